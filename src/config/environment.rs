// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses listen address, backend selection (hosted or local SQLite) and HTTP client timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration

use std::env;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::info;
use url::Url;

use recipe_core::constants::defaults;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Which data service the server talks to
#[derive(Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Hosted backend-as-a-service
    Hosted {
        /// Project base URL, always ending in `/`
        url: Url,
        /// Public anon key sent with every request
        anon_key: String,
    },
    /// Local `SQLite` database
    Local {
        /// sqlx connection URL
        database_url: String,
    },
}

impl BackendConfig {
    /// Read `RECIPE_BACKEND` and the variables of the selected backend
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown backend or missing hosted credentials
    pub fn from_env() -> Result<Self> {
        let kind = env_var_or("RECIPE_BACKEND", "local");
        match kind.trim().to_lowercase().as_str() {
            "local" | "sqlite" => Ok(Self::Local {
                database_url: env_var_or("DATABASE_URL", defaults::DATABASE_URL),
            }),
            "hosted" | "remote" => {
                let raw_url = env::var("BACKEND_URL")
                    .context("BACKEND_URL is required when RECIPE_BACKEND=hosted")?;
                let anon_key = env::var("BACKEND_ANON_KEY")
                    .context("BACKEND_ANON_KEY is required when RECIPE_BACKEND=hosted")?;
                if anon_key.trim().is_empty() {
                    bail!("BACKEND_ANON_KEY must not be empty");
                }
                Ok(Self::Hosted {
                    url: normalize_base_url(&raw_url)?,
                    anon_key,
                })
            }
            other => bail!("Invalid RECIPE_BACKEND value: {other} (expected hosted or local)"),
        }
    }

    /// Short name for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Hosted { .. } => "hosted",
            Self::Local { .. } => "local",
        }
    }
}

impl Debug for BackendConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hosted { url, .. } => f
                .debug_struct("Hosted")
                .field("url", &url.as_str())
                .field("anon_key", &"[redacted]")
                .finish(),
            Self::Local { database_url } => f
                .debug_struct("Local")
                .field("database_url", database_url)
                .finish(),
        }
    }
}

/// Timeouts for calls to the hosted backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::HTTP_CLIENT_TIMEOUT_SECS,
            connect_timeout_secs: defaults::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Listen host
    pub host: String,
    /// Listen port
    pub http_port: u16,
    /// Data service selection
    pub backend: BackendConfig,
    /// Remote call timeouts
    pub http_client: HttpClientConfig,
    /// Recipes shown in the home page strip
    pub featured_recipe_limit: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            host: env_var_or("HOST", defaults::HOST),
            http_port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
            backend: BackendConfig::from_env()?,
            http_client: HttpClientConfig {
                timeout_secs: parse_env(
                    "HTTP_CLIENT_TIMEOUT_SECS",
                    defaults::HTTP_CLIENT_TIMEOUT_SECS,
                )?,
                connect_timeout_secs: parse_env(
                    "HTTP_CLIENT_CONNECT_TIMEOUT_SECS",
                    defaults::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
                )?,
            },
            featured_recipe_limit: parse_env(
                "FEATURED_RECIPE_LIMIT",
                defaults::FEATURED_RECIPE_LIMIT,
            )?,
        };

        if config.http_client.timeout_secs == 0 {
            bail!("HTTP_CLIENT_TIMEOUT_SECS must be positive");
        }
        Ok(config)
    }

    /// `host:port` to bind the listener to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        let backend = match &self.backend {
            BackendConfig::Hosted { url, .. } => format!("hosted ({url})"),
            BackendConfig::Local { database_url } => format!("local ({database_url})"),
        };
        format!(
            "RecipeShare Configuration:\n\
             - Environment: {}\n\
             - Listen: {}\n\
             - Backend: {backend}\n\
             - HTTP client timeout: {}s (connect {}s)\n\
             - Featured recipes: {}",
            self.environment,
            self.bind_address(),
            self.http_client.timeout_secs,
            self.http_client.connect_timeout_secs,
            self.featured_recipe_limit,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Parse a project URL so that `join("rest/v1/...")` appends instead of replacing
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("Invalid BACKEND_URL: {raw}"))?;
    if url.cannot_be_a_base() {
        bail!("BACKEND_URL must be an http(s) URL: {raw}");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
