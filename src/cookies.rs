// ABOUTME: Cookie helpers for the access token and the per-browser client key
// ABOUTME: Builds Set-Cookie values with HttpOnly/SameSite defaults and reads cookies from request headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::http::{header, HeaderMap, HeaderValue};
use tracing::warn;

use recipe_core::constants::cookies;

/// `SameSite` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on same-site requests and top-level navigations
    Lax,
    /// Sent on same-site requests only
    Strict,
}

/// Attributes of one `Set-Cookie` header
#[derive(Debug, Clone)]
pub struct SecureCookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Lifetime in seconds; 0 expires the cookie immediately
    pub max_age_secs: u64,
    /// Hide from scripts
    pub http_only: bool,
    /// Only send over HTTPS
    pub secure: bool,
    /// Cross-site policy
    pub same_site: SameSite,
}

impl SecureCookieConfig {
    /// `HttpOnly`, `SameSite=Lax` cookie on `/`
    #[must_use]
    pub const fn new(name: String, value: String, max_age_secs: u64) -> Self {
        Self {
            name,
            value,
            max_age_secs,
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Require HTTPS
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Render the `Set-Cookie` value
    #[must_use]
    pub fn build(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}",
            self.name, self.value, self.max_age_secs
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(match self.same_site {
            SameSite::Lax => "; SameSite=Lax",
            SameSite::Strict => "; SameSite=Strict",
        });
        cookie
    }

    /// Append as a `Set-Cookie` header
    pub fn append_to(&self, headers: &mut HeaderMap) {
        match HeaderValue::from_str(&self.build()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %self.name, error = %e, "Skipping unencodable cookie"),
        }
    }
}

/// Store the backend access token
pub fn set_auth_cookie(headers: &mut HeaderMap, token: &str, secure: bool) {
    SecureCookieConfig::new(
        cookies::ACCESS_TOKEN.to_owned(),
        token.to_owned(),
        cookies::ACCESS_TOKEN_MAX_AGE_SECS,
    )
    .with_secure(secure)
    .append_to(headers);
}

/// Expire the access token cookie
pub fn clear_auth_cookie(headers: &mut HeaderMap, secure: bool) {
    SecureCookieConfig::new(cookies::ACCESS_TOKEN.to_owned(), String::new(), 0)
        .with_secure(secure)
        .append_to(headers);
}

/// Store the per-browser client key
pub fn set_client_cookie(headers: &mut HeaderMap, key: &str, secure: bool) {
    SecureCookieConfig::new(
        cookies::CLIENT_KEY.to_owned(),
        key.to_owned(),
        cookies::ACCESS_TOKEN_MAX_AGE_SECS,
    )
    .with_secure(secure)
    .append_to(headers);
}

/// Value of cookie `name` from the request's `Cookie` headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}
