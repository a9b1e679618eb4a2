// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory data clients, seeded users and recipes, and a fault-injecting client wrapper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `recipe_share`

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use recipe_share::{
    config::{BackendConfig, Environment, HttpClientConfig, ServerConfig},
    constants::{collections, columns},
    data_client::{self, DataClient, Filter, QueryOutput, Row, RowQuery, SqliteDataClient},
    errors::{AppError, AppResult},
    models::{AuthSession, AuthUser, Difficulty, Ingredient, NewRecipe, Recipe, Step},
    session::SessionContext,
};

static INIT_LOGGER: Once = Once::new();

/// Password used for every test account
pub const TEST_PASSWORD: &str = "Sup3rSecret!";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory `SQLite` data client with the schema applied
pub async fn create_test_client() -> SqliteDataClient {
    init_test_logging();
    SqliteDataClient::connect("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Configuration for router tests
pub fn test_server_config() -> ServerConfig {
    ServerConfig {
        environment: Environment::Testing,
        host: "127.0.0.1".to_owned(),
        http_port: 0,
        backend: BackendConfig::Local {
            database_url: "sqlite::memory:".to_owned(),
        },
        http_client: HttpClientConfig::default(),
        featured_recipe_limit: 3,
    }
}

/// A registered user with a live session
pub struct TestUser {
    /// Identity
    pub user: AuthUser,
    /// Session for view calls
    pub session: SessionContext,
    /// Raw access token, for cookies
    pub access_token: String,
}

/// Register `email` and sign it in
pub async fn create_test_user(client: &SqliteDataClient, email: &str) -> TestUser {
    client.create_user(email, TEST_PASSWORD).await.unwrap();
    let AuthSession { access_token, user } = client
        .sign_in_with_password(email, TEST_PASSWORD)
        .await
        .unwrap();
    TestUser {
        session: SessionContext::authenticated(access_token.clone(), user.clone()),
        user,
        access_token,
    }
}

/// Complete recipe payload owned by `user_id`
pub fn sample_recipe(user_id: uuid::Uuid, title: &str, difficulty: Difficulty) -> NewRecipe {
    NewRecipe {
        title: title.to_owned(),
        description: format!("How to make {title}"),
        cooking_time: 30,
        difficulty,
        ingredients: vec![Ingredient {
            id: "1".to_owned(),
            name: "flour".to_owned(),
            amount: "2".to_owned(),
            unit: "cups".to_owned(),
        }],
        steps: vec![Step {
            id: "2".to_owned(),
            description: "Mix everything".to_owned(),
        }],
        user_id,
    }
}

/// Insert a recipe for `owner` and read it back
pub async fn create_test_recipe(
    client: &dyn DataClient,
    owner: &TestUser,
    title: &str,
    difficulty: Difficulty,
) -> Recipe {
    let recipe = sample_recipe(owner.user.id, title, difficulty);
    data_client::insert_record(
        client,
        owner.session.access_token(),
        collections::RECIPES,
        &recipe,
    )
    .await
    .unwrap();

    let query = RowQuery::new(collections::RECIPES).eq(columns::TITLE, title);
    data_client::fetch_optional(client, None, query)
        .await
        .unwrap()
        .expect("inserted recipe")
}

// ============================================================================
// Fault injection
// ============================================================================

/// Wraps a real client and fails or delays calls on demand
pub struct FlakyClient {
    inner: SqliteDataClient,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    query_delays_ms: Mutex<VecDeque<u64>>,
    writes: AtomicUsize,
}

impl FlakyClient {
    /// Healthy wrapper around `inner`
    pub fn new(inner: SqliteDataClient) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            query_delays_ms: Mutex::new(VecDeque::new()),
            writes: AtomicUsize::new(0),
        })
    }

    /// Wrapped client, for setup that must not be faulted
    pub const fn inner(&self) -> &SqliteDataClient {
        &self.inner
    }

    /// Make every read fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every insert and delete fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay the next queries, one entry per query
    pub fn delay_next_queries(&self, delays_ms: &[u64]) {
        self.query_delays_ms
            .lock()
            .unwrap()
            .extend(delays_ms.iter().copied());
    }

    /// Inserts and deletes attempted so far
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn write_guard(&self) -> AppResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("injected write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl DataClient for FlakyClient {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>> {
        self.inner.get_user(access_token).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        self.inner.sign_in_with_password(email, password).await
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.inner.sign_out(access_token).await
    }

    async fn query(&self, access_token: Option<&str>, query: &RowQuery) -> AppResult<QueryOutput> {
        let delay = self.query_delays_ms.lock().unwrap().pop_front();
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("injected read failure"));
        }
        self.inner.query(access_token, query).await
    }

    async fn insert(&self, access_token: Option<&str>, collection: &str, row: Row) -> AppResult<()> {
        self.write_guard()?;
        self.inner.insert(access_token, collection, row).await
    }

    async fn delete(
        &self,
        access_token: Option<&str>,
        collection: &str,
        filters: &[Filter],
    ) -> AppResult<()> {
        self.write_guard()?;
        self.inner.delete(access_token, collection, filters).await
    }
}
