// ABOUTME: Remote data client contract: identity lookup, row query, insert, delete, sign-in/out
// ABOUTME: Query builder types plus typed fetch helpers shared by every view controller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Remote Data Client
//!
//! The application never owns its data. Every screen talks to a managed
//! backend through the [`DataClient`] trait: collections are addressed by name,
//! rows travel as JSON objects, and filters are the two predicate kinds the
//! screens need (equality and case-insensitive pattern).
//!
//! Two backends implement the trait:
//! - [`hosted::HostedDataClient`]: PostgREST-style REST plus GoTrue-style auth
//! - [`sqlite::SqliteDataClient`]: local `SQLite` schema for development and tests

/// Hosted backend over HTTP
pub mod hosted;
/// LIKE pattern escaping and matching
pub mod pattern;
/// Local `SQLite` backend
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::config::environment::{BackendConfig, HttpClientConfig};
use crate::errors::{AppError, AppResult};
use crate::models::{AuthSession, AuthUser};
use recipe_core::constants::{collections, columns, embeds};

pub use hosted::HostedDataClient;
pub use sqlite::SqliteDataClient;

/// One row as returned by the backend
pub type Row = Map<String, Value>;

// ============================================================================
// Query building
// ============================================================================

/// Row predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq {
        /// Column name
        column: String,
        /// Compared value
        value: Value,
    },
    /// Case-insensitive `LIKE`: `%` matches any run, `_` one character, `\` escapes
    ILike {
        /// Column name
        column: String,
        /// Pattern including wildcards
        pattern: String,
    },
}

impl Filter {
    /// Equality predicate
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive pattern predicate
    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::ILike {
            column: column.into(),
            pattern: pattern.into(),
        }
    }

    /// Column the predicate applies to
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Eq { column, .. } | Self::ILike { column, .. } => column,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Oldest / smallest first
    Ascending,
    /// Newest / largest first
    Descending,
}

/// Ordering clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Sort key
    pub column: String,
    /// Sort direction
    pub direction: SortDirection,
}

/// Related row embedded under `alias`, resolved through `foreign_key`
///
/// Mirrors a `alias:collection(columns)` select: the row's `foreign_key` value
/// is looked up as the `id` of `collection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// Key the related row appears under
    pub alias: String,
    /// Collection of the related row
    pub collection: String,
    /// Column of the parent row holding the related id
    pub foreign_key: String,
    /// Selected columns of the related row; empty selects all
    pub columns: Vec<String>,
}

impl Embed {
    /// Owner/author public fields, embedded as `user`
    #[must_use]
    pub fn user(fields: &[&str]) -> Self {
        Self {
            alias: embeds::USER.to_owned(),
            collection: collections::USERS.to_owned(),
            foreign_key: columns::USER_ID.to_owned(),
            columns: fields.iter().map(|c| (*c).to_owned()).collect(),
        }
    }

    /// Full recipe row, embedded as `recipe`
    #[must_use]
    pub fn recipe() -> Self {
        Self {
            alias: embeds::RECIPE.to_owned(),
            collection: collections::RECIPES.to_owned(),
            foreign_key: columns::RECIPE_ID.to_owned(),
            columns: Vec::new(),
        }
    }
}

/// Shape of the result a query asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Every matching row
    #[default]
    Many,
    /// At most one row; more than one match is an error
    Single,
    /// Only the number of matching rows
    Count,
}

/// A read against one collection
#[derive(Debug, Clone, PartialEq)]
pub struct RowQuery {
    /// Target collection
    pub collection: String,
    /// Selected columns; empty selects all
    pub columns: Vec<String>,
    /// Related rows to embed
    pub embeds: Vec<Embed>,
    /// Predicates, AND-combined
    pub filters: Vec<Filter>,
    /// Optional ordering
    pub order: Option<Order>,
    /// Optional row limit
    pub limit: Option<u32>,
    /// Result shape
    pub mode: QueryMode,
}

impl RowQuery {
    /// Start a query selecting all columns of `collection`
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            columns: Vec::new(),
            embeds: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
            mode: QueryMode::Many,
        }
    }

    /// Restrict the selected columns
    #[must_use]
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.columns = fields.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    /// Embed a related row
    #[must_use]
    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Add an equality predicate
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    /// Add a case-insensitive pattern predicate
    #[must_use]
    pub fn ilike(mut self, column: &str, pattern: impl Into<String>) -> Self {
        self.filters.push(Filter::ilike(column, pattern));
        self
    }

    /// Case-insensitive literal substring predicate on `column`
    #[must_use]
    pub fn contains(self, column: &str, term: &str) -> Self {
        self.ilike(column, pattern::contains_pattern(term))
    }

    /// Order by `column`
    #[must_use]
    pub fn order(mut self, column: &str, direction: SortDirection) -> Self {
        self.order = Some(Order {
            column: column.to_owned(),
            direction,
        });
        self
    }

    /// Newest rows first
    #[must_use]
    pub fn newest_first(self) -> Self {
        self.order(columns::CREATED_AT, SortDirection::Descending)
    }

    /// Limit the number of rows
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Ask for at most one row
    #[must_use]
    pub fn single(mut self) -> Self {
        self.mode = QueryMode::Single;
        self
    }

    /// Ask only for the number of matching rows
    #[must_use]
    pub fn count(mut self) -> Self {
        self.mode = QueryMode::Count;
        self
    }
}

/// Result of [`DataClient::query`], shaped by [`QueryMode`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// `QueryMode::Many`
    Rows(Vec<Row>),
    /// `QueryMode::Single`
    Row(Option<Row>),
    /// `QueryMode::Count`
    Count(u64),
}

impl QueryOutput {
    /// Rows of a `Many` query
    pub fn into_rows(self) -> AppResult<Vec<Row>> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Row(row) => Ok(row.into_iter().collect()),
            Self::Count(_) => Err(AppError::internal("Expected rows, got a count")),
        }
    }

    /// Row of a `Single` query
    pub fn into_row(self) -> AppResult<Option<Row>> {
        match self {
            Self::Row(row) => Ok(row),
            Self::Rows(mut rows) if rows.len() <= 1 => Ok(rows.pop()),
            Self::Rows(rows) => Err(AppError::external_service(
                "data service",
                format!("Expected a single row, got {}", rows.len()),
            )),
            Self::Count(_) => Err(AppError::internal("Expected a row, got a count")),
        }
    }

    /// Count of a `Count` query
    pub fn into_count(self) -> AppResult<u64> {
        match self {
            Self::Count(count) => Ok(count),
            Self::Rows(_) | Self::Row(_) => Err(AppError::internal("Expected a count, got rows")),
        }
    }
}

// ============================================================================
// Client contract
// ============================================================================

/// Managed backend executing authenticated CRUD against named collections
///
/// `access_token` is the caller's session token; `None` issues the call
/// anonymously. Row-level permission checks are the backend's concern.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Resolve the user owning `access_token`, `None` if the token is not valid
    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>>;

    /// Exchange email and password for a session
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// Invalidate the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;

    /// Run a read
    async fn query(&self, access_token: Option<&str>, query: &RowQuery) -> AppResult<QueryOutput>;

    /// Insert one row into `collection`
    async fn insert(&self, access_token: Option<&str>, collection: &str, row: Row)
        -> AppResult<()>;

    /// Delete the rows of `collection` matching every filter
    async fn delete(
        &self,
        access_token: Option<&str>,
        collection: &str,
        filters: &[Filter],
    ) -> AppResult<()>;
}

// ============================================================================
// Typed helpers
// ============================================================================

fn decode_row<T: DeserializeOwned>(row: Row) -> AppResult<T> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| AppError::serialization(format!("Failed to decode row: {e}")))
}

/// Run a `Many` query and decode every row
pub async fn fetch_all<T: DeserializeOwned>(
    client: &dyn DataClient,
    access_token: Option<&str>,
    query: &RowQuery,
) -> AppResult<Vec<T>> {
    client
        .query(access_token, query)
        .await?
        .into_rows()?
        .into_iter()
        .map(decode_row)
        .collect()
}

/// Run a query in single-row mode and decode the row if present
pub async fn fetch_optional<T: DeserializeOwned>(
    client: &dyn DataClient,
    access_token: Option<&str>,
    query: RowQuery,
) -> AppResult<Option<T>> {
    client
        .query(access_token, &query.single())
        .await?
        .into_row()?
        .map(decode_row)
        .transpose()
}

/// Run a query in count-only mode
pub async fn count(
    client: &dyn DataClient,
    access_token: Option<&str>,
    query: RowQuery,
) -> AppResult<u64> {
    client
        .query(access_token, &query.count())
        .await?
        .into_count()
}

/// Serialize `record` and insert it as one row
pub async fn insert_record<T: Serialize + Sync>(
    client: &dyn DataClient,
    access_token: Option<&str>,
    collection: &str,
    record: &T,
) -> AppResult<()> {
    match serde_json::to_value(record)? {
        Value::Object(row) => client.insert(access_token, collection, row).await,
        other => Err(AppError::serialization(format!(
            "Insert payload must be an object, got {other}"
        ))),
    }
}

/// Build the data client selected by configuration
pub async fn connect(
    backend: &BackendConfig,
    http: &HttpClientConfig,
) -> AppResult<Arc<dyn DataClient>> {
    let client: Arc<dyn DataClient> = match backend {
        BackendConfig::Hosted { url, anon_key } => {
            Arc::new(HostedDataClient::new(url.clone(), anon_key.clone(), http)?)
        }
        BackendConfig::Local { database_url } => {
            Arc::new(SqliteDataClient::connect(database_url).await?)
        }
    };
    info!(backend = client.backend_name(), "Data client ready");
    Ok(client)
}
