// ABOUTME: Local SQLite implementation of the data client contract backed by sqlx
// ABOUTME: Owns the schema, password auth with opaque session tokens, and row-level ownership checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{query::Query, Row as _, Sqlite, SqlitePool};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::pattern::LikePattern;
use super::{DataClient, Embed, Filter, QueryMode, QueryOutput, Row, RowQuery, SortDirection};
use crate::errors::{AppError, AppResult};
use crate::models::{AuthSession, AuthUser};
use recipe_core::constants::{collections, columns, messages};

// ============================================================================
// Collection schemas
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Integer,
    Json,
}

/// Readable columns of one collection; only these names ever reach SQL text
struct CollectionSchema {
    name: &'static str,
    columns: &'static [(&'static str, ColumnKind)],
    /// Column that must match the session user on insert and delete
    owner_column: Option<&'static str>,
}

impl CollectionSchema {
    fn kind_of(&self, column: &str) -> AppResult<ColumnKind> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| {
                AppError::invalid_input(format!("Unknown column {column} on {}", self.name))
            })
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const RELATION_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Text),
    ("recipe_id", ColumnKind::Text),
    ("user_id", ColumnKind::Text),
    ("created_at", ColumnKind::Text),
];

const SCHEMAS: &[CollectionSchema] = &[
    CollectionSchema {
        name: collections::RECIPES,
        columns: &[
            ("id", ColumnKind::Text),
            ("title", ColumnKind::Text),
            ("description", ColumnKind::Text),
            ("cooking_time", ColumnKind::Integer),
            ("difficulty", ColumnKind::Text),
            ("ingredients", ColumnKind::Json),
            ("steps", ColumnKind::Json),
            ("user_id", ColumnKind::Text),
            ("created_at", ColumnKind::Text),
        ],
        owner_column: Some(columns::USER_ID),
    },
    CollectionSchema {
        name: collections::COMMENTS,
        columns: &[
            ("id", ColumnKind::Text),
            ("recipe_id", ColumnKind::Text),
            ("user_id", ColumnKind::Text),
            ("content", ColumnKind::Text),
            ("created_at", ColumnKind::Text),
        ],
        owner_column: Some(columns::USER_ID),
    },
    CollectionSchema {
        name: collections::LIKES,
        columns: RELATION_COLUMNS,
        owner_column: Some(columns::USER_ID),
    },
    CollectionSchema {
        name: collections::SAVED_RECIPES,
        columns: RELATION_COLUMNS,
        owner_column: Some(columns::USER_ID),
    },
    // password_hash is never readable through queries
    CollectionSchema {
        name: collections::USERS,
        columns: &[
            ("id", ColumnKind::Text),
            ("email", ColumnKind::Text),
            ("created_at", ColumnKind::Text),
        ],
        owner_column: None,
    },
];

fn schema_for(collection: &str) -> AppResult<&'static CollectionSchema> {
    SCHEMAS
        .iter()
        .find(|schema| schema.name == collection)
        .ok_or_else(|| AppError::not_found(format!("Collection {collection}")))
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn password_cost() -> u32 {
    if cfg!(debug_assertions) {
        4
    } else {
        bcrypt::DEFAULT_COST
    }
}

// ============================================================================
// Client
// ============================================================================

/// Data client over a local `SQLite` database
///
/// Reads are public. Inserts must carry the session user's id in the owner
/// column and deletes only ever touch the session user's rows, mirroring the
/// row-level policies of the hosted backend.
#[derive(Clone)]
pub struct SqliteDataClient {
    pool: SqlitePool,
}

impl SqliteDataClient {
    /// Open (creating if needed) the database at `database_url` and apply the schema
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed, the file cannot be created,
    /// or a migration fails
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL {database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool = if in_memory {
            // Every connection to :memory: is a separate database; keep exactly one alive
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::config(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
            SqlitePoolOptions::new().connect_with(options).await
        }
        .map_err(|e| AppError::database(format!("Failed to open {database_url}: {e}")))?;

        let client = Self { pool };
        client.migrate().await?;
        info!(database_url, "SQLite data client connected");
        Ok(client)
    }

    /// Underlying pool, for tests and maintenance tasks
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> AppResult<()> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                cooking_time INTEGER NOT NULL CHECK (cooking_time > 0),
                difficulty TEXT NOT NULL CHECK (difficulty IN ('easy', 'medium', 'hard')),
                ingredients TEXT NOT NULL DEFAULT '[]',
                steps TEXT NOT NULL DEFAULT '[]',
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS likes (
                id TEXT PRIMARY KEY,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE (recipe_id, user_id)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS saved_recipes (
                id TEXT PRIMARY KEY,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE (recipe_id, user_id)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_recipes_created_at ON recipes(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_comments_recipe ON comments(recipe_id, created_at)",
            "CREATE INDEX IF NOT EXISTS idx_likes_recipe ON likes(recipe_id)",
            "CREATE INDEX IF NOT EXISTS idx_saved_user ON saved_recipes(user_id, created_at)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        Ok(())
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Register a user with a bcrypt-hashed password
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is taken
    #[instrument(skip(self, password))]
    pub async fn create_user(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::missing_field("email"));
        }
        if password.is_empty() {
            return Err(AppError::missing_field("password"));
        }

        let owned_password = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(owned_password, password_cost()))
                .await
                .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_owned(),
        };
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(password_hash)
        .bind(timestamp_now())
        .execute(&self.pool)
        .await?;

        info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Find a user by email, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_user_by_email(&self, email: &str) -> AppResult<Option<AuthUser>> {
        let row = sqlx::query("SELECT id, email FROM users WHERE email = $1 COLLATE NOCASE")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up user: {e}")))?;
        row.as_ref().map(row_to_auth_user).transpose()
    }

    async fn session_user_id(&self, access_token: Option<&str>) -> AppResult<Uuid> {
        let token = access_token.ok_or_else(AppError::auth_required)?;
        self.get_user(token)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| AppError::auth_invalid("Session expired or invalid"))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    async fn select_rows(&self, schema: &CollectionSchema, query: &RowQuery) -> AppResult<Vec<Row>> {
        let clause = where_clause(schema, &query.filters)?;
        let mut sql = format!("SELECT {} FROM {}{}", schema.column_list(), schema.name, clause.sql);

        if let Some(order) = &query.order {
            schema.kind_of(&order.column)?;
            let direction = match order.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            sql.push_str(&format!(" ORDER BY {} {direction}, rowid {direction}", order.column));
        }

        let limit = match query.mode {
            QueryMode::Single => Some(query.limit.map_or(2, |l| l.min(2))),
            QueryMode::Many | QueryMode::Count => query.limit,
        };
        // Pattern filters run after decoding, so the limit has to wait for them
        if let Some(limit) = limit.filter(|_| clause.patterns.is_empty()) {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut decoded = self.fetch_matching(schema, &sql, &clause).await?;
        if let Some(limit) = limit {
            decoded.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        for embed in &query.embeds {
            self.attach_embed(&mut decoded, embed).await?;
        }
        if !query.columns.is_empty() {
            for row in &mut decoded {
                project(row, &query.columns, &query.embeds);
            }
        }
        debug!(collection = schema.name, rows = decoded.len(), "Selected rows");
        Ok(decoded)
    }

    async fn attach_embed(&self, rows: &mut [Row], embed: &Embed) -> AppResult<()> {
        let related = schema_for(&embed.collection)?;
        let mut resolved: HashMap<String, Value> = HashMap::new();

        for row in rows.iter_mut() {
            let Some(Value::String(key)) = row.get(&embed.foreign_key).cloned() else {
                row.insert(embed.alias.clone(), Value::Null);
                continue;
            };
            if !resolved.contains_key(&key) {
                let found = self.fetch_by_id(related, &key).await?;
                let value = found.map_or(Value::Null, |mut found| {
                    if !embed.columns.is_empty() {
                        found.retain(|name, _| embed.columns.iter().any(|c| c == name));
                    }
                    Value::Object(found)
                });
                resolved.insert(key.clone(), value);
            }
            let value = resolved.get(&key).cloned().unwrap_or(Value::Null);
            row.insert(embed.alias.clone(), value);
        }
        Ok(())
    }

    async fn fetch_by_id(&self, schema: &CollectionSchema, id: &str) -> AppResult<Option<Row>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            schema.column_list(),
            schema.name
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load {} {id}: {e}", schema.name)))?;
        row.as_ref().map(|row| decode_row(schema, row)).transpose()
    }

    /// Run `sql` with the clause's binds and keep the rows its patterns accept
    async fn fetch_matching(
        &self,
        schema: &CollectionSchema,
        sql: &str,
        clause: &WhereClause,
    ) -> AppResult<Vec<Row>> {
        let rows = bind_all(sqlx::query(sql), &clause.binds)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to query {}: {e}", schema.name)))?;

        let mut decoded = Vec::with_capacity(rows.len());
        for row in &rows {
            let row = decode_row(schema, row)?;
            if clause.accepts(&row) {
                decoded.push(row);
            }
        }
        Ok(decoded)
    }

    async fn count_rows(&self, schema: &CollectionSchema, filters: &[Filter]) -> AppResult<u64> {
        let clause = where_clause(schema, filters)?;
        if !clause.patterns.is_empty() {
            let sql = format!("SELECT {} FROM {}{}", schema.column_list(), schema.name, clause.sql);
            let matching = self.fetch_matching(schema, &sql, &clause).await?;
            return Ok(u64::try_from(matching.len()).unwrap_or(u64::MAX));
        }
        let sql = format!("SELECT COUNT(*) AS total FROM {}{}", schema.name, clause.sql);
        let row = bind_all(sqlx::query(&sql), &clause.binds)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count {}: {e}", schema.name)))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| AppError::database(format!("Failed to read count: {e}")))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

#[async_trait]
impl DataClient for SqliteDataClient {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>> {
        let row = sqlx::query(
            r"
            SELECT u.id, u.email FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
            ",
        )
        .bind(access_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to resolve session: {e}")))?;
        row.as_ref().map(row_to_auth_user).transpose()
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let row = sqlx::query("SELECT id, email, password_hash FROM users WHERE email = $1 COLLATE NOCASE")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up user: {e}")))?
            .ok_or_else(|| AppError::auth_invalid(messages::SIGN_IN_FAILED))?;

        let hash: String = row
            .try_get("password_hash")
            .map_err(|e| AppError::database(format!("Failed to read password hash: {e}")))?;
        let candidate = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || {
            bcrypt::verify(&candidate, &hash).unwrap_or(false)
        })
        .await
        .unwrap_or(false);
        if !verified {
            return Err(AppError::auth_invalid(messages::SIGN_IN_FAILED));
        }

        let user = row_to_auth_user(&row)?;
        let access_token = Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(&access_token)
            .bind(user.id.to_string())
            .bind(timestamp_now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create session: {e}")))?;

        info!(user_id = %user.id, "User signed in");
        Ok(AuthSession { access_token, user })
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(access_token)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete session: {e}")))?;
        Ok(())
    }

    async fn query(&self, _access_token: Option<&str>, query: &RowQuery) -> AppResult<QueryOutput> {
        let schema = schema_for(&query.collection)?;
        match query.mode {
            QueryMode::Count => Ok(QueryOutput::Count(
                self.count_rows(schema, &query.filters).await?,
            )),
            QueryMode::Single => QueryOutput::Rows(self.select_rows(schema, query).await?)
                .into_row()
                .map(QueryOutput::Row),
            QueryMode::Many => Ok(QueryOutput::Rows(self.select_rows(schema, query).await?)),
        }
    }

    #[instrument(skip(self, access_token, row))]
    async fn insert(
        &self,
        access_token: Option<&str>,
        collection: &str,
        mut row: Row,
    ) -> AppResult<()> {
        let schema = schema_for(collection)?;
        let Some(owner_column) = schema.owner_column else {
            return Err(AppError::permission_denied(format!(
                "Rows of {collection} cannot be inserted directly"
            )));
        };
        let user_id = self.session_user_id(access_token).await?;
        match row.get(owner_column) {
            Some(Value::String(owner)) if *owner == user_id.to_string() => {}
            _ => {
                return Err(AppError::permission_denied(format!(
                    "{collection} rows must belong to the signed-in user"
                ))
                .with_user_id(user_id))
            }
        }

        row.entry(columns::ID.to_owned())
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.insert(columns::CREATED_AT.to_owned(), Value::String(timestamp_now()));

        let mut names = Vec::with_capacity(row.len());
        let mut binds = Vec::with_capacity(row.len());
        for (name, value) in &row {
            binds.push(BindValue::for_column(schema.kind_of(name)?, name, value)?);
            names.push(name.as_str());
        }
        let placeholders = (1..=names.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {collection} ({}) VALUES ({placeholders})",
            names.join(", ")
        );

        bind_all(sqlx::query(&sql), &binds)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.message().contains("CHECK constraint") => {
                    AppError::invalid_input(format!("Rejected {collection} row: {db}"))
                }
                other => AppError::from(other),
            })?;
        debug!(collection, %user_id, "Inserted row");
        Ok(())
    }

    #[instrument(skip(self, access_token, filters))]
    async fn delete(
        &self,
        access_token: Option<&str>,
        collection: &str,
        filters: &[Filter],
    ) -> AppResult<()> {
        let schema = schema_for(collection)?;
        let Some(owner_column) = schema.owner_column else {
            return Err(AppError::permission_denied(format!(
                "Rows of {collection} cannot be deleted directly"
            )));
        };
        if filters.is_empty() {
            return Err(AppError::invalid_input(format!(
                "Refusing to delete every row of {collection}"
            )));
        }
        let user_id = self.session_user_id(access_token).await?;

        let mut scoped = filters.to_vec();
        scoped.push(Filter::eq(owner_column, user_id.to_string()));
        let clause = where_clause(schema, &scoped)?;

        let deleted = if clause.patterns.is_empty() {
            let sql = format!("DELETE FROM {collection}{}", clause.sql);
            bind_all(sqlx::query(&sql), &clause.binds)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete from {collection}: {e}")))?
                .rows_affected()
        } else {
            let sql = format!("SELECT {} FROM {collection}{}", schema.column_list(), clause.sql);
            let matching = self.fetch_matching(schema, &sql, &clause).await?;
            let delete_sql = format!("DELETE FROM {collection} WHERE id = $1");
            let mut deleted = 0;
            for row in matching {
                let Some(Value::String(id)) = row.get(columns::ID) else {
                    continue;
                };
                deleted += sqlx::query(&delete_sql)
                    .bind(id.as_str())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::database(format!("Failed to delete from {collection}: {e}"))
                    })?
                    .rows_affected();
            }
            deleted
        };
        debug!(collection, %user_id, deleted, "Deleted rows");
        Ok(())
    }
}

// ============================================================================
// SQL helpers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
}

impl BindValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(text) => Self::Text(text.clone()),
            Value::Bool(flag) => Self::Integer(i64::from(*flag)),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Integer)
                .or_else(|| number.as_f64().map(Self::Real))
                .unwrap_or_else(|| Self::Text(number.to_string())),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    fn for_column(kind: ColumnKind, column: &str, value: &Value) -> AppResult<Self> {
        match (kind, value) {
            (_, Value::Null) => Ok(Self::Null),
            (ColumnKind::Json, other) => Ok(Self::Text(other.to_string())),
            (ColumnKind::Integer, Value::Number(number)) => number
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| AppError::invalid_input(format!("{column} must be an integer"))),
            (ColumnKind::Integer, _) => {
                Err(AppError::invalid_input(format!("{column} must be an integer")))
            }
            (ColumnKind::Text, Value::String(text)) => Ok(Self::Text(text.clone())),
            (ColumnKind::Text, _) => Err(AppError::invalid_input(format!("{column} must be text"))),
        }
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    binds: &[BindValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in binds {
        query = match value {
            BindValue::Null => query.bind(Option::<String>::None),
            BindValue::Text(text) => query.bind(text.clone()),
            BindValue::Integer(number) => query.bind(*number),
            BindValue::Real(number) => query.bind(*number),
        };
    }
    query
}

/// SQL predicates plus the pattern filters applied to decoded rows
///
/// `SQLite`'s `lower()` only folds ASCII, so `ILike` is matched in Rust.
#[derive(Debug, Default)]
struct WhereClause {
    /// ` WHERE a = $1 AND b IS NULL`, or empty
    sql: String,
    binds: Vec<BindValue>,
    patterns: Vec<(String, LikePattern)>,
}

impl WhereClause {
    fn accepts(&self, row: &Row) -> bool {
        self.patterns
            .iter()
            .all(|(column, pattern)| match row.get(column) {
                Some(Value::String(text)) => pattern.matches(text),
                Some(Value::Number(number)) => pattern.matches(&number.to_string()),
                _ => false,
            })
    }
}

fn where_clause(schema: &CollectionSchema, filters: &[Filter]) -> AppResult<WhereClause> {
    let mut predicates = Vec::with_capacity(filters.len());
    let mut clause = WhereClause::default();

    for filter in filters {
        schema.kind_of(filter.column())?;
        match filter {
            Filter::Eq {
                column,
                value: Value::Null,
            } => predicates.push(format!("{column} IS NULL")),
            Filter::Eq { column, value } => {
                clause.binds.push(BindValue::from_json(value));
                predicates.push(format!("{column} = ${}", clause.binds.len()));
            }
            Filter::ILike { column, pattern } => {
                clause
                    .patterns
                    .push((column.clone(), LikePattern::new(pattern)));
            }
        }
    }

    if !predicates.is_empty() {
        clause.sql = format!(" WHERE {}", predicates.join(" AND "));
    }
    Ok(clause)
}

fn decode_row(schema: &CollectionSchema, row: &SqliteRow) -> AppResult<Row> {
    let mut decoded = Row::new();
    for (name, kind) in schema.columns {
        let value = match kind {
            ColumnKind::Text => row
                .try_get::<Option<String>, _>(*name)
                .map(|v| v.map_or(Value::Null, Value::String)),
            ColumnKind::Integer => row
                .try_get::<Option<i64>, _>(*name)
                .map(|v| v.map_or(Value::Null, Value::from)),
            ColumnKind::Json => row.try_get::<Option<String>, _>(*name).map(|v| {
                v.and_then(|text| serde_json::from_str(&text).ok())
                    .unwrap_or(Value::Null)
            }),
        }
        .map_err(|e| AppError::database(format!("Failed to read {}.{name}: {e}", schema.name)))?;
        decoded.insert((*name).to_owned(), value);
    }
    Ok(decoded)
}

fn row_to_auth_user(row: &SqliteRow) -> AppResult<AuthUser> {
    let id: String = row
        .try_get("id")
        .map_err(|e| AppError::database(format!("Failed to read user id: {e}")))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| AppError::database(format!("Failed to read user email: {e}")))?;
    Ok(AuthUser {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid user id {id}: {e}")))?,
        email,
    })
}

/// Keep only the selected columns and the embed aliases
fn project(row: &mut Row, selected: &[String], embeds: &[Embed]) {
    row.retain(|name, _| {
        selected.iter().any(|c| c == name) || embeds.iter().any(|e| e.alias == *name)
    });
}
