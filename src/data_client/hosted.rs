// ABOUTME: Hosted backend client speaking PostgREST-style REST and GoTrue-style auth over reqwest
// ABOUTME: Translates RowQuery into select/filter/order params and parses exact counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_RANGE};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::{DataClient, Filter, QueryMode, QueryOutput, Row, RowQuery, SortDirection};
use crate::config::environment::HttpClientConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{AuthSession, AuthUser};
use recipe_core::constants::messages;

const SERVICE: &str = "data service";

/// Client for a hosted backend-as-a-service
///
/// Every call carries the project's anon key in `apikey`; the bearer token is
/// the caller's session token when present, the anon key otherwise, so
/// row-level security sees the right identity.
pub struct HostedDataClient {
    base_url: Url,
    anon_key: String,
    http: Client,
}

impl HostedDataClient {
    /// Create a client for the project at `base_url`
    pub fn new(base_url: Url, anon_key: String, config: &HttpClientConfig) -> AppResult<Self> {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            anon_key,
            http,
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::config(format!("Invalid backend URL for {path}: {e}")))
    }

    fn rest_url(&self, collection: &str) -> AppResult<Url> {
        self.endpoint(&format!("rest/v1/{collection}"))
    }

    fn authorized(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
    }

    async fn send(builder: RequestBuilder) -> AppResult<Response> {
        let response = builder.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::status_error(response).await)
    }

    async fn status_error(response: Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(%status, body = %body, "Data service rejected request");
        match status {
            StatusCode::UNAUTHORIZED => AppError::auth_invalid(format!("{SERVICE}: {body}")),
            StatusCode::FORBIDDEN => AppError::permission_denied(format!("{SERVICE}: {body}")),
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                AppError::service_unavailable(format!("{SERVICE} returned {status}"))
            }
            _ => AppError::external_service(SERVICE, format!("{status}: {body}")),
        }
    }

    async fn fetch_rows(&self, access_token: Option<&str>, query: &RowQuery) -> AppResult<Vec<Row>> {
        let mut params = vec![("select".to_owned(), select_clause(query))];
        params.extend(filter_params(&query.filters));
        if let Some(order) = &query.order {
            params.push(("order".to_owned(), order_param(&order.column, order.direction)));
        }
        let limit = match query.mode {
            // Two rows are enough to tell "one" from "more than one"
            QueryMode::Single => Some(query.limit.map_or(2, |l| l.min(2))),
            QueryMode::Many | QueryMode::Count => query.limit,
        };
        if let Some(limit) = limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }

        let request = self
            .http
            .get(self.rest_url(&query.collection)?)
            .query(&params)
            .header(ACCEPT, "application/json");
        let response = Self::send(self.authorized(request, access_token)).await?;
        let rows: Vec<Row> = response.json().await?;
        debug!(collection = %query.collection, rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    async fn fetch_count(&self, access_token: Option<&str>, query: &RowQuery) -> AppResult<u64> {
        let mut params = vec![("select".to_owned(), "*".to_owned())];
        params.extend(filter_params(&query.filters));

        let request = self
            .http
            .head(self.rest_url(&query.collection)?)
            .query(&params)
            .header("Prefer", "count=exact");
        let response = Self::send(self.authorized(request, access_token)).await?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .ok_or_else(|| AppError::external_service(SERVICE, "Missing Content-Range header"))?;
        parse_content_range(range)
    }
}

#[async_trait]
impl DataClient for HostedDataClient {
    fn backend_name(&self) -> &'static str {
        "hosted"
    }

    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>> {
        let request = self.http.get(self.endpoint("auth/v1/user")?);
        let response = self.authorized(request, Some(access_token)).send().await?;
        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let request = self
            .http
            .post(self.endpoint("auth/v1/token")?)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = self.authorized(request, None).send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(AppError::auth_invalid(messages::SIGN_IN_FAILED))
            }
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let request = self.http.post(self.endpoint("auth/v1/logout")?);
        Self::send(self.authorized(request, Some(access_token))).await?;
        Ok(())
    }

    async fn query(&self, access_token: Option<&str>, query: &RowQuery) -> AppResult<QueryOutput> {
        match query.mode {
            QueryMode::Count => Ok(QueryOutput::Count(
                self.fetch_count(access_token, query).await?,
            )),
            QueryMode::Single => {
                QueryOutput::Rows(self.fetch_rows(access_token, query).await?)
                    .into_row()
                    .map(QueryOutput::Row)
            }
            QueryMode::Many => Ok(QueryOutput::Rows(
                self.fetch_rows(access_token, query).await?,
            )),
        }
    }

    async fn insert(
        &self,
        access_token: Option<&str>,
        collection: &str,
        row: Row,
    ) -> AppResult<()> {
        let request = self
            .http
            .post(self.rest_url(collection)?)
            .header("Prefer", "return=minimal")
            .json(&Value::Object(row));
        Self::send(self.authorized(request, access_token)).await?;
        debug!(collection, "Inserted row");
        Ok(())
    }

    async fn delete(
        &self,
        access_token: Option<&str>,
        collection: &str,
        filters: &[Filter],
    ) -> AppResult<()> {
        if filters.is_empty() {
            return Err(AppError::invalid_input(format!(
                "Refusing to delete every row of {collection}"
            )));
        }
        let request = self
            .http
            .delete(self.rest_url(collection)?)
            .query(&filter_params(filters));
        Self::send(self.authorized(request, access_token)).await?;
        debug!(collection, "Deleted rows");
        Ok(())
    }
}

// ============================================================================
// Query translation
// ============================================================================

/// `select` parameter: `*` or the column list, followed by `alias:table(cols)` embeds
fn select_clause(query: &RowQuery) -> String {
    let mut parts = if query.columns.is_empty() {
        vec!["*".to_owned()]
    } else {
        query.columns.clone()
    };
    for embed in &query.embeds {
        let columns = if embed.columns.is_empty() {
            "*".to_owned()
        } else {
            embed.columns.join(",")
        };
        parts.push(format!("{}:{}({columns})", embed.alias, embed.collection));
    }
    parts.join(",")
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::Eq {
                column,
                value: Value::Null,
            } => (column.clone(), "is.null".to_owned()),
            Filter::Eq {
                column,
                value: Value::String(text),
            } => (column.clone(), format!("eq.{text}")),
            Filter::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Filter::ILike { column, pattern } => (column.clone(), format!("ilike.{pattern}")),
        })
        .collect()
}

fn order_param(column: &str, direction: SortDirection) -> String {
    match direction {
        SortDirection::Ascending => format!("{column}.asc"),
        SortDirection::Descending => format!("{column}.desc"),
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`
fn parse_content_range(value: &str) -> AppResult<u64> {
    value
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| AppError::external_service(SERVICE, format!("Unusable Content-Range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_client::Embed;
    use recipe_core::constants::{collections, columns};

    fn client() -> HostedDataClient {
        let config = HttpClientConfig {
            timeout_secs: 5,
            connect_timeout_secs: 5,
        };
        HostedDataClient::new(
            Url::parse("https://project.example.co/").unwrap(),
            "anon".to_owned(),
            &config,
        )
        .unwrap()
    }

    #[test]
    fn test_select_clause_with_embed() {
        let query = RowQuery::new(collections::RECIPES)
            .embed(Embed::user(&[columns::ID, columns::EMAIL]));
        assert_eq!(select_clause(&query), "*,user:users(id,email)");

        let saved = RowQuery::new(collections::SAVED_RECIPES)
            .select(&[columns::CREATED_AT])
            .embed(Embed::recipe());
        assert_eq!(select_clause(&saved), "created_at,recipe:recipes(*)");
    }

    #[test]
    fn test_filter_params_render_operators() {
        let params = filter_params(&[
            Filter::eq(columns::DIFFICULTY, "hard"),
            Filter::eq("cooking_time", 30),
            Filter::ilike(columns::TITLE, "%soup%"),
        ]);
        assert_eq!(params[0], ("difficulty".to_owned(), "eq.hard".to_owned()));
        assert_eq!(params[1], ("cooking_time".to_owned(), "eq.30".to_owned()));
        assert_eq!(params[2], ("title".to_owned(), "ilike.%soup%".to_owned()));
    }

    #[test]
    fn test_order_param() {
        assert_eq!(
            order_param(columns::CREATED_AT, SortDirection::Descending),
            "created_at.desc"
        );
        assert_eq!(order_param(columns::TITLE, SortDirection::Ascending), "title.asc");
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-24/3573").unwrap(), 3573);
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
        assert!(parse_content_range("0-24/*").is_err());
    }

    #[test]
    fn test_rest_url_joins_collection() {
        let url = client().rest_url(collections::LIKES).unwrap();
        assert_eq!(url.as_str(), "https://project.example.co/rest/v1/likes");
    }
}
