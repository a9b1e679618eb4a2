// ABOUTME: Landing page with the hero links and a strip of the newest recipes
// ABOUTME: A failed featured fetch is logged and the strip renders empty
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use tracing::error;

use super::{AppResources, ClientKey};
use crate::errors::AppError;
use crate::notifications::NotificationQueue;
use crate::views::listing::featured_recipes;

/// Landing page routes
pub struct HomeRoutes;

impl HomeRoutes {
    /// `GET /` plus the not-found page for unknown paths
    pub fn routes(resources: Arc<AppResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_home))
            .fallback(Self::handle_not_found)
            .with_state(resources)
    }

    async fn handle_home(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let session = resources.session(&headers).await;
        let featured = featured_recipes(
            resources.client.as_ref(),
            &session,
            resources.featured_recipe_limit,
        )
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "Error fetching featured recipes");
            Vec::new()
        });

        resources.render_page(
            "home.html",
            "/",
            &session,
            &client,
            &NotificationQueue::new(),
            |context| context.insert("featured", &featured),
        )
    }

    async fn handle_not_found(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
        uri: Uri,
    ) -> Result<Response, AppError> {
        let session = resources.session(&headers).await;
        let page = resources.render_page(
            "error.html",
            uri.path(),
            &session,
            &client,
            &NotificationQueue::new(),
            |context| {
                context.insert("error_title", "Page not found");
                context.insert("error_message", "The page you're looking for doesn't exist.");
            },
        )?;
        Ok((StatusCode::NOT_FOUND, page).into_response())
    }
}
