// ABOUTME: Recipe listing, recipe detail, like/save toggles and comment posting
// ABOUTME: Form posts redirect back to the detail page with their notifications flashed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{AppResources, ClientKey};
use crate::errors::AppError;
use crate::models::{Difficulty, DifficultyFilter, RelationKind};
use crate::notifications::NotificationQueue;
use crate::views::{DetailStatus, RecipeDetailView, RecipeListView};

/// Listing query string
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    /// `all`, `easy`, `medium` or `hard`; absent keeps the default
    pub difficulty: Option<String>,
    /// Submitted title search
    pub q: Option<String>,
}

/// Comment form body
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    /// Comment text
    #[serde(default)]
    pub content: String,
}

/// Recipe routes
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Listing, detail and the detail page's form posts
    pub fn routes(resources: Arc<AppResources>) -> Router {
        Router::new()
            .route("/recipes", get(Self::handle_list))
            .route("/recipes/:id", get(Self::handle_detail))
            .route("/recipes/:id/like", post(Self::handle_like))
            .route("/recipes/:id/save", post(Self::handle_save))
            .route("/recipes/:id/comments", post(Self::handle_comment))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
        Query(params): Query<ListingParams>,
    ) -> Result<Response, AppError> {
        let session = resources.session(&headers).await;
        let view = RecipeListView::new(Arc::clone(&resources.client));
        view.set_search_input(params.q.unwrap_or_default());

        match params.difficulty.as_deref() {
            Some(raw) => {
                let filter = raw.parse::<DifficultyFilter>().unwrap_or_else(|e| {
                    warn!(difficulty = raw, error = %e, "Ignoring unknown difficulty filter");
                    DifficultyFilter::All
                });
                view.set_difficulty(&session, filter).await;
            }
            None => view.submit_search(&session).await,
        }
        let listing = view.state();
        view.unmount();

        resources.render_page(
            "recipes.html",
            "/recipes",
            &session,
            &client,
            &NotificationQueue::new(),
            |context| {
                context.insert("listing", &listing);
                context.insert("difficulties", &Difficulty::ALL);
            },
        )
    }

    async fn handle_detail(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let session = resources.session(&headers).await;
        let raised = NotificationQueue::new();
        let view = RecipeDetailView::new(Arc::clone(&resources.client), recipe_id);
        view.mount(&session, &raised).await;
        let detail = view.state();
        let interaction = view.interaction();
        view.unmount();

        let status = if detail.status == DetailStatus::Loaded {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        };
        let path = format!("/recipes/{recipe_id}");
        let page = resources.render_page(
            "recipe_detail.html",
            &path,
            &session,
            &client,
            &raised,
            |context| {
                context.insert("recipe_id", &recipe_id);
                context.insert("detail", &detail);
                context.insert("interaction", &interaction);
            },
        )?;
        Ok((status, page).into_response())
    }

    async fn handle_like(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Response {
        Self::toggle_relation(&resources, &client, &headers, recipe_id, RelationKind::Like).await
    }

    async fn handle_save(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
    ) -> Response {
        Self::toggle_relation(&resources, &client, &headers, recipe_id, RelationKind::Save).await
    }

    async fn toggle_relation(
        resources: &AppResources,
        client: &ClientKey,
        headers: &HeaderMap,
        recipe_id: Uuid,
        kind: RelationKind,
    ) -> Response {
        let session = resources.session(headers).await;
        let raised = NotificationQueue::new();
        let view = RecipeDetailView::new(Arc::clone(&resources.client), recipe_id);

        if session.is_authenticated() {
            if let Err(e) = view.load_interaction(&session).await {
                warn!(recipe_id = %recipe_id, error = %e, "Error checking user interactions");
            }
        }
        if let Err(e) = view.toggle(&session, kind, &raised).await {
            debug!(recipe_id = %recipe_id, kind = ?kind, error = %e, "Toggle not applied");
        }
        view.unmount();

        resources.redirect_with_flash(client, &raised, &format!("/recipes/{recipe_id}"))
    }

    async fn handle_comment(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
        Path(recipe_id): Path<Uuid>,
        Form(form): Form<CommentForm>,
    ) -> Response {
        let session = resources.session(&headers).await;
        let raised = NotificationQueue::new();
        let view = RecipeDetailView::new(Arc::clone(&resources.client), recipe_id);
        view.set_comment_draft(form.content);
        if let Err(e) = view.submit_comment(&session, &raised).await {
            debug!(recipe_id = %recipe_id, error = %e, "Comment not posted");
        }
        view.unmount();

        resources.redirect_with_flash(&client, &raised, &format!("/recipes/{recipe_id}"))
    }
}
