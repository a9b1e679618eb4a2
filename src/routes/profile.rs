// ABOUTME: Profile page with the signed-in user's recipes and saved recipes as two tabs
// ABOUTME: Anonymous visitors are sent to the sign-in page
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use tracing::warn;

use super::{AppResources, ClientKey};
use crate::errors::AppError;
use crate::notifications::NotificationQueue;
use crate::views::profile::load_profile;
use crate::views::ProfileTab;

/// Profile query string
#[derive(Debug, Default, Deserialize)]
pub struct ProfileParams {
    /// `my-recipes` or `saved`
    pub tab: Option<String>,
}

/// Profile routes
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// `GET /profile`
    pub fn routes(resources: Arc<AppResources>) -> Router {
        Router::new()
            .route("/profile", get(Self::handle_profile))
            .with_state(resources)
    }

    async fn handle_profile(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
        Query(params): Query<ProfileParams>,
    ) -> Result<Response, AppError> {
        let session = resources.session(&headers).await;
        if !session.is_authenticated() {
            return Ok(Redirect::to("/auth/login").into_response());
        }

        let tab = params
            .tab
            .as_deref()
            .unwrap_or_default()
            .parse::<ProfileTab>()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to the default profile tab");
                ProfileTab::default()
            });
        let profile = load_profile(resources.client.as_ref(), &session).await?;

        resources.render_page(
            "profile.html",
            "/profile",
            &session,
            &client,
            &NotificationQueue::new(),
            |context| {
                context.insert("tab", tab.as_str());
                context.insert("profile", &profile);
            },
        )
    }
}
