// ABOUTME: Route module organization and shared request plumbing for the RecipeShare web pages
// ABOUTME: Holds the shared resources, the client-key middleware and the router builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route modules for the RecipeShare server
//!
//! Each module owns one screen (or one group of form posts) and exposes a
//! `routes()` constructor. Pages render server-side. Every form post ends in
//! a redirect, and its notifications travel through the [`FlashStore`] to
//! the next page render.

/// Sign-in and sign-out
pub mod auth;
/// Recipe creation form
pub mod create;
/// Liveness and readiness probes
pub mod health;
/// Landing page
pub mod home;
/// Profile page with own and saved recipes
pub mod profile;
/// Listing, detail, like/save toggles and comments
pub mod recipes;

pub use auth::AuthRoutes;
pub use create::{CreateRoutes, DraftStore};
pub use health::HealthRoutes;
pub use home::HomeRoutes;
pub use profile::ProfileRoutes;
pub use recipes::RecipeRoutes;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    Router,
};
use tera::Context;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::cookies::{get_cookie_value, set_client_cookie};
use crate::data_client::DataClient;
use crate::errors::AppResult;
use crate::notifications::{FlashStore, Notification, NotificationQueue};
use crate::session::SessionContext;
use crate::templates::{PageChrome, TemplateRenderer};
use recipe_core::constants::cookies;

/// Form bodies are small; anything larger is rejected before parsing
const MAX_FORM_BODY_BYTES: usize = 64 * 1024;

/// Everything the handlers share
pub struct AppResources {
    /// Backend data client
    pub client: Arc<dyn DataClient>,
    /// Compiled page templates
    pub templates: TemplateRenderer,
    /// Notifications waiting for the next page render, per browser
    pub flash: FlashStore,
    /// In-progress create forms, per browser
    pub drafts: DraftStore,
    /// Recipes shown on the landing page
    pub featured_recipe_limit: u32,
    /// Mark cookies `Secure`
    pub secure_cookies: bool,
}

impl AppResources {
    /// Resources for `client` configured from `config`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the page templates fail to parse
    pub fn new(client: Arc<dyn DataClient>, config: &ServerConfig) -> AppResult<Self> {
        Ok(Self {
            client,
            templates: TemplateRenderer::new()?,
            flash: FlashStore::new(),
            drafts: DraftStore::new(),
            featured_recipe_limit: config.featured_recipe_limit,
            secure_cookies: config.environment.is_production(),
        })
    }

    /// Session of the request's access token cookie
    pub async fn session(&self, headers: &HeaderMap) -> SessionContext {
        let token = get_cookie_value(headers, cookies::ACCESS_TOKEN);
        SessionContext::resolve(self.client.as_ref(), token.as_deref()).await
    }

    /// Render a full page: chrome plus whatever `fill` adds
    ///
    /// Flash notifications for `client` are consumed here, followed by the
    /// ones raised while building this page.
    pub fn render_page(
        &self,
        template: &str,
        path: &str,
        session: &SessionContext,
        client: &ClientKey,
        raised: &NotificationQueue,
        fill: impl FnOnce(&mut Context),
    ) -> AppResult<Response> {
        let mut notifications: Vec<Notification> = self.flash.take(client.as_str());
        notifications.extend(raised.drain());
        let mut context = PageChrome::new(path, session, &notifications).context();
        fill(&mut context);
        let html = self.templates.render(template, &context)?;
        Ok(Html(html).into_response())
    }

    /// Stash `raised` for the next page and redirect there
    pub fn redirect_with_flash(
        &self,
        client: &ClientKey,
        raised: &NotificationQueue,
        to: &str,
    ) -> Response {
        self.flash.push_all(client.as_str(), raised.drain());
        Redirect::to(to).into_response()
    }
}

/// Opaque per-browser key carried in the client cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(String);

impl ClientKey {
    /// Key text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Make sure every request carries a [`ClientKey`], issuing one when absent
async fn ensure_client_key(
    State(resources): State<Arc<AppResources>>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = get_cookie_value(request.headers(), cookies::CLIENT_KEY)
        .filter(|key| Uuid::parse_str(key).is_ok());
    let issued = existing.is_none();
    let key = existing.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    request.extensions_mut().insert(ClientKey(key.clone()));

    let mut response = next.run(request).await;
    if issued {
        set_client_cookie(response.headers_mut(), &key, resources.secure_cookies);
    }
    response
}

/// Full application router
pub fn router(resources: Arc<AppResources>) -> Router {
    Router::new()
        .merge(HomeRoutes::routes(Arc::clone(&resources)))
        .merge(RecipeRoutes::routes(Arc::clone(&resources)))
        .merge(CreateRoutes::routes(Arc::clone(&resources)))
        .merge(ProfileRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&resources),
            ensure_client_key,
        ))
        .merge(HealthRoutes::routes())
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
