// ABOUTME: Email/password sign-in and sign-out against the data service's identity endpoints
// ABOUTME: The access token lives in an HttpOnly cookie; sign-out clears it even if the remote call fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Authentication routes
//!
//! Sign-in exchanges the posted credentials for a session with the data
//! service and stores its token in a cookie. Every later request resolves
//! the token back into a user through
//! [`SessionContext::resolve`](crate::session::SessionContext::resolve).

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{AppResources, ClientKey};
use crate::cookies::{clear_auth_cookie, set_auth_cookie};
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::notifications::{NotificationQueue, Notifier};
use crate::views::profile::sign_out;
use recipe_core::constants::messages;

/// Sign-in form body
#[derive(Deserialize)]
pub struct LoginForm {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Account password
    #[serde(default)]
    pub password: String,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Sign-in page, sign-in post and sign-out post
    pub fn routes(resources: Arc<AppResources>) -> Router {
        Router::new()
            .route("/auth/login", get(Self::handle_login_page).post(Self::handle_login))
            .route("/auth/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    async fn handle_login_page(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let session = resources.session(&headers).await;
        resources.render_page(
            "login.html",
            "/auth/login",
            &session,
            &client,
            &NotificationQueue::new(),
            |_| {},
        )
    }

    async fn handle_login(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        Form(form): Form<LoginForm>,
    ) -> Response {
        let raised = NotificationQueue::new();
        let email = form.email.trim();
        if email.is_empty() || form.password.is_empty() {
            raised.error(messages::SIGN_IN_FAILED);
            return resources.redirect_with_flash(&client, &raised, "/auth/login");
        }

        match resources
            .client
            .sign_in_with_password(email, &form.password)
            .await
        {
            Ok(auth) => {
                AppLogger::log_auth_event(Some(auth.user.id), "sign_in", true);
                info!(user_id = %auth.user.id, "User signed in");
                let mut response = resources.redirect_with_flash(&client, &raised, "/recipes");
                set_auth_cookie(
                    response.headers_mut(),
                    &auth.access_token,
                    resources.secure_cookies,
                );
                response
            }
            Err(e) => {
                AppLogger::log_auth_event(None, "sign_in", false);
                warn!(error = %e, "Sign-in rejected");
                let message = if e.code.is_unauthenticated() {
                    messages::SIGN_IN_FAILED.to_owned()
                } else {
                    e.message
                };
                raised.error(&message);
                resources.redirect_with_flash(&client, &raised, "/auth/login")
            }
        }
    }

    async fn handle_logout(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
    ) -> impl IntoResponse {
        let session = resources.session(&headers).await;
        let raised = NotificationQueue::new();
        if let Err(e) = sign_out(resources.client.as_ref(), &session).await {
            warn!(error = %e, "Remote sign-out failed, clearing the local session anyway");
        }
        raised.success(messages::SIGNED_OUT);
        resources.drafts.discard(client.as_str());

        let mut response = resources.redirect_with_flash(&client, &raised, "/");
        clear_auth_cookie(response.headers_mut(), resources.secure_cookies);
        response
    }
}
