// ABOUTME: Per-request session context carrying the access token and resolved user
// ABOUTME: Resolved once from the data client and passed explicitly into every view operation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use tracing::{debug, warn};

use crate::data_client::DataClient;
use crate::errors::{AppError, AppResult};
use crate::models::AuthUser;

/// Read-only identity for one request
///
/// `user` is `None` for anonymous visitors and for tokens the backend no
/// longer accepts; in both cases `access_token` is dropped so that reads go
/// out anonymously.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

impl SessionContext {
    /// Visitor without a session
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session whose user is already known
    #[must_use]
    pub fn authenticated(access_token: impl Into<String>, user: AuthUser) -> Self {
        Self {
            access_token: Some(access_token.into()),
            user: Some(user),
        }
    }

    /// Look up the user behind `access_token`
    ///
    /// Lookup failures degrade to an anonymous session; a page never fails
    /// because identity could not be resolved.
    pub async fn resolve(client: &dyn DataClient, access_token: Option<&str>) -> Self {
        let Some(token) = access_token.filter(|t| !t.is_empty()) else {
            return Self::anonymous();
        };
        match client.get_user(token).await {
            Ok(Some(user)) => {
                debug!(user_id = %user.id, "Session resolved");
                Self::authenticated(token, user)
            }
            Ok(None) => {
                debug!("Access token rejected, continuing anonymously");
                Self::anonymous()
            }
            Err(e) => {
                warn!(error = %e, "Session lookup failed, continuing anonymously");
                Self::anonymous()
            }
        }
    }

    /// Current user, if signed in
    #[must_use]
    pub const fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// Token to forward to the data client
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Whether a user is signed in
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Current user or an unauthenticated error
    pub fn require_user(&self) -> AppResult<&AuthUser> {
        self.user.as_ref().ok_or_else(AppError::auth_required)
    }
}
