// ABOUTME: Authenticated identity returned by the backend and public user fields for embeds
// ABOUTME: An AuthSession pairs the opaque access token with the user it belongs to
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in user as reported by the backend's identity lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    /// User identifier, referenced by `user_id` columns
    pub id: Uuid,
    /// Sign-in email
    pub email: String,
}

/// Result of a successful password sign-in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthSession {
    /// Bearer token for subsequent calls
    pub access_token: String,
    /// Who the token belongs to
    pub user: AuthUser,
}

/// Public user fields embedded into recipe and comment rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    /// Present when the embed selected it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Email shown as the author name
    pub email: String,
}
