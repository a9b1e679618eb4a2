// ABOUTME: Per-screen view controllers holding view-local state mirrored from remote rows
// ABOUTME: Listing, detail, interaction toggles, recipe form and profile, plus the generation-token lifetime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # View Controllers
//!
//! Each screen owns its state and talks to the [`DataClient`](crate::data_client::DataClient)
//! directly. Identity always arrives as an explicit
//! [`SessionContext`](crate::session::SessionContext) and user-facing outcomes
//! go to a [`Notifier`](crate::notifications::Notifier).
//!
//! Fetches started by a view take a [`FetchToken`] from its [`ViewLifetime`];
//! a response whose token is no longer current is dropped instead of applied.

/// Recipe detail aggregation and comment submission
pub mod detail;
/// Like/save reconciliation
pub mod interactions;
/// Generation tokens for discarding stale responses
pub mod lifetime;
/// Recipe listing and featured strip
pub mod listing;
/// Profile tabs
pub mod profile;
/// Recipe creation form
pub mod recipe_form;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use detail::{DetailState, DetailStatus, RecipeDetailView};
pub use interactions::{InteractionState, PendingToggle};
pub use lifetime::{FetchToken, ViewLifetime};
pub use listing::{ListingState, RecipeListView};
pub use profile::{ProfileData, ProfileTab};
pub use recipe_form::{FormEdit, FormError, FormField, IngredientField, RecipeDraft};

/// Lock view state, recovering from a poisoned mutex
///
/// State is only ever replaced wholesale under the lock, so a panic elsewhere
/// cannot leave it half-written.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
