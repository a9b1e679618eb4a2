// ABOUTME: Like/save reconciliation between view-local flags and the remote relation rows
// ABOUTME: Optimistic toggle with rollback on failure, plus the initial interaction fetch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use super::lock;
use crate::data_client::{self, DataClient, Filter, RowQuery};
use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::models::{NewRelation, RelationKind};
use crate::notifications::Notifier;
use crate::session::SessionContext;
use recipe_core::constants::{collections, columns, messages};

/// What the current user sees on the like and save buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InteractionState {
    /// A like row exists for (recipe, user)
    pub liked: bool,
    /// A saved row exists for (recipe, user)
    pub saved: bool,
    /// Total like rows for the recipe
    pub like_count: u64,
}

/// A toggle that has been applied locally but not yet confirmed remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingToggle {
    /// Relation toggled
    pub kind: RelationKind,
    /// Flag value after the toggle
    pub now_active: bool,
    /// How far the like counter actually moved; a saturated decrement moves it 0
    pub count_delta: i8,
}

impl InteractionState {
    /// Current flag for `kind`
    #[must_use]
    pub const fn is_active(&self, kind: RelationKind) -> bool {
        match kind {
            RelationKind::Like => self.liked,
            RelationKind::Save => self.saved,
        }
    }

    fn set_active(&mut self, kind: RelationKind, active: bool) {
        match kind {
            RelationKind::Like => self.liked = active,
            RelationKind::Save => self.saved = active,
        }
    }

    fn shift_count(&mut self, delta: i8) {
        self.like_count = if delta >= 0 {
            self.like_count.saturating_add(u64::from(delta.unsigned_abs()))
        } else {
            self.like_count.saturating_sub(u64::from(delta.unsigned_abs()))
        };
    }

    /// Flip the flag for `kind` and move the counter with it
    pub fn begin_toggle(&mut self, kind: RelationKind) -> PendingToggle {
        let now_active = !self.is_active(kind);
        self.set_active(kind, now_active);

        let count_delta = match (kind.is_counted(), now_active) {
            (true, true) => 1,
            (true, false) if self.like_count > 0 => -1,
            _ => 0,
        };
        self.shift_count(count_delta);
        PendingToggle {
            kind,
            now_active,
            count_delta,
        }
    }

    /// Undo `pending` if the state still shows it
    ///
    /// Returns `false` when something else already changed the flag; the
    /// state is then left alone.
    pub fn rollback(&mut self, pending: PendingToggle) -> bool {
        if self.is_active(pending.kind) != pending.now_active {
            return false;
        }
        self.set_active(pending.kind, !pending.now_active);
        self.shift_count(-pending.count_delta);
        true
    }
}

fn relation_filters(recipe_id: Uuid, user_id: Uuid) -> [Filter; 2] {
    [
        Filter::eq(columns::RECIPE_ID, recipe_id.to_string()),
        Filter::eq(columns::USER_ID, user_id.to_string()),
    ]
}

async fn relation_exists(
    client: &dyn DataClient,
    session: &SessionContext,
    kind: RelationKind,
    recipe_id: Uuid,
    user_id: Uuid,
) -> AppResult<bool> {
    let mut query = RowQuery::new(kind.collection()).select(&[columns::ID]);
    query.filters.extend(relation_filters(recipe_id, user_id));
    let row: Option<serde_json::Value> =
        data_client::fetch_optional(client, session.access_token(), query).await?;
    Ok(row.is_some())
}

/// Load like count and, for a signed-in user, the like/save flags
///
/// The count is read for everyone; the flags stay `false` without a user.
pub async fn fetch_interaction_state(
    client: &dyn DataClient,
    session: &SessionContext,
    recipe_id: Uuid,
) -> AppResult<InteractionState> {
    let count_query =
        RowQuery::new(collections::LIKES).eq(columns::RECIPE_ID, recipe_id.to_string());
    let like_count = data_client::count(client, session.access_token(), count_query);

    let Some(user) = session.user() else {
        return Ok(InteractionState {
            like_count: like_count.await?,
            ..InteractionState::default()
        });
    };

    let (like_count, liked, saved) = tokio::try_join!(
        like_count,
        relation_exists(client, session, RelationKind::Like, recipe_id, user.id),
        relation_exists(client, session, RelationKind::Save, recipe_id, user.id),
    )?;
    Ok(InteractionState {
        liked,
        saved,
        like_count,
    })
}

/// Toggle the `kind` relation between the session user and `recipe_id`
///
/// The local flag (and like counter) flips before the remote call is issued.
/// On failure the flip is rolled back if nothing has changed it since, and an
/// error notification is raised. Returns the flag value now in effect.
///
/// # Errors
///
/// Returns `AuthRequired` without any remote call when nobody is signed in,
/// or the remote error after rollback
pub async fn toggle(
    client: &dyn DataClient,
    session: &SessionContext,
    recipe_id: Uuid,
    kind: RelationKind,
    state: &Mutex<InteractionState>,
    notifier: &dyn Notifier,
) -> AppResult<bool> {
    let user = match session.require_user() {
        Ok(user) => user,
        Err(e) => {
            notifier.error(kind.sign_in_prompt());
            return Err(e);
        }
    };

    let pending = lock(state).begin_toggle(kind);
    debug!(%kind, %recipe_id, now_active = pending.now_active, "Toggling relation");

    let result = if pending.now_active {
        let relation = NewRelation {
            recipe_id,
            user_id: user.id,
        };
        data_client::insert_record(client, session.access_token(), kind.collection(), &relation)
            .await
    } else {
        client
            .delete(
                session.access_token(),
                kind.collection(),
                &relation_filters(recipe_id, user.id),
            )
            .await
    };

    match result {
        Ok(()) => {
            AppLogger::log_interaction(kind, recipe_id, user.id, pending.now_active);
            if kind == RelationKind::Save {
                notifier.success(if pending.now_active {
                    messages::RECIPE_SAVED
                } else {
                    messages::RECIPE_UNSAVED
                });
            }
            Ok(pending.now_active)
        }
        Err(e) => {
            error!(%kind, %recipe_id, user_id = %user.id, error = %e, "Relation toggle failed");
            let reverted = lock(state).rollback(pending);
            debug!(reverted, "Rolled back optimistic toggle");
            notifier.error(kind.failure_message());
            Err(e)
        }
    }
}
