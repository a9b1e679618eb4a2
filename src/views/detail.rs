// ABOUTME: Recipe detail view aggregating recipe, comments and interaction state concurrently
// ABOUTME: Handles comment submission and like/save toggles against the loaded recipe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::interactions::{self, InteractionState};
use super::{lock, FetchToken, ViewLifetime};
use crate::data_client::{self, DataClient, Embed, RowQuery};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Comment, NewComment, Recipe, RelationKind};
use crate::notifications::Notifier;
use crate::session::SessionContext;
use recipe_core::constants::{collections, columns, messages};

/// Whether the detail screen has something to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailStatus {
    /// Mount has not completed
    #[default]
    Loading,
    /// Recipe row present
    Loaded,
    /// No row for the id, or the fetch failed
    NotFound,
}

/// Detail screen state
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailState {
    /// Load outcome
    pub status: DetailStatus,
    /// Recipe with its owner embedded
    pub recipe: Option<Recipe>,
    /// Comments, newest first, with authors embedded
    pub comments: Vec<Comment>,
    /// Text in the comment box
    pub comment_draft: String,
}

/// Recipe row plus its owner's public fields
pub async fn fetch_recipe(
    client: &dyn DataClient,
    session: &SessionContext,
    recipe_id: Uuid,
) -> AppResult<Option<Recipe>> {
    let query = RowQuery::new(collections::RECIPES)
        .embed(Embed::user(&[columns::ID, columns::EMAIL]))
        .eq(columns::ID, recipe_id.to_string());
    data_client::fetch_optional(client, session.access_token(), query).await
}

/// Comments on a recipe, newest first, with each author's email
pub async fn fetch_comments(
    client: &dyn DataClient,
    session: &SessionContext,
    recipe_id: Uuid,
) -> AppResult<Vec<Comment>> {
    let query = RowQuery::new(collections::COMMENTS)
        .embed(Embed::user(&[columns::EMAIL]))
        .eq(columns::RECIPE_ID, recipe_id.to_string())
        .newest_first();
    data_client::fetch_all(client, session.access_token(), &query).await
}

/// Recipe detail controller
pub struct RecipeDetailView {
    client: Arc<dyn DataClient>,
    recipe_id: Uuid,
    lifetime: ViewLifetime,
    state: Mutex<DetailState>,
    interaction: Mutex<InteractionState>,
}

impl RecipeDetailView {
    /// Unmounted view for `recipe_id`
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>, recipe_id: Uuid) -> Self {
        Self {
            client,
            recipe_id,
            lifetime: ViewLifetime::new(),
            state: Mutex::new(DetailState::default()),
            interaction: Mutex::new(InteractionState::default()),
        }
    }

    /// Recipe this view shows
    #[must_use]
    pub const fn recipe_id(&self) -> Uuid {
        self.recipe_id
    }

    /// Copy of the screen state
    #[must_use]
    pub fn state(&self) -> DetailState {
        lock(&self.state).clone()
    }

    /// Copy of the like/save state
    #[must_use]
    pub fn interaction(&self) -> InteractionState {
        *lock(&self.interaction)
    }

    /// Fetch recipe, comments and interaction state concurrently
    ///
    /// Each part fails on its own: a recipe failure shows "not found" and
    /// raises an error notification, a comments or interaction failure leaves
    /// that section empty or zeroed.
    pub async fn mount(&self, session: &SessionContext, notifier: &dyn Notifier) {
        let token = self.lifetime.begin();
        let client = self.client.as_ref();

        let (recipe, comments, interaction) = tokio::join!(
            fetch_recipe(client, session, self.recipe_id),
            fetch_comments(client, session, self.recipe_id),
            interactions::fetch_interaction_state(client, session, self.recipe_id),
        );

        if !self.lifetime.is_current(token) {
            debug!(recipe_id = %self.recipe_id, "Discarding stale detail response");
            return;
        }

        let mut state = lock(&self.state);
        match recipe {
            Ok(Some(recipe)) => {
                state.status = DetailStatus::Loaded;
                state.recipe = Some(recipe);
            }
            Ok(None) => {
                debug!(recipe_id = %self.recipe_id, "Recipe not found");
                state.status = DetailStatus::NotFound;
                state.recipe = None;
            }
            Err(e) => {
                error!(recipe_id = %self.recipe_id, error = %e, "Error fetching recipe");
                notifier.error(messages::RECIPE_LOAD_FAILED);
                state.status = DetailStatus::NotFound;
                state.recipe = None;
            }
        }
        state.comments = comments.unwrap_or_else(|e| {
            error!(recipe_id = %self.recipe_id, error = %e, "Error fetching comments");
            Vec::new()
        });
        drop(state);

        *lock(&self.interaction) = interaction.unwrap_or_else(|e| {
            warn!(recipe_id = %self.recipe_id, error = %e, "Error checking user interactions");
            InteractionState::default()
        });
    }

    /// Fetch only the like/save state, ahead of a toggle
    pub async fn load_interaction(&self, session: &SessionContext) -> AppResult<()> {
        let token = self.lifetime.begin();
        let state =
            interactions::fetch_interaction_state(self.client.as_ref(), session, self.recipe_id)
                .await?;
        if self.lifetime.is_current(token) {
            *lock(&self.interaction) = state;
        }
        Ok(())
    }

    /// Stop applying responses
    pub fn unmount(&self) {
        self.lifetime.unmount();
    }

    /// Replace the text in the comment box
    pub fn set_comment_draft(&self, text: impl Into<String>) {
        lock(&self.state).comment_draft = text.into();
    }

    /// Toggle like or save for the session user
    pub async fn toggle(
        &self,
        session: &SessionContext,
        kind: RelationKind,
        notifier: &dyn Notifier,
    ) -> AppResult<bool> {
        interactions::toggle(
            self.client.as_ref(),
            session,
            self.recipe_id,
            kind,
            &self.interaction,
            notifier,
        )
        .await
    }

    /// Post the comment box content
    ///
    /// Blank content is ignored. On success the box is cleared and the
    /// comment list is re-fetched rather than appended to.
    ///
    /// # Errors
    ///
    /// `MissingRequiredField` for blank content, `AuthRequired` without a
    /// user, or the remote insert error
    pub async fn submit_comment(
        &self,
        session: &SessionContext,
        notifier: &dyn Notifier,
    ) -> AppResult<()> {
        let content = lock(&self.state).comment_draft.trim().to_owned();
        if content.is_empty() {
            return Err(AppError::missing_field("content"));
        }
        let user = match session.require_user() {
            Ok(user) => user,
            Err(e) => {
                notifier.error(messages::SIGN_IN_TO_COMMENT);
                return Err(e);
            }
        };

        let comment = NewComment {
            recipe_id: self.recipe_id,
            user_id: user.id,
            content,
        };
        if let Err(e) = data_client::insert_record(
            self.client.as_ref(),
            session.access_token(),
            collections::COMMENTS,
            &comment,
        )
        .await
        {
            error!(recipe_id = %self.recipe_id, error = %e, "Error adding comment");
            notifier.error(messages::COMMENT_FAILED);
            return Err(e);
        }
        AppLogger::log_created(collections::COMMENTS, user.id, Some(self.recipe_id));

        lock(&self.state).comment_draft.clear();
        self.refresh_comments(session, self.lifetime.current()).await;
        notifier.success(messages::COMMENT_ADDED);
        Ok(())
    }

    async fn refresh_comments(&self, session: &SessionContext, token: FetchToken) {
        match fetch_comments(self.client.as_ref(), session, self.recipe_id).await {
            Ok(comments) if self.lifetime.is_current(token) => {
                lock(&self.state).comments = comments;
            }
            Ok(_) => debug!("Discarding stale comment list"),
            Err(e) => error!(recipe_id = %self.recipe_id, error = %e, "Error fetching comments"),
        }
    }
}
