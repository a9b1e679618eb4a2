// ABOUTME: Comment rows and the presence-only like/save relation rows
// ABOUTME: RelationKind maps a toggle to its collection and user-facing wording
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recipe::Recipe;
use super::user::UserSummary;
use crate::constants::{collections, messages};

/// A stored comment, optionally with its author's public fields embedded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Row identifier
    pub id: Uuid,
    /// Commented recipe
    pub recipe_id: Uuid,
    /// Author
    pub user_id: Uuid,
    /// Comment text
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Author's public fields when embedded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Insert payload for a new comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewComment {
    /// Commented recipe
    pub recipe_id: Uuid,
    /// Author
    pub user_id: Uuid,
    /// Comment text
    pub content: String,
}

/// Which presence-only relation a toggle acts on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Row in `likes`, counted per recipe
    Like,
    /// Row in `saved_recipes`, never counted
    Save,
}

impl RelationKind {
    /// Collection holding rows of this relation
    #[must_use]
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Like => collections::LIKES,
            Self::Save => collections::SAVED_RECIPES,
        }
    }

    /// Whether the view keeps a counter for this relation
    #[must_use]
    pub const fn is_counted(&self) -> bool {
        matches!(self, Self::Like)
    }

    /// Notification shown when an anonymous user tries the toggle
    #[must_use]
    pub const fn sign_in_prompt(&self) -> &'static str {
        match self {
            Self::Like => messages::SIGN_IN_TO_LIKE,
            Self::Save => messages::SIGN_IN_TO_SAVE,
        }
    }

    /// Notification shown when the remote call fails
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::Like => messages::LIKE_FAILED,
            Self::Save => messages::SAVE_FAILED,
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Like => f.write_str("like"),
            Self::Save => f.write_str("save"),
        }
    }
}

/// A stored like or saved-recipe row; existence is the whole meaning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeRelation {
    /// Row identifier
    pub id: Uuid,
    /// Related recipe
    pub recipe_id: Uuid,
    /// Acting user
    pub user_id: Uuid,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Row in `likes`
pub type Like = RecipeRelation;

/// Row in `saved_recipes`
pub type SavedRecipe = RecipeRelation;

/// Insert payload for a like or saved-recipe row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRelation {
    /// Related recipe
    pub recipe_id: Uuid,
    /// Acting user
    pub user_id: Uuid,
}

/// Saved row with the recipe embedded, as listed on the profile screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedRecipeEntry {
    /// When the recipe was saved
    pub created_at: DateTime<Utc>,
    /// The saved recipe; absent if it no longer resolves
    #[serde(default)]
    pub recipe: Option<Recipe>,
}
