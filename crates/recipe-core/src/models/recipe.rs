// ABOUTME: Recipe model with embedded ordered ingredient and step arrays
// ABOUTME: Difficulty enum, listing difficulty filter, and the insert payload for new recipes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;
use crate::errors::AppError;

// ============================================================================
// Difficulty
// ============================================================================

/// How demanding a recipe is to cook
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Beginner friendly
    Easy,
    /// Some experience needed
    #[default]
    Medium,
    /// Demanding technique or timing
    Hard,
}

impl Difficulty {
    /// Every difficulty, in display order
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Capitalized label for display
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(AppError::invalid_input(format!("Invalid difficulty: {s}"))),
        }
    }
}

/// Difficulty selector on the listing screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    /// No difficulty restriction
    #[default]
    All,
    /// Exact match on one difficulty
    Only(Difficulty),
}

impl DifficultyFilter {
    /// Query-string representation (`all`, `easy`, ...)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(difficulty) => difficulty.as_str(),
        }
    }

    /// Whether a recipe of `difficulty` passes this filter
    #[must_use]
    pub fn accepts(&self, difficulty: Difficulty) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == difficulty,
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Only)
    }
}

impl Display for DifficultyFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Embedded arrays
// ============================================================================

/// One ingredient line, embedded inside a recipe row
///
/// `id` is generated by the create form and is only unique within that form
/// session; nothing addresses an ingredient by it once the recipe is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Ingredient {
    /// Form-local identifier
    #[serde(default)]
    pub id: String,
    /// Ingredient name
    pub name: String,
    /// Free-text amount ("2", "a pinch")
    pub amount: String,
    /// Free-text unit ("cups", "g")
    pub unit: String,
}

/// One preparation step, embedded inside a recipe row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Step {
    /// Form-local identifier
    #[serde(default)]
    pub id: String,
    /// What to do
    pub description: String,
}

// ============================================================================
// Recipe
// ============================================================================

/// A stored recipe row, optionally with its owner's public fields embedded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    /// Row identifier
    pub id: Uuid,
    /// Title shown in listings
    pub title: String,
    /// Short description
    pub description: String,
    /// Minutes, always positive
    pub cooking_time: u32,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Ordered ingredients
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Ordered steps
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Owner
    pub user_id: Uuid,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Owner's public fields, present when the query embedded them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl Recipe {
    /// Email of the owner when embedded
    #[must_use]
    pub fn author_email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }
}

/// Insert payload for a new recipe
///
/// `id` and `created_at` are assigned by the data service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRecipe {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Minutes, must be positive
    pub cooking_time: u32,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Ordered ingredients, stored verbatim
    pub ingredients: Vec<Ingredient>,
    /// Ordered steps, stored verbatim
    pub steps: Vec<Step>,
    /// Submitting user
    pub user_id: Uuid,
}
