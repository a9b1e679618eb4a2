// ABOUTME: Core data models shared by the data clients, views and presentation layer
// ABOUTME: Recipes with embedded ingredients and steps, comments, like/save relations, users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Comments and like/save relation rows
pub mod interaction;
/// Recipes, ingredients, steps and difficulty
pub mod recipe;
/// Authenticated identity and public user fields
pub mod user;

pub use interaction::{
    Comment, Like, NewComment, NewRelation, RecipeRelation, RelationKind, SavedRecipe,
    SavedRecipeEntry,
};
pub use recipe::{Difficulty, DifficultyFilter, Ingredient, NewRecipe, Recipe, Step};
pub use user::{AuthSession, AuthUser, UserSummary};
