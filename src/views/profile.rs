// ABOUTME: Profile screen data: the signed-in user's own recipes and saved recipes
// ABOUTME: Saved rows whose recipe no longer resolves are skipped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::str::FromStr;

use serde::Serialize;
use tracing::{error, info};

use crate::data_client::{self, DataClient, Embed, RowQuery};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Recipe, SavedRecipeEntry};
use crate::session::SessionContext;
use recipe_core::constants::{collections, columns};

/// Profile tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileTab {
    /// Recipes the user created
    #[default]
    MyRecipes,
    /// Recipes the user saved
    Saved,
}

impl ProfileTab {
    /// Query-string value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MyRecipes => "my-recipes",
            Self::Saved => "saved",
        }
    }
}

impl FromStr for ProfileTab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "my-recipes" => Ok(Self::MyRecipes),
            "saved" => Ok(Self::Saved),
            other => Err(AppError::invalid_input(format!("Unknown profile tab: {other}"))),
        }
    }
}

/// Everything the profile page shows
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileData {
    /// User's own recipes, newest first
    pub my_recipes: Vec<Recipe>,
    /// Saved recipes, most recently saved first
    pub saved_recipes: Vec<Recipe>,
}

/// Recipes owned by the session user, newest first
pub async fn fetch_my_recipes(
    client: &dyn DataClient,
    session: &SessionContext,
) -> AppResult<Vec<Recipe>> {
    let user = session.require_user()?;
    let query = RowQuery::new(collections::RECIPES)
        .eq(columns::USER_ID, user.id.to_string())
        .newest_first();
    data_client::fetch_all(client, session.access_token(), &query).await
}

/// Recipes the session user saved, most recently saved first
pub async fn fetch_saved_recipes(
    client: &dyn DataClient,
    session: &SessionContext,
) -> AppResult<Vec<Recipe>> {
    let user = session.require_user()?;
    let query = RowQuery::new(collections::SAVED_RECIPES)
        .select(&[columns::CREATED_AT])
        .embed(Embed::recipe())
        .eq(columns::USER_ID, user.id.to_string())
        .newest_first();
    let entries: Vec<SavedRecipeEntry> =
        data_client::fetch_all(client, session.access_token(), &query).await?;
    Ok(entries.into_iter().filter_map(|entry| entry.recipe).collect())
}

/// Load both tabs concurrently
///
/// A failing tab is logged and left empty.
///
/// # Errors
///
/// Returns `AuthRequired` when nobody is signed in
pub async fn load_profile(client: &dyn DataClient, session: &SessionContext) -> AppResult<ProfileData> {
    session.require_user()?;
    let (mine, saved) = tokio::join!(
        fetch_my_recipes(client, session),
        fetch_saved_recipes(client, session)
    );
    Ok(ProfileData {
        my_recipes: mine.unwrap_or_else(|e| {
            error!(error = %e, "Error fetching user recipes");
            Vec::new()
        }),
        saved_recipes: saved.unwrap_or_else(|e| {
            error!(error = %e, "Error fetching saved recipes");
            Vec::new()
        }),
    })
}

/// Invalidate the session remotely
///
/// # Errors
///
/// Returns the backend error; the caller still forgets the token locally
pub async fn sign_out(client: &dyn DataClient, session: &SessionContext) -> AppResult<()> {
    let user_id = session.user().map(|u| u.id);
    let Some(token) = session.access_token() else {
        return Ok(());
    };
    let result = client.sign_out(token).await;
    AppLogger::log_auth_event(user_id, "sign_out", result.is_ok());
    if result.is_ok() {
        info!("Signed out");
    }
    result
}
