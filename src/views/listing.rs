// ABOUTME: Recipe listing view with difficulty filter and explicit-submit title search
// ABOUTME: Builds the newest-first listing query and the featured strip for the home page
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, error};

use super::{lock, FetchToken, ViewLifetime};
use crate::data_client::{self, DataClient, Embed, RowQuery};
use crate::errors::AppResult;
use crate::models::{DifficultyFilter, Recipe};
use crate::session::SessionContext;
use recipe_core::constants::{collections, columns};

/// Listing query: newest first with the owner's email, filters AND-combined
///
/// A blank `search` adds no title predicate.
#[must_use]
pub fn listing_query(difficulty: DifficultyFilter, search: &str, limit: Option<u32>) -> RowQuery {
    let mut query = RowQuery::new(collections::RECIPES)
        .embed(Embed::user(&[columns::EMAIL]))
        .newest_first();
    if let DifficultyFilter::Only(wanted) = difficulty {
        query = query.eq(columns::DIFFICULTY, wanted.as_str());
    }
    let term = search.trim();
    if !term.is_empty() {
        query = query.contains(columns::TITLE, term);
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    query
}

/// Latest recipes for the home page
pub async fn featured_recipes(
    client: &dyn DataClient,
    session: &SessionContext,
    limit: u32,
) -> AppResult<Vec<Recipe>> {
    let query = listing_query(DifficultyFilter::All, "", Some(limit));
    data_client::fetch_all(client, session.access_token(), &query).await
}

/// Listing screen state
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListingState {
    /// Rows of the last applied fetch
    pub recipes: Vec<Recipe>,
    /// Selected difficulty
    #[serde(serialize_with = "serialize_filter")]
    pub difficulty: DifficultyFilter,
    /// Text in the search box, not yet submitted
    pub search_input: String,
    /// Search term the shown rows were fetched with
    pub applied_search: String,
    /// A fetch is in flight
    pub loading: bool,
    /// The last fetch failed
    pub load_failed: bool,
}

fn serialize_filter<S: serde::Serializer>(
    filter: &DifficultyFilter,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(filter.as_str())
}

/// Recipe listing controller
pub struct RecipeListView {
    client: Arc<dyn DataClient>,
    lifetime: ViewLifetime,
    state: Mutex<ListingState>,
}

impl RecipeListView {
    /// Unmounted view with default filters
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self {
            client,
            lifetime: ViewLifetime::new(),
            state: Mutex::new(ListingState::default()),
        }
    }

    /// Copy of the current state
    #[must_use]
    pub fn state(&self) -> ListingState {
        lock(&self.state).clone()
    }

    /// Initial fetch with the current filters
    pub async fn mount(&self, session: &SessionContext) {
        let (difficulty, search) = {
            let state = lock(&self.state);
            (state.difficulty, state.applied_search.clone())
        };
        self.fetch(session, difficulty, search).await;
    }

    /// Change the difficulty and re-fetch right away
    ///
    /// The fetch uses the new difficulty together with whatever is currently
    /// typed in the search box.
    pub async fn set_difficulty(&self, session: &SessionContext, difficulty: DifficultyFilter) {
        let search = {
            let mut state = lock(&self.state);
            state.difficulty = difficulty;
            state.search_input.clone()
        };
        self.fetch(session, difficulty, search).await;
    }

    /// Update the search box without fetching
    pub fn set_search_input(&self, text: impl Into<String>) {
        lock(&self.state).search_input = text.into();
    }

    /// Run the typed search with the current difficulty
    pub async fn submit_search(&self, session: &SessionContext) {
        let (difficulty, search) = {
            let state = lock(&self.state);
            (state.difficulty, state.search_input.clone())
        };
        self.fetch(session, difficulty, search).await;
    }

    /// Stop applying responses
    pub fn unmount(&self) {
        self.lifetime.unmount();
    }

    async fn fetch(&self, session: &SessionContext, difficulty: DifficultyFilter, search: String) {
        let token = self.lifetime.begin();
        lock(&self.state).loading = true;

        let query = listing_query(difficulty, &search, None);
        let result: AppResult<Vec<Recipe>> =
            data_client::fetch_all(self.client.as_ref(), session.access_token(), &query).await;
        self.apply(token, search, result);
    }

    fn apply(&self, token: FetchToken, search: String, result: AppResult<Vec<Recipe>>) {
        if !self.lifetime.is_current(token) {
            debug!("Discarding stale recipe listing response");
            return;
        }
        let mut state = lock(&self.state);
        state.loading = false;
        match result {
            Ok(recipes) => {
                debug!(count = recipes.len(), "Recipe listing loaded");
                state.recipes = recipes;
                state.applied_search = search;
                state.load_failed = false;
            }
            Err(e) => {
                error!(error = %e, "Error fetching recipes");
                state.load_failed = true;
            }
        }
    }
}
