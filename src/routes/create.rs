// ABOUTME: Recipe creation page backed by a per-browser draft that survives form round trips
// ABOUTME: Form posts carry field edits plus one action: add/remove a row or submit the recipe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    routing::get,
    Extension, Form, Router,
};
use lru::LruCache;
use tracing::{debug, warn};

use super::{AppResources, ClientKey};
use crate::errors::AppError;
use crate::models::Difficulty;
use crate::notifications::NotificationQueue;
use crate::views::recipe_form::submit_recipe;
use crate::views::{FormEdit, FormField, IngredientField, RecipeDraft};
use recipe_core::constants::defaults;

/// In-progress create forms keyed by client key
///
/// Holds at most a fixed number of browsers; the least recently touched
/// draft is evicted first.
#[derive(Debug)]
pub struct DraftStore {
    drafts: Mutex<LruCache<String, RecipeDraft>>,
}

impl DraftStore {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(defaults::MAX_TRACKED_BROWSERS)
    {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    };

    /// Empty store holding up to the default number of browsers
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Empty store holding up to `capacity` drafts
    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            drafts: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn drafts(&self) -> MutexGuard<'_, LruCache<String, RecipeDraft>> {
        self.drafts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Draft for `client_key`, a fresh one if none is stored
    #[must_use]
    pub fn get(&self, client_key: &str) -> RecipeDraft {
        self.drafts().get(client_key).cloned().unwrap_or_default()
    }

    /// Store `draft` for `client_key`
    pub fn put(&self, client_key: &str, draft: RecipeDraft) {
        self.drafts().put(client_key.to_owned(), draft);
    }

    /// Forget the draft for `client_key`
    pub fn discard(&self, client_key: &str) {
        self.drafts().pop(client_key);
    }

    /// Drafts currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.drafts().len()
    }

    /// No drafts held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drafts().is_empty()
    }
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}

/// What the pressed button asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// Change the row structure and show the form again
    Edit(FormEdit),
    /// Validate and insert
    Submit,
}

impl FormAction {
    fn parse(value: &str) -> Option<Self> {
        match value.split_once(':') {
            None => match value {
                "submit" => Some(Self::Submit),
                "add_ingredient" => Some(Self::Edit(FormEdit::AddIngredient)),
                "add_step" => Some(Self::Edit(FormEdit::AddStep)),
                _ => None,
            },
            Some(("remove_ingredient", id)) => {
                Some(Self::Edit(FormEdit::RemoveIngredient(id.to_owned())))
            }
            Some(("remove_step", id)) => Some(Self::Edit(FormEdit::RemoveStep(id.to_owned()))),
            Some(_) => None,
        }
    }
}

/// Translate posted form pairs into draft edits and the requested action
///
/// Unknown fields are ignored. A post without an action submits.
#[must_use]
pub fn parse_form(pairs: Vec<(String, String)>) -> (Vec<FormEdit>, FormAction) {
    let mut edits = Vec::with_capacity(pairs.len());
    let mut action = None;

    for (name, value) in pairs {
        match name.as_str() {
            "title" => edits.push(FormEdit::SetField(FormField::Title, value)),
            "description" => edits.push(FormEdit::SetField(FormField::Description, value)),
            "cooking_time" => edits.push(FormEdit::SetField(FormField::CookingTime, value)),
            "difficulty" => match value.parse::<Difficulty>() {
                Ok(difficulty) => edits.push(FormEdit::SetDifficulty(difficulty)),
                Err(e) => warn!(error = %e, "Ignoring posted difficulty"),
            },
            "action" => action = FormAction::parse(&value),
            other => {
                if let Some(edit) = row_edit(other, value) {
                    edits.push(edit);
                }
            }
        }
    }
    (edits, action.unwrap_or(FormAction::Submit))
}

/// `ingredient.<id>.<field>` or `step.<id>.description`
fn row_edit(name: &str, value: String) -> Option<FormEdit> {
    let mut parts = name.splitn(3, '.');
    match (parts.next()?, parts.next()?, parts.next()?) {
        ("ingredient", id, field) => Some(FormEdit::UpdateIngredient {
            id: id.to_owned(),
            field: IngredientField::parse(field)?,
            value,
        }),
        ("step", id, "description") => Some(FormEdit::UpdateStep {
            id: id.to_owned(),
            description: value,
        }),
        _ => None,
    }
}

/// Create page routes
pub struct CreateRoutes;

impl CreateRoutes {
    /// `GET /create` and `POST /create`
    pub fn routes(resources: Arc<AppResources>) -> Router {
        Router::new()
            .route("/create", get(Self::handle_form).post(Self::handle_post))
            .with_state(resources)
    }

    async fn handle_form(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let session = resources.session(&headers).await;
        let draft = resources.drafts.get(client.as_str());
        resources.render_page(
            "create.html",
            "/create",
            &session,
            &client,
            &NotificationQueue::new(),
            |context| {
                context.insert("draft", &draft);
                context.insert("difficulties", &Difficulty::ALL);
            },
        )
    }

    async fn handle_post(
        State(resources): State<Arc<AppResources>>,
        Extension(client): Extension<ClientKey>,
        headers: HeaderMap,
        Form(pairs): Form<Vec<(String, String)>>,
    ) -> Response {
        let session = resources.session(&headers).await;
        let raised = NotificationQueue::new();
        let mut draft = resources.drafts.get(client.as_str());

        let (edits, action) = parse_form(pairs);
        for edit in edits {
            if !draft.apply(edit) {
                debug!("Posted edit addressed a row no longer in the draft");
            }
        }

        match action {
            FormAction::Edit(edit) => {
                draft.apply(edit);
                resources.drafts.put(client.as_str(), draft);
                resources.redirect_with_flash(&client, &raised, "/create")
            }
            FormAction::Submit => {
                match submit_recipe(resources.client.as_ref(), &session, &draft, &raised).await {
                    Ok(()) => {
                        resources.drafts.discard(client.as_str());
                        resources.redirect_with_flash(&client, &raised, "/recipes")
                    }
                    Err(e) => {
                        debug!(error = %e, "Recipe not created");
                        resources.drafts.put(client.as_str(), draft);
                        resources.redirect_with_flash(&client, &raised, "/create")
                    }
                }
            }
        }
    }
}
