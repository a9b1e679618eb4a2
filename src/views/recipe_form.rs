// ABOUTME: Recipe creation form: draft state, tagged field edits and submit validation
// ABOUTME: Ingredient and step rows get form-local ids that mean nothing once the recipe is stored
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::data_client::{self, DataClient};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Difficulty, Ingredient, NewRecipe, Step};
use crate::notifications::Notifier;
use crate::session::SessionContext;
use recipe_core::constants::{collections, messages};

// ============================================================================
// Edits
// ============================================================================

/// Editable field of an ingredient row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientField {
    /// Ingredient name
    Name,
    /// Free-text amount
    Amount,
    /// Free-text unit
    Unit,
}

impl IngredientField {
    /// Form field suffix
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Amount => "amount",
            Self::Unit => "unit",
        }
    }

    /// Parse a form field suffix
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "amount" => Some(Self::Amount),
            "unit" => Some(Self::Unit),
            _ => None,
        }
    }
}

impl Display for IngredientField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Free-text top-level field of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Recipe title
    Title,
    /// Recipe description
    Description,
    /// Cooking time as typed
    CookingTime,
}

/// One change to the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEdit {
    /// Replace a top-level text field
    SetField(FormField, String),
    /// Replace the difficulty
    SetDifficulty(Difficulty),
    /// Append an empty ingredient row
    AddIngredient,
    /// Replace one field of the ingredient with this id
    UpdateIngredient {
        /// Row id
        id: String,
        /// Field to replace
        field: IngredientField,
        /// New value
        value: String,
    },
    /// Drop the ingredient with this id
    RemoveIngredient(String),
    /// Append an empty step row
    AddStep,
    /// Replace the description of the step with this id
    UpdateStep {
        /// Row id
        id: String,
        /// New description
        description: String,
    },
    /// Drop the step with this id
    RemoveStep(String),
}

// ============================================================================
// Validation
// ============================================================================

/// Reasons a draft cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Nobody is signed in
    #[error("You must be logged in to create a recipe")]
    Unauthenticated,
    /// A top-level field is blank
    #[error("{0} is required")]
    MissingField(&'static str),
    /// Cooking time is not a positive whole number
    #[error("Cooking time must be a whole number of minutes greater than zero")]
    InvalidCookingTime,
    /// An ingredient row has a blank field
    #[error("Ingredient {position} is missing its {field}")]
    IncompleteIngredient {
        /// 1-based row number
        position: usize,
        /// Blank field
        field: IngredientField,
    },
    /// A step row has a blank description
    #[error("Step {position} needs a description")]
    IncompleteStep {
        /// 1-based row number
        position: usize,
    },
}

impl From<FormError> for AppError {
    fn from(error: FormError) -> Self {
        match error {
            FormError::Unauthenticated => Self::auth_required(),
            FormError::MissingField(field) => Self::missing_field(field),
            FormError::InvalidCookingTime => Self::value_out_of_range(error.to_string()),
            FormError::IncompleteIngredient { .. } | FormError::IncompleteStep { .. } => {
                Self::invalid_input(error.to_string())
            }
        }
    }
}

/// Parse a typed cooking time; only integers greater than zero pass
pub fn parse_cooking_time(raw: &str) -> Result<u32, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormError::MissingField("Cooking time"));
    }
    match trimmed.parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(FormError::InvalidCookingTime),
    }
}

// ============================================================================
// Draft
// ============================================================================

/// In-progress recipe form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDraft {
    /// Title as typed
    pub title: String,
    /// Description as typed
    pub description: String,
    /// Cooking time as typed
    pub cooking_time: String,
    /// Selected difficulty
    pub difficulty: Difficulty,
    /// Ingredient rows in display order
    pub ingredients: Vec<Ingredient>,
    /// Step rows in display order
    pub steps: Vec<Step>,
    #[serde(skip)]
    next_id: u64,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            cooking_time: String::new(),
            difficulty: Difficulty::Medium,
            ingredients: Vec::new(),
            steps: Vec::new(),
            next_id: 0,
        }
    }
}

impl RecipeDraft {
    /// Empty form with medium difficulty preselected
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    /// Append an empty ingredient row and return its id
    pub fn add_ingredient(&mut self) -> String {
        let id = self.fresh_id();
        self.ingredients.push(Ingredient {
            id: id.clone(),
            ..Ingredient::default()
        });
        id
    }

    /// Replace one field of an ingredient row; `false` if the id is unknown
    pub fn update_ingredient(&mut self, id: &str, field: IngredientField, value: String) -> bool {
        let Some(ingredient) = self.ingredients.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        match field {
            IngredientField::Name => ingredient.name = value,
            IngredientField::Amount => ingredient.amount = value,
            IngredientField::Unit => ingredient.unit = value,
        }
        true
    }

    /// Drop an ingredient row; `false` if the id is unknown
    pub fn remove_ingredient(&mut self, id: &str) -> bool {
        let before = self.ingredients.len();
        self.ingredients.retain(|i| i.id != id);
        self.ingredients.len() != before
    }

    /// Append an empty step row and return its id
    pub fn add_step(&mut self) -> String {
        let id = self.fresh_id();
        self.steps.push(Step {
            id: id.clone(),
            description: String::new(),
        });
        id
    }

    /// Replace a step description; `false` if the id is unknown
    pub fn update_step(&mut self, id: &str, description: String) -> bool {
        let Some(step) = self.steps.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        step.description = description;
        true
    }

    /// Drop a step row; `false` if the id is unknown
    pub fn remove_step(&mut self, id: &str) -> bool {
        let before = self.steps.len();
        self.steps.retain(|s| s.id != id);
        self.steps.len() != before
    }

    /// Apply one edit; `false` if it addressed an unknown row
    pub fn apply(&mut self, edit: FormEdit) -> bool {
        match edit {
            FormEdit::SetField(FormField::Title, value) => self.title = value,
            FormEdit::SetField(FormField::Description, value) => self.description = value,
            FormEdit::SetField(FormField::CookingTime, value) => self.cooking_time = value,
            FormEdit::SetDifficulty(difficulty) => self.difficulty = difficulty,
            FormEdit::AddIngredient => {
                self.add_ingredient();
            }
            FormEdit::UpdateIngredient { id, field, value } => {
                return self.update_ingredient(&id, field, value)
            }
            FormEdit::RemoveIngredient(id) => return self.remove_ingredient(&id),
            FormEdit::AddStep => {
                self.add_step();
            }
            FormEdit::UpdateStep { id, description } => return self.update_step(&id, description),
            FormEdit::RemoveStep(id) => return self.remove_step(&id),
        }
        true
    }

    /// Check every required field and build the insert payload
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in form order
    pub fn validate(&self, user_id: Uuid) -> Result<NewRecipe, FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingField("Title"));
        }
        if self.description.trim().is_empty() {
            return Err(FormError::MissingField("Description"));
        }
        let cooking_time = parse_cooking_time(&self.cooking_time)?;

        for (index, ingredient) in self.ingredients.iter().enumerate() {
            let blank = [
                (IngredientField::Amount, &ingredient.amount),
                (IngredientField::Unit, &ingredient.unit),
                (IngredientField::Name, &ingredient.name),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());
            if let Some((field, _)) = blank {
                return Err(FormError::IncompleteIngredient {
                    position: index + 1,
                    field,
                });
            }
        }
        if let Some(index) = self
            .steps
            .iter()
            .position(|s| s.description.trim().is_empty())
        {
            return Err(FormError::IncompleteStep {
                position: index + 1,
            });
        }

        Ok(NewRecipe {
            title: self.title.clone(),
            description: self.description.clone(),
            cooking_time,
            difficulty: self.difficulty,
            ingredients: self.ingredients.clone(),
            steps: self.steps.clone(),
            user_id,
        })
    }
}

/// Validate `draft` and insert it as one recipe row
///
/// Nothing is sent unless a user is signed in and the draft validates. The
/// caller keeps the draft on failure so the form can be retried.
///
/// # Errors
///
/// Returns the validation error mapped into `AppError`, or the insert error
pub async fn submit_recipe(
    client: &dyn DataClient,
    session: &SessionContext,
    draft: &RecipeDraft,
    notifier: &dyn Notifier,
) -> AppResult<()> {
    let Some(user) = session.user() else {
        notifier.error(messages::SIGN_IN_TO_CREATE);
        return Err(FormError::Unauthenticated.into());
    };
    let recipe = draft.validate(user.id).map_err(|e| {
        notifier.error(&e.to_string());
        AppError::from(e)
    })?;

    if let Err(e) =
        data_client::insert_record(client, session.access_token(), collections::RECIPES, &recipe)
            .await
    {
        error!(user_id = %user.id, error = %e, "Error creating recipe");
        notifier.error(messages::RECIPE_CREATE_FAILED);
        return Err(e);
    }

    AppLogger::log_created(collections::RECIPES, user.id, None);
    info!(title = %recipe.title, "Recipe created");
    notifier.success(messages::RECIPE_CREATED);
    Ok(())
}
