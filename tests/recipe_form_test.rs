// ABOUTME: Integration tests for recipe draft submission against the local data client
// ABOUTME: Covers the created row, validation refusals, unauthenticated refusal and insert failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_test_client, create_test_user, FlakyClient};
use recipe_share::{
    constants::{collections, columns, messages},
    data_client::{self, RowQuery},
    errors::ErrorCode,
    models::{Difficulty, Recipe},
    notifications::{Notification, NotificationQueue},
    session::SessionContext,
    views::{recipe_form::submit_recipe, IngredientField, RecipeDraft},
};

fn filled_draft() -> RecipeDraft {
    let mut draft = RecipeDraft::new();
    draft.title = "Shakshuka".to_owned();
    draft.description = "Eggs poached in spiced tomato".to_owned();
    draft.cooking_time = " 25 ".to_owned();
    draft.difficulty = Difficulty::Easy;
    let eggs = draft.add_ingredient();
    draft.update_ingredient(&eggs, IngredientField::Amount, "4".to_owned());
    draft.update_ingredient(&eggs, IngredientField::Unit, "pcs".to_owned());
    draft.update_ingredient(&eggs, IngredientField::Name, "eggs".to_owned());
    let step = draft.add_step();
    draft.update_step(&step, "Crack the eggs into the sauce".to_owned());
    draft
}

#[tokio::test]
async fn test_submit_inserts_recipe_owned_by_user() {
    let flaky = FlakyClient::new(create_test_client().await);
    let alice = create_test_user(flaky.inner(), "alice@example.com").await;
    let queue = NotificationQueue::new();

    submit_recipe(flaky.as_ref(), &alice.session, &filled_draft(), &queue)
        .await
        .unwrap();
    assert_eq!(
        queue.drain(),
        vec![Notification::success(messages::RECIPE_CREATED)]
    );

    let query = RowQuery::new(collections::RECIPES).eq(columns::TITLE, "Shakshuka");
    let stored: Recipe = data_client::fetch_optional(flaky.as_ref(), None, query)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.user_id, alice.user.id);
    assert_eq!(stored.cooking_time, 25);
    assert_eq!(stored.difficulty, Difficulty::Easy);
    assert_eq!(stored.ingredients.len(), 1);
    assert_eq!(stored.ingredients[0].name, "eggs");
    assert_eq!(stored.steps[0].description, "Crack the eggs into the sauce");
}

#[tokio::test]
async fn test_submit_without_rows_is_accepted() {
    let flaky = FlakyClient::new(create_test_client().await);
    let alice = create_test_user(flaky.inner(), "alice@example.com").await;
    let mut draft = RecipeDraft::new();
    draft.title = "Toast".to_owned();
    draft.description = "Bread, heated".to_owned();
    draft.cooking_time = "3".to_owned();

    submit_recipe(flaky.as_ref(), &alice.session, &draft, &NotificationQueue::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_anonymous_submit_sends_nothing() {
    let flaky = FlakyClient::new(create_test_client().await);
    let queue = NotificationQueue::new();

    let err = submit_recipe(
        flaky.as_ref(),
        &SessionContext::anonymous(),
        &filled_draft(),
        &queue,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::AuthRequired);
    assert_eq!(flaky.write_attempts(), 0);
    assert_eq!(
        queue.drain(),
        vec![Notification::error(messages::SIGN_IN_TO_CREATE)]
    );
}

#[tokio::test]
async fn test_invalid_drafts_are_refused_before_insert() {
    let flaky = FlakyClient::new(create_test_client().await);
    let alice = create_test_user(flaky.inner(), "alice@example.com").await;

    let mut zero_time = filled_draft();
    zero_time.cooking_time = "0".to_owned();
    let mut no_title = filled_draft();
    no_title.title = "   ".to_owned();
    let mut half_ingredient = filled_draft();
    half_ingredient.add_ingredient();

    let cases = [
        (zero_time, ErrorCode::ValueOutOfRange),
        (no_title, ErrorCode::MissingRequiredField),
        (half_ingredient, ErrorCode::InvalidInput),
    ];
    for (draft, expected) in cases {
        let queue = NotificationQueue::new();
        let err = submit_recipe(flaky.as_ref(), &alice.session, &draft, &queue)
            .await
            .unwrap_err();
        assert_eq!(err.code, expected);
        let raised = queue.drain();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0], Notification::error(err_text(&draft, &alice)));
    }
    assert_eq!(flaky.write_attempts(), 0);
}

fn err_text(draft: &RecipeDraft, user: &common::TestUser) -> String {
    draft.validate(user.user.id).unwrap_err().to_string()
}

#[tokio::test]
async fn test_insert_failure_notifies_and_keeps_draft_usable() {
    let flaky = FlakyClient::new(create_test_client().await);
    let alice = create_test_user(flaky.inner(), "alice@example.com").await;
    flaky.fail_writes(true);
    let draft = filled_draft();
    let queue = NotificationQueue::new();

    let err = submit_recipe(flaky.as_ref(), &alice.session, &draft, &queue)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);
    assert_eq!(
        queue.drain(),
        vec![Notification::error(messages::RECIPE_CREATE_FAILED)]
    );

    flaky.fail_writes(false);
    submit_recipe(flaky.as_ref(), &alice.session, &draft, &queue)
        .await
        .unwrap();
    assert_eq!(flaky.write_attempts(), 2);
}
