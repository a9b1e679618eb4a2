// ABOUTME: Integration tests for the local SQLite data client
// ABOUTME: Covers sessions, ordering and filters, embeds, ownership rules, uniqueness and persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{create_test_client, create_test_recipe, create_test_user, sample_recipe, TEST_PASSWORD};
use recipe_share::{
    constants::{collections, columns},
    data_client::{self, DataClient, Embed, Filter, RowQuery, SqliteDataClient},
    errors::ErrorCode,
    models::{Difficulty, NewRelation, Recipe},
};

#[tokio::test]
async fn test_sign_in_resolves_session_until_sign_out() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;

    let resolved = client.get_user(&alice.access_token).await.unwrap();
    assert_eq!(resolved, Some(alice.user.clone()));

    client.sign_out(&alice.access_token).await.unwrap();
    assert_eq!(client.get_user(&alice.access_token).await.unwrap(), None);
}

#[tokio::test]
async fn test_sign_in_rejects_bad_credentials() {
    let client = create_test_client().await;
    create_test_user(&client, "alice@example.com").await;

    let wrong_password = client
        .sign_in_with_password("alice@example.com", "not-it")
        .await
        .unwrap_err();
    assert_eq!(wrong_password.code, ErrorCode::AuthInvalid);

    let unknown = client
        .sign_in_with_password("nobody@example.com", TEST_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(unknown.code, ErrorCode::AuthInvalid);
}

#[tokio::test]
async fn test_email_is_unique_case_insensitively() {
    let client = create_test_client().await;
    create_test_user(&client, "alice@example.com").await;

    let err = client
        .create_user("ALICE@example.com", TEST_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    assert!(client
        .find_user_by_email("Alice@Example.com")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_newest_first_with_difficulty_and_title_filters() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    create_test_recipe(&client, &alice, "Tomato Soup", Difficulty::Easy).await;
    create_test_recipe(&client, &alice, "Beef Wellington", Difficulty::Hard).await;
    create_test_recipe(&client, &alice, "Onion soup", Difficulty::Hard).await;

    let all: Vec<Recipe> = data_client::fetch_all(
        &client,
        None,
        &RowQuery::new(collections::RECIPES).newest_first(),
    )
    .await
    .unwrap();
    let titles: Vec<&str> = all.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Onion soup", "Beef Wellington", "Tomato Soup"]);

    let hard_soups: Vec<Recipe> = data_client::fetch_all(
        &client,
        None,
        &RowQuery::new(collections::RECIPES)
            .eq(columns::DIFFICULTY, "hard")
            .ilike(columns::TITLE, "%SOUP%")
            .newest_first(),
    )
    .await
    .unwrap();
    assert_eq!(hard_soups.len(), 1);
    assert_eq!(hard_soups[0].title, "Onion soup");
}

#[tokio::test]
async fn test_title_pattern_folds_non_ascii_case() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    let bob = create_test_user(&client, "bob@example.com").await;
    create_test_recipe(&client, &alice, "Crème Brûlée", Difficulty::Hard).await;
    create_test_recipe(&client, &alice, "Creme Caramel", Difficulty::Medium).await;
    create_test_recipe(&client, &bob, "CRÈME FRAÎCHE TART", Difficulty::Easy).await;
    create_test_recipe(&client, &alice, "Ölpfannkuchen", Difficulty::Easy).await;

    let cremes: Vec<Recipe> = data_client::fetch_all(
        &client,
        None,
        &RowQuery::new(collections::RECIPES)
            .contains(columns::TITLE, "crème")
            .newest_first(),
    )
    .await
    .unwrap();
    let titles: Vec<&str> = cremes.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["CRÈME FRAÎCHE TART", "Crème Brûlée"]);

    // The limit applies to matching rows, not to the rows scanned
    let newest: Vec<Recipe> = data_client::fetch_all(
        &client,
        None,
        &RowQuery::new(collections::RECIPES)
            .contains(columns::TITLE, "CRÈME")
            .newest_first()
            .limit(1),
    )
    .await
    .unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].title, "CRÈME FRAÎCHE TART");

    let total = data_client::count(
        &client,
        None,
        RowQuery::new(collections::RECIPES).contains(columns::TITLE, "ölpfann"),
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_title_search_treats_wildcards_literally() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    create_test_recipe(&client, &alice, "Tomato Soup", Difficulty::Easy).await;
    create_test_recipe(&client, &alice, "100% Rye Bread", Difficulty::Hard).await;

    for (term, expected) in [("_", 0), ("%", 1), ("100%", 1), ("to_", 0)] {
        let found = data_client::count(
            &client,
            None,
            RowQuery::new(collections::RECIPES).contains(columns::TITLE, term),
        )
        .await
        .unwrap();
        assert_eq!(found, expected, "search {term:?}");
    }
}

#[tokio::test]
async fn test_delete_by_title_pattern_only_touches_own_rows() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    let bob = create_test_user(&client, "bob@example.com").await;
    create_test_recipe(&client, &alice, "Crème Brûlée", Difficulty::Hard).await;
    create_test_recipe(&client, &bob, "Crème Anglaise", Difficulty::Medium).await;
    create_test_recipe(&client, &alice, "Pancakes", Difficulty::Easy).await;

    client
        .delete(
            alice.session.access_token(),
            collections::RECIPES,
            &[Filter::ilike(columns::TITLE, "CRÈME%")],
        )
        .await
        .unwrap();

    let left: Vec<Recipe> = data_client::fetch_all(
        &client,
        None,
        &RowQuery::new(collections::RECIPES).newest_first(),
    )
    .await
    .unwrap();
    let titles: Vec<&str> = left.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Pancakes", "Crème Anglaise"]);
}

#[tokio::test]
async fn test_embedded_owner_email() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    let recipe = create_test_recipe(&client, &alice, "Pancakes", Difficulty::Easy).await;

    let query = RowQuery::new(collections::RECIPES)
        .embed(Embed::user(&[columns::EMAIL]))
        .eq(columns::ID, recipe.id.to_string());
    let loaded: Recipe = data_client::fetch_optional(&client, None, query)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.author_email(), Some("alice@example.com"));
    assert_eq!(loaded.ingredients, recipe.ingredients);
    assert_eq!(loaded.steps, recipe.steps);
}

#[tokio::test]
async fn test_inserts_must_belong_to_session_user() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    let bob = create_test_user(&client, "bob@example.com").await;

    let forged = sample_recipe(alice.user.id, "Forged", Difficulty::Easy);
    let err = data_client::insert_record(
        &client,
        bob.session.access_token(),
        collections::RECIPES,
        &forged,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let anonymous = data_client::insert_record(&client, None, collections::RECIPES, &forged)
        .await
        .unwrap_err();
    assert_eq!(anonymous.code, ErrorCode::AuthRequired);
}

#[tokio::test]
async fn test_non_positive_cooking_time_rejected_by_schema() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    let mut recipe = sample_recipe(alice.user.id, "Instant", Difficulty::Easy);
    recipe.cooking_time = 0;

    let err = data_client::insert_record(
        &client,
        alice.session.access_token(),
        collections::RECIPES,
        &recipe,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_relation_rows_are_unique_per_user() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    let recipe = create_test_recipe(&client, &alice, "Pie", Difficulty::Medium).await;
    let like = NewRelation {
        recipe_id: recipe.id,
        user_id: alice.user.id,
    };
    let token = alice.session.access_token();

    data_client::insert_record(&client, token, collections::LIKES, &like)
        .await
        .unwrap();
    let duplicate = data_client::insert_record(&client, token, collections::LIKES, &like)
        .await
        .unwrap_err();
    assert_eq!(duplicate.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_delete_only_touches_own_rows() {
    let client = create_test_client().await;
    let alice = create_test_user(&client, "alice@example.com").await;
    let bob = create_test_user(&client, "bob@example.com").await;
    let recipe = create_test_recipe(&client, &alice, "Pie", Difficulty::Medium).await;

    for user in [&alice, &bob] {
        let like = NewRelation {
            recipe_id: recipe.id,
            user_id: user.user.id,
        };
        data_client::insert_record(&client, user.session.access_token(), collections::LIKES, &like)
            .await
            .unwrap();
    }

    client
        .delete(
            bob.session.access_token(),
            collections::LIKES,
            &[Filter::eq(columns::RECIPE_ID, recipe.id.to_string())],
        )
        .await
        .unwrap();

    let remaining = data_client::count(
        &client,
        None,
        RowQuery::new(collections::LIKES).eq(columns::RECIPE_ID, recipe.id.to_string()),
    )
    .await
    .unwrap();
    assert_eq!(remaining, 1);

    let unfiltered = client
        .delete(alice.session.access_token(), collections::LIKES, &[])
        .await
        .unwrap_err();
    assert_eq!(unfiltered.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_single_mode_returns_none_for_missing_row() {
    let client = create_test_client().await;
    let query = RowQuery::new(collections::RECIPES).eq(columns::ID, uuid::Uuid::new_v4().to_string());
    let missing: Option<Recipe> = data_client::fetch_optional(&client, None, query)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_unknown_collection_and_column_rejected() {
    let client = create_test_client().await;
    let unknown_collection = client
        .query(None, &RowQuery::new("passwords"))
        .await
        .unwrap_err();
    assert_eq!(unknown_collection.code, ErrorCode::ResourceNotFound);

    let unknown_column = client
        .query(None, &RowQuery::new(collections::USERS).eq("password_hash", "x"))
        .await
        .unwrap_err();
    assert_eq!(unknown_column.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_on_disk_database_persists_between_connections() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("nested/recipes.db").display());

    {
        let client = SqliteDataClient::connect(&url).await.unwrap();
        client.create_user("carol@example.com", TEST_PASSWORD).await.unwrap();
        client.pool().close().await;
    }

    let reopened = SqliteDataClient::connect(&url).await.unwrap();
    let carol = reopened.find_user_by_email("carol@example.com").await.unwrap();
    assert!(carol.is_some());
}
