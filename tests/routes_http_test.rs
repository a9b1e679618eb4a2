// ABOUTME: HTTP-level tests for the page router using in-process requests
// ABOUTME: Covers page renders, sign-in cookies, form post redirects with flashed notifications and not-found pages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::{http::StatusCode, Router};
use common::{
    create_test_client, create_test_recipe, create_test_user, test_server_config, TestUser,
    TEST_PASSWORD,
};
use helpers::axum_test::AxumTestRequest;
use recipe_share::{
    constants::cookies,
    data_client::DataClient,
    models::{Difficulty, Recipe},
    notifications::FlashStore,
    routes::{self, AppResources, DraftStore},
};
use uuid::Uuid;

const BROWSER: &str = "0f8fad5bd9cb469fa16570867728950e";

struct TestApp {
    router: Router,
    resources: Arc<AppResources>,
    client: Arc<dyn DataClient>,
    alice: TestUser,
    recipes: Vec<Recipe>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_resources(|_| {}).await
    }

    async fn with_resources(configure: impl FnOnce(&mut AppResources)) -> Self {
        let sqlite = create_test_client().await;
        let alice = create_test_user(&sqlite, "alice@example.com").await;
        let mut recipes = Vec::new();
        for (title, difficulty) in [
            ("Boiled Egg", Difficulty::Easy),
            ("Croissants", Difficulty::Hard),
            ("Risotto", Difficulty::Medium),
            ("Consomme", Difficulty::Hard),
        ] {
            recipes.push(create_test_recipe(&sqlite, &alice, title, difficulty).await);
        }

        let client: Arc<dyn DataClient> = Arc::new(sqlite);
        let mut resources =
            AppResources::new(Arc::clone(&client), &test_server_config()).expect("resources");
        configure(&mut resources);
        let resources = Arc::new(resources);
        Self {
            router: routes::router(Arc::clone(&resources)),
            resources,
            client,
            alice,
            recipes,
        }
    }

    fn app(&self) -> Router {
        self.router.clone()
    }

    fn signed_in(&self) -> [(&str, &str); 2] {
        [
            (cookies::CLIENT_KEY, BROWSER),
            (cookies::ACCESS_TOKEN, self.alice.access_token.as_str()),
        ]
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::get("/health").send(app.app()).await;
    assert_eq!(response.status(), 200);
    assert!(response.cookie(cookies::CLIENT_KEY).is_none());
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");

    let ready = AxumTestRequest::get("/ready").send(app.app()).await;
    assert_eq!(ready.status(), 200);
}

#[tokio::test]
async fn test_home_issues_client_key_and_shows_latest() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::get("/").send(app.app()).await;
    assert_eq!(response.status(), 200);
    let key = response.cookie(cookies::CLIENT_KEY).expect("client key cookie");
    assert!(Uuid::parse_str(&key).is_ok());

    let html = response.text();
    assert!(html.contains("Consomme"));
    assert!(html.contains("Risotto"));
    assert!(html.contains("Croissants"));
    assert!(!html.contains("Boiled Egg"));
    assert!(html.contains("Sign In"));
}

#[tokio::test]
async fn test_known_client_key_is_not_reissued() {
    let app = TestApp::new().await;
    let response = AxumTestRequest::get("/recipes")
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .send(app.app())
        .await;
    assert!(response.cookie(cookies::CLIENT_KEY).is_none());
}

#[tokio::test]
async fn test_listing_filters_by_query_string() {
    let app = TestApp::new().await;

    let html = AxumTestRequest::get("/recipes?difficulty=hard")
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .text();
    assert!(html.contains("Croissants"));
    assert!(html.contains("Consomme"));
    assert!(!html.contains("Risotto"));
    assert_eq!(
        html.matches(r#"<span class="posted">less than a minute ago</span>"#)
            .count(),
        2
    );

    let html = AxumTestRequest::get("/recipes?difficulty=hard&q=CROIS")
        .send(app.app())
        .await
        .text();
    assert!(html.contains("Croissants"));
    assert!(!html.contains("Consomme"));

    let html = AxumTestRequest::get("/recipes?difficulty=impossible")
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .text();
    assert!(html.contains("Boiled Egg"));
}

#[tokio::test]
async fn test_detail_page_and_unknown_recipe() {
    let app = TestApp::new().await;
    let risotto = &app.recipes[2];

    let html = AxumTestRequest::get(&format!("/recipes/{}", risotto.id))
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .text();
    assert!(html.contains("Risotto"));
    assert!(html.contains("Like (0)"));
    assert!(html.contains("2 cups flour"));
    assert!(html.contains(r#"<span class="posted">less than a minute ago</span>"#));

    let missing = AxumTestRequest::get(&format!("/recipes/{}", Uuid::new_v4()))
        .send(app.app())
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .text();
    assert!(missing.contains("Recipe not found"));
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let app = TestApp::new().await;
    let html = AxumTestRequest::get("/no-such-page")
        .send(app.app())
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .text();
    assert!(html.contains("Page not found"));
}

#[tokio::test]
async fn test_login_sets_token_cookie() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/auth/login")
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .form(&[("email", "alice@example.com"), ("password", TEST_PASSWORD)])
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.location().as_deref(), Some("/recipes"));
    let token = response.cookie(cookies::ACCESS_TOKEN).expect("token cookie");
    assert!(app.client.get_user(&token).await.unwrap().is_some());

    let html = AxumTestRequest::get("/recipes")
        .cookies(&[(cookies::CLIENT_KEY, BROWSER), (cookies::ACCESS_TOKEN, token.as_str())])
        .send(app.app())
        .await
        .text();
    assert!(html.contains("alice@example.com"));
    assert!(html.contains("Sign Out"));
}

#[tokio::test]
async fn test_rejected_login_flashes_error() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/auth/login")
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .form(&[("email", "alice@example.com"), ("password", "wrong")])
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.location().as_deref(), Some("/auth/login"));
    assert!(response.cookie(cookies::ACCESS_TOKEN).is_none());

    let page = AxumTestRequest::get("/auth/login")
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .send(app.app())
        .await;
    assert!(page.text().contains("Invalid email or password"));

    let again = AxumTestRequest::get("/auth/login")
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .send(app.app())
        .await;
    assert!(!again.text().contains("Invalid email or password"));
}

#[tokio::test]
async fn test_like_post_redirects_and_updates_count() {
    let app = TestApp::new().await;
    let risotto = &app.recipes[2];
    let detail = format!("/recipes/{}", risotto.id);

    let response = AxumTestRequest::post(&format!("{detail}/like"))
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(detail.clone()));

    let html = AxumTestRequest::get(&detail)
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .text();
    assert!(html.contains("Liked (1)"));

    AxumTestRequest::post(&format!("{detail}/like"))
        .cookies(&app.signed_in())
        .send(app.app())
        .await;
    let html = AxumTestRequest::get(&detail)
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .text();
    assert!(html.contains("Like (0)"));
}

#[tokio::test]
async fn test_save_post_flashes_confirmation() {
    let app = TestApp::new().await;
    let detail = format!("/recipes/{}", app.recipes[1].id);

    AxumTestRequest::post(&format!("{detail}/save"))
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    let html = AxumTestRequest::get(&detail)
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .text();
    assert!(html.contains("Recipe saved"));
    assert!(html.contains("Saved"));
}

#[tokio::test]
async fn test_anonymous_like_flashes_sign_in_prompt() {
    let app = TestApp::new().await;
    let detail = format!("/recipes/{}", app.recipes[0].id);

    AxumTestRequest::post(&format!("{detail}/like"))
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let html = AxumTestRequest::get(&detail)
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .send(app.app())
        .await
        .text();
    assert!(html.contains("Please sign in to like recipes"));
    assert!(html.contains("Like (0)"));
}

#[tokio::test]
async fn test_comment_post_appears_on_detail() {
    let app = TestApp::new().await;
    let detail = format!("/recipes/{}", app.recipes[0].id);

    AxumTestRequest::post(&format!("{detail}/comments"))
        .cookies(&app.signed_in())
        .form(&[("content", "  Perfectly runny  ")])
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let html = AxumTestRequest::get(&detail)
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .text();
    assert!(html.contains("Perfectly runny"));
    assert!(html.contains("Comment added successfully"));
}

#[tokio::test]
async fn test_create_form_round_trip() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/create")
        .cookies(&app.signed_in())
        .form(&[("title", "Gazpacho"), ("action", "add_ingredient")])
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.location().as_deref(), Some("/create"));

    let html = AxumTestRequest::get("/create")
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .text();
    assert!(html.contains("ingredient.1.amount"));
    assert!(html.contains("Gazpacho"));

    let response = AxumTestRequest::post("/create")
        .cookies(&app.signed_in())
        .form(&[
            ("title", "Gazpacho"),
            ("description", "Cold tomato soup"),
            ("cooking_time", "15"),
            ("difficulty", "easy"),
            ("ingredient.1.amount", "1"),
            ("ingredient.1.unit", "kg"),
            ("ingredient.1.name", "tomatoes"),
            ("action", "submit"),
        ])
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.location().as_deref(), Some("/recipes"));

    let html = AxumTestRequest::get("/recipes")
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .text();
    assert!(html.contains("Gazpacho"));
    assert!(html.contains("Recipe created successfully!"));

    let fresh = AxumTestRequest::get("/create")
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .text();
    assert!(!fresh.contains("ingredient.1.amount"));
}

#[tokio::test]
async fn test_invalid_create_keeps_draft() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/create")
        .cookies(&app.signed_in())
        .form(&[
            ("title", "Gazpacho"),
            ("description", "Cold tomato soup"),
            ("cooking_time", "0"),
            ("action", "submit"),
        ])
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.location().as_deref(), Some("/create"));

    let html = AxumTestRequest::get("/create")
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .text();
    assert!(html.contains("Gazpacho"));
    assert!(html.contains("Cooking time must be a whole number"));
}

#[tokio::test]
async fn test_profile_requires_sign_in() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::get("/profile")
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.location().as_deref(), Some("/auth/login"));

    let html = AxumTestRequest::get("/profile?tab=my-recipes")
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .text();
    assert!(html.contains("My Profile"));
    assert!(html.contains("Consomme"));
}

#[tokio::test]
async fn test_logout_clears_token_cookie() {
    let app = TestApp::new().await;

    let response = AxumTestRequest::post("/auth/logout")
        .cookies(&app.signed_in())
        .send(app.app())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.location().as_deref(), Some("/"));

    let cleared = response
        .set_cookies()
        .into_iter()
        .find(|c| c.starts_with(cookies::ACCESS_TOKEN))
        .expect("token cookie cleared");
    assert!(cleared.contains("Max-Age=0"));
    assert!(app
        .client
        .get_user(&app.alice.access_token)
        .await
        .unwrap()
        .is_none());

    let html = AxumTestRequest::get("/")
        .cookies(&[(cookies::CLIENT_KEY, BROWSER)])
        .send(app.app())
        .await
        .text();
    assert!(html.contains("You have been signed out"));
}

#[tokio::test]
async fn test_cookieless_posts_stay_within_store_capacity() {
    let capacity = NonZeroUsize::new(8).unwrap();
    let app = TestApp::with_resources(|resources| {
        resources.drafts = DraftStore::with_capacity(capacity);
        resources.flash = FlashStore::with_capacity(capacity);
    })
    .await;

    for _ in 0..50 {
        let response = AxumTestRequest::post("/create")
            .form(&[("title", "Spam"), ("action", "add_step")])
            .send(app.app())
            .await;
        assert!(response.cookie(cookies::CLIENT_KEY).is_some());
    }
    for _ in 0..50 {
        AxumTestRequest::post(&format!("/recipes/{}/like", app.recipes[0].id))
            .send(app.app())
            .await
            .assert_status(StatusCode::SEE_OTHER);
    }

    assert_eq!(app.resources.drafts.len(), capacity.get());
    assert_eq!(app.resources.flash.len(), capacity.get());
}
