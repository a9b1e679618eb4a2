// ABOUTME: Demo data seeder for a local RecipeShare database
// ABOUTME: Creates demo users, a handful of recipes, and some likes, saves and comments between them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Demo data seeder for RecipeShare.
//!
//! Only the local `SQLite` backend can be seeded; hosted projects manage
//! their own accounts.
//!
//! Usage:
//! ```bash
//! # Seed the default database
//! cargo run --bin seed-demo-data
//!
//! # Seed a specific database file
//! cargo run --bin seed-demo-data -- --database-url sqlite:./data/demo.db
//! ```

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use recipe_share::{
    config::BackendConfig,
    constants::collections,
    data_client::{self, sqlite::SqliteDataClient, DataClient, RowQuery},
    errors::ErrorCode,
    models::{
        AuthUser, Difficulty, Ingredient, NewComment, NewRecipe, NewRelation, Recipe, Step,
    },
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Password shared by every demo account
const DEMO_USER_PASSWORD: &str = "DemoUser123!";

#[derive(Parser)]
#[command(
    name = "seed-demo-data",
    about = "RecipeShare Demo Data Seeder",
    long_about = "Populate a local database with demo users, recipes and interactions"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

struct DemoRecipe {
    title: &'static str,
    description: &'static str,
    cooking_time: u32,
    difficulty: Difficulty,
    ingredients: &'static [(&'static str, &'static str, &'static str)],
    steps: &'static [&'static str],
}

const DEMO_USERS: &[&str] = &["alice@example.com", "bob@example.com"];

const DEMO_RECIPES: &[DemoRecipe] = &[
    DemoRecipe {
        title: "Classic Tomato Soup",
        description: "A smooth, warming soup for cold evenings",
        cooking_time: 40,
        difficulty: Difficulty::Easy,
        ingredients: &[
            ("tomatoes", "8", "pcs"),
            ("onion", "1", "pc"),
            ("vegetable stock", "750", "ml"),
        ],
        steps: &[
            "Soften the chopped onion in olive oil",
            "Add tomatoes and stock and simmer for 25 minutes",
            "Blend until smooth and season to taste",
        ],
    },
    DemoRecipe {
        title: "Chocolate Chip Cookies",
        description: "Crisp edges, chewy middles",
        cooking_time: 25,
        difficulty: Difficulty::Medium,
        ingredients: &[
            ("butter", "115", "g"),
            ("brown sugar", "150", "g"),
            ("flour", "190", "g"),
            ("chocolate chips", "170", "g"),
        ],
        steps: &[
            "Cream the butter and sugar",
            "Fold in flour and chocolate chips",
            "Bake at 180C for 11 minutes",
        ],
    },
    DemoRecipe {
        title: "Beef Wellington",
        description: "Tenderloin wrapped in mushroom duxelles and puff pastry",
        cooking_time: 150,
        difficulty: Difficulty::Hard,
        ingredients: &[
            ("beef tenderloin", "1", "kg"),
            ("mushrooms", "500", "g"),
            ("puff pastry", "1", "sheet"),
        ],
        steps: &[
            "Sear the beef on all sides",
            "Cook the mushrooms down to a dry paste",
            "Wrap, chill, then bake until golden",
        ],
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .init();

    let database_url = match args.database_url {
        Some(url) => url,
        None => match BackendConfig::from_env()? {
            BackendConfig::Local { database_url } => database_url,
            BackendConfig::Hosted { .. } => {
                bail!("Seeding is only supported for the local backend (RECIPE_BACKEND=local)")
            }
        },
    };
    info!(database_url, "Seeding demo data");

    let client = SqliteDataClient::connect(&database_url)
        .await
        .with_context(|| format!("Failed to open {database_url}"))?;

    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for email in DEMO_USERS {
        users.push(ensure_user(&client, email).await?);
    }
    let Some((author, others)) = users.split_first() else {
        bail!("No demo users configured");
    };

    let author_session = client
        .sign_in_with_password(&author.email, DEMO_USER_PASSWORD)
        .await?;
    let token = Some(author_session.access_token.as_str());

    let existing = data_client::count(&client, token, RowQuery::new(collections::RECIPES)).await?;
    if existing > 0 {
        info!(existing, "Recipes already present, skipping recipe inserts");
    } else {
        for demo in DEMO_RECIPES {
            let recipe = to_new_recipe(demo, author.id);
            data_client::insert_record(&client, token, collections::RECIPES, &recipe).await?;
            info!(title = demo.title, "Inserted recipe");
        }
    }

    let query = RowQuery::new(collections::RECIPES).newest_first();
    let recipes: Vec<Recipe> = data_client::fetch_all(&client, token, &query).await?;

    for user in others {
        let session = client
            .sign_in_with_password(&user.email, DEMO_USER_PASSWORD)
            .await?;
        let token = Some(session.access_token.as_str());
        for recipe in recipes.iter().take(2) {
            let relation = NewRelation {
                recipe_id: recipe.id,
                user_id: user.id,
            };
            insert_ignoring_duplicates(&client, token, collections::LIKES, &relation).await?;
            insert_ignoring_duplicates(&client, token, collections::SAVED_RECIPES, &relation)
                .await?;
            let comment = NewComment {
                recipe_id: recipe.id,
                user_id: user.id,
                content: format!("Made the {} last night, delicious!", recipe.title),
            };
            data_client::insert_record(&client, token, collections::COMMENTS, &comment).await?;
        }
        client.sign_out(&session.access_token).await?;
    }
    client.sign_out(&author_session.access_token).await?;

    info!(
        users = users.len(),
        recipes = DEMO_RECIPES.len(),
        password = DEMO_USER_PASSWORD,
        "Demo data seeded"
    );
    Ok(())
}

async fn ensure_user(client: &SqliteDataClient, email: &str) -> Result<AuthUser> {
    if let Some(user) = client.find_user_by_email(email).await? {
        info!(email, "Demo user already exists");
        return Ok(user);
    }
    Ok(client.create_user(email, DEMO_USER_PASSWORD).await?)
}

async fn insert_ignoring_duplicates(
    client: &SqliteDataClient,
    token: Option<&str>,
    collection: &str,
    relation: &NewRelation,
) -> Result<()> {
    match data_client::insert_record(client, token, collection, relation).await {
        Err(e) if e.code == ErrorCode::ResourceAlreadyExists => Ok(()),
        other => Ok(other?),
    }
}

fn to_new_recipe(demo: &DemoRecipe, user_id: Uuid) -> NewRecipe {
    NewRecipe {
        title: demo.title.to_owned(),
        description: demo.description.to_owned(),
        cooking_time: demo.cooking_time,
        difficulty: demo.difficulty,
        ingredients: demo
            .ingredients
            .iter()
            .enumerate()
            .map(|(index, (name, amount, unit))| Ingredient {
                id: (index + 1).to_string(),
                name: (*name).to_owned(),
                amount: (*amount).to_owned(),
                unit: (*unit).to_owned(),
            })
            .collect(),
        steps: demo
            .steps
            .iter()
            .enumerate()
            .map(|(index, description)| Step {
                id: (index + 1).to_string(),
                description: (*description).to_owned(),
            })
            .collect(),
        user_id,
    }
}
