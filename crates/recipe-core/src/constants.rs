// ABOUTME: Application-wide constants for collections, columns, cookies and defaults
// ABOUTME: Single source of truth for names shared by the data clients and the views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Remote collection (table) names
pub mod collections {
    /// Recipe rows
    pub const RECIPES: &str = "recipes";
    /// Comment rows
    pub const COMMENTS: &str = "comments";
    /// Like relation rows
    pub const LIKES: &str = "likes";
    /// Saved-recipe relation rows
    pub const SAVED_RECIPES: &str = "saved_recipes";
    /// Public user rows
    pub const USERS: &str = "users";
}

/// Column names used in filters, ordering and embeds
pub mod columns {
    /// Primary key
    pub const ID: &str = "id";
    /// Owning / acting user reference
    pub const USER_ID: &str = "user_id";
    /// Recipe reference on comments, likes and saved rows
    pub const RECIPE_ID: &str = "recipe_id";
    /// Creation timestamp, used for every listing order
    pub const CREATED_AT: &str = "created_at";
    /// Recipe title, target of the free-text search
    pub const TITLE: &str = "title";
    /// Recipe difficulty, target of the difficulty filter
    pub const DIFFICULTY: &str = "difficulty";
    /// User email
    pub const EMAIL: &str = "email";
}

/// Embed aliases, mirroring `alias:table(columns)` selects
pub mod embeds {
    /// Owner/author embedded into recipes and comments
    pub const USER: &str = "user";
    /// Recipe embedded into saved rows
    pub const RECIPE: &str = "recipe";
}

/// Service identity used in logs
pub mod service_names {
    /// Main server binary
    pub const RECIPE_SHARE_SERVER: &str = "recipe-share-server";
}

/// Defaults used when configuration is absent
pub mod defaults {
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8080;
    /// HTTP listen host
    pub const HOST: &str = "127.0.0.1";
    /// Local `SQLite` database URL
    pub const DATABASE_URL: &str = "sqlite:./data/recipes.db";
    /// Remote request timeout
    pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;
    /// Remote connect timeout
    pub const HTTP_CLIENT_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Recipes shown on the home page
    pub const FEATURED_RECIPE_LIMIT: u32 = 3;
    /// Difficulty preselected on a fresh create form
    pub const FORM_DIFFICULTY: &str = "medium";
    /// Browsers whose drafts and flash notifications are kept; least recently seen go first
    pub const MAX_TRACKED_BROWSERS: usize = 10_000;
}

/// Cookie names used by the presentation layer
pub mod cookies {
    /// Backend access token
    pub const ACCESS_TOKEN: &str = "rs_access_token";
    /// Per-browser key for drafts and flash notifications
    pub const CLIENT_KEY: &str = "rs_client";
    /// Access token lifetime in seconds
    pub const ACCESS_TOKEN_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;
}

/// User-visible notification texts
pub mod messages {
    /// Like attempted without a session
    pub const SIGN_IN_TO_LIKE: &str = "Please sign in to like recipes";
    /// Save attempted without a session
    pub const SIGN_IN_TO_SAVE: &str = "Please sign in to save recipes";
    /// Comment attempted without a session
    pub const SIGN_IN_TO_COMMENT: &str = "Please sign in to comment";
    /// Recipe submit attempted without a session
    pub const SIGN_IN_TO_CREATE: &str = "You must be logged in to create a recipe";
    /// Like toggle failed remotely
    pub const LIKE_FAILED: &str = "Error updating like status";
    /// Save toggle failed remotely
    pub const SAVE_FAILED: &str = "Error updating save status";
    /// Save toggled on
    pub const RECIPE_SAVED: &str = "Recipe saved";
    /// Save toggled off
    pub const RECIPE_UNSAVED: &str = "Recipe removed from saved";
    /// Comment inserted
    pub const COMMENT_ADDED: &str = "Comment added successfully";
    /// Comment insert failed
    pub const COMMENT_FAILED: &str = "Error adding comment";
    /// Recipe inserted
    pub const RECIPE_CREATED: &str = "Recipe created successfully!";
    /// Recipe insert failed
    pub const RECIPE_CREATE_FAILED: &str = "Error creating recipe. Please try again.";
    /// Detail fetch failed
    pub const RECIPE_LOAD_FAILED: &str = "Error loading recipe";
    /// Sign-in rejected
    pub const SIGN_IN_FAILED: &str = "Invalid email or password";
    /// Signed out
    pub const SIGNED_OUT: &str = "You have been signed out";
}
