// ABOUTME: Main library entry point for the RecipeShare recipe-sharing web application
// ABOUTME: Server-rendered pages over a pluggable data client (hosted data service or local SQLite)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # RecipeShare
//!
//! Browse, create, like, save and comment on recipes. All persistent state
//! lives behind a [`DataClient`](data_client::DataClient): either a hosted
//! backend-as-a-service reached over its REST and auth endpoints, or a local
//! `SQLite` database with the same contract for development and tests.
//!
//! ## Architecture
//!
//! - **`data_client`**: collection queries, inserts, deletes and sign-in
//! - **`session`**: per-request identity, passed explicitly to every view
//! - **`views`**: one controller per screen, owning view-local state
//! - **`routes`**: axum handlers rendering pages and handling form posts
//! - **`templates`**: tera templates compiled into the binary
//! - **`notifications`**: success/error messages carried across redirects
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use recipe_share::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("RecipeShare will listen on {}", config.bind_address());
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Cookie building and parsing
pub mod cookies;

/// Backend data client contract and its hosted and `SQLite` implementations
pub mod data_client;

/// Structured logging setup and application log events
pub mod logging;

/// User-visible notifications and the flash store
pub mod notifications;

/// HTTP routes and shared request plumbing
pub mod routes;

/// Per-request session context
pub mod session;

/// Page rendering
pub mod templates;

/// Per-screen view controllers
pub mod views;

pub use recipe_core::{constants, errors, models};
