// ABOUTME: Core types and constants for the RecipeShare recipe-sharing application
// ABOUTME: Foundation crate with error handling, recipe and interaction models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Recipe Core
//!
//! Foundation crate providing shared types and constants for the RecipeShare
//! application. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Collection names, column names, and defaults
//! - **models**: Recipe, comment, like/save relation and user types

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Recipe, Comment, Like, `SavedRecipe`, users)
pub mod models;
