// ABOUTME: Configuration module for the recipe server
// ABOUTME: Environment-driven server, backend and HTTP client settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration loaded from environment variables
//!
//! - **Environment**: deployment mode, listen address, backend selection and
//!   remote client timeouts

/// Environment and server configuration
pub mod environment;

pub use environment::{BackendConfig, Environment, HttpClientConfig, ServerConfig};
