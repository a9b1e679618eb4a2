// ABOUTME: Server-side HTML rendering with tera templates compiled into the binary
// ABOUTME: Registers the relative-time filter and builds the shared page context (nav, user, flash)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::errors::{AppError, AppResult};
use crate::notifications::Notification;
use crate::session::SessionContext;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("recipes.html", include_str!("../templates/recipes.html")),
    ("recipe_detail.html", include_str!("../templates/recipe_detail.html")),
    ("create.html", include_str!("../templates/create.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Compiled page templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Parse every page template
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a template fails to parse
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .map_err(|e| AppError::config(format!("Failed to parse templates: {e:?}")))?;
        tera.register_filter("timeago", timeago_filter);
        Ok(Self { tera })
    }

    /// Render `template` with `context`
    ///
    /// # Errors
    ///
    /// Returns an internal error if rendering fails
    pub fn render(&self, template: &str, context: &Context) -> AppResult<String> {
        self.tera
            .render(template, context)
            .map_err(|e| AppError::internal(format!("Failed to render {template}: {e:?}")))
    }
}

/// Variables every page needs: nav state, signed-in user and pending notifications
#[derive(Debug, Clone, Serialize)]
pub struct PageChrome<'a> {
    /// Request path, used to highlight the active nav link
    pub current_path: &'a str,
    /// Email of the signed-in user
    pub user_email: Option<&'a str>,
    /// Flash notifications to show once
    pub notifications: &'a [Notification],
}

impl<'a> PageChrome<'a> {
    /// Chrome for `session` at `current_path`
    #[must_use]
    pub fn new(
        current_path: &'a str,
        session: &'a SessionContext,
        notifications: &'a [Notification],
    ) -> Self {
        Self {
            current_path,
            user_email: session.user().map(|u| u.email.as_str()),
            notifications,
        }
    }

    /// Tera context seeded with the chrome variables
    #[must_use]
    pub fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("current_path", self.current_path);
        context.insert("user_email", &self.user_email);
        context.insert("notifications", self.notifications);
        context
    }
}

/// "3 hours ago" style distance between `then` and `now`
#[must_use]
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    let seconds = (now - then).num_seconds().max(0);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    let distance = match seconds {
        s if s < 30 => "less than a minute".to_owned(),
        s if s < 90 => "1 minute".to_owned(),
        s if s < 45 * MINUTE => plural((s + 30) / MINUTE, "minute"),
        s if s < DAY => format!("about {}", plural(((s + HOUR / 2) / HOUR).max(1), "hour")),
        s if s < 42 * HOUR => "1 day".to_owned(),
        s if s < MONTH => plural((s + DAY / 2) / DAY, "day"),
        s if s < 2 * MONTH => format!("about {}", plural(s / MONTH, "month")),
        s if s < YEAR => plural(s / MONTH, "month"),
        s => format!("about {}", plural(s / YEAR, "year")),
    };
    format!("{distance} ago")
}

fn timeago_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("timeago expects an RFC 3339 timestamp string"))?;
    let then = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| tera::Error::msg(format!("timeago could not parse {raw}: {e}")))?;
    Ok(Value::String(relative_time(then.with_timezone(&Utc), Utc::now())))
}
