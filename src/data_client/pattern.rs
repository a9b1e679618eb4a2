// ABOUTME: LIKE-style pattern escaping and Unicode case-insensitive matching
// ABOUTME: Search terms become literal substring patterns; the local backend matches them in Rust
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Escape character understood by both backends
pub const LIKE_ESCAPE: char = '\\';

/// Escape `\`, `%` and `_` in `term` so it only matches itself
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// `%term%` with the term taken literally
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyOne,
    Literal(char),
}

/// Compiled case-insensitive LIKE pattern
///
/// `%` matches any run of characters, `_` exactly one, and `\` makes the
/// next character literal. Both sides are lowercased with full Unicode
/// rules before comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern {
    tokens: Vec<Token>,
}

impl LikePattern {
    /// Compile `pattern`; a trailing lone `\` matches a literal backslash
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let folded = pattern.to_lowercase();
        let mut tokens = Vec::with_capacity(folded.len());
        let mut chars = folded.chars();
        while let Some(c) = chars.next() {
            let token = match c {
                '%' => Token::AnyRun,
                '_' => Token::AnyOne,
                LIKE_ESCAPE => Token::Literal(chars.next().unwrap_or(LIKE_ESCAPE)),
                other => Token::Literal(other),
            };
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }
        Self { tokens }
    }

    /// Whether `text` matches, ignoring case
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.to_lowercase().chars().collect();
        let tokens = &self.tokens;

        let (mut t, mut p) = (0, 0);
        // Position after the last `%` and the text index it was tried at
        let mut resume: Option<(usize, usize)> = None;

        while t < text.len() {
            match tokens.get(p) {
                Some(Token::AnyRun) => {
                    p += 1;
                    resume = Some((p, t));
                }
                Some(Token::AnyOne) => {
                    p += 1;
                    t += 1;
                }
                Some(Token::Literal(c)) if *c == text[t] => {
                    p += 1;
                    t += 1;
                }
                _ => match resume {
                    Some((after_run, tried_at)) => {
                        p = after_run;
                        t = tried_at + 1;
                        resume = Some((after_run, t));
                    }
                    None => return false,
                },
            }
        }
        tokens[p..].iter().all(|token| *token == Token::AnyRun)
    }
}
