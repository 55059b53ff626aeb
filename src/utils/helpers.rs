//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::utils::errors::{PortalError, Result};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `limit`/`offset` query parameters shared by list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Clamp limit into `1..=MAX_PAGE_SIZE` and offset to non-negative
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Validate phone number format (basic validation)
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
        && phone.chars().filter(|c| c.is_ascii_digit()).count() >= 10
}

/// Normalize a phone number into bare digits, as WhatsApp gateways expect
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim and require a non-empty string no longer than `max_chars`
pub fn require_text(field: &str, value: &str, max_chars: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortalError::InvalidInput(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max_chars {
        return Err(PortalError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(trimmed.to_string())
}

/// Order-independent key for a pair of users
pub fn participant_key(a: Uuid, b: Uuid) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{}:{}", low, high)
}

/// Split a display name into first and last name
pub fn split_full_name(full_name: &str) -> (String, String) {
    let normalized = normalize_whitespace(full_name);
    match normalized.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (normalized, String::new()),
    }
}

/// Escape a user search term for use inside an ILIKE pattern
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_");
    format!("%{}%", escaped)
}
