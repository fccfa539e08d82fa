//! Field validators shared by all services.
//!
//! # Responsibility
//! - Check raw command input before it reaches persistence.
//! - Convert accepted text into typed values (`NaiveDate`, enums).
//!
//! # Invariants
//! - Validators are pure: no I/O, no logging, no shared state.
//! - Every rejection carries the offending field name.

use crate::model::task::TaskStatus;
use crate::model::user::UserRole;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::RangeInclusive;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Malformed input rejected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// Input field that failed validation (`email`, `due_date`, ...).
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Accepts `local@domain.tld` addresses and returns the trimmed value.
pub fn validate_email(value: &str) -> ValidationResult<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("email", "must not be empty"));
    }
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::new(
            "email",
            format!("`{trimmed}` is not a valid email address"),
        ));
    }
    Ok(trimmed)
}

/// Parses a strict ISO `YYYY-MM-DD` calendar date.
pub fn validate_date(field: &'static str, value: &str) -> ValidationResult<NaiveDate> {
    let trimmed = value.trim();
    if !ISO_DATE_RE.is_match(trimmed) {
        return Err(ValidationError::new(
            field,
            format!("`{trimmed}` is not in YYYY-MM-DD format"),
        ));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
        ValidationError::new(field, format!("`{trimmed}` is not a valid calendar date"))
    })
}

/// Checks that `value` lies inside the configured inclusive priority range.
pub fn validate_priority(value: i64, range: &RangeInclusive<i64>) -> ValidationResult<i64> {
    if !range.contains(&value) {
        return Err(ValidationError::new(
            "priority",
            format!(
                "{value} is outside the allowed range {}..={}",
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(value)
}

pub fn validate_status(value: &str) -> ValidationResult<TaskStatus> {
    TaskStatus::parse(value.trim()).ok_or_else(|| {
        ValidationError::new(
            "status",
            format!("`{}` must be one of pending|in_progress|completed", value.trim()),
        )
    })
}

pub fn validate_role(value: &str) -> ValidationResult<UserRole> {
    UserRole::parse(value.trim()).ok_or_else(|| {
        ValidationError::new(
            "role",
            format!("`{}` must be one of admin|manager|member", value.trim()),
        )
    })
}

/// Trims `value` and rejects blank input.
pub fn validate_required(field: &'static str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}
