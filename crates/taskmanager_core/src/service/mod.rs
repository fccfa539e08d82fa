//! Core use-case services.
//!
//! # Responsibility
//! - Validate raw command input and enforce business rules.
//! - Orchestrate repository calls into use-case level APIs.
//!
//! # Invariants
//! - Every mutation is preceded by field validation.
//! - Service APIs never bypass repository persistence contracts.
//! - Failures map onto the [`ServiceError`] taxonomy.

use crate::config::Config;
use crate::repo::RepoError;
use crate::validation::ValidationError;
use std::ops::RangeInclusive;

pub mod project_service;
pub mod task_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy surfaced to the command layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Referenced entity is absent.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    /// Uniqueness violation.
    #[error("{entity} with {field} `{value}` already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    /// Referential-integrity block.
    #[error("{entity} {id} cannot be changed: {reason}")]
    Conflict {
        entity: &'static str,
        id: i64,
        reason: String,
    },
    /// Configured cap reached.
    #[error("{subject} already reached the {setting} limit of {limit}")]
    LimitExceeded {
        setting: &'static str,
        limit: u32,
        subject: String,
    },
    /// Persistence-layer failure.
    #[error(transparent)]
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Stable machine-readable label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Duplicate { .. } => "duplicate",
            Self::Conflict { .. } => "conflict",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::Repo(_) => "storage_error",
        }
    }

    /// Input field the error is attributed to, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation(err) => Some(err.field),
            Self::Duplicate { field, .. } => Some(*field),
            Self::LimitExceeded { setting, .. } => Some(*setting),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::not_found(entity, id),
            other => Self::Repo(other),
        }
    }
}

/// Business-rule settings taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePolicy {
    pub max_tasks_per_user: u32,
    pub max_projects: u32,
    pub priority_range: RangeInclusive<i64>,
    pub allow_reopen_completed: bool,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ServicePolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_tasks_per_user: config.max_tasks_per_user,
            max_projects: config.max_projects,
            priority_range: config.priority_range(),
            allow_reopen_completed: config.allow_reopen_completed,
        }
    }
}

/// Trims optional free text; `None` stays `None`.
pub(crate) fn trim_optional(value: Option<&str>) -> Option<String> {
    value.map(|text| text.trim().to_string())
}
