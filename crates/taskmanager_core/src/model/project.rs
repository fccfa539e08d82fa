//! Project domain model.
//!
//! # Invariants
//! - `end_date >= start_date`.
//! - `manager_id` resolves to an existing user with role admin or manager
//!   when the project is created or its manager is reassigned.

use crate::model::user::UserId;
use chrono::NaiveDate;

/// Storage-assigned project identifier.
pub type ProjectId = i64;

/// Persisted project record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub manager_id: UserId,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

impl Project {
    /// `start_date <= today <= end_date`.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }

    /// End date is strictly in the past.
    pub fn is_completed(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    /// Start date is strictly in the future.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.start_date > today
    }
}

/// Timeline bucket used by `project list --state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectState {
    Active,
    Completed,
    Upcoming,
}

impl ProjectState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }

    pub fn matches(self, project: &Project, today: NaiveDate) -> bool {
        match self {
            Self::Active => project.is_active(today),
            Self::Completed => project.is_completed(today),
            Self::Upcoming => project.is_upcoming(today),
        }
    }
}

/// Validated input for inserting a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub manager_id: UserId,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<UserId>,
}

impl ProjectPatch {
    /// Applies present fields onto `project`, returning whether anything changed.
    pub fn apply_to(&self, project: &mut Project) -> bool {
        let before = project.clone();
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(start_date) = self.start_date {
            project.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            project.end_date = end_date;
        }
        if let Some(manager_id) = self.manager_id {
            project.manager_id = manager_id;
        }
        *project != before
    }
}
