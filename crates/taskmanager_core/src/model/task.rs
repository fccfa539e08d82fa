//! Task domain model.
//!
//! # Invariants
//! - `assigned_to` and `project_id` resolve to existing rows at creation time.
//! - `status` is always one of the three [`TaskStatus`] values.
//! - Lower `priority` numbers mean higher priority.

use crate::model::project::ProjectId;
use crate::model::user::UserId;
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};

/// Storage-assigned task identifier.
pub type TaskId = i64;

/// Priority used when the caller does not pick one.
pub const DEFAULT_PRIORITY: i64 = 2;

/// Task lifecycle state. Any state may follow any other via explicit update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Created but not started.
    Pending,
    /// Work is in progress.
    InProgress,
    /// Finished.
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: i64,
    pub status: TaskStatus,
    pub assigned_to: UserId,
    pub project_id: ProjectId,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; only bumped by writes that change a field.
    pub updated_at: i64,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Due strictly before `today` and not completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && !self.is_completed()
    }
}

/// Validated input for inserting a task. New tasks start as `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: i64,
    pub assigned_to: UserId,
    pub project_id: ProjectId,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<i64>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<UserId>,
}

impl TaskPatch {
    /// Applies present fields onto `task`, returning whether anything changed.
    pub fn apply_to(&self, task: &mut Task) -> bool {
        let before = task.clone();
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        *task != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus) -> Task {
        Task {
            id: 1,
            title: "Design Homepage Mockup".to_string(),
            description: String::new(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            priority: 1,
            status,
            assigned_to: 3,
            project_id: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn status_text_matches_storage_values() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn overdue_excludes_completed_and_due_today() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        assert!(task(TaskStatus::Pending).is_overdue(today));
        assert!(!task(TaskStatus::Completed).is_overdue(today));
        assert!(!task(TaskStatus::Pending).is_overdue(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
    }

    #[test]
    fn patch_with_current_status_changes_nothing() {
        let mut t = task(TaskStatus::Pending);
        let patch = TaskPatch {
            status: Some(TaskStatus::Pending),
            ..TaskPatch::default()
        };
        assert!(!patch.apply_to(&mut t));
        assert_eq!(t, task(TaskStatus::Pending));
    }
}
