//! Task use-case service.
//!
//! # Responsibility
//! - Create, filter, update, complete and delete tasks.
//! - Resolve assignee emails and project ids before writing.
//! - Provide the overdue/upcoming due-date views.
//!
//! # Invariants
//! - Assignee and project references resolve to existing rows on every write.
//! - No user holds more than `max_tasks_per_user` tasks.
//! - Priorities stay inside the configured range.
//! - List results keep creation order.

use crate::model::project::ProjectId;
use crate::model::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus, DEFAULT_PRIORITY};
use crate::model::user::{User, UserId};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::user_repo::UserRepository;
use crate::service::{trim_optional, ServiceError, ServicePolicy, ServiceResult};
use crate::validation::{
    validate_date, validate_email, validate_priority, validate_required, validate_status,
    ValidationError,
};
use chrono::{Days, NaiveDate};
use log::info;
use std::collections::HashMap;

/// Raw input for `task add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: String,
    /// Defaults to [`DEFAULT_PRIORITY`].
    pub priority: Option<i64>,
    pub assignee_email: String,
    pub project_id: ProjectId,
}

/// Raw input for `task update`; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<i64>,
    pub status: Option<String>,
    pub assignee_email: Option<String>,
}

/// Conjunctive `task list` filters; absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub assignee_email: Option<String>,
    pub project_id: Option<ProjectId>,
    pub status: Option<String>,
    pub priority: Option<i64>,
}

/// Task annotated with its assignee email and project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub task: Task,
    pub assignee_email: Option<String>,
    pub project_name: Option<String>,
}

pub struct TaskService<R: TaskRepository + ProjectRepository + UserRepository> {
    repo: R,
    policy: ServicePolicy,
}

impl<R: TaskRepository + ProjectRepository + UserRepository> TaskService<R> {
    pub fn new(repo: R, policy: ServicePolicy) -> Self {
        Self { repo, policy }
    }

    /// Creates one `pending` task.
    ///
    /// # Errors
    /// - `Validation` for malformed fields.
    /// - `NotFound` for an unknown assignee or project.
    /// - `LimitExceeded` when the assignee already holds `max_tasks_per_user`.
    pub fn add(&self, request: &NewTaskRequest) -> ServiceResult<Task> {
        let title = validate_required("title", &request.title)?;
        let description = trim_optional(request.description.as_deref()).unwrap_or_default();
        let due_date = validate_date("due_date", &request.due_date)?;
        let priority = validate_priority(
            request.priority.unwrap_or(DEFAULT_PRIORITY),
            &self.policy.priority_range,
        )?;
        let assignee = self.resolve_assignee(&request.assignee_email)?;
        if self.repo.get_project(request.project_id)?.is_none() {
            return Err(ServiceError::not_found("project", request.project_id));
        }
        self.ensure_capacity(&assignee)?;

        let id = self.repo.create_task(&NewTask {
            title,
            description,
            due_date,
            priority,
            assigned_to: assignee.id,
            project_id: request.project_id,
        })?;
        info!(
            "event=task_add module=service status=ok task_id={} assigned_to={} project_id={}",
            id, assignee.id, request.project_id
        );
        self.get(id)
    }

    pub fn get(&self, id: TaskId) -> ServiceResult<Task> {
        self.repo
            .get_task(id)?
            .ok_or_else(|| ServiceError::not_found("task", id))
    }

    /// Lists tasks matching every present filter, in creation order.
    pub fn list(&self, filter: &TaskFilter) -> ServiceResult<Vec<TaskSummary>> {
        let query = TaskListQuery {
            assignee_email: filter
                .assignee_email
                .as_deref()
                .map(|email| validate_email(email).map(str::to_string))
                .transpose()?,
            project_id: filter.project_id,
            status: filter.status.as_deref().map(validate_status).transpose()?,
            priority: filter
                .priority
                .map(|priority| validate_priority(priority, &self.policy.priority_range))
                .transpose()?,
            ..TaskListQuery::default()
        };
        self.summarize(self.repo.list_tasks(&query)?)
    }

    /// Applies the present fields of `request` to one task.
    ///
    /// # Errors
    /// - `Validation` for malformed fields, or reopening a completed task
    ///   while `allow_reopen_completed` is off.
    /// - `NotFound` for an unknown task or new assignee.
    /// - `LimitExceeded` when the new assignee is full.
    pub fn update(&self, id: TaskId, request: &UpdateTaskRequest) -> ServiceResult<Task> {
        let title = request
            .title
            .as_deref()
            .map(|title| validate_required("title", title))
            .transpose()?;
        let due_date = request
            .due_date
            .as_deref()
            .map(|value| validate_date("due_date", value))
            .transpose()?;
        let priority = request
            .priority
            .map(|priority| validate_priority(priority, &self.policy.priority_range))
            .transpose()?;
        let status = request.status.as_deref().map(validate_status).transpose()?;

        let current = self.get(id)?;
        if let Some(status) = status {
            self.ensure_transition(&current, status)?;
        }
        let assigned_to = match request.assignee_email.as_deref() {
            Some(email) => {
                let assignee = self.resolve_assignee(email)?;
                if assignee.id != current.assigned_to {
                    self.ensure_capacity(&assignee)?;
                }
                Some(assignee.id)
            }
            None => None,
        };

        let patch = TaskPatch {
            title,
            description: trim_optional(request.description.as_deref()),
            due_date,
            priority,
            status,
            assigned_to,
        };
        let updated = self.repo.update_task(id, &patch)?;
        info!(
            "event=task_update module=service status=ok task_id={} task_status={} changed={}",
            id,
            updated.status,
            updated != current
        );
        Ok(updated)
    }

    /// Marks one task `completed`.
    pub fn complete(&self, id: TaskId) -> ServiceResult<Task> {
        self.update(
            id,
            &UpdateTaskRequest {
                status: Some(TaskStatus::Completed.as_str().to_string()),
                ..UpdateTaskRequest::default()
            },
        )
    }

    /// Deletes one task and returns the removed record.
    pub fn delete(&self, id: TaskId) -> ServiceResult<Task> {
        let task = self.get(id)?;
        self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={}", id);
        Ok(task)
    }

    /// Open tasks due strictly before `today`.
    pub fn overdue(&self, today: NaiveDate) -> ServiceResult<Vec<TaskSummary>> {
        let query = TaskListQuery {
            due_before: Some(today),
            ..TaskListQuery::default()
        };
        let tasks = self.repo.list_tasks(&query)?;
        self.summarize(tasks.into_iter().filter(|task| task.is_overdue(today)).collect())
    }

    /// Open tasks due within `[today, today + days]`.
    pub fn upcoming(&self, today: NaiveDate, days: u32) -> ServiceResult<Vec<TaskSummary>> {
        let until = today
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| ValidationError::new("days", format!("{days} days is out of range")))?;
        let query = TaskListQuery {
            due_from: Some(today),
            due_until: Some(until),
            exclude_completed: true,
            ..TaskListQuery::default()
        };
        self.summarize(self.repo.list_tasks(&query)?)
    }

    fn resolve_assignee(&self, email: &str) -> ServiceResult<User> {
        let email = validate_email(email)?;
        self.repo
            .find_user_by_email(email)?
            .ok_or_else(|| ServiceError::not_found("user", email))
    }

    fn ensure_capacity(&self, assignee: &User) -> ServiceResult<()> {
        let held = self.repo.count_tasks_for_user(assignee.id)?;
        if held >= self.policy.max_tasks_per_user {
            return Err(ServiceError::LimitExceeded {
                setting: "max_tasks_per_user",
                limit: self.policy.max_tasks_per_user,
                subject: format!("user {}", assignee.email),
            });
        }
        Ok(())
    }

    fn ensure_transition(&self, current: &Task, next: TaskStatus) -> ServiceResult<()> {
        if current.is_completed() && next != TaskStatus::Completed && !self.policy.allow_reopen_completed
        {
            return Err(ValidationError::new(
                "status",
                format!(
                    "task {} is completed and cannot move to {next} (allow_reopen_completed is off)",
                    current.id
                ),
            )
            .into());
        }
        Ok(())
    }

    fn summarize(&self, tasks: Vec<Task>) -> ServiceResult<Vec<TaskSummary>> {
        let mut emails: HashMap<UserId, Option<String>> = HashMap::new();
        let mut project_names: HashMap<ProjectId, Option<String>> = HashMap::new();
        let mut summaries = Vec::with_capacity(tasks.len());
        for task in tasks {
            let assignee_email = match emails.get(&task.assigned_to) {
                Some(email) => email.clone(),
                None => {
                    let email = self.repo.get_user(task.assigned_to)?.map(|user| user.email);
                    emails.insert(task.assigned_to, email.clone());
                    email
                }
            };
            let project_name = match project_names.get(&task.project_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.repo.get_project(task.project_id)?.map(|project| project.name);
                    project_names.insert(task.project_id, name.clone());
                    name
                }
            };
            summaries.push(TaskSummary {
                task,
                assignee_email,
                project_name,
            });
        }
        Ok(summaries)
    }
}
