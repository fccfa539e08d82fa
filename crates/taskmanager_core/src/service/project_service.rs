//! Project use-case service.
//!
//! # Responsibility
//! - Create, list, update and delete projects.
//! - Resolve manager emails into user ids and display names.
//!
//! # Invariants
//! - `end_date >= start_date` after every write.
//! - Managers are users with role `admin` or `manager` when assigned.
//! - The number of projects never exceeds `max_projects`.
//! - A project referenced by tasks is never deleted.

use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch, ProjectState};
use crate::model::user::User;
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository};
use crate::repo::user_repo::UserRepository;
use crate::service::{trim_optional, ServiceError, ServicePolicy, ServiceResult};
use crate::validation::{validate_date, validate_email, validate_required, ValidationError};
use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;

/// Raw input for `project add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub manager_email: String,
}

/// Raw input for `project update`; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub manager_email: Option<String>,
}

/// Project annotated with its manager's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub project: Project,
    /// `None` only when the manager row is missing.
    pub manager_name: Option<String>,
}

pub struct ProjectService<R: ProjectRepository + UserRepository> {
    repo: R,
    policy: ServicePolicy,
}

impl<R: ProjectRepository + UserRepository> ProjectService<R> {
    pub fn new(repo: R, policy: ServicePolicy) -> Self {
        Self { repo, policy }
    }

    /// Creates one project.
    ///
    /// # Errors
    /// - `Validation` for malformed fields, `end < start` or a `member` manager.
    /// - `NotFound` when no user has the manager email.
    /// - `LimitExceeded` when `max_projects` projects already exist.
    pub fn add(&self, request: &NewProjectRequest) -> ServiceResult<Project> {
        let name = validate_required("name", &request.name)?;
        let description = trim_optional(request.description.as_deref()).unwrap_or_default();
        let start_date = validate_date("start_date", &request.start_date)?;
        let end_date = validate_date("end_date", &request.end_date)?;
        ensure_period(start_date, end_date)?;
        let manager = self.resolve_manager(&request.manager_email)?;

        let existing = self.repo.count_projects()?;
        if existing >= self.policy.max_projects {
            return Err(ServiceError::LimitExceeded {
                setting: "max_projects",
                limit: self.policy.max_projects,
                subject: "project store".to_string(),
            });
        }

        let id = self.repo.create_project(&NewProject {
            name,
            description,
            start_date,
            end_date,
            manager_id: manager.id,
        })?;
        info!(
            "event=project_add module=service status=ok project_id={} manager_id={}",
            id, manager.id
        );
        self.get(id)
    }

    pub fn get(&self, id: ProjectId) -> ServiceResult<Project> {
        self.repo
            .get_project(id)?
            .ok_or_else(|| ServiceError::not_found("project", id))
    }

    /// Lists projects in creation order, optionally keeping one timeline
    /// state relative to `today`.
    pub fn list(&self, state: Option<&str>, today: NaiveDate) -> ServiceResult<Vec<ProjectSummary>> {
        let state = state
            .map(|value| {
                ProjectState::parse(value.trim()).ok_or_else(|| {
                    ValidationError::new(
                        "state",
                        format!("`{}` must be one of active|completed|upcoming", value.trim()),
                    )
                })
            })
            .transpose()?;

        let mut manager_names: HashMap<i64, Option<String>> = HashMap::new();
        let mut summaries = Vec::new();
        for project in self.repo.list_projects(&ProjectListQuery::default())? {
            if state.is_some_and(|state| !state.matches(&project, today)) {
                continue;
            }
            let manager_name = match manager_names.get(&project.manager_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.repo.get_user(project.manager_id)?.map(|user| user.name);
                    manager_names.insert(project.manager_id, name.clone());
                    name
                }
            };
            summaries.push(ProjectSummary {
                project,
                manager_name,
            });
        }
        Ok(summaries)
    }

    /// Applies the present fields of `request` to one project.
    ///
    /// The merged period is re-checked, so moving only one bound still
    /// rejects `end < start`.
    pub fn update(&self, id: ProjectId, request: &UpdateProjectRequest) -> ServiceResult<Project> {
        let name = request
            .name
            .as_deref()
            .map(|name| validate_required("name", name))
            .transpose()?;
        let start_date = request
            .start_date
            .as_deref()
            .map(|value| validate_date("start_date", value))
            .transpose()?;
        let end_date = request
            .end_date
            .as_deref()
            .map(|value| validate_date("end_date", value))
            .transpose()?;

        let current = self.get(id)?;
        ensure_period(
            start_date.unwrap_or(current.start_date),
            end_date.unwrap_or(current.end_date),
        )?;
        let manager_id = request
            .manager_email
            .as_deref()
            .map(|email| self.resolve_manager(email).map(|manager| manager.id))
            .transpose()?;

        let patch = ProjectPatch {
            name,
            description: trim_optional(request.description.as_deref()),
            start_date,
            end_date,
            manager_id,
        };
        let updated = self.repo.update_project(id, &patch)?;
        info!(
            "event=project_update module=service status=ok project_id={} changed={}",
            id,
            updated != current
        );
        Ok(updated)
    }

    /// Deletes a project no task references and returns the removed record.
    pub fn delete(&self, id: ProjectId) -> ServiceResult<Project> {
        let project = self.get(id)?;
        let tasks = self.repo.count_tasks_for_project(id)?;
        if tasks > 0 {
            return Err(ServiceError::Conflict {
                entity: "project",
                id,
                reason: format!("still referenced by {tasks} task(s)"),
            });
        }

        self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={}", id);
        Ok(project)
    }

    fn resolve_manager(&self, email: &str) -> ServiceResult<User> {
        let email = validate_email(email)?;
        let manager = self
            .repo
            .find_user_by_email(email)?
            .ok_or_else(|| ServiceError::not_found("user", email))?;
        if !manager.role.can_manage_projects() {
            return Err(ValidationError::new(
                "manager",
                format!(
                    "{} has role {} and cannot manage projects",
                    manager.email, manager.role
                ),
            )
            .into());
        }
        Ok(manager)
    }
}

fn ensure_period(start_date: NaiveDate, end_date: NaiveDate) -> ServiceResult<()> {
    if end_date < start_date {
        return Err(ValidationError::new(
            "end_date",
            format!("{end_date} is before start_date {start_date}"),
        )
        .into());
    }
    Ok(())
}
