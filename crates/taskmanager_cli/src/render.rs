//! Plain-text reports printed by list and mutation commands.
//!
//! # Invariants
//! - Output is byte-stable: scripts parse these lines.
//! - Lists keep the order they are given.

use std::fmt::Write;
use taskmanager_core::{Project, ProjectSummary, Task, TaskSummary, User};

const UNKNOWN: &str = "Unknown";

pub fn user_line(user: &User) -> String {
    format!("[{}] {} ({})", user.id, user.name, user.email)
}

pub fn task_line(task: &Task) -> String {
    format!(
        "[{}] {} (Priority: {}, Status: {})",
        task.id, task.title, task.priority, task.status
    )
}

pub fn project_line(project: &Project) -> String {
    format!("[{}] {}", project.id, project.name)
}

pub fn render_users(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }
    let mut out = String::from("\nUsers:");
    for user in users {
        let _ = write!(out, "\n  - {} ({}), Role: {}", user.name, user.email, user.role);
    }
    out
}

pub fn render_tasks(tasks: &[TaskSummary]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }
    let mut out = String::from("\nTasks:");
    for summary in tasks {
        let task = &summary.task;
        let _ = write!(
            out,
            "\n  - {}\n    Due: {}, Assigned to: {}, Project: {}",
            task_line(task),
            task.due_date,
            summary.assignee_email.as_deref().unwrap_or(UNKNOWN),
            summary.project_name.as_deref().unwrap_or(UNKNOWN),
        );
        if !task.description.is_empty() {
            let _ = write!(out, "\n    Description: {}", task.description);
        }
    }
    out
}

pub fn render_projects(projects: &[ProjectSummary]) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }
    let mut out = String::from("\nProjects:");
    for summary in projects {
        let project = &summary.project;
        let _ = write!(
            out,
            "\n  - {}\n    Manager: {}, Period: {} to {}",
            project_line(project),
            summary.manager_name.as_deref().unwrap_or(UNKNOWN),
            project.start_date,
            project.end_date,
        );
        if !project.description.is_empty() {
            let _ = write!(out, "\n    Description: {}", project.description);
        }
    }
    out
}
