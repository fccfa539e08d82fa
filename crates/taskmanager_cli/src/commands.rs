//! Dispatch from parsed arguments to core services.
//!
//! # Responsibility
//! - Map each subcommand onto one service call.
//! - Turn the result into the text printed on stdout.
//!
//! # Invariants
//! - Commands never print; output is returned to the caller so nothing is
//!   shown for a transaction that is rolled back.

use crate::args::{Command, ProjectCommand, TaskCommand, UserCommand};
use crate::render;
use chrono::NaiveDate;
use taskmanager_core::{
    NewProjectRequest, NewTaskRequest, NewUserRequest, ProjectService, ServicePolicy,
    ServiceResult, SqliteStore, TaskFilter, TaskService, UpdateProjectRequest, UpdateTaskRequest,
    UpdateUserRequest, UserRef, UserService,
};

/// Runs one command against `store` and returns its report.
pub fn execute(
    command: Command,
    store: SqliteStore<'_>,
    policy: &ServicePolicy,
    today: NaiveDate,
) -> ServiceResult<String> {
    match command {
        Command::User { command } => run_user(command, UserService::new(store)),
        Command::Task { command } => {
            run_task(command, TaskService::new(store, policy.clone()), today)
        }
        Command::Project { command } => {
            run_project(command, ProjectService::new(store, policy.clone()), today)
        }
    }
}

fn run_user(command: UserCommand, service: UserService<SqliteStore<'_>>) -> ServiceResult<String> {
    match command {
        UserCommand::Add { name, email, role } => {
            let user = service.add(&NewUserRequest { name, email, role })?;
            Ok(format!("User added: {}", render::user_line(&user)))
        }
        UserCommand::List { role } => {
            let users = service.list(role.as_deref())?;
            Ok(render::render_users(&users))
        }
        UserCommand::Update {
            id,
            name,
            email,
            role,
        } => {
            let user = service.update(&UserRef::Id(id), &UpdateUserRequest { name, email, role })?;
            Ok(format!("User updated: {}", render::user_line(&user)))
        }
        UserCommand::Delete { id } => {
            let user = service.delete(id)?;
            Ok(format!("User deleted: {}", render::user_line(&user)))
        }
    }
}

fn run_task(
    command: TaskCommand,
    service: TaskService<SqliteStore<'_>>,
    today: NaiveDate,
) -> ServiceResult<String> {
    match command {
        TaskCommand::Add(args) => {
            let task = service.add(&NewTaskRequest {
                title: args.title,
                description: args.description,
                due_date: args.due_date,
                priority: args.priority,
                assignee_email: args.assigned_to,
                project_id: args.project,
            })?;
            Ok(format!("Task added: {}", render::task_line(&task)))
        }
        TaskCommand::List {
            user,
            project,
            status,
            priority,
        } => {
            let tasks = service.list(&TaskFilter {
                assignee_email: user,
                project_id: project,
                status,
                priority,
            })?;
            Ok(render::render_tasks(&tasks))
        }
        TaskCommand::Update(args) => {
            let task = service.update(
                args.id,
                &UpdateTaskRequest {
                    title: args.title,
                    description: args.description,
                    due_date: args.due_date,
                    priority: args.priority,
                    status: args.status,
                    assignee_email: args.assigned_to,
                },
            )?;
            Ok(format!("Task updated: {}", render::task_line(&task)))
        }
        TaskCommand::Complete { id } => {
            let task = service.complete(id)?;
            Ok(format!("Task completed: {}", render::task_line(&task)))
        }
        TaskCommand::Delete { id } => {
            let task = service.delete(id)?;
            Ok(format!("Task deleted: {}", render::task_line(&task)))
        }
        TaskCommand::Overdue => Ok(render::render_tasks(&service.overdue(today)?)),
        TaskCommand::Upcoming { days } => Ok(render::render_tasks(&service.upcoming(today, days)?)),
    }
}

fn run_project(
    command: ProjectCommand,
    service: ProjectService<SqliteStore<'_>>,
    today: NaiveDate,
) -> ServiceResult<String> {
    match command {
        ProjectCommand::Add {
            name,
            description,
            start_date,
            end_date,
            manager,
        } => {
            let project = service.add(&NewProjectRequest {
                name,
                description,
                start_date,
                end_date,
                manager_email: manager,
            })?;
            Ok(format!("Project added: {}", render::project_line(&project)))
        }
        ProjectCommand::List { state } => {
            let projects = service.list(state.as_deref(), today)?;
            Ok(render::render_projects(&projects))
        }
        ProjectCommand::Update {
            id,
            end_date,
            start_date,
            name,
            description,
            manager,
        } => {
            let project = service.update(
                id,
                &UpdateProjectRequest {
                    name,
                    description,
                    start_date,
                    end_date,
                    manager_email: manager,
                },
            )?;
            Ok(format!("Project updated: {}", render::project_line(&project)))
        }
        ProjectCommand::Delete { id } => {
            let project = service.delete(id)?;
            Ok(format!("Project deleted: {}", render::project_line(&project)))
        }
    }
}
