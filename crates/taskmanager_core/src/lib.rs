//! Core domain logic for the task manager.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::{Config, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{init_logging, logging_status, LogTarget};
pub use model::project::{Project, ProjectId, ProjectState};
pub use model::task::{Task, TaskId, TaskStatus};
pub use model::user::{User, UserId, UserRole};
pub use repo::{RepoError, RepoResult, SqliteStore};
pub use service::project_service::{
    NewProjectRequest, ProjectService, ProjectSummary, UpdateProjectRequest,
};
pub use service::task_service::{
    NewTaskRequest, TaskFilter, TaskService, TaskSummary, UpdateTaskRequest,
};
pub use service::user_service::{NewUserRequest, UpdateUserRequest, UserRef, UserService};
pub use service::{ServiceError, ServicePolicy, ServiceResult};
pub use validation::ValidationError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
