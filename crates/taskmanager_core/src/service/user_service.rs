//! User use-case service.
//!
//! # Responsibility
//! - Register, look up, update and delete users.
//! - Keep emails unique and project managers in a managing role.
//!
//! # Invariants
//! - Email uniqueness is checked case-insensitively before every write.
//! - A user referenced by a task or project is never deleted.
//! - A user managing a project never drops to role `member`.

use crate::model::user::{NewUser, User, UserId, UserPatch, UserRole};
use crate::repo::user_repo::{UserListQuery, UserRepository};
use crate::service::{ServiceError, ServiceResult};
use crate::validation::{validate_email, validate_required, validate_role};
use log::info;
use std::fmt::{Display, Formatter};

/// Caller-side handle on a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Id(UserId),
    Email(String),
}

impl Display for UserRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Email(email) => f.write_str(email),
        }
    }
}

/// Raw input for `user add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRequest {
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Raw input for `user update`; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers one user.
    ///
    /// # Errors
    /// - `Validation` for a blank name, malformed email or unknown role.
    /// - `Duplicate` when the email is already registered.
    pub fn add(&self, request: &NewUserRequest) -> ServiceResult<User> {
        let new_user = NewUser {
            name: validate_required("name", &request.name)?,
            email: validate_email(&request.email)?.to_string(),
            role: validate_role(&request.role)?,
        };
        self.ensure_email_free(&new_user.email, None)?;

        let id = self.repo.create_user(&new_user)?;
        info!(
            "event=user_add module=service status=ok user_id={} role={}",
            id, new_user.role
        );
        self.get(&UserRef::Id(id))
    }

    pub fn get(&self, user: &UserRef) -> ServiceResult<User> {
        let found = match user {
            UserRef::Id(id) => self.repo.get_user(*id)?,
            UserRef::Email(email) => self.repo.find_user_by_email(validate_email(email)?)?,
        };
        found.ok_or_else(|| ServiceError::not_found("user", user))
    }

    /// Lists users in creation order, optionally restricted to one role.
    pub fn list(&self, role: Option<&str>) -> ServiceResult<Vec<User>> {
        let query = UserListQuery {
            role: role.map(validate_role).transpose()?,
        };
        Ok(self.repo.list_users(&query)?)
    }

    /// Applies the present fields of `request` to one user.
    ///
    /// # Errors
    /// - `NotFound` when the user does not exist.
    /// - `Duplicate` when the new email belongs to another user.
    /// - `Conflict` when demoting a project manager to `member`.
    pub fn update(&self, user: &UserRef, request: &UpdateUserRequest) -> ServiceResult<User> {
        let patch = UserPatch {
            name: request
                .name
                .as_deref()
                .map(|name| validate_required("name", name))
                .transpose()?,
            email: request
                .email
                .as_deref()
                .map(|email| validate_email(email).map(str::to_string))
                .transpose()?,
            role: request.role.as_deref().map(validate_role).transpose()?,
        };

        let current = self.get(user)?;
        if let Some(email) = patch.email.as_deref() {
            self.ensure_email_free(email, Some(current.id))?;
        }
        if patch.role == Some(UserRole::Member) && current.role != UserRole::Member {
            let references = self.repo.user_references(current.id)?;
            if references.managed_projects > 0 {
                return Err(ServiceError::Conflict {
                    entity: "user",
                    id: current.id,
                    reason: format!(
                        "manages {} project(s) and cannot become a member",
                        references.managed_projects
                    ),
                });
            }
        }

        let updated = self.repo.update_user(current.id, &patch)?;
        info!(
            "event=user_update module=service status=ok user_id={} changed={}",
            updated.id,
            updated != current
        );
        Ok(updated)
    }

    /// Deletes an unreferenced user and returns the removed record.
    pub fn delete(&self, id: UserId) -> ServiceResult<User> {
        let user = self.get(&UserRef::Id(id))?;
        let references = self.repo.user_references(id)?;
        if !references.is_empty() {
            return Err(ServiceError::Conflict {
                entity: "user",
                id,
                reason: format!(
                    "still assigned to {} task(s) and managing {} project(s)",
                    references.assigned_tasks, references.managed_projects
                ),
            });
        }

        self.repo.delete_user(id)?;
        info!("event=user_delete module=service status=ok user_id={}", id);
        Ok(user)
    }

    fn ensure_email_free(&self, email: &str, owner: Option<UserId>) -> ServiceResult<()> {
        match self.repo.find_user_by_email(email)? {
            Some(existing) if Some(existing.id) != owner => Err(ServiceError::Duplicate {
                entity: "user",
                field: "email",
                value: email.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
