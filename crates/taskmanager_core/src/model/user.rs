//! User domain model.
//!
//! # Invariants
//! - `email` is unique (case-insensitive) across all users.
//! - A user referenced by a task or project is never deleted.

use std::fmt::{Display, Formatter};

/// Storage-assigned user identifier.
pub type UserId = i64;

/// Access role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Manager,
    Member,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "member" => Some(Self::Member),
            _ => None,
        }
    }

    /// Whether users with this role may be recorded as project managers.
    pub fn can_manage_projects(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

/// Validated input for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }

    /// Applies present fields onto `user`, returning whether anything changed.
    pub fn apply_to(&self, user: &mut User) -> bool {
        let before = user.clone();
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        *user != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: 1,
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            role: UserRole::Member,
            created_at: 0,
        }
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in [UserRole::Admin, UserRole::Manager, UserRole::Member] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("Admin"), None);
    }

    #[test]
    fn only_admin_and_manager_can_manage_projects() {
        assert!(UserRole::Admin.can_manage_projects());
        assert!(UserRole::Manager.can_manage_projects());
        assert!(!UserRole::Member.can_manage_projects());
    }

    #[test]
    fn patch_reports_whether_fields_changed() {
        let mut user = sample();
        let same = UserPatch {
            role: Some(UserRole::Member),
            ..UserPatch::default()
        };
        assert!(!same.apply_to(&mut user));

        let promote = UserPatch {
            role: Some(UserRole::Manager),
            ..UserPatch::default()
        };
        assert!(promote.apply_to(&mut user));
        assert_eq!(user.role, UserRole::Manager);
        assert_eq!(user.email, "jane@example.com");
    }
}
