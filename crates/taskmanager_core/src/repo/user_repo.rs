//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `users` table.
//! - Report how many tasks/projects reference a user.
//!
//! # Invariants
//! - Email lookups are case-insensitive (`COLLATE NOCASE` column).
//! - Read paths reject rows with unknown role values.

use crate::model::user::{NewUser, User, UserId, UserPatch, UserRole};
use crate::repo::{changed_or_not_found, RepoError, RepoResult, SqliteStore};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    role,
    created_at
FROM users";

/// Query options for listing users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
}

/// Rows that point at one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserReferences {
    /// Tasks whose assignee is the user.
    pub assigned_tasks: u32,
    /// Projects managed by the user.
    pub managed_projects: u32,
}

impl UserReferences {
    pub fn is_empty(&self) -> bool {
        self.assigned_tasks == 0 && self.managed_projects == 0
    }
}

/// Repository interface for user operations.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    /// Applies `patch` and returns the stored result. A patch that changes
    /// nothing performs no write.
    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    fn user_references(&self, id: UserId) -> RepoResult<UserReferences>;
}

impl UserRepository for SqliteStore<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<UserId> {
        self.conn().execute(
            "INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3);",
            params![user.name.as_str(), user.email.as_str(), user.role.as_str()],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(role) = query.role {
            sql.push_str(" AND role = ?");
            bind_values.push(Value::Text(role.as_str().to_string()));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User> {
        let mut user = self
            .get_user(id)?
            .ok_or(RepoError::NotFound { entity: "user", id })?;
        if !patch.apply_to(&mut user) {
            return Ok(user);
        }

        let changed = self.conn().execute(
            "UPDATE users
             SET
                name = ?1,
                email = ?2,
                role = ?3
             WHERE id = ?4;",
            params![user.name.as_str(), user.email.as_str(), user.role.as_str(), id],
        )?;
        changed_or_not_found(changed, "user", id)?;
        Ok(user)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1;", [id])?;
        changed_or_not_found(changed, "user", id)
    }

    fn user_references(&self, id: UserId) -> RepoResult<UserReferences> {
        let references = self.conn().query_row(
            "SELECT
                (SELECT COUNT(*) FROM tasks WHERE assigned_to = ?1),
                (SELECT COUNT(*) FROM projects WHERE manager_id = ?1);",
            [id],
            |row| {
                Ok(UserReferences {
                    assigned_tasks: row.get(0)?,
                    managed_projects: row.get(1)?,
                })
            },
        )?;
        Ok(references)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let role_text: String = row.get("role")?;
    let role = UserRole::parse(&role_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid role `{role_text}` in users.role")))?;

    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role,
        created_at: row.get("created_at")?,
    })
}
