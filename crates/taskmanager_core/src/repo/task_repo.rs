//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `tasks` table.
//! - Translate list filters into one conjunctive SQL query.
//!
//! # Invariants
//! - Every present filter narrows the result (AND semantics, never OR).
//! - Results are ordered by creation (`id ASC`).
//! - `updated_at` only moves when a write changes at least one field.

use crate::model::project::ProjectId;
use crate::model::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
use crate::model::user::UserId;
use crate::repo::{changed_or_not_found, RepoError, RepoResult, SqliteStore};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const TASK_SELECT_SQL: &str = "SELECT
    t.id AS id,
    t.title AS title,
    t.description AS description,
    t.due_date AS due_date,
    t.priority AS priority,
    t.status AS status,
    t.assigned_to AS assigned_to,
    t.project_id AS project_id,
    t.created_at AS created_at,
    t.updated_at AS updated_at
FROM tasks t";

/// Conjunctive filter set for listing tasks. Empty query lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    /// Assignee email, matched case-insensitively.
    pub assignee_email: Option<String>,
    pub project_id: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<i64>,
    /// Only tasks due strictly before this date.
    pub due_before: Option<NaiveDate>,
    /// Only tasks due on or after this date.
    pub due_from: Option<NaiveDate>,
    /// Only tasks due on or before this date.
    pub due_until: Option<NaiveDate>,
    /// Skip tasks with status `completed`.
    pub exclude_completed: bool,
}

/// Repository interface for task operations.
pub trait TaskRepository {
    fn create_task(&self, task: &NewTask) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Applies `patch` and returns the stored result. A patch that changes
    /// nothing performs no write.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn count_tasks_for_user(&self, user_id: UserId) -> RepoResult<u32>;
}

impl TaskRepository for SqliteStore<'_> {
    fn create_task(&self, task: &NewTask) -> RepoResult<TaskId> {
        self.conn().execute(
            "INSERT INTO tasks (
                title,
                description,
                due_date,
                priority,
                status,
                assigned_to,
                project_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                task.title.as_str(),
                task.description.as_str(),
                task.due_date,
                task.priority,
                TaskStatus::Pending.as_str(),
                task.assigned_to,
                task.project_id,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{TASK_SELECT_SQL} WHERE t.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = String::from(TASK_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(email) = query.assignee_email.as_ref() {
            sql.push_str(" INNER JOIN users u ON u.id = t.assigned_to AND u.email = ?");
            bind_values.push(Value::Text(email.trim().to_string()));
        }
        sql.push_str(" WHERE 1 = 1");

        if let Some(project_id) = query.project_id {
            sql.push_str(" AND t.project_id = ?");
            bind_values.push(Value::Integer(project_id));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND t.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(priority) = query.priority {
            sql.push_str(" AND t.priority = ?");
            bind_values.push(Value::Integer(priority));
        }
        if let Some(due_before) = query.due_before {
            sql.push_str(" AND t.due_date < ?");
            bind_values.push(date_value(due_before));
        }
        if let Some(due_from) = query.due_from {
            sql.push_str(" AND t.due_date >= ?");
            bind_values.push(date_value(due_from));
        }
        if let Some(due_until) = query.due_until {
            sql.push_str(" AND t.due_date <= ?");
            bind_values.push(date_value(due_until));
        }
        if query.exclude_completed {
            sql.push_str(" AND t.status <> ?");
            bind_values.push(Value::Text(TaskStatus::Completed.as_str().to_string()));
        }

        sql.push_str(" ORDER BY t.id ASC");

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task> {
        let mut task = self
            .get_task(id)?
            .ok_or(RepoError::NotFound { entity: "task", id })?;
        if !patch.apply_to(&mut task) {
            return Ok(task);
        }

        let changed = self.conn().execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                due_date = ?3,
                priority = ?4,
                status = ?5,
                assigned_to = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                task.due_date,
                task.priority,
                task.status.as_str(),
                task.assigned_to,
                id,
            ],
        )?;
        changed_or_not_found(changed, "task", id)?;

        // `updated_at` is assigned by the storage clock.
        self.get_task(id)?
            .ok_or(RepoError::NotFound { entity: "task", id })
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        changed_or_not_found(changed, "task", id)
    }

    fn count_tasks_for_user(&self, user_id: UserId) -> RepoResult<u32> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE assigned_to = ?1;",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format("%Y-%m-%d").to_string())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        priority: row.get("priority")?,
        status,
        assigned_to: row.get("assigned_to")?,
        project_id: row.get("project_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
