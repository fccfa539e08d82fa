//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - Dates are stored as ISO `YYYY-MM-DD` text so lexical order is date order.
//! - The table enforces `end_date >= start_date` as a last line of defence.

use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::model::user::UserId;
use crate::repo::{changed_or_not_found, RepoError, RepoResult, SqliteStore};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    start_date,
    end_date,
    manager_id,
    created_at
FROM projects";

/// Query options for listing projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub manager_id: Option<UserId>,
}

/// Repository interface for project operations.
pub trait ProjectRepository {
    fn create_project(&self, project: &NewProject) -> RepoResult<ProjectId>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    /// Applies `patch` and returns the stored result. A patch that changes
    /// nothing performs no write.
    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn count_projects(&self) -> RepoResult<u32>;
    fn count_tasks_for_project(&self, id: ProjectId) -> RepoResult<u32>;
}

impl ProjectRepository for SqliteStore<'_> {
    fn create_project(&self, project: &NewProject) -> RepoResult<ProjectId> {
        self.conn().execute(
            "INSERT INTO projects (
                name,
                description,
                start_date,
                end_date,
                manager_id
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.name.as_str(),
                project.description.as_str(),
                project.start_date,
                project.end_date,
                project.manager_id,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(manager_id) = query.manager_id {
            sql.push_str(" AND manager_id = ?");
            bind_values.push(Value::Integer(manager_id));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project> {
        let mut project = self.get_project(id)?.ok_or(RepoError::NotFound {
            entity: "project",
            id,
        })?;
        if !patch.apply_to(&mut project) {
            return Ok(project);
        }

        let changed = self.conn().execute(
            "UPDATE projects
             SET
                name = ?1,
                description = ?2,
                start_date = ?3,
                end_date = ?4,
                manager_id = ?5
             WHERE id = ?6;",
            params![
                project.name.as_str(),
                project.description.as_str(),
                project.start_date,
                project.end_date,
                project.manager_id,
                id,
            ],
        )?;
        changed_or_not_found(changed, "project", id)?;
        Ok(project)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        changed_or_not_found(changed, "project", id)
    }

    fn count_projects(&self) -> RepoResult<u32> {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn count_tasks_for_project(&self, id: ProjectId) -> RepoResult<u32> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE project_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let project = Project {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        manager_id: row.get("manager_id")?,
        created_at: row.get("created_at")?,
    };
    if project.end_date < project.start_date {
        return Err(RepoError::InvalidData(format!(
            "project {} ends before it starts",
            project.id
        )));
    }
    Ok(project)
}
