//! Task template catalog.

use super::{Database, now_ms};
use crate::error::{EngineError, EngineResult};
use crate::store::TaskTemplateStore;
use crate::types::{NewTaskTemplate, PRIORITY_DEFAULT, TaskTemplate, TaskTemplateId, clamp_priority};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn parse_task_template_row(row: &Row) -> rusqlite::Result<TaskTemplate> {
    Ok(TaskTemplate {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        priority: row.get("priority")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a task template using an existing connection (avoids deadlock).
pub(crate) fn get_task_template_internal(
    conn: &Connection,
    id: TaskTemplateId,
) -> EngineResult<Option<TaskTemplate>> {
    let task = conn
        .query_row(
            "SELECT * FROM task_templates WHERE id = ?1",
            params![id],
            parse_task_template_row,
        )
        .optional()?;
    Ok(task)
}

/// Internal helper to insert a task template inside a caller's transaction.
pub(crate) fn insert_task_template_internal(
    conn: &Connection,
    input: NewTaskTemplate,
) -> EngineResult<TaskTemplate> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(EngineError::invalid_field("title", "title must not be empty"));
    }
    let priority = clamp_priority(input.priority.unwrap_or(PRIORITY_DEFAULT));
    let now = now_ms();

    conn.execute(
        "INSERT INTO task_templates (title, description, category, priority, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![title, input.description, input.category, priority, now],
    )?;

    Ok(TaskTemplate {
        id: conn.last_insert_rowid(),
        title,
        description: input.description,
        category: input.category,
        priority,
        created_at: now,
    })
}

impl Database {
    /// Add a reusable task definition to the catalog.
    pub fn create_task_template(&self, input: NewTaskTemplate) -> EngineResult<TaskTemplate> {
        self.with_conn(|conn| insert_task_template_internal(conn, input))
    }

    /// Add several entries in one transaction.
    pub fn create_task_templates(
        &self,
        inputs: Vec<NewTaskTemplate>,
    ) -> EngineResult<Vec<TaskTemplate>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let created = inputs
                .into_iter()
                .map(|input| insert_task_template_internal(&tx, input))
                .collect::<EngineResult<Vec<_>>>()?;
            tx.commit()?;
            Ok(created)
        })
    }

    /// Get a catalog entry by ID.
    pub fn get_task_template(&self, id: TaskTemplateId) -> EngineResult<Option<TaskTemplate>> {
        self.with_conn(|conn| get_task_template_internal(conn, id))
    }

    /// List the catalog, optionally filtered by category.
    pub fn list_task_templates(&self, category: Option<&str>) -> EngineResult<Vec<TaskTemplate>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM task_templates
                 WHERE (?1 IS NULL OR category = ?1)
                 ORDER BY title COLLATE NOCASE, id",
            )?;
            let tasks = stmt
                .query_map(params![category], parse_task_template_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Number of templates referencing a catalog entry.
    pub fn task_template_usage(&self, id: TaskTemplateId) -> EngineResult<i64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM template_task_maps WHERE task_template_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Delete a catalog entry. Fails while any template still references it.
    pub fn delete_task_template(&self, id: TaskTemplateId) -> EngineResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if get_task_template_internal(&tx, id)?.is_none() {
                return Err(EngineError::TaskTemplateNotFound(id));
            }

            let referenced_by: i64 = tx.query_row(
                "SELECT COUNT(*) FROM template_task_maps WHERE task_template_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            if referenced_by > 0 {
                return Err(EngineError::InUse(format!(
                    "task template {} is referenced by {} template(s)",
                    id, referenced_by
                )));
            }

            tx.execute("DELETE FROM task_templates WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(())
        })
    }
}

impl TaskTemplateStore for Database {
    fn find_task_template(&self, id: TaskTemplateId) -> EngineResult<Option<TaskTemplate>> {
        self.get_task_template(id)
    }

    fn create_task_template(&self, input: NewTaskTemplate) -> EngineResult<TaskTemplate> {
        Database::create_task_template(self, input)
    }

    fn create_task_templates(&self, inputs: Vec<NewTaskTemplate>) -> EngineResult<Vec<TaskTemplate>> {
        Database::create_task_templates(self, inputs)
    }
}
