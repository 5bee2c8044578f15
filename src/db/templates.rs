//! Onboarding template definitions and their ordered task references.

use super::catalog::get_task_template_internal;
use super::{Database, now_ms};
use crate::error::{EngineError, EngineResult};
use crate::store::TemplateStore;
use crate::types::{
    NewTemplate, TaskTemplate, TaskTemplateId, Template, TemplateEntry, TemplateId, TemplateTaskMap,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashSet;

pub fn parse_template_row(row: &Row) -> rusqlite::Result<Template> {
    Ok(Template {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        department: row.get("department")?,
        category: row.get("category")?,
        item_count: row.get("item_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_entry_row(row: &Row) -> rusqlite::Result<TemplateEntry> {
    Ok(TemplateEntry {
        map: TemplateTaskMap {
            template_id: row.get("template_id")?,
            task_template_id: row.get("task_template_id")?,
            sequence: row.get("sequence")?,
        },
        task: TaskTemplate {
            id: row.get("task_template_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            category: row.get("category")?,
            priority: row.get("priority")?,
            created_at: row.get("created_at")?,
        },
    })
}

pub(crate) fn get_template_internal(
    conn: &Connection,
    id: TemplateId,
) -> EngineResult<Option<Template>> {
    let template = conn
        .query_row(
            "SELECT * FROM templates WHERE id = ?1",
            params![id],
            parse_template_row,
        )
        .optional()?;
    Ok(template)
}

/// Recompute item_count from the maps so it can never drift.
fn refresh_item_count(conn: &Connection, id: TemplateId) -> EngineResult<()> {
    conn.execute(
        "UPDATE templates SET
            item_count = (SELECT COUNT(*) FROM template_task_maps WHERE template_id = ?1),
            updated_at = ?2
         WHERE id = ?1",
        params![id, now_ms()],
    )?;
    Ok(())
}

/// Insert a template and its maps inside a caller's transaction.
pub(crate) fn insert_template_internal(
    conn: &Connection,
    input: NewTemplate,
    task_template_ids: &[TaskTemplateId],
) -> EngineResult<Template> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(EngineError::invalid_field("name", "template name must not be empty"));
    }

    let mut seen = HashSet::new();
    for &task_id in task_template_ids {
        if !seen.insert(task_id) {
            return Err(EngineError::DuplicateReference {
                task_template_id: task_id,
            });
        }
        if get_task_template_internal(conn, task_id)?.is_none() {
            return Err(EngineError::TaskTemplateNotFound(task_id));
        }
    }

    let now = now_ms();
    conn.execute(
        "INSERT INTO templates (name, description, department, category, item_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
        params![name, input.description, input.department, input.category, now],
    )?;
    let template_id = conn.last_insert_rowid();

    for (index, task_id) in task_template_ids.iter().enumerate() {
        conn.execute(
            "INSERT INTO template_task_maps (template_id, task_template_id, sequence)
             VALUES (?1, ?2, ?3)",
            params![template_id, task_id, index as i64 + 1],
        )?;
    }

    refresh_item_count(conn, template_id)?;
    get_template_internal(conn, template_id)?
        .ok_or(EngineError::TemplateNotFound(template_id))
}

impl Database {
    /// Create a template referencing catalog entries in the given order.
    pub fn create_template(
        &self,
        input: NewTemplate,
        task_template_ids: &[TaskTemplateId],
    ) -> EngineResult<Template> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let template = insert_template_internal(&tx, input, task_template_ids)?;
            tx.commit()?;
            Ok(template)
        })
    }

    /// Get a template by ID.
    pub fn get_template(&self, id: TemplateId) -> EngineResult<Option<Template>> {
        self.with_conn(|conn| get_template_internal(conn, id))
    }

    /// List templates, optionally filtered by department and/or category.
    pub fn list_templates(
        &self,
        department: Option<&str>,
        category: Option<&str>,
    ) -> EngineResult<Vec<Template>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM templates
                 WHERE (?1 IS NULL OR department = ?1)
                   AND (?2 IS NULL OR category = ?2)
                 ORDER BY name COLLATE NOCASE, id",
            )?;
            let templates = stmt
                .query_map(params![department, category], parse_template_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(templates)
        })
    }

    /// Get the entries of a template, ordered by sequence.
    pub fn get_template_entries(&self, id: TemplateId) -> EngineResult<Vec<TemplateEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.template_id, m.task_template_id, m.sequence,
                        t.title, t.description, t.category, t.priority, t.created_at
                 FROM template_task_maps m
                 INNER JOIN task_templates t ON t.id = m.task_template_id
                 WHERE m.template_id = ?1
                 ORDER BY m.sequence",
            )?;
            let entries = stmt
                .query_map(params![id], parse_entry_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
    }

    /// Append a catalog entry to the end of a template.
    pub fn add_task_to_template(
        &self,
        template_id: TemplateId,
        task_template_id: TaskTemplateId,
    ) -> EngineResult<TemplateTaskMap> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if get_template_internal(&tx, template_id)?.is_none() {
                return Err(EngineError::TemplateNotFound(template_id));
            }
            if get_task_template_internal(&tx, task_template_id)?.is_none() {
                return Err(EngineError::TaskTemplateNotFound(task_template_id));
            }

            let already: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM template_task_maps
                               WHERE template_id = ?1 AND task_template_id = ?2)",
                params![template_id, task_template_id],
                |row| row.get(0),
            )?;
            if already {
                return Err(EngineError::DuplicateReference { task_template_id });
            }

            let sequence: i64 = tx.query_row(
                "SELECT COALESCE(MAX(sequence), 0) + 1 FROM template_task_maps WHERE template_id = ?1",
                params![template_id],
                |row| row.get(0),
            )?;

            tx.execute(
                "INSERT INTO template_task_maps (template_id, task_template_id, sequence)
                 VALUES (?1, ?2, ?3)",
                params![template_id, task_template_id, sequence],
            )?;
            refresh_item_count(&tx, template_id)?;
            tx.commit()?;

            Ok(TemplateTaskMap {
                template_id,
                task_template_id,
                sequence,
            })
        })
    }

    /// Remove a catalog entry from a template. Returns false if it was not referenced.
    pub fn remove_task_from_template(
        &self,
        template_id: TemplateId,
        task_template_id: TaskTemplateId,
    ) -> EngineResult<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if get_template_internal(&tx, template_id)?.is_none() {
                return Err(EngineError::TemplateNotFound(template_id));
            }

            let removed = tx.execute(
                "DELETE FROM template_task_maps WHERE template_id = ?1 AND task_template_id = ?2",
                params![template_id, task_template_id],
            )?;
            refresh_item_count(&tx, template_id)?;
            tx.commit()?;

            Ok(removed > 0)
        })
    }

    /// Delete a template. Its maps go with it; applied tasks are untouched.
    pub fn delete_template(&self, id: TemplateId) -> EngineResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
            if deleted == 0 {
                return Err(EngineError::TemplateNotFound(id));
            }
            Ok(())
        })
    }
}

impl TemplateStore for Database {
    fn find_template(&self, id: TemplateId) -> EngineResult<Option<Template>> {
        self.get_template(id)
    }

    fn template_entries(&self, id: TemplateId) -> EngineResult<Vec<TemplateEntry>> {
        self.get_template_entries(id)
    }
}
