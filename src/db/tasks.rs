//! Onboarding task rows owned by new hires.

use super::new_hires::get_new_hire_internal;
use super::{Database, now_ms};
use crate::error::{EngineError, EngineResult};
use crate::store::OnboardingTaskStore;
use crate::types::{NewHireId, NewOnboardingTask, OnboardingTask, TaskId, TaskStatus, clamp_priority};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn parse_task_row(row: &Row) -> rusqlite::Result<OnboardingTask> {
    Ok(OnboardingTask {
        id: row.get("id")?,
        new_hire_id: row.get("new_hire_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        assigned_to: row.get("assigned_to")?,
        due_date: row.get("due_date")?,
        status: row.get("status")?,
        priority: row.get("priority")?,
        category: row.get("category")?,
        task_template_id: row.get("task_template_id")?,
        completed_date: row.get("completed_date")?,
        completed_by: row.get("completed_by")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(conn: &Connection, task_id: TaskId) -> EngineResult<Option<OnboardingTask>> {
    let task = conn
        .query_row(
            "SELECT * FROM onboarding_tasks WHERE id = ?1",
            params![task_id],
            parse_task_row,
        )
        .optional()?;
    Ok(task)
}

impl Database {
    /// Insert a batch of pending tasks for one new hire in a single transaction.
    pub fn insert_task_batch(
        &self,
        new_hire_id: NewHireId,
        tasks: &[NewOnboardingTask],
    ) -> EngineResult<Vec<OnboardingTask>> {
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if get_new_hire_internal(&tx, new_hire_id)?.is_none() {
                return Err(EngineError::NewHireNotFound(new_hire_id));
            }

            let mut created = Vec::with_capacity(tasks.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO onboarding_tasks (
                        new_hire_id, title, description, assigned_to, due_date, status,
                        priority, category, task_template_id, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )?;

                for task in tasks {
                    let priority = clamp_priority(task.priority);
                    stmt.execute(params![
                        new_hire_id,
                        task.title,
                        task.description,
                        task.assigned_to,
                        task.due_date,
                        TaskStatus::Pending,
                        priority,
                        task.category,
                        task.task_template_id,
                        now,
                    ])?;

                    created.push(OnboardingTask {
                        id: tx.last_insert_rowid(),
                        new_hire_id,
                        title: task.title.clone(),
                        description: task.description.clone(),
                        assigned_to: task.assigned_to.clone(),
                        due_date: task.due_date,
                        status: TaskStatus::Pending,
                        priority,
                        category: task.category.clone(),
                        task_template_id: task.task_template_id,
                        completed_date: None,
                        completed_by: None,
                        created_at: now,
                    });
                }
            }

            // Uncommitted inserts roll back when tx drops.
            tx.commit()?;
            Ok(created)
        })
    }

    /// Get a task by ID.
    pub fn get_onboarding_task(&self, task_id: TaskId) -> EngineResult<Option<OnboardingTask>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// All tasks of a new hire, in creation order.
    pub fn list_tasks_for_new_hire(&self, new_hire_id: NewHireId) -> EngineResult<Vec<OnboardingTask>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM onboarding_tasks WHERE new_hire_id = ?1 ORDER BY id")?;
            let tasks = stmt
                .query_map(params![new_hire_id], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Change a task's status. Entering `completed` stamps the completion date and
    /// actor; leaving it clears both.
    pub fn set_task_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        completed_by: Option<&str>,
    ) -> EngineResult<OnboardingTask> {
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let task = get_task_internal(&tx, task_id)?.ok_or(EngineError::TaskNotFound(task_id))?;

            let (completed_date, completed_by) = match (task.status.is_completed(), status.is_completed()) {
                // Already completed: keep the original stamp
                (true, true) => (task.completed_date, task.completed_by.clone()),
                (false, true) => (Some(now), completed_by.map(String::from)),
                (_, false) => (None, None),
            };

            tx.execute(
                "UPDATE onboarding_tasks SET status = ?1, completed_date = ?2, completed_by = ?3
                 WHERE id = ?4",
                params![status, completed_date, completed_by, task_id],
            )?;
            tx.commit()?;

            Ok(OnboardingTask {
                status,
                completed_date,
                completed_by,
                ..task
            })
        })
    }
}

impl OnboardingTaskStore for Database {
    fn create_task_batch(
        &self,
        new_hire_id: NewHireId,
        tasks: &[NewOnboardingTask],
    ) -> EngineResult<Vec<OnboardingTask>> {
        self.insert_task_batch(new_hire_id, tasks)
    }

    fn task_statuses(&self, new_hire_id: NewHireId) -> EngineResult<Vec<TaskStatus>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT status FROM onboarding_tasks WHERE new_hire_id = ?1")?;
            let statuses = stmt
                .query_map(params![new_hire_id], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<TaskStatus>>>()?;
            Ok(statuses)
        })
    }

    fn update_task_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        completed_by: Option<&str>,
    ) -> EngineResult<OnboardingTask> {
        self.set_task_status(task_id, status, completed_by)
    }
}
