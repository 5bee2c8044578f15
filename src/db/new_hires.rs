//! New hire records and audience queries.

use super::{Database, map_constraint, now_ms};
use crate::error::{EngineError, EngineResult};
use crate::store::NewHireStore;
use crate::types::{Audience, NewHire, NewHireId, NewHireInput, NewHireStatus, Progress};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn parse_new_hire_row(row: &Row) -> rusqlite::Result<NewHire> {
    Ok(NewHire {
        id: row.get("id")?,
        candidate_id: row.get("candidate_id")?,
        job_id: row.get("job_id")?,
        company_id: row.get("company_id")?,
        status: row.get("status")?,
        progress: row.get("progress")?,
        manager_id: row.get("manager_id")?,
        start_date: row.get("start_date")?,
        department: row.get("department")?,
        work_location: row.get("work_location")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn get_new_hire_internal(
    conn: &Connection,
    id: NewHireId,
) -> EngineResult<Option<NewHire>> {
    let hire = conn
        .query_row(
            "SELECT * FROM new_hires WHERE id = ?1",
            params![id],
            parse_new_hire_row,
        )
        .optional()?;
    Ok(hire)
}

impl Database {
    /// Register a new hire. A (candidate, job) pair can only be onboarded once.
    pub fn create_new_hire(&self, input: NewHireInput) -> EngineResult<NewHire> {
        let now = now_ms();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO new_hires (
                    candidate_id, job_id, company_id, status, progress, manager_id,
                    start_date, department, work_location, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    input.candidate_id,
                    input.job_id,
                    input.company_id,
                    NewHireStatus::NotStarted,
                    input.manager_id,
                    input.start_date,
                    input.department,
                    input.work_location,
                    now,
                ],
            )
            .map_err(|e| {
                map_constraint(e, || {
                    format!(
                        "new hire for candidate {} and job {}",
                        input.candidate_id, input.job_id
                    )
                })
            })?;

            let id = conn.last_insert_rowid();
            get_new_hire_internal(conn, id)?.ok_or(EngineError::NewHireNotFound(id))
        })
    }

    /// Get a new hire by ID.
    pub fn get_new_hire(&self, id: NewHireId) -> EngineResult<Option<NewHire>> {
        self.with_conn(|conn| get_new_hire_internal(conn, id))
    }

    /// List new hires, optionally restricted to one department.
    pub fn list_new_hires(&self, department: Option<&str>) -> EngineResult<Vec<NewHire>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM new_hires
                 WHERE (?1 IS NULL OR department = ?1)
                 ORDER BY id",
            )?;
            let hires = stmt
                .query_map(params![department], parse_new_hire_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(hires)
        })
    }

    /// Resolve an audience to the matching new hire IDs, in ID order.
    ///
    /// A single-hire audience that does not exist resolves to an empty list.
    pub fn resolve_audience(&self, audience: &Audience) -> EngineResult<Vec<NewHireId>> {
        self.with_conn(|conn| {
            let ids = match audience {
                Audience::NewHire(id) => get_new_hire_internal(conn, *id)?
                    .map(|hire| vec![hire.id])
                    .unwrap_or_default(),
                Audience::Department(department) => {
                    let mut stmt =
                        conn.prepare("SELECT id FROM new_hires WHERE department = ?1 ORDER BY id")?;
                    let ids = stmt
                        .query_map(params![department], |row| row.get(0))?
                        .collect::<rusqlite::Result<Vec<NewHireId>>>()?;
                    ids
                }
                Audience::All => {
                    let mut stmt = conn.prepare("SELECT id FROM new_hires ORDER BY id")?;
                    let ids = stmt
                        .query_map([], |row| row.get(0))?
                        .collect::<rusqlite::Result<Vec<NewHireId>>>()?;
                    ids
                }
            };
            Ok(ids)
        })
    }

    /// Persist recomputed progress and status.
    pub fn update_new_hire_progress(&self, id: NewHireId, progress: &Progress) -> EngineResult<()> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE new_hires SET progress = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
                params![progress.progress, progress.status, now_ms(), id],
            )?;
            if updated == 0 {
                return Err(EngineError::NewHireNotFound(id));
            }
            Ok(())
        })
    }
}

impl NewHireStore for Database {
    fn find_new_hire(&self, id: NewHireId) -> EngineResult<Option<NewHire>> {
        self.get_new_hire(id)
    }

    fn new_hire_ids(&self, audience: &Audience) -> EngineResult<Vec<NewHireId>> {
        self.resolve_audience(audience)
    }

    fn write_progress(&self, id: NewHireId, progress: &Progress) -> EngineResult<()> {
        self.update_new_hire_progress(id, progress)
    }
}
