//! Derived progress and status of a new hire.

use crate::error::{EngineError, EngineResult};
use crate::store::{NewHireStore, OnboardingTaskStore};
use crate::types::{NewHireId, NewHireStatus, Progress, TaskStatus};
use tracing::debug;

/// Compute progress from the current task statuses.
///
/// `progress` is `round(100 * completed / total)` with halves rounding up; a hire
/// with no tasks is `0` and not started.
pub fn compute_progress(statuses: &[TaskStatus]) -> Progress {
    let total = statuses.len();
    let completed = statuses.iter().filter(|s| s.is_completed()).count();

    if total == 0 {
        return Progress {
            progress: 0,
            status: NewHireStatus::NotStarted,
            completed: 0,
            total: 0,
        };
    }

    let status = if completed == 0 {
        NewHireStatus::NotStarted
    } else if completed < total {
        NewHireStatus::InProgress
    } else {
        NewHireStatus::Completed
    };

    // Integer form of round-half-up, so 1/3 -> 33 and 2/3 -> 67.
    let progress = ((200 * completed + total) / (2 * total)) as u8;

    Progress {
        progress,
        status,
        completed,
        total,
    }
}

/// Re-read a new hire's tasks and write back the derived progress.
pub fn recalculate<S>(store: &S, new_hire_id: NewHireId) -> EngineResult<Progress>
where
    S: NewHireStore + OnboardingTaskStore + ?Sized,
{
    if store.find_new_hire(new_hire_id)?.is_none() {
        return Err(EngineError::NewHireNotFound(new_hire_id));
    }

    let statuses = store.task_statuses(new_hire_id)?;
    let progress = compute_progress(&statuses);
    store.write_progress(new_hire_id, &progress)?;

    debug!(
        new_hire_id,
        progress = progress.progress,
        status = %progress.status,
        "recalculated new hire progress"
    );
    Ok(progress)
}
