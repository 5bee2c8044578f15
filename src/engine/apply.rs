//! Materializing resolved tasks for new hires.
//!
//! Each recipient is atomic: either its full task set is written or nothing is. A
//! batch is best-effort across recipients: one failure is counted and logged, and the
//! remaining recipients are still processed. Applying twice creates two independent
//! task sets.

use crate::config::OnboardingConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{NewHireStore, OnboardingTaskStore};
use crate::types::{
    BatchResult, NewHire, NewHireId, NewOnboardingTask, OnboardingTask, RecipientFailure,
    ResolvedTask,
};
use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

/// Due date for one task: the task's own date, then the batch date, then the hire's
/// start date plus the configured offset.
fn effective_due_date(
    task: &ResolvedTask,
    batch_due: Option<NaiveDate>,
    hire: &NewHire,
    config: &OnboardingConfig,
) -> Option<NaiveDate> {
    task.due_date.or(batch_due).or_else(|| {
        let start = hire.start_date?;
        let days = config.default_due_days?;
        start.checked_add_days(Days::new(days))
    })
}

fn build_rows(
    tasks: &[ResolvedTask],
    batch_due: Option<NaiveDate>,
    hire: &NewHire,
    config: &OnboardingConfig,
) -> Vec<NewOnboardingTask> {
    tasks
        .iter()
        .map(|task| NewOnboardingTask {
            title: task.title.clone(),
            description: task.description.clone(),
            assigned_to: task.assigned_to.clone(),
            due_date: effective_due_date(task, batch_due, hire, config),
            priority: task.priority,
            category: task.category.clone(),
            task_template_id: Some(task.task_template_id),
        })
        .collect()
}

/// Create one pending task per resolved task for a single new hire.
pub fn apply_to_one<S>(
    store: &S,
    new_hire_id: NewHireId,
    tasks: &[ResolvedTask],
    due_date: Option<NaiveDate>,
    config: &OnboardingConfig,
) -> EngineResult<Vec<OnboardingTask>>
where
    S: NewHireStore + OnboardingTaskStore + ?Sized,
{
    if tasks.is_empty() {
        return Err(EngineError::EmptyTaskSet);
    }

    let hire = store
        .find_new_hire(new_hire_id)?
        .ok_or(EngineError::NewHireNotFound(new_hire_id))?;

    let rows = build_rows(tasks, due_date, &hire, config);
    let created = store
        .create_task_batch(new_hire_id, &rows)
        .map_err(|e| match e {
            EngineError::NewHireNotFound(_) => e,
            other => EngineError::RecipientApplication {
                new_hire_id,
                reason: other.to_string(),
            },
        })?;

    debug!(new_hire_id, tasks = created.len(), "applied tasks to new hire");
    Ok(created)
}

/// Apply to each recipient independently and count the outcomes.
pub fn apply_to_many<S>(
    store: &S,
    new_hire_ids: &[NewHireId],
    tasks: &[ResolvedTask],
    due_date: Option<NaiveDate>,
    config: &OnboardingConfig,
) -> EngineResult<BatchResult>
where
    S: NewHireStore + OnboardingTaskStore + ?Sized,
{
    if new_hire_ids.is_empty() {
        return Err(EngineError::NoRecipients("an empty recipient list".to_string()));
    }
    if tasks.is_empty() {
        return Err(EngineError::EmptyTaskSet);
    }

    let mut result = BatchResult::default();
    for &new_hire_id in new_hire_ids {
        match apply_to_one(store, new_hire_id, tasks, due_date, config) {
            Ok(created) => {
                result.success_count += 1;
                result.tasks_created += created.len();
            }
            Err(err) => {
                warn!(new_hire_id, error = %err, "template application failed for recipient");
                result.fail_count += 1;
                result.failures.push(RecipientFailure {
                    new_hire_id,
                    code: err.code(),
                    message: err.to_string(),
                });
            }
        }
    }

    info!(
        recipients = new_hire_ids.len(),
        success = result.success_count,
        failed = result.fail_count,
        tasks_created = result.tasks_created,
        "bulk template application finished"
    );
    Ok(result)
}
