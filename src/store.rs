//! Storage seams consumed by the engine.
//!
//! The engine never talks to SQLite directly. Each concern it reads or writes is a
//! small trait here; [`crate::db::Database`] implements all of them, and tests can
//! substitute their own.

use crate::error::EngineResult;
use crate::types::{
    Audience, NewHire, NewHireId, NewOnboardingTask, NewTaskTemplate, OnboardingTask, Progress,
    TaskId, TaskStatus, TaskTemplate, TaskTemplateId, Template, TemplateEntry, TemplateId,
};

/// Catalog of reusable task definitions.
pub trait TaskTemplateStore {
    fn find_task_template(&self, id: TaskTemplateId) -> EngineResult<Option<TaskTemplate>>;

    fn create_task_template(&self, input: NewTaskTemplate) -> EngineResult<TaskTemplate>;

    /// Create several entries, in order. Either every entry is written or none is.
    fn create_task_templates(&self, inputs: Vec<NewTaskTemplate>) -> EngineResult<Vec<TaskTemplate>>;
}

/// Read access to template definitions.
pub trait TemplateStore {
    fn find_template(&self, id: TemplateId) -> EngineResult<Option<Template>>;

    /// Entries of a template. Order is not guaranteed.
    fn template_entries(&self, id: TemplateId) -> EngineResult<Vec<TemplateEntry>>;
}

/// New hire lookups and derived-state writes.
pub trait NewHireStore {
    fn find_new_hire(&self, id: NewHireId) -> EngineResult<Option<NewHire>>;

    /// Resolve an audience into new hire ids.
    fn new_hire_ids(&self, audience: &Audience) -> EngineResult<Vec<NewHireId>>;

    fn write_progress(&self, id: NewHireId, progress: &Progress) -> EngineResult<()>;
}

/// Onboarding task persistence.
pub trait OnboardingTaskStore {
    /// Insert all tasks for one new hire. Either every row is written or none is.
    fn create_task_batch(
        &self,
        new_hire_id: NewHireId,
        tasks: &[NewOnboardingTask],
    ) -> EngineResult<Vec<OnboardingTask>>;

    fn task_statuses(&self, new_hire_id: NewHireId) -> EngineResult<Vec<TaskStatus>>;

    fn update_task_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        completed_by: Option<&str>,
    ) -> EngineResult<OnboardingTask>;
}

/// Everything the engine facade needs.
pub trait OnboardingStore:
    TaskTemplateStore + TemplateStore + NewHireStore + OnboardingTaskStore
{
}

impl<T> OnboardingStore for T where
    T: TaskTemplateStore + TemplateStore + NewHireStore + OnboardingTaskStore
{
}
