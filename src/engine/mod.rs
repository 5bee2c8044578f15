//! Onboarding template application engine.
//!
//! The facade ties the three stages together:
//!
//! 1. [`OnboardingEngine::resolve_and_customize`] loads a template into an editable
//!    [`Customization`].
//! 2. [`OnboardingEngine::apply_template`] commits the (possibly customized) task list
//!    and applies it to an audience.
//! 3. [`OnboardingEngine::recalculate_new_hire`] recomputes derived progress, and
//!    [`OnboardingEngine::set_task_status`] does so after every status change.

pub mod apply;
pub mod customize;
pub mod progress;

pub use apply::{apply_to_many, apply_to_one};
pub use customize::{Customization, commit_drafts, resolve_drafts};
pub use progress::{compute_progress, recalculate};

use crate::config::OnboardingConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::OnboardingStore;
use crate::types::{
    Audience, BatchResult, NewHireId, OnboardingTask, Progress, TaskDraft, TaskId, TaskStatus,
    Template, TemplateId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request to apply a template to an audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub template_id: TemplateId,
    pub audience: Audience,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Replaces the template's own task list when present.
    #[serde(default)]
    pub customized_tasks: Option<Vec<TaskDraft>>,
}

impl ApplyRequest {
    pub fn new(template_id: TemplateId, audience: Audience) -> Self {
        Self {
            template_id,
            audience,
            due_date: None,
            customized_tasks: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_tasks(mut self, drafts: Vec<TaskDraft>) -> Self {
        self.customized_tasks = Some(drafts);
        self
    }
}

/// Engine over a storage backend.
pub struct OnboardingEngine<S> {
    store: S,
    config: OnboardingConfig,
}

impl<S: OnboardingStore> OnboardingEngine<S> {
    pub fn new(store: S, config: OnboardingConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &OnboardingConfig {
        &self.config
    }

    fn require_template(&self, template_id: TemplateId) -> EngineResult<Template> {
        self.store
            .find_template(template_id)?
            .ok_or(EngineError::TemplateNotFound(template_id))
    }

    /// Load a template's tasks as drafts, in sequence order.
    pub fn resolve_and_customize(&self, template_id: TemplateId) -> EngineResult<Customization> {
        self.require_template(template_id)?;
        let entries = self.store.template_entries(template_id)?;
        Ok(Customization::from_entries(entries).with_defaults(
            self.config.default_priority,
            self.config.default_category.clone(),
        ))
    }

    /// Commit the task list and apply it to every recipient in the audience.
    pub fn apply_template(&self, request: ApplyRequest) -> EngineResult<BatchResult> {
        let template = self.require_template(request.template_id)?;

        // Recipients are resolved before anything is written.
        let recipients: Vec<NewHireId> = self.store.new_hire_ids(&request.audience)?;
        if recipients.is_empty() {
            return Err(match &request.audience {
                Audience::NewHire(id) => EngineError::NewHireNotFound(*id),
                other => EngineError::NoRecipients(other.to_string()),
            });
        }

        let drafts = match request.customized_tasks {
            Some(drafts) => drafts,
            None => self.resolve_and_customize(template.id)?.into_drafts(),
        };
        let resolved = commit_drafts(&self.store, &drafts)?;

        info!(
            template_id = template.id,
            template = %template.name,
            audience = %request.audience,
            recipients = recipients.len(),
            tasks = resolved.len(),
            "applying onboarding template"
        );

        apply_to_many(
            &self.store,
            &recipients,
            &resolved,
            request.due_date,
            &self.config,
        )
    }

    /// Recompute and persist a new hire's progress.
    pub fn recalculate_new_hire(&self, new_hire_id: NewHireId) -> EngineResult<Progress> {
        recalculate(&self.store, new_hire_id)
    }

    /// Change a task's status and recompute its owner's progress.
    pub fn set_task_status(
        &self,
        task_id: TaskId,
        status: TaskStatus,
        completed_by: Option<&str>,
    ) -> EngineResult<(OnboardingTask, Progress)> {
        let task = self.store.update_task_status(task_id, status, completed_by)?;
        let progress = self.recalculate_new_hire(task.new_hire_id)?;
        Ok((task, progress))
    }
}
