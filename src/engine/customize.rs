//! Customization of a template's task list before it is applied.
//!
//! A [`Customization`] starts from a template's entries (or from caller-supplied
//! drafts), is edited in memory, and is finally committed. Commit is the only step
//! that writes: every ad-hoc draft becomes a new catalog entry so the resulting
//! [`ResolvedTask`] list is fully catalog-backed.

use crate::error::{EngineError, EngineResult};
use crate::store::TaskTemplateStore;
use crate::types::{
    NewTaskTemplate, PRIORITY_DEFAULT, Priority, ResolvedTask, TaskDraft, TaskTemplateId,
    TemplateEntry, clamp_priority,
};
use std::collections::HashSet;
use tracing::debug;

/// Turn template entries into drafts, ordered by ascending sequence.
pub fn resolve_drafts(mut entries: Vec<TemplateEntry>) -> Vec<TaskDraft> {
    entries.sort_by_key(|entry| entry.map.sequence);
    entries
        .iter()
        .map(|entry| TaskDraft::from_task_template(&entry.task))
        .collect()
}

/// Commit drafts, creating a catalog entry for each ad-hoc draft.
///
/// The whole list is validated first, including that every referenced catalog entry
/// exists. Ad-hoc drafts are then created in one all-or-nothing store call, so a
/// rejected commit leaves the catalog untouched.
pub fn commit_drafts<S: TaskTemplateStore + ?Sized>(
    store: &S,
    drafts: &[TaskDraft],
) -> EngineResult<Vec<ResolvedTask>> {
    if drafts.is_empty() {
        return Err(EngineError::EmptyTaskSet);
    }

    let mut seen = HashSet::new();
    for (index, draft) in drafts.iter().enumerate() {
        if draft.title.trim().is_empty() {
            return Err(EngineError::invalid_field(
                "title",
                format!("draft {} has an empty title", index + 1),
            ));
        }
        if let Some(id) = draft.task_template_id {
            if !seen.insert(id) {
                return Err(EngineError::DuplicateReference {
                    task_template_id: id,
                });
            }
            if store.find_task_template(id)?.is_none() {
                return Err(EngineError::TaskTemplateNotFound(id));
            }
        }
    }

    let new_entries: Vec<NewTaskTemplate> = drafts
        .iter()
        .filter(|draft| draft.is_ad_hoc())
        .map(|draft| NewTaskTemplate {
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            priority: Some(draft.priority),
        })
        .collect();

    let created = if new_entries.is_empty() {
        Vec::new()
    } else {
        store.create_task_templates(new_entries)?
    };
    let mut created = created.into_iter();

    let mut resolved = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let task_template_id = match draft.task_template_id {
            Some(id) => id,
            None => {
                let entry = created.next().ok_or_else(|| {
                    EngineError::internal("catalog returned fewer entries than requested")
                })?;
                debug!(task_template_id = entry.id, title = %entry.title, "materialized ad-hoc draft");
                entry.id
            }
        };

        resolved.push(ResolvedTask {
            task_template_id,
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            due_date: draft.due_date,
            assigned_to: draft.assigned_to.clone(),
            priority: clamp_priority(draft.priority),
            category: draft.category.clone(),
        });
    }

    Ok(resolved)
}

/// Editable working set of drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customization {
    drafts: Vec<TaskDraft>,
    default_priority: Priority,
    default_category: Option<String>,
}

impl Customization {
    /// Start from an explicit draft list.
    pub fn new(drafts: Vec<TaskDraft>) -> Self {
        Self {
            drafts,
            default_priority: PRIORITY_DEFAULT,
            default_category: None,
        }
    }

    /// Start from a template's entries.
    pub fn from_entries(entries: Vec<TemplateEntry>) -> Self {
        Self::new(resolve_drafts(entries))
    }

    /// Priority and category given to blank drafts (builder pattern).
    pub fn with_defaults(mut self, priority: Priority, category: Option<String>) -> Self {
        self.default_priority = clamp_priority(priority);
        self.default_category = category;
        self
    }

    pub fn drafts(&self) -> &[TaskDraft] {
        &self.drafts
    }

    pub fn into_drafts(self) -> Vec<TaskDraft> {
        self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// An empty list disables commit.
    pub fn can_commit(&self) -> bool {
        !self.drafts.is_empty()
    }

    pub fn draft_mut(&mut self, index: usize) -> Option<&mut TaskDraft> {
        self.drafts.get_mut(index)
    }

    fn contains_reference(&self, id: TaskTemplateId) -> bool {
        self.drafts.iter().any(|d| d.task_template_id == Some(id))
    }

    /// Copy due dates and assignees from a prior draft list onto drafts that reference
    /// the same catalog entry and have not been scheduled yet.
    pub fn carry_over(&mut self, prior: &[TaskDraft]) {
        for draft in &mut self.drafts {
            let Some(id) = draft.task_template_id else {
                continue;
            };
            let Some(previous) = prior.iter().find(|p| p.task_template_id == Some(id)) else {
                continue;
            };
            if draft.due_date.is_none() {
                draft.due_date = previous.due_date;
            }
            if draft.assigned_to.is_none() {
                draft.assigned_to = previous.assigned_to.clone();
            }
        }
    }

    /// Append an empty ad-hoc draft and return it for editing.
    pub fn add_blank(&mut self) -> &mut TaskDraft {
        let mut draft = TaskDraft::blank(self.default_priority);
        draft.category = self.default_category.clone();
        self.drafts.push(draft);
        let last = self.drafts.len() - 1;
        &mut self.drafts[last]
    }

    /// Append a draft pre-filled from the catalog.
    ///
    /// A catalog entry may appear at most once per application.
    pub fn add_from_catalog<S: TaskTemplateStore + ?Sized>(
        &mut self,
        store: &S,
        task_template_id: TaskTemplateId,
    ) -> EngineResult<&TaskDraft> {
        if self.contains_reference(task_template_id) {
            return Err(EngineError::DuplicateReference { task_template_id });
        }
        let task = store
            .find_task_template(task_template_id)?
            .ok_or(EngineError::TaskTemplateNotFound(task_template_id))?;

        self.drafts.push(TaskDraft::from_task_template(&task));
        let last = self.drafts.len() - 1;
        Ok(&self.drafts[last])
    }

    /// Remove the draft at `index`.
    pub fn remove(&mut self, index: usize) -> EngineResult<TaskDraft> {
        if index >= self.drafts.len() {
            return Err(EngineError::invalid_field(
                "index",
                format!(
                    "draft index {} out of range ({} drafts)",
                    index,
                    self.drafts.len()
                ),
            ));
        }
        Ok(self.drafts.remove(index))
    }

    /// Commit the working set.
    pub fn commit<S: TaskTemplateStore + ?Sized>(&self, store: &S) -> EngineResult<Vec<ResolvedTask>> {
        commit_drafts(store, &self.drafts)
    }
}
