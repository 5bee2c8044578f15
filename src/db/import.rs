//! Template definition files.
//!
//! A definition describes a template and its ordered tasks in YAML or JSON. Tasks
//! either reference an existing catalog entry by `task_template_id` or describe a new
//! one inline. Import creates the missing catalog entries and the template in a single
//! transaction; export produces the same shape from the database.
//!
//! ```yaml
//! name: Engineering Checklist
//! department: Engineering
//! tasks:
//!   - title: Laptop Setup
//!     priority: 2
//!   - task_template_id: 7
//! ```

use super::Database;
use super::catalog::{get_task_template_internal, insert_task_template_internal};
use super::templates::insert_template_internal;
use crate::error::{EngineError, EngineResult};
use crate::types::{NewTaskTemplate, NewTemplate, Priority, TaskTemplateId, Template, TemplateId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A template as written in a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskDefinition>,
}

/// One task line of a definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_template_id: Option<TaskTemplateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Definition file encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// Pick the format from a file extension. Anything other than `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DefinitionFormat::Json,
            _ => DefinitionFormat::Yaml,
        }
    }
}

impl TemplateDefinition {
    /// Parse a definition from text.
    pub fn parse(content: &str, format: DefinitionFormat) -> EngineResult<Self> {
        match format {
            DefinitionFormat::Json => serde_json::from_str(content)
                .map_err(|e| EngineError::invalid_field("definition", e.to_string())),
            DefinitionFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| EngineError::invalid_field("definition", e.to_string())),
        }
    }

    /// Read and parse a definition file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::invalid_field("definition", format!("{}: {}", path.display(), e))
        })?;
        Self::parse(&content, DefinitionFormat::from_path(path))
    }

    /// Serialize to text.
    pub fn render(&self, format: DefinitionFormat) -> EngineResult<String> {
        match format {
            DefinitionFormat::Json => serde_json::to_string_pretty(self).map_err(EngineError::internal),
            DefinitionFormat::Yaml => serde_yaml::to_string(self).map_err(EngineError::internal),
        }
    }
}

impl Database {
    /// Create a template from a definition, adding inline tasks to the catalog.
    pub fn import_template_definition(&self, def: TemplateDefinition) -> EngineResult<Template> {
        if def.tasks.is_empty() {
            return Err(EngineError::EmptyTaskSet);
        }

        // Validate before touching the database
        let mut seen = HashSet::new();
        for (index, task) in def.tasks.iter().enumerate() {
            match task.task_template_id {
                Some(id) => {
                    if !seen.insert(id) {
                        return Err(EngineError::DuplicateReference {
                            task_template_id: id,
                        });
                    }
                }
                None => {
                    let has_title = task.title.as_deref().is_some_and(|t| !t.trim().is_empty());
                    if !has_title {
                        return Err(EngineError::invalid_field(
                            "title",
                            format!("task {} has neither a task_template_id nor a title", index + 1),
                        ));
                    }
                }
            }
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let mut task_ids = Vec::with_capacity(def.tasks.len());
            for task in def.tasks {
                let id = match task.task_template_id {
                    Some(id) => {
                        if get_task_template_internal(&tx, id)?.is_none() {
                            return Err(EngineError::TaskTemplateNotFound(id));
                        }
                        id
                    }
                    None => {
                        insert_task_template_internal(
                            &tx,
                            NewTaskTemplate {
                                title: task.title.unwrap_or_default(),
                                description: task.description,
                                category: task.category,
                                priority: task.priority,
                            },
                        )?
                        .id
                    }
                };
                task_ids.push(id);
            }

            let template = insert_template_internal(
                &tx,
                NewTemplate {
                    name: def.name,
                    description: def.description,
                    department: def.department,
                    category: def.category,
                },
                &task_ids,
            )?;
            tx.commit()?;

            tracing::info!(
                template_id = template.id,
                tasks = task_ids.len(),
                "imported template definition"
            );
            Ok(template)
        })
    }

    /// Build a definition for an existing template.
    pub fn export_template_definition(&self, id: TemplateId) -> EngineResult<TemplateDefinition> {
        let template = self.get_template(id)?.ok_or(EngineError::TemplateNotFound(id))?;
        let entries = self.get_template_entries(id)?;

        Ok(TemplateDefinition {
            name: template.name,
            description: template.description,
            department: template.department,
            category: template.category,
            tasks: entries
                .into_iter()
                .map(|entry| TaskDefinition {
                    task_template_id: Some(entry.task.id),
                    title: Some(entry.task.title),
                    description: entry.task.description,
                    category: entry.task.category,
                    priority: Some(entry.task.priority),
                })
                .collect(),
        })
    }
}
