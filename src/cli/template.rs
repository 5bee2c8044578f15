//! Template subcommands.

use crate::types::{NewTemplate, TaskTemplateId, TemplateId};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Create a template from existing catalog entries
    Create(TemplateCreateArgs),

    /// Import a template definition file (YAML, or JSON by extension)
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Export a template as a definition file
    Export(TemplateExportArgs),

    /// List templates
    List {
        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Show a template and its ordered tasks
    Show {
        id: TemplateId,
    },

    /// Append a catalog entry to a template
    AddTask {
        template: TemplateId,
        task_template: TaskTemplateId,
    },

    /// Remove a catalog entry from a template
    RemoveTask {
        template: TemplateId,
        task_template: TaskTemplateId,
    },

    /// Delete a template
    Delete {
        id: TemplateId,
    },
}

#[derive(Args, Debug)]
pub struct TemplateCreateArgs {
    /// Template name
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Catalog entries in order, comma separated or repeated
    #[arg(short, long = "task", value_delimiter = ',')]
    pub tasks: Vec<TaskTemplateId>,
}

impl TemplateCreateArgs {
    /// Split into the template fields and the ordered catalog references.
    pub fn into_parts(self) -> (NewTemplate, Vec<TaskTemplateId>) {
        (
            NewTemplate {
                name: self.name,
                description: self.description,
                department: self.department,
                category: self.category,
            },
            self.tasks,
        )
    }
}

#[derive(Args, Debug)]
pub struct TemplateExportArgs {
    /// Template ID
    pub id: TemplateId,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write JSON instead of YAML when printing to stdout
    #[arg(long)]
    pub json: bool,
}
