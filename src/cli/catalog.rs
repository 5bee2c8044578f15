//! Catalog subcommands.

use crate::types::{NewTaskTemplate, Priority, TaskTemplateId};
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Add a reusable task template
    Add(CatalogAddArgs),

    /// List task templates
    List {
        /// Only entries in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Remove a task template that no template references
    Remove {
        /// Task template ID
        id: TaskTemplateId,
    },
}

#[derive(Args, Debug)]
pub struct CatalogAddArgs {
    /// Task title
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Priority 1 (normal) to 3 (urgent); out-of-range values are clamped
    #[arg(short, long)]
    pub priority: Option<Priority>,
}

impl From<CatalogAddArgs> for NewTaskTemplate {
    fn from(args: CatalogAddArgs) -> Self {
        NewTaskTemplate {
            title: args.title,
            description: args.description,
            category: args.category,
            priority: args.priority,
        }
    }
}
