//! CLI command definitions for the onboarding engine.
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod apply;
pub mod catalog;
pub mod hire;
pub mod template;

use crate::format::OutputFormat;
use crate::types::{NewHireId, TaskId, TaskStatus, TemplateId};
use apply::ApplyArgs;
use catalog::CatalogCommand;
use clap::{Parser, Subcommand};
use hire::HireCommand;
use template::TemplateCommand;

/// Onboarding template engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format (overrides config)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the task template catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Manage onboarding templates
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Manage new hires
    #[command(subcommand)]
    Hire(HireCommand),

    /// Show a template's tasks as editable drafts
    Drafts {
        /// Template ID
        template: TemplateId,
    },

    /// Apply a template to one new hire, a department, or everyone
    Apply(ApplyArgs),

    /// Update onboarding tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Recalculate a new hire's progress from their tasks
    Recalc {
        /// New hire ID
        hire: NewHireId,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Set a task's status and recalculate its owner's progress
    Status {
        /// Task ID
        task: TaskId,

        /// New status: pending, in-progress, completed
        status: TaskStatus,

        /// Who completed the task
        #[arg(long)]
        by: Option<String>,
    },
}
