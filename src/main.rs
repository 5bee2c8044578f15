//! Onboarding template engine CLI
//!
//! Manages the task catalog, templates and new hires, and applies templates to
//! new hires as onboarding checklists.

use anyhow::{Context, Result};
use clap::Parser;
use onboarding_engine::cli::apply::ApplyArgs;
use onboarding_engine::cli::catalog::CatalogCommand;
use onboarding_engine::cli::hire::HireCommand;
use onboarding_engine::cli::template::{TemplateCommand, TemplateExportArgs};
use onboarding_engine::cli::{Cli, Command, TaskCommand};
use onboarding_engine::config::{Config, ConfigLoader};
use onboarding_engine::db::Database;
use onboarding_engine::db::import::{DefinitionFormat, TemplateDefinition};
use onboarding_engine::engine::{ApplyRequest, OnboardingEngine};
use onboarding_engine::error::{EngineError, ErrorBody};
use onboarding_engine::format::{self, OutputFormat};
use onboarding_engine::logging::{self, LogTarget};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

type Engine = OnboardingEngine<Database>;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&LogTarget::parse(&cli.log), cli.verbose) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    let mut output = cli.format.unwrap_or_default();
    let result = load_config(&cli).and_then(|config| {
        output = cli.format.unwrap_or(config.server.default_format);
        run(cli.command, config, output)
    });

    if let Err(err) = result {
        match (output, err.downcast_ref::<EngineError>()) {
            (OutputFormat::Json, Some(engine_err)) => {
                println!("{}", format::to_json(&ErrorBody::from(engine_err)));
            }
            _ => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let loader = match cli.config {
        Some(ref path) => ConfigLoader::load_explicit(PathBuf::from(path))?,
        None => ConfigLoader::load()?,
    };
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "using config file");
    }

    let mut config = loader.into_config();
    if let Some(ref db_path) = cli.database {
        config.server.db_path = PathBuf::from(db_path);
    }
    Ok(config)
}

fn run(command: Command, config: Config, output: OutputFormat) -> Result<()> {
    config.ensure_db_dir()?;
    let db = Database::open(&config.server.db_path).with_context(|| {
        format!("failed to open database {}", config.server.db_path.display())
    })?;
    info!(db = %config.server.db_path.display(), "database ready");

    let engine = OnboardingEngine::new(db, config.onboarding);

    match command {
        Command::Catalog(cmd) => run_catalog(engine.store(), cmd, output),
        Command::Template(cmd) => run_template(engine.store(), cmd, output),
        Command::Hire(cmd) => run_hire(engine.store(), cmd, output),
        Command::Drafts { template } => {
            let customization = engine.resolve_and_customize(template)?;
            emit(output, customization.drafts(), || {
                format::format_drafts_markdown(customization.drafts())
            });
            Ok(())
        }
        Command::Apply(args) => run_apply(&engine, args, output),
        Command::Task(TaskCommand::Status { task, status, by }) => {
            let (task, progress) = engine.set_task_status(task, status, by.as_deref())?;
            emit(output, &json!({ "task": task, "progress": progress }), || {
                format!(
                    "Task `#{}` is {}\n{}",
                    task.id,
                    task.status,
                    format::format_progress_markdown(&progress)
                )
            });
            Ok(())
        }
        Command::Recalc { hire } => {
            let progress = engine.recalculate_new_hire(hire)?;
            emit(output, &progress, || format::format_progress_markdown(&progress));
            Ok(())
        }
    }
}

/// Print a result in the requested format.
fn emit<T: Serialize + ?Sized>(output: OutputFormat, value: &T, markdown: impl FnOnce() -> String) {
    match output {
        OutputFormat::Json => println!("{}", format::to_json(value)),
        OutputFormat::Markdown => print!("{}", markdown()),
    }
}

fn run_catalog(db: &Database, cmd: CatalogCommand, output: OutputFormat) -> Result<()> {
    match cmd {
        CatalogCommand::Add(args) => {
            let task = db.create_task_template(args.into())?;
            emit(output, &task, || format::format_catalog_markdown(std::slice::from_ref(&task)));
        }
        CatalogCommand::List { category } => {
            let tasks = db.list_task_templates(category.as_deref())?;
            emit(output, &tasks, || format::format_catalog_markdown(&tasks));
        }
        CatalogCommand::Remove { id } => {
            db.delete_task_template(id)?;
            emit(output, &json!({ "deleted": id }), || {
                format!("Removed task template `#{}`\n", id)
            });
        }
    }
    Ok(())
}

fn run_template(db: &Database, cmd: TemplateCommand, output: OutputFormat) -> Result<()> {
    match cmd {
        TemplateCommand::Create(args) => {
            let (input, tasks) = args.into_parts();
            let template = db.create_template(input, &tasks)?;
            let entries = db.get_template_entries(template.id)?;
            emit(output, &template, || format::format_template_markdown(&template, &entries));
        }
        TemplateCommand::Import { file } => {
            let definition = TemplateDefinition::load(&file)?;
            let template = db.import_template_definition(definition)?;
            let entries = db.get_template_entries(template.id)?;
            emit(output, &template, || format::format_template_markdown(&template, &entries));
        }
        TemplateCommand::Export(args) => run_template_export(db, args)?,
        TemplateCommand::List {
            department,
            category,
        } => {
            let templates = db.list_templates(department.as_deref(), category.as_deref())?;
            emit(output, &templates, || format::format_templates_markdown(&templates));
        }
        TemplateCommand::Show { id } => {
            let template = db
                .get_template(id)?
                .ok_or(EngineError::TemplateNotFound(id))?;
            let entries = db.get_template_entries(id)?;
            emit(output, &json!({ "template": template, "entries": entries }), || {
                format::format_template_markdown(&template, &entries)
            });
        }
        TemplateCommand::AddTask {
            template,
            task_template,
        } => {
            let map = db.add_task_to_template(template, task_template)?;
            emit(output, &map, || {
                format!(
                    "Added `#{}` to template `#{}` at position {}\n",
                    map.task_template_id, map.template_id, map.sequence
                )
            });
        }
        TemplateCommand::RemoveTask {
            template,
            task_template,
        } => {
            let removed = db.remove_task_from_template(template, task_template)?;
            emit(output, &json!({ "removed": removed }), || {
                if removed {
                    format!("Removed `#{}` from template `#{}`\n", task_template, template)
                } else {
                    format!("Template `#{}` does not reference `#{}`\n", template, task_template)
                }
            });
        }
        TemplateCommand::Delete { id } => {
            db.delete_template(id)?;
            emit(output, &json!({ "deleted": id }), || {
                format!("Deleted template `#{}`\n", id)
            });
        }
    }
    Ok(())
}

fn run_template_export(db: &Database, args: TemplateExportArgs) -> Result<()> {
    let definition = db.export_template_definition(args.id)?;

    match args.output {
        Some(path) => {
            let rendered = definition.render(DefinitionFormat::from_path(&path))?;
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Exported template '{}' ({} tasks) to {}",
                definition.name,
                definition.tasks.len(),
                path.display()
            );
        }
        None => {
            let encoding = if args.json {
                DefinitionFormat::Json
            } else {
                DefinitionFormat::Yaml
            };
            print!("{}", definition.render(encoding)?);
        }
    }
    Ok(())
}

fn run_hire(db: &Database, cmd: HireCommand, output: OutputFormat) -> Result<()> {
    match cmd {
        HireCommand::Add(args) => {
            let hire = db.create_new_hire(args.into())?;
            emit(output, &hire, || format::format_new_hire_markdown(&hire, &[]));
        }
        HireCommand::List { department } => {
            let hires = db.list_new_hires(department.as_deref())?;
            emit(output, &hires, || format::format_new_hires_markdown(&hires));
        }
        HireCommand::Show { id } => {
            let hire = db.get_new_hire(id)?.ok_or(EngineError::NewHireNotFound(id))?;
            let tasks = db.list_tasks_for_new_hire(id)?;
            emit(output, &json!({ "new_hire": hire, "tasks": tasks }), || {
                format::format_new_hire_markdown(&hire, &tasks)
            });
        }
    }
    Ok(())
}

fn run_apply(engine: &Engine, args: ApplyArgs, output: OutputFormat) -> Result<()> {
    let mut request = ApplyRequest::new(args.template, args.audience());
    if let Some(due) = args.due_date {
        request = request.with_due_date(due);
    }

    if args.has_edits() {
        let mut customization = engine.resolve_and_customize(args.template)?;
        args.customize(&mut customization, engine.store())?;
        request = request.with_tasks(customization.into_drafts());
    }

    let result = engine.apply_template(request)?;
    emit(output, &result, || format::format_batch_markdown(&result));
    Ok(())
}
