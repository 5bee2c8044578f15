//! Output formatting utilities for markdown and JSON.

use crate::types::{
    BatchResult, NewHire, OnboardingTask, Progress, TaskDraft, TaskStatus, TaskTemplate, Template,
    TemplateEntry,
};
use serde::{Deserialize, Serialize};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

fn priority_marker(priority: i32) -> &'static str {
    match priority {
        3 => "!!! ",
        2 => "! ",
        _ => "",
    }
}

fn status_box(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Completed => "[x]",
    }
}

/// Format the catalog as markdown.
pub fn format_catalog_markdown(tasks: &[TaskTemplate]) -> String {
    let mut md = format!("# Task Templates ({})\n\n", tasks.len());
    for task in tasks {
        md.push_str(&format!(
            "- {}{} `#{}`",
            priority_marker(task.priority),
            task.title,
            task.id
        ));
        if let Some(ref category) = task.category {
            md.push_str(&format!(" _{}_", category));
        }
        md.push('\n');
    }
    md
}

/// Format a list of templates as markdown.
pub fn format_templates_markdown(templates: &[Template]) -> String {
    let mut md = format!("# Templates ({})\n\n", templates.len());
    for template in templates {
        md.push_str(&format!(
            "- {} `#{}` ({} task{})",
            template.name,
            template.id,
            template.item_count,
            if template.item_count == 1 { "" } else { "s" }
        ));
        if let Some(ref dept) = template.department {
            md.push_str(&format!(" - {}", dept));
        }
        md.push('\n');
    }
    md
}

/// Format a template with its ordered tasks.
pub fn format_template_markdown(template: &Template, entries: &[TemplateEntry]) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Template: {}\n", template.name));
    md.push_str(&format!("- **id**: `{}`\n", template.id));
    if let Some(ref dept) = template.department {
        md.push_str(&format!("- **department**: {}\n", dept));
    }
    if let Some(ref category) = template.category {
        md.push_str(&format!("- **category**: {}\n", category));
    }
    md.push_str(&format!("- **tasks**: {}\n", template.item_count));

    if let Some(ref desc) = template.description {
        md.push_str("\n### Description\n");
        md.push_str(desc);
        md.push('\n');
    }

    if !entries.is_empty() {
        md.push_str("\n### Tasks\n");
        for (index, entry) in entries.iter().enumerate() {
            md.push_str(&format!(
                "{}. {}{} `#{}`\n",
                index + 1,
                priority_marker(entry.task.priority),
                entry.task.title,
                entry.task.id
            ));
        }
    }

    md
}

/// Format customization drafts with their editable index.
pub fn format_drafts_markdown(drafts: &[TaskDraft]) -> String {
    let mut md = format!("# Drafts ({})\n\n", drafts.len());
    for (index, draft) in drafts.iter().enumerate() {
        let source = match draft.task_template_id {
            Some(id) => format!("`#{}`", id),
            None => "_new_".to_string(),
        };
        md.push_str(&format!(
            "{}: {}{} {}",
            index,
            priority_marker(draft.priority),
            draft.title,
            source
        ));
        if let Some(due) = draft.due_date {
            md.push_str(&format!(" due {}", due));
        }
        if let Some(ref who) = draft.assigned_to {
            md.push_str(&format!(" @{}", who));
        }
        md.push('\n');
    }
    md
}

/// Format a list of new hires as markdown.
pub fn format_new_hires_markdown(hires: &[NewHire]) -> String {
    let mut md = format!("# New Hires ({})\n\n", hires.len());
    for hire in hires {
        md.push_str(&format!(
            "- `#{}` candidate {} / job {} - {} ({}%)",
            hire.id, hire.candidate_id, hire.job_id, hire.status, hire.progress
        ));
        if let Some(ref dept) = hire.department {
            md.push_str(&format!(" - {}", dept));
        }
        if let Some(start) = hire.start_date {
            md.push_str(&format!(" starts {}", start));
        }
        md.push('\n');
    }
    md
}

/// Format a new hire with their task checklist.
pub fn format_new_hire_markdown(hire: &NewHire, tasks: &[OnboardingTask]) -> String {
    let mut md = String::new();

    md.push_str(&format!("## New Hire `#{}`\n", hire.id));
    md.push_str(&format!("- **candidate**: {}\n", hire.candidate_id));
    md.push_str(&format!("- **job**: {}\n", hire.job_id));
    md.push_str(&format!("- **status**: {}\n", hire.status));
    md.push_str(&format!("- **progress**: {}%\n", hire.progress));
    if let Some(ref dept) = hire.department {
        md.push_str(&format!("- **department**: {}\n", dept));
    }
    if let Some(start) = hire.start_date {
        md.push_str(&format!("- **start date**: {}\n", start));
    }
    if let Some(ref location) = hire.work_location {
        md.push_str(&format!("- **location**: {}\n", location));
    }

    md.push_str(&format!("\n### Tasks ({})\n", tasks.len()));
    for task in tasks {
        md.push_str(&format_task_short(task));
    }

    md
}

/// Format a task in short form for lists.
fn format_task_short(task: &OnboardingTask) -> String {
    let due = task
        .due_date
        .map(|d| format!(" due {}", d))
        .unwrap_or_default();
    let assignee = task
        .assigned_to
        .as_ref()
        .map(|a| format!(" @{}", a))
        .unwrap_or_default();

    format!(
        "- {} {}{} `#{}`{}{}\n",
        status_box(task.status),
        priority_marker(task.priority),
        task.title,
        task.id,
        assignee,
        due,
    )
}

/// Format recalculated progress.
pub fn format_progress_markdown(progress: &Progress) -> String {
    format!(
        "{}% ({}/{} tasks completed) - {}\n",
        progress.progress, progress.completed, progress.total, progress.status
    )
}

/// Format a bulk application outcome.
pub fn format_batch_markdown(result: &BatchResult) -> String {
    let mut md = format!("{}\n", result);
    for failure in &result.failures {
        md.push_str(&format!("- new hire `#{}`: {}\n", failure.new_hire_id, failure.message));
    }
    md
}

/// Render any serializable value as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}
