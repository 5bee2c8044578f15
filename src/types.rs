//! Core types for the onboarding engine.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TaskTemplateId = i64;
pub type TemplateId = i64;
pub type NewHireId = i64;
pub type TaskId = i64;

/// Task priority. Valid range is 1..=3.
pub type Priority = i32;

pub const PRIORITY_MIN: Priority = 1;
pub const PRIORITY_MAX: Priority = 3;
pub const PRIORITY_DEFAULT: Priority = 1;

/// Clamp a priority into the valid range.
pub fn clamp_priority(p: Priority) -> Priority {
    p.clamp(PRIORITY_MIN, PRIORITY_MAX)
}

/// A reusable task definition from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: TaskTemplateId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Priority,
    pub created_at: i64,
}

/// Input for creating a catalog entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTaskTemplate {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
}

/// An onboarding checklist definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub item_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
}

/// Join row between a template and one of its task templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTaskMap {
    pub template_id: TemplateId,
    pub task_template_id: TaskTemplateId,
    pub sequence: i64,
}

/// A map together with the task template it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub map: TemplateTaskMap,
    pub task: TaskTemplate,
}

/// Editable, pre-commit task. `task_template_id` is `None` for ad-hoc drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub priority: Priority,
    pub category: Option<String>,
    pub task_template_id: Option<TaskTemplateId>,
}

impl TaskDraft {
    /// An empty ad-hoc draft.
    pub fn blank(priority: Priority) -> Self {
        Self {
            title: String::new(),
            description: None,
            due_date: None,
            assigned_to: None,
            priority: clamp_priority(priority),
            category: None,
            task_template_id: None,
        }
    }

    /// A draft pre-filled from a catalog entry.
    pub fn from_task_template(task: &TaskTemplate) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: None,
            assigned_to: None,
            priority: clamp_priority(task.priority),
            category: task.category.clone(),
            task_template_id: Some(task.id),
        }
    }

    pub fn is_ad_hoc(&self) -> bool {
        self.task_template_id.is_none()
    }
}

/// A committed draft, always backed by a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTask {
    pub task_template_id: TaskTemplateId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub priority: Priority,
    pub category: Option<String>,
}

/// Derived onboarding status of a new hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NewHireStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Status of a single onboarding task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Error returned when a status string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl NewHireStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewHireStatus::NotStarted => "not-started",
            NewHireStatus::InProgress => "in-progress",
            NewHireStatus::Completed => "completed",
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl FromStr for NewHireStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "not-started" => Ok(NewHireStatus::NotStarted),
            "in-progress" => Ok(NewHireStatus::InProgress),
            "completed" => Ok(NewHireStatus::Completed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for NewHireStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Statuses are stored as their kebab-case text form.

impl ToSql for NewHireStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for NewHireStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A candidate undergoing onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHire {
    pub id: NewHireId,
    pub candidate_id: i64,
    pub job_id: i64,
    pub company_id: Option<i64>,
    pub status: NewHireStatus,
    pub progress: u8,
    pub manager_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub department: Option<String>,
    pub work_location: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for registering a new hire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewHireInput {
    pub candidate_id: i64,
    pub job_id: i64,
    pub company_id: Option<i64>,
    pub manager_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub department: Option<String>,
    pub work_location: Option<String>,
}

/// A task instance owned by a new hire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingTask {
    pub id: TaskId,
    pub new_hire_id: NewHireId,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub category: Option<String>,
    pub task_template_id: Option<TaskTemplateId>,
    pub completed_date: Option<i64>,
    pub completed_by: Option<String>,
    pub created_at: i64,
}

/// Row to insert when applying a resolved task to one new hire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOnboardingTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub category: Option<String>,
    pub task_template_id: Option<TaskTemplateId>,
}

/// Derived progress of a new hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub progress: u8,
    pub status: NewHireStatus,
    pub completed: usize,
    pub total: usize,
}

/// Who a template is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    NewHire(NewHireId),
    Department(String),
    All,
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Audience::NewHire(id) => write!(f, "new hire {}", id),
            Audience::Department(dept) => write!(f, "department '{}'", dept),
            Audience::All => write!(f, "all new hires"),
        }
    }
}

/// One recipient that could not be onboarded in a bulk application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFailure {
    pub new_hire_id: NewHireId,
    pub code: crate::error::ErrorCode,
    pub message: String,
}

/// Outcome of a bulk application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success_count: usize,
    pub fail_count: usize,
    pub tasks_created: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failures: Vec<RecipientFailure>,
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Success: {}, Failed: {}", self.success_count, self.fail_count)
    }
}
