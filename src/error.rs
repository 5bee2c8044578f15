//! Structured error types for engine operations.

use crate::types::{NewHireId, TaskId, TaskTemplateId, TemplateId};
use serde::{Deserialize, Serialize};

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    InvalidFieldValue,
    EmptyTaskSet,
    DuplicateReference,

    // Not found errors
    TemplateNotFound,
    TaskTemplateNotFound,
    NewHireNotFound,
    TaskNotFound,

    // Conflict errors
    AlreadyExists,
    InUse,
    NoRecipients,
    RecipientApplicationFailed,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Errors raised by the catalog, the customization resolver and the
/// application engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Task template {task_template_id} is already part of this task set")]
    DuplicateReference { task_template_id: TaskTemplateId },

    #[error("Applying tasks to new hire {new_hire_id} failed: {reason}")]
    RecipientApplication {
        new_hire_id: NewHireId,
        reason: String,
    },

    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    #[error("Task template not found: {0}")]
    TaskTemplateNotFound(TaskTemplateId),

    #[error("New hire not found: {0}")]
    NewHireNotFound(NewHireId),

    #[error("Onboarding task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Cannot commit an empty task set")]
    EmptyTaskSet,

    #[error("No new hires matched {0}")]
    NoRecipients(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Still in use: {0}")]
    InUse(String),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::DuplicateReference { .. } => ErrorCode::DuplicateReference,
            EngineError::RecipientApplication { .. } => ErrorCode::RecipientApplicationFailed,
            EngineError::TemplateNotFound(_) => ErrorCode::TemplateNotFound,
            EngineError::TaskTemplateNotFound(_) => ErrorCode::TaskTemplateNotFound,
            EngineError::NewHireNotFound(_) => ErrorCode::NewHireNotFound,
            EngineError::TaskNotFound(_) => ErrorCode::TaskNotFound,
            EngineError::EmptyTaskSet => ErrorCode::EmptyTaskSet,
            EngineError::NoRecipients(_) => ErrorCode::NoRecipients,
            EngineError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            EngineError::InUse(_) => ErrorCode::InUse,
            EngineError::InvalidField { .. } => ErrorCode::InvalidFieldValue,
            EngineError::Database(_) => ErrorCode::DatabaseError,
            EngineError::Migration(_) | EngineError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// True for errors caused by an unknown identifier.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::TemplateNotFound
                | ErrorCode::TaskTemplateNotFound
                | ErrorCode::NewHireNotFound
                | ErrorCode::TaskNotFound
        )
    }
}

/// Serializable form of an error, for JSON output.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&EngineError> for ErrorBody {
    fn from(err: &EngineError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
