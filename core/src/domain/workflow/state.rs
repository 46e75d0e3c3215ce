use thiserror::Error;

use crate::domain::{
    common::entities::app_errors::CoreError, menu::entities::MenuId,
    safety::entities::SafetyAnswer,
};

/// Where the upload → parse → ask sequence currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Empty,
    FileSelected,
    Uploaded(MenuId),
    Parsed(MenuId),
    Answered(SafetyAnswer),
    /// Upload or parse failed; the message is also the status line.
    Error(String),
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Empty => "empty",
            WorkflowState::FileSelected => "file-selected",
            WorkflowState::Uploaded(_) => "uploaded",
            WorkflowState::Parsed(_) => "parsed",
            WorkflowState::Answered(_) => "answered",
            WorkflowState::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Inline status shown under the upload and parse steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Why a step did not run, or why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Select a file first")]
    NoFileSelected,

    #[error("Upload a menu first")]
    NoMenuUploaded,

    #[error("Parse the menu first")]
    MenuNotParsed,

    #[error("Ask a question first")]
    EmptyQuestion,

    #[error("Please select at least one allergy to get safety analysis")]
    NoAllergiesSelected,

    #[error(transparent)]
    Backend(#[from] CoreError),
}

impl WorkflowError {
    /// Gate errors mean the step was a no-op; nothing was sent.
    pub fn is_gate(&self) -> bool {
        !matches!(self, WorkflowError::Backend(_))
    }
}
