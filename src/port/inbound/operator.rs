//! Operator port: the primitive UI operations the orchestrator relies on.

use std::path::PathBuf;

use crate::domain::MachineStatus;
use crate::error::Result;

/// Severity of a message shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message pushed to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Operator surface consumed by the application layer.
///
/// Every prompt returns `Ok(None)` when the operator cancels; the caller
/// treats that as a silent, non-error end of the flow.
///
/// # Errors
///
/// Prompt methods return an error only when the surface itself fails
/// (closed terminal, broken pipe).
pub trait Operator {
    /// Pick one of `items`; returns its index.
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>>;

    /// Free-text input with an optional pre-filled default.
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Pick a file with the given extension.
    fn pick_file(&self, prompt: &str, extension: &str) -> Result<Option<PathBuf>>;

    /// Push a message to the operator.
    fn notify(&self, notice: Notice);

    /// Refresh the persistent status display.
    fn show_status(&self, status: MachineStatus);

    fn info(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Info, message));
    }

    fn warn(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Warning, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Error, message));
    }
}
