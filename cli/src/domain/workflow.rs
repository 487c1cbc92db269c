//! Terminal outcomes of a pull request workflow.

use std::fmt;

use serde::Serialize;

/// How a create/update/destroy run ended.
///
/// A failed or timed-out run is never retried automatically; the next
/// trigger event starts a fresh attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum WorkflowOutcome {
    CompletedSuccess { installation_id: String },
    CompletedFailure { reason: String },
    TimedOut { stage: String },
    /// Documented no-op, e.g. no environment label on the pull request.
    Skipped { reason: String },
}

impl WorkflowOutcome {
    /// Whether the caller should report the run as failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::CompletedFailure { .. } | Self::TimedOut { .. })
    }
}

impl fmt::Display for WorkflowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompletedSuccess { installation_id } => {
                write!(f, "completed (installation {installation_id})")
            }
            Self::CompletedFailure { reason } => write!(f, "failed: {reason}"),
            Self::TimedOut { stage } => write!(f, "timed out waiting for {stage}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}
