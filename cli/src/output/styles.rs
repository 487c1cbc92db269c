//! Terminal palette for workflow reports.
//!
//! `Styles::default()` is the plain palette used for pipes and `--no-color`;
//! every style is a no-op there.

use owo_colors::Style;

use crate::domain::WorkflowOutcome;

#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    /// Keys of `status` listings.
    pub dim: Style,
    /// The `owner/repo#number` heading.
    pub header: Style,
    /// Deadline expiries, kept apart from remote failures.
    pub timed_out: Style,
}

impl Styles {
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            info: Style::new().blue(),
            dim: Style::new().dimmed(),
            header: Style::new().bold().cyan(),
            timed_out: Style::new().magenta(),
        }
    }

    /// Marker and style for the final line of a workflow run.
    #[must_use]
    pub fn outcome(&self, outcome: &WorkflowOutcome) -> (&'static str, Style) {
        match outcome {
            WorkflowOutcome::CompletedSuccess { .. } => ("✓", self.success),
            WorkflowOutcome::Skipped { .. } => ("ℹ", self.info),
            WorkflowOutcome::CompletedFailure { .. } => ("✗", self.error),
            WorkflowOutcome::TimedOut { .. } => ("⏱", self.timed_out),
        }
    }
}
