//! Output formatting module

pub mod json;
pub mod styles;

use std::io::IsTerminal as _;

use owo_colors::OwoColorize as _;
pub use styles::Styles;

use crate::domain::WorkflowOutcome;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let styles = if !no_color && is_tty {
            Styles::colored()
        } else {
            Styles::default()
        };
        Self { styles, is_tty }
    }

    /// Print a success message prefixed with `✓`.
    pub fn success(&self, msg: &str) {
        println!("  {} {msg}", "✓".style(self.styles.success));
    }

    /// Print a warning message prefixed with `⚠`.
    pub fn warn(&self, msg: &str) {
        println!("  {} {msg}", "⚠".style(self.styles.warning));
    }

    /// Print an error message prefixed with `✗` to stderr.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`.
    pub fn info(&self, msg: &str) {
        println!("  {} {msg}", "ℹ".style(self.styles.info));
    }

    /// Print a section header.
    pub fn header(&self, msg: &str) {
        println!("  {}", msg.style(self.styles.header));
    }

    /// Print a key-value pair with the key dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {}  {value}", key.style(self.styles.dim));
    }

    /// Report how a workflow ended; failures and timeouts go to stderr.
    pub fn outcome(&self, outcome: &WorkflowOutcome) {
        let (marker, style) = self.styles.outcome(outcome);
        if outcome.is_failure() {
            eprintln!("  {} {outcome}", marker.style(style));
        } else {
            println!("  {} {outcome}", marker.style(style));
        }
    }
}
