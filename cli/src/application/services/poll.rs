//! Deadline-bounded polling.
//!
//! Every stage runs its own check-then-wait (or wait-then-check) loop inside
//! [`with_deadline`]. The deadline also covers a probe still in flight when
//! it elapses, and dropping the returned future cancels the loop.

use std::future::Future;

use anyhow::Result;

use crate::domain::{ErrorKind, SpinwickError, StageTiming, classify};

/// Run `work` under the stage deadline from `timing`.
///
/// # Errors
///
/// Returns whatever `work` fails with, or [`SpinwickError::Timeout`] naming
/// `stage` when the deadline elapses first.
pub async fn with_deadline<T>(
    stage: &'static str,
    timing: StageTiming,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timing.timeout(), work).await {
        Ok(result) => result,
        Err(_) => Err(SpinwickError::Timeout {
            stage,
            waited: timing.timeout(),
        }
        .into()),
    }
}

/// Whether a failed probe should be retried on the next tick.
#[must_use]
pub fn is_retryable(err: &anyhow::Error) -> bool {
    classify(err) == ErrorKind::Transient
}
