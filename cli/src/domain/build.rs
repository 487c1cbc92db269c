//! Build signal interpretation. No I/O.
//!
//! Repositories surface their CI result differently (commit status entry,
//! check run, or a Jenkins job linked from a status entry). The strategy table
//! in the configuration picks the reader; everything here turns raw API
//! records into a [`BuildVerdict`].

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::config::CiMechanism;
use crate::domain::error::SpinwickError;

/// Multibranch job link: `.../job/<job>/job/<branch>/<build>/...`.
static JOB_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: compile-time constant pattern, cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"/job/([^/]+)/job/([^/]+)/(\d+)(?:/|$)").expect("valid regex")
});

/// One entry of a commit's combined status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatus {
    pub context: String,
    /// `pending`, `success`, `failure` or `error`.
    pub state: String,
    pub target_url: Option<String>,
}

/// One check run reported for a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRun {
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
    pub html_url: Option<String>,
}

/// Status, conclusion and link of the build for a head commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSignal {
    pub status: String,
    pub conclusion: String,
    pub link: Option<String>,
}

impl BuildSignal {
    fn in_progress(link: Option<String>) -> Self {
        Self {
            status: "in_progress".to_string(),
            conclusion: String::new(),
            link,
        }
    }

    fn completed(conclusion: &str, link: Option<String>) -> Self {
        Self {
            status: "completed".to_string(),
            conclusion: conclusion.to_string(),
            link,
        }
    }
}

/// What the waiter should do after reading a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildVerdict {
    InProgress,
    Succeeded,
    Failed { conclusion: String },
    Unknown(String),
}

impl BuildVerdict {
    /// Map a terminal verdict to its error. `None` while still in progress or
    /// on success.
    #[must_use]
    pub fn into_error(self) -> Option<SpinwickError> {
        match self {
            Self::InProgress | Self::Succeeded => None,
            Self::Failed { conclusion } => Some(SpinwickError::BuildFailed { conclusion }),
            Self::Unknown(status) => Some(SpinwickError::UnknownBuildStatus(status)),
        }
    }
}

/// Decide from a build signal.
///
/// Status strings nobody expects are failures, not retries, so an odd CI
/// state cannot keep a workflow polling forever.
#[must_use]
pub fn verdict(signal: &BuildSignal) -> BuildVerdict {
    match signal.status.as_str() {
        "in_progress" | "queued" => BuildVerdict::InProgress,
        "completed" if signal.conclusion == "success" => BuildVerdict::Succeeded,
        "completed" => BuildVerdict::Failed {
            conclusion: signal.conclusion.clone(),
        },
        other => BuildVerdict::Unknown(other.to_string()),
    }
}

/// Signal from the status entry whose context is `context`.
///
/// `None` while CI has not reported that context yet.
#[must_use]
pub fn signal_from_statuses(statuses: &[CommitStatus], context: &str) -> Option<BuildSignal> {
    let status = statuses.iter().find(|s| s.context == context)?;
    let link = status.target_url.clone().filter(|u| !u.is_empty());
    Some(match status.state.as_str() {
        "pending" => BuildSignal::in_progress(link),
        "success" => BuildSignal::completed("success", link),
        "failure" | "error" => BuildSignal::completed(&status.state, link),
        other => BuildSignal {
            status: other.to_string(),
            conclusion: String::new(),
            link,
        },
    })
}

/// Signal from the check run named `name`.
#[must_use]
pub fn signal_from_check_runs(runs: &[CheckRun], name: &str) -> Option<BuildSignal> {
    let run = runs.iter().find(|r| r.name == name)?;
    Some(BuildSignal {
        status: run.status.clone(),
        conclusion: run.conclusion.clone().unwrap_or_default(),
        link: run.html_url.clone().filter(|u| !u.is_empty()),
    })
}

/// Build link for the configured context under the repository's mechanism.
#[must_use]
pub fn build_link(
    mechanism: &CiMechanism,
    context: &str,
    statuses: &[CommitStatus],
    runs: &[CheckRun],
) -> Option<String> {
    match mechanism {
        CiMechanism::CheckRun => signal_from_check_runs(runs, context),
        CiMechanism::StatusApi | CiMechanism::Jenkins { .. } => {
            signal_from_statuses(statuses, context)
        }
    }
    .and_then(|s| s.link)
}

/// A Jenkins build addressed by its folder-qualified job path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JenkinsJob {
    /// e.g. `mp/job/mattermost-server/job/PR-1234`.
    pub path: String,
    pub build_number: u64,
}

/// Parse the multibranch job path and build number out of a build link.
///
/// # Errors
///
/// Returns [`SpinwickError::UnparseableBuildLink`] when the link does not
/// contain a `job/<job>/job/<branch>/<number>` sequence.
pub fn parse_job_link(link: &str, folder: &str) -> Result<JenkinsJob, SpinwickError> {
    let caps = JOB_LINK_RE
        .captures(link)
        .ok_or_else(|| SpinwickError::UnparseableBuildLink(link.to_string()))?;
    let build_number = caps[3]
        .parse()
        .map_err(|_| SpinwickError::UnparseableBuildLink(link.to_string()))?;
    Ok(JenkinsJob {
        path: format!("{folder}/job/{}/job/{}", &caps[1], &caps[2]),
        build_number,
    })
}

/// Result of one Jenkins build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JenkinsBuild {
    pub number: u64,
    pub building: bool,
    pub result: Option<String>,
}

/// Turn a Jenkins build into a signal.
#[must_use]
pub fn signal_from_jenkins(build: &JenkinsBuild, link: Option<String>) -> BuildSignal {
    match build.result.as_deref() {
        Some("SUCCESS") if !build.building => BuildSignal::completed("success", link),
        Some(result @ ("FAILURE" | "ABORTED")) => {
            BuildSignal::completed(&result.to_lowercase(), link)
        }
        _ => BuildSignal::in_progress(link),
    }
}
