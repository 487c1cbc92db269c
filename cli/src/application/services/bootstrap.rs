//! Environment bootstrapper: waits for a fresh installation to answer, then
//! seeds accounts, a team and the review configuration profile.
//!
//! Admin creation and login are fatal; every later step is best effort and
//! only recorded in the [`BootstrapReport`].

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::application::ports::{AppConnector, AppTeam, AppUser, ReachabilityProbe, TargetApp};
use crate::application::services::poll::with_deadline;
use crate::domain::bootstrap::{
    ADMIN_ACCOUNT, BootstrapReport, BootstrapStep, EmailRelay, TEST_ACCOUNT, apply_profile,
    team_name,
};
use crate::domain::config::Timing;

const HTTPS_PORT: u16 = 443;

/// Bootstrap the environment served at `dns`.
///
/// # Errors
///
/// Fails with `Timeout` when the DNS name never accepts connections or the
/// application never answers ping. Step failures are reported, not returned.
pub async fn bootstrap_environment<B>(
    backend: &B,
    timing: &Timing,
    relay: &EmailRelay,
    dns: &str,
    pr_number: u64,
) -> Result<BootstrapReport>
where
    B: ReachabilityProbe + AppConnector,
{
    wait_for_dns(backend, timing, dns).await?;

    let mut app = backend
        .connect(&format!("https://{dns}"))
        .context("opening application session")?;
    wait_for_ping(&app, timing).await?;
    info!(%dns, "application is up, seeding");

    let report = seed(&mut app, relay, pr_number).await;
    if let Some((step, error)) = report.fatal_failure() {
        warn!(%dns, %step, %error, "bootstrap aborted");
    } else if report.is_complete() {
        info!(%dns, "bootstrap complete");
    } else {
        warn!(%dns, "bootstrap finished with recoverable failures");
    }
    Ok(report)
}

async fn wait_for_dns(backend: &impl ReachabilityProbe, timing: &Timing, dns: &str) -> Result<()> {
    let stage = timing.reachability;
    with_deadline("the environment DNS to resolve", stage, async {
        loop {
            match backend.check_tcp_connectivity(dns, HTTPS_PORT).await {
                Ok(true) => return Ok(()),
                Ok(false) => debug!(%dns, "not reachable yet"),
                Err(e) => debug!(%dns, error = %format!("{e:#}"), "reachability check failed"),
            }
            sleep(stage.interval()).await;
        }
    })
    .await
}

async fn wait_for_ping(app: &impl TargetApp, timing: &Timing) -> Result<()> {
    let stage = timing.ping;
    with_deadline("the application to start", stage, async {
        loop {
            match app.ping().await {
                Ok(true) => return Ok(()),
                Ok(false) => debug!("ping not ok yet"),
                Err(e) => debug!(error = %format!("{e:#}"), "ping failed"),
            }
            sleep(stage.interval()).await;
        }
    })
    .await
}

async fn seed(app: &mut impl TargetApp, relay: &EmailRelay, pr_number: u64) -> BootstrapReport {
    let mut report = BootstrapReport::default();

    match app.create_user(&ADMIN_ACCOUNT).await {
        Ok(_) => report.succeeded(BootstrapStep::CreateAdmin),
        Err(e) => {
            report.failed(BootstrapStep::CreateAdmin, format!("{e:#}"));
            return report;
        }
    }
    let admin = match app
        .login(ADMIN_ACCOUNT.username, ADMIN_ACCOUNT.password)
        .await
    {
        Ok(user) => {
            report.succeeded(BootstrapStep::Login);
            user
        }
        Err(e) => {
            report.failed(BootstrapStep::Login, format!("{e:#}"));
            return report;
        }
    };

    let name = team_name(pr_number);
    let team = step(&mut report, BootstrapStep::CreateTeam, app.create_team(&name, &name).await);
    add_member(
        &*app,
        &mut report,
        BootstrapStep::AddAdminToTeam,
        team.as_ref(),
        Some(&admin),
    )
    .await;

    let tester = step(
        &mut report,
        BootstrapStep::CreateTestUser,
        app.create_user(&TEST_ACCOUNT).await,
    );
    add_member(
        &*app,
        &mut report,
        BootstrapStep::AddTestUserToTeam,
        team.as_ref(),
        tester.as_ref(),
    )
    .await;

    match step(&mut report, BootstrapStep::ReadConfig, app.get_config().await) {
        Some(mut config) => {
            apply_profile(&mut config, relay);
            step(&mut report, BootstrapStep::UpdateConfig, app.update_config(&config).await);
        }
        None => report.skipped(BootstrapStep::UpdateConfig),
    }

    report
}

/// Record the outcome of a recoverable step.
fn step<T>(report: &mut BootstrapReport, step: BootstrapStep, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => {
            report.succeeded(step);
            Some(value)
        }
        Err(e) => {
            warn!(%step, error = %format!("{e:#}"), "bootstrap step failed");
            report.failed(step, format!("{e:#}"));
            None
        }
    }
}

async fn add_member(
    app: &impl TargetApp,
    report: &mut BootstrapReport,
    which: BootstrapStep,
    team: Option<&AppTeam>,
    user: Option<&AppUser>,
) {
    let (Some(team), Some(user)) = (team, user) else {
        report.skipped(which);
        return;
    };
    let result = app.add_team_member(&team.id, &user.id).await;
    step(report, which, result);
}
