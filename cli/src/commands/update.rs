//! `spinwick update` upgrades an environment to the tracked head commit.

use std::process::ExitCode;

use anyhow::Result;

use super::{PrArgs, exit_code, load_tracked};
use crate::app::AppContext;

pub async fn run(app: &AppContext, args: PrArgs) -> Result<ExitCode> {
    let controller = app.controller()?;
    let pr = load_tracked(controller.backend(), &args).await?;
    let outcome = controller.handle_update(&pr).await;
    app.output.outcome(&outcome);
    Ok(exit_code(&outcome))
}
