//! `spinwick create` runs the create workflow to completion.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use super::{PrArgs, exit_code, load_tracked};
use crate::app::AppContext;

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub pr: PrArgs,
    /// Request the high-availability size
    #[arg(long)]
    pub ha: bool,
}

pub async fn run(app: &AppContext, args: CreateArgs) -> Result<ExitCode> {
    let controller = app.controller()?;
    let mut pr = load_tracked(controller.backend(), &args.pr).await?;

    let ha_label = &controller.config().labels.setup_ha;
    if args.ha && !pr.has_label(ha_label) {
        pr.labels.push(ha_label.clone());
    }

    let outcome = controller.handle_create(&pr).await;
    app.output.outcome(&outcome);
    Ok(exit_code(&outcome))
}
