//! `spinwick destroy` tears an environment down.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use super::{PrArgs, exit_code, load_tracked};
use crate::app::AppContext;
use crate::application::ports::InstallationRecordStore;

#[derive(Args, Debug)]
pub struct DestroyArgs {
    #[command(flatten)]
    pub pr: PrArgs,
    /// Installation to delete; defaults to the recorded one
    #[arg(long)]
    pub installation_id: Option<String>,
}

pub async fn run(app: &AppContext, args: DestroyArgs) -> Result<ExitCode> {
    let controller = app.controller()?;
    let pr = load_tracked(controller.backend(), &args.pr).await?;

    let installation_id = match args.installation_id {
        Some(id) => id,
        None => match controller.backend().get_record(pr.number).await? {
            Some(record) => record.installation_id,
            None => {
                app.output
                    .info(&format!("{} has no environment", pr.display_name()));
                return Ok(ExitCode::SUCCESS);
            }
        },
    };

    let outcome = controller.handle_destroy(&pr, &installation_id).await;
    app.output.outcome(&outcome);
    Ok(exit_code(&outcome))
}
