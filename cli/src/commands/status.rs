//! `spinwick status` shows the persisted installation record.

use std::process::ExitCode;

use anyhow::Result;
use chrono::{TimeDelta, Utc};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::InstallationRecordStore;
use crate::infra::store::JsonFileStore;
use crate::output::json;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Pull request number
    #[arg(long)]
    pub number: u64,
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &AppContext, args: StatusArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let store = JsonFileStore::from_config(&config)?;

    let Some(record) = store.get_record(args.number).await? else {
        let message = format!("no environment recorded for pull request #{}", args.number);
        if args.json {
            println!("{}", json::format_error(&message, "NOT_FOUND")?);
        } else {
            app.output.info(&message);
        }
        return Ok(ExitCode::FAILURE);
    };

    if args.json {
        println!("{}", json::format_value(&record)?);
        return Ok(ExitCode::SUCCESS);
    }

    app.output.header(&format!(
        "{}/{}#{}",
        record.repo_owner, record.repo_name, record.number
    ));
    app.output.kv("installation", &record.installation_id);
    app.output.kv("created     ", &record.created_at.to_rfc3339());
    app.output
        .kv("age         ", &format_age(Utc::now() - record.created_at));
    Ok(ExitCode::SUCCESS)
}

/// Coarse human age: largest whole unit only.
fn format_age(age: TimeDelta) -> String {
    let minutes = age.num_minutes().max(0);
    match (age.num_days(), age.num_hours()) {
        (d, _) if d > 0 => format!("{d}d"),
        (_, h) if h > 0 => format!("{h}h"),
        _ => format!("{minutes}m"),
    }
}
