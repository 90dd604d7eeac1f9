//! `get` and `set`: direct resource reads and writes.

use std::sync::Arc;

use chrono::Utc;
use ivtpump_core::Snapshot;

use crate::cli::{GetArgs, GlobalOpts, SetArgs};
use crate::commands::Session;
use crate::commands::util::{Reading, ReadingRow, parse_value};
use crate::error::CliError;
use crate::output;

pub async fn get(args: GetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::load(global)?;
    let sentinels = Arc::new(session.config.sentinels.clone());
    let plan = session.config.plan.clone();
    let poller = session.poller()?;

    let entries = poller.gateway().get_many(args.paths.as_slice()).await?;
    let snap = Snapshot::new(entries, sentinels, 0, Utc::now());

    let readings: Vec<Reading> = args
        .paths
        .iter()
        .map(|path| Reading::from_snapshot(&snap, path, plan.tier_of(path)))
        .collect();

    let placeholder = output::unavailable(output::should_color(global.color));
    let out = output::render_list(
        global.output,
        &readings,
        |r| ReadingRow::new(r, &placeholder),
        |r| r.value.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn set(args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let value = parse_value(&args.value);
    let poller = Session::load(global)?.poller()?;

    if !poller.write(&args.path, &value).await? {
        return Err(CliError::WriteRejected { path: args.path });
    }

    if !global.quiet {
        let color = output::should_color(global.color);
        eprintln!("{} {} = {value}", output::status(true, "ok", color), args.path);
    }
    Ok(())
}
