//! `poll`: run the tiered poller and print each committed snapshot.

use ivtpump_core::{PollPlan, Poller, Snapshot};

use crate::cli::{GlobalOpts, PollArgs};
use crate::commands::Session;
use crate::commands::util::{Reading, ReadingRow};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: PollArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut session = Session::load(global)?;
    if args.fast_only {
        let fast = session.config.plan.fast().to_vec();
        session.config.plan = PollPlan::new(fast, std::iter::empty::<String>());
    }
    let poller = session.poller()?;

    if args.once {
        let snap = poller.refresh().await?;
        print_snapshot(&poller, &snap, global);
        return Ok(());
    }

    poller.start().await?;
    print_snapshot(&poller, &poller.snapshot(), global);

    let mut health = poller.health();
    let mut last_cycle = poller.snapshot().cycle();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = health.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = health.borrow_and_update().clone();
                if let Some(err) = status.last_error {
                    tracing::warn!(
                        failures = status.consecutive_failures,
                        error = %err,
                        "poll cycle failed, showing previous readings"
                    );
                    continue;
                }
                let snap = poller.snapshot();
                if snap.cycle() != last_cycle {
                    last_cycle = snap.cycle();
                    print_snapshot(&poller, &snap, global);
                }
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

fn print_snapshot(poller: &Poller, snap: &Snapshot, global: &GlobalOpts) {
    let readings: Vec<Reading> = poller
        .plan()
        .paths()
        .map(|(path, tier)| Reading::from_snapshot(snap, path, Some(tier)))
        .collect();

    let placeholder = output::unavailable(output::should_color(global.color));
    let out = output::render_list(
        global.output,
        &readings,
        |r| ReadingRow::new(r, &placeholder),
        |r| {
            format!(
                "{}\t{}",
                r.path,
                r.value.as_deref().unwrap_or_default()
            )
        },
    );
    output::print_output(&out, global.quiet);
}
