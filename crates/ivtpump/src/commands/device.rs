//! `probe` and `info`: device reachability and identity.

use std::fmt::Write as _;

use ivtpump_core::{DEVICE_INFO_PATHS, DeviceInfo, PollPlan};

use crate::cli::GlobalOpts;
use crate::commands::Session;
use crate::error::CliError;
use crate::output;

pub async fn probe(global: &GlobalOpts) -> Result<(), CliError> {
    let poller = Session::load(global)?.poller()?;
    let device = poller.gateway().device_id().to_owned();

    if !poller.gateway().probe().await? {
        return Err(CliError::ProbeFailed { device });
    }

    let color = output::should_color(global.color);
    output::print_output(
        &format!("{} device {device} is reachable", output::status(true, "ok", color)),
        global.quiet,
    );
    Ok(())
}

pub async fn info(global: &GlobalOpts) -> Result<(), CliError> {
    let mut session = Session::load(global)?;
    // Only the identity paths, fetched in one cycle.
    session.config.plan = PollPlan::new(
        DEVICE_INFO_PATHS.iter().copied(),
        std::iter::empty::<&str>(),
    );
    let poller = session.poller()?;
    poller.refresh().await?;

    let info = poller.device_info();
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &info,
        |i| detail(i, color),
        |i| i.serial_number().to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(info: &DeviceInfo, color: bool) -> String {
    let na = output::unavailable(color);
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| na.clone());

    let mut out = String::new();
    let _ = writeln!(out, "Device:       {}", info.device_id);
    let _ = writeln!(out, "Manufacturer: {}", info.manufacturer);
    let _ = writeln!(out, "Model:        {}", info.model);
    let _ = writeln!(out, "Serial:       {}", info.serial_number());
    let _ = writeln!(out, "Firmware:     {}", field(&info.firmware));
    let _ = writeln!(out, "Hardware:     {}", field(&info.hardware));
    let _ = writeln!(out, "MAC:          {}", field(&info.mac));
    let _ = write!(out, "System type:  {}", field(&info.system_type));
    out
}
