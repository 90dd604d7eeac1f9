//! `auth`: SingleKey ID login.
//!
//! The login itself happens in a browser. `auth url` prints where to go;
//! the browser ends on an app-scheme redirect that it cannot open, and
//! `auth exchange` turns that redirect URL into stored tokens.

use std::sync::Arc;

use ivtpump_api::oauth::{authorization_url, exchange_code, extract_code};
use ivtpump_api::{OAuthConfig, TokenSink};
use ivtpump_config::{ProfileTokenSink, TokenStorage};
use ivtpump_core::Poller;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Url => {
            let url = authorization_url(&OAuthConfig::default());
            if !global.quiet {
                eprintln!("Open this URL in a browser and sign in with your SingleKey ID.");
                eprintln!("Copy the URL the browser fails to open afterwards, then run:");
                eprintln!("  ivtpump auth exchange '<that url>' --device <device id>");
                eprintln!();
            }
            println!("{url}");
            Ok(())
        }

        AuthCommand::Exchange {
            callback_url,
            device,
            storage,
        } => exchange(&callback_url, device, storage.into(), global).await,
    }
}

async fn exchange(
    callback_url: &str,
    device: String,
    storage: TokenStorage,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if device.trim().is_empty() {
        return Err(CliError::Validation {
            field: "device".into(),
            reason: "must not be empty".into(),
        });
    }
    let code = extract_code(callback_url).ok_or_else(|| CliError::Validation {
        field: "callback_url".into(),
        reason: "no `code` query parameter found".into(),
    })?;

    // Endpoint overrides of an existing profile apply to the exchange too.
    let path = global.config_path();
    let cfg = ivtpump_config::load_config_from(&path)?;
    let profile = global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());
    let existing = cfg.profiles.get(&profile).cloned().unwrap_or_default();
    let (oauth, transport) = ivtpump_config::profile_oauth(&existing, &cfg.defaults)?;
    let http = transport.build_client()?;
    let credential = exchange_code(&http, &oauth, &code).await?;

    ivtpump_config::update_profile(&path, &profile, |p| {
        p.device_id.clone_from(&device);
        p.token_storage = storage;
    })?;
    let sink: Arc<dyn TokenSink> =
        Arc::new(ProfileTokenSink::new(path.clone(), profile.clone(), storage));
    sink.persist(&credential).await?;
    tracing::info!(profile = %profile, path = %path.display(), "tokens saved");

    // Confirm the fresh credential reaches the device through the
    // profile's own gateway settings.
    let mut saved = existing;
    saved.device_id.clone_from(&device);
    let config = ivtpump_config::pump_config_with_credential(&saved, credential, &cfg.defaults)?;
    let poller = Poller::new(config, Some(sink))?;
    if !poller.gateway().probe().await? {
        return Err(CliError::ProbeFailed { device });
    }

    let color = output::should_color(global.color);
    output::print_output(
        &format!(
            "{} profile '{profile}' saved, device {device} is reachable",
            output::status(true, "ok", color)
        ),
        global.quiet,
    );
    Ok(())
}
