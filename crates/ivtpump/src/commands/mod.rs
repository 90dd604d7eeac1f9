//! Command handlers, one module per subcommand group.

pub mod auth;
pub mod device;
pub mod poll;
pub mod util;
pub mod values;

use std::sync::Arc;

use ivtpump_api::TokenSink;
use ivtpump_config::{ConfigError, ProfileTokenSink};
use ivtpump_core::{Poller, PumpConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Auth(args) => auth::handle(args, global).await,
        Command::Probe => device::probe(global).await,
        Command::Info => device::info(global).await,
        Command::Get(args) => values::get(args, global).await,
        Command::Set(args) => values::set(args, global).await,
        Command::Poll(args) => poll::handle(args, global).await,
        Command::Completions(_) => unreachable!("handled before dispatch"),
    }
}

/// The active profile, resolved into a poller configuration.
pub struct Session {
    pub config: PumpConfig,
    pub sink: Arc<dyn TokenSink>,
}

impl Session {
    /// Load the config file and resolve `--profile` (or the default).
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let path = global.config_path();
        let cfg = ivtpump_config::load_config_from(&path)?;
        let (name, profile) = cfg
            .profile(global.profile.as_deref())
            .map_err(|e| match e {
                ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                    name: profile,
                    path: path.display().to_string(),
                },
                other => other.into(),
            })?;

        let config = ivtpump_config::profile_to_pump_config(profile, &name, &cfg.defaults)?;
        let sink: Arc<dyn TokenSink> =
            Arc::new(ProfileTokenSink::new(path, name.clone(), profile.token_storage));
        tracing::debug!(profile = %name, device = %config.device_id, "session loaded");

        Ok(Self { config, sink })
    }

    /// A poller for this session; refreshed tokens are written back to
    /// the profile.
    pub fn poller(self) -> Result<Poller, CliError> {
        Ok(Poller::new(self.config, Some(self.sink))?)
    }
}
