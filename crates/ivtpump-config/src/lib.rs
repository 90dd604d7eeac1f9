//! Configuration for the ivtpump CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! persistence of refreshed credentials, and translation to
//! `ivtpump_core::PumpConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use futures_util::future::BoxFuture;
use ivtpump_api::{
    Credential, OAuthConfig, POINTT_BASE_URL, TlsMode, TokenSink, TransportConfig,
};
use ivtpump_core::{PollPlan, PumpConfig, Sentinels};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

const KEYRING_SERVICE: &str = "ivtpump";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Pick the named profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => Err(ConfigError::UnknownProfile { profile: name }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Seconds per HTTP call.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default = "default_slow_tier_every")]
    pub slow_tier_every: u32,

    /// Numeric readings that mean "no data".
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<f64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            slow_tier_every: default_slow_tier_every(),
            sentinels: default_sentinels(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    60
}
fn default_slow_tier_every() -> u32 {
    5
}
fn default_sentinels() -> Vec<f64> {
    Sentinels::default().as_slice().to_vec()
}

/// Where refreshed credentials are written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    /// Plaintext in this profile.
    #[default]
    File,
    /// System keyring, entry `{profile}/tokens`.
    Keyring,
}

/// A named device profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway device id.
    pub device_id: String,

    /// Access token (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Environment variable name containing the access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub token_storage: TokenStorage,

    /// Override the gateway API root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Override the OAuth2 token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override poll interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,
}

/// Credential triple as stored in the keyring.
#[derive(Debug, Deserialize, Serialize)]
struct StoredTokens {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<&Credential> for StoredTokens {
    fn from(cred: &Credential) -> Self {
        Self {
            access_token: cred.access_token().expose_secret().to_owned(),
            refresh_token: cred.refresh_token().map(|t| t.expose_secret().to_owned()),
            expires_at: cred.expires_at(),
        }
    }
}

impl From<StoredTokens> for Credential {
    fn from(stored: StoredTokens) -> Self {
        Credential::new(
            SecretString::from(stored.access_token),
            stored.refresh_token.map(SecretString::from),
            stored.expires_at,
        )
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ivtpump", "ivtpump").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ivtpump");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path`, merged with `IVTPUMP_`-prefixed environment
/// variables (`__` separates nested keys).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("IVTPUMP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize `cfg` to TOML at `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Read only the file, without defaults or environment overrides, so a
/// rewrite does not bake environment values into it.
fn read_file_config(path: &Path) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(toml::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the initial credential for a profile.
///
/// The access token comes from, in order: the variable named by
/// `access_token_env`, the keyring (when `token_storage = "keyring"`),
/// the plaintext profile fields.
pub fn resolve_credential(profile: &Profile, profile_name: &str) -> Result<Credential, ConfigError> {
    // 1. Profile's access_token_env → env var lookup
    if let Some(ref env_name) = profile.access_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(Credential::new(
                SecretString::from(val),
                profile.refresh_token.clone().map(SecretString::from),
                profile.token_expires_at,
            ));
        }
    }

    // 2. System keyring
    if profile.token_storage == TokenStorage::Keyring {
        if let Some(stored) = read_keyring(profile_name)? {
            return Ok(stored.into());
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.access_token {
        return Ok(Credential::new(
            SecretString::from(token.clone()),
            profile.refresh_token.clone().map(SecretString::from),
            profile.token_expires_at,
        ));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/tokens"))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

fn read_keyring(profile_name: &str) -> Result<Option<StoredTokens>, ConfigError> {
    let entry = keyring_entry(profile_name)?;
    match entry.get_password() {
        Ok(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ConfigError::Keyring(format!("corrupt token entry: {e}"))),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(ConfigError::Keyring(e.to_string())),
    }
}

/// Write `credential` to the profile's token storage.
///
/// For file storage, the profile in the file at `path` is updated in
/// place (created if missing, with `device_id` left empty).
/// Keyring storage leaves the file untouched.
pub fn store_credential(
    path: &Path,
    profile_name: &str,
    storage: TokenStorage,
    credential: &Credential,
) -> Result<(), ConfigError> {
    let stored = StoredTokens::from(credential);
    match storage {
        TokenStorage::Keyring => {
            let raw = serde_json::to_string(&stored)
                .map_err(|e| ConfigError::Keyring(e.to_string()))?;
            keyring_entry(profile_name)?
                .set_password(&raw)
                .map_err(|e| ConfigError::Keyring(e.to_string()))
        }
        TokenStorage::File => update_profile(path, profile_name, |profile| {
            profile.access_token = Some(stored.access_token);
            profile.refresh_token = stored.refresh_token;
            profile.token_expires_at = stored.expires_at;
        }),
    }
}

/// Create or modify one profile in the file at `path`.
///
/// The first profile written to an empty file becomes the default.
pub fn update_profile(
    path: &Path,
    profile_name: &str,
    update: impl FnOnce(&mut Profile),
) -> Result<(), ConfigError> {
    let mut cfg = read_file_config(path)?;
    if cfg.profiles.is_empty() {
        cfg.default_profile = Some(profile_name.to_owned());
    }
    update(cfg.profiles.entry(profile_name.to_owned()).or_default());
    save_config_to(&cfg, path)
}

// ── Token persistence ───────────────────────────────────────────────

/// Persists refreshed credentials back to the profile they came from.
#[derive(Debug, Clone)]
pub struct ProfileTokenSink {
    path: PathBuf,
    profile_name: String,
    storage: TokenStorage,
}

impl ProfileTokenSink {
    pub fn new(path: PathBuf, profile_name: impl Into<String>, storage: TokenStorage) -> Self {
        Self {
            path,
            profile_name: profile_name.into(),
            storage,
        }
    }
}

impl TokenSink for ProfileTokenSink {
    fn persist<'a>(
        &'a self,
        credential: &'a Credential,
    ) -> BoxFuture<'a, Result<(), ivtpump_api::Error>> {
        let path = self.path.clone();
        let profile_name = self.profile_name.clone();
        let storage = self.storage;
        let credential = credential.clone();
        Box::pin(async move {
            // File and keyring I/O block; keep them off the runtime workers.
            tokio::task::spawn_blocking(move || {
                store_credential(&path, &profile_name, storage, &credential)
            })
            .await
            .map_err(|e| ivtpump_api::Error::Persistence {
                message: format!("token writer task failed: {e}"),
            })?
            .map_err(|e| ivtpump_api::Error::Persistence {
                message: e.to_string(),
            })?;
            debug!(
                profile = %self.profile_name,
                storage = ?self.storage,
                "refreshed credential saved"
            );
            Ok(())
        })
    }
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `PumpConfig` from a profile and the global defaults.
pub fn profile_to_pump_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<PumpConfig, ConfigError> {
    let credential = resolve_credential(profile, profile_name)?;
    pump_config_with_credential(profile, credential, defaults)
}

/// Like [`profile_to_pump_config`], with a credential obtained elsewhere
/// (a fresh code exchange) instead of the profile's stored tokens.
pub fn pump_config_with_credential(
    profile: &Profile,
    credential: Credential,
    defaults: &Defaults,
) -> Result<PumpConfig, ConfigError> {
    if profile.device_id.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "device_id".into(),
            reason: "must not be empty".into(),
        });
    }
    if defaults.slow_tier_every == 0 {
        return Err(ConfigError::Validation {
            field: "slow_tier_every".into(),
            reason: "must be at least 1".into(),
        });
    }

    let poll_interval = profile.poll_interval.unwrap_or(defaults.poll_interval);
    if poll_interval == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let base_url = parse_url(
        "base_url",
        profile.base_url.as_deref().unwrap_or(POINTT_BASE_URL),
    )?;
    let (oauth, transport) = profile_oauth(profile, defaults)?;

    let mut config = PumpConfig::new(profile.device_id.trim(), credential);
    config.base_url = base_url;
    config.oauth = oauth;
    config.tls = transport.tls;
    config.timeout = transport.timeout;
    config.poll_interval = Duration::from_secs(poll_interval);
    config.slow_tier_every = defaults.slow_tier_every;
    config.sentinels = Sentinels::new(defaults.sentinels.iter().copied());
    config.plan = PollPlan::k30();
    Ok(config)
}

/// Token endpoint and HTTP transport for a profile, without touching its
/// tokens. Used for the initial code exchange, before any token exists.
pub fn profile_oauth(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<(OAuthConfig, TransportConfig), ConfigError> {
    let oauth = match profile.token_url {
        Some(ref token_url) => OAuthConfig::with_token_url(parse_url("token_url", token_url)?),
        None => OAuthConfig::default(),
    };
    let tls = match profile.ca_cert {
        Some(ref ca_path) => TlsMode::CustomCa(ca_path.clone()),
        None => TlsMode::System,
    };
    let transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    };
    Ok((oauth, transport))
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}
