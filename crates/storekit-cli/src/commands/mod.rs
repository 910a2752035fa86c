//! CLI commands

use clap::Args;
use std::path::{Path, PathBuf};

use storekit_core::{ProfileConfig, TransportSettings};

use crate::error::{CliError, Result};

pub mod config;
pub mod netstorage;
pub mod pulp;

/// Overrides for the HTTP transport; unset flags keep the profile's values
#[derive(Args, Debug, Default)]
pub struct TransportArgs {
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra CA bundle (PEM) to trust
    #[arg(long)]
    pub ca_bundle: Option<PathBuf>,

    /// Skip TLS certificate verification (insecure)
    #[arg(long)]
    pub insecure_skip_tls: bool,
}

impl TransportArgs {
    pub fn apply(&self, mut settings: TransportSettings) -> TransportSettings {
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        if let Some(ca_bundle) = &self.ca_bundle {
            settings.ca_bundle = Some(ca_bundle.clone());
        }
        if self.insecure_skip_tls {
            settings.insecure_skip_tls = true;
        }
        settings
    }
}

/// Storage group connection flags
#[derive(Args, Debug, Default)]
pub struct NsArgs {
    /// Upload host, e.g. example-nsu.akamaihd.net
    #[arg(long, env = "STOREKIT_NS_HOST")]
    pub host: Option<String>,

    /// Storage group folder (CP code)
    #[arg(long, env = "STOREKIT_NS_FOLDER")]
    pub folder: Option<String>,

    /// Key prefix below the folder
    #[arg(long, env = "STOREKIT_NS_PREFIX")]
    pub prefix: Option<String>,

    /// Upload account key name
    #[arg(long, env = "STOREKIT_NS_KEY_NAME")]
    pub key_name: Option<String>,

    /// Upload account secret
    #[arg(long, env = "STOREKIT_NS_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Use plain HTTP instead of HTTPS
    #[arg(long)]
    pub insecure_http: bool,

    #[command(flatten)]
    pub transport: TransportArgs,
}

/// Pulp server connection flags
#[derive(Args, Debug, Default)]
pub struct PulpArgs {
    /// Server endpoint, e.g. https://pulp.example.com
    #[arg(long, env = "STOREKIT_PULP_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "STOREKIT_PULP_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "STOREKIT_PULP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Log in first and use the session certificate instead of basic auth
    #[arg(long)]
    pub session: bool,

    #[command(flatten)]
    pub transport: TransportArgs,
}

/// Load the profile file; a missing default file is an empty profile
pub fn load_profile(path: Option<&Path>) -> Result<ProfileConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_with_help(
                    format!("Config file {} not found", path.display()),
                    "Create it or drop --config to use ~/.config/storekit/config.yaml",
                ));
            }
            tracing::debug!("Loading profile from {}", path.display());
            Ok(ProfileConfig::load_from(path)?)
        }
        None => Ok(ProfileConfig::load()?),
    }
}

/// Take the flag value, else the profile value, else fail naming the flag
pub(crate) fn require(flag: Option<&str>, profile: Option<&str>, name: &str) -> Result<String> {
    flag.or(profile)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::config_with_help(
                format!("No {} configured", name),
                format!(
                    "Pass --{} or set it in the profile file",
                    name.replace('_', "-")
                ),
            )
        })
}
