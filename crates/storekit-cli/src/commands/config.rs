//! Profile file commands

use clap::{Args, Subcommand};
use console::style;
use std::path::{Path, PathBuf};

use storekit_core::{NetStorageProfile, ProfileConfig, PulpProfile};

use crate::error::{CliError, Result};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the profile file location
    Path,

    /// Store NetStorage connection settings in the profile
    SetNs(SetNsArgs),

    /// Store Pulp connection settings in the profile
    SetPulp(SetPulpArgs),
}

#[derive(Args, Debug)]
pub struct SetNsArgs {
    /// Upload host, e.g. example-nsu.akamaihd.net
    #[arg(long)]
    pub host: String,

    /// Storage group folder (CP code)
    #[arg(long)]
    pub folder: String,

    /// Upload account key name
    #[arg(long)]
    pub key_name: String,

    /// Key prefix below the folder
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Environment variable to read the secret from at run time
    #[arg(long, conflicts_with = "secret")]
    pub secret_env: Option<String>,

    /// Upload account secret, stored inline
    #[arg(long)]
    pub secret: Option<String>,

    /// Use plain HTTP instead of HTTPS
    #[arg(long)]
    pub insecure_http: bool,
}

#[derive(Args, Debug)]
pub struct SetPulpArgs {
    /// Server endpoint, e.g. https://pulp.example.com
    #[arg(long)]
    pub endpoint: String,

    #[arg(long)]
    pub username: String,

    /// Environment variable to read the password from at run time
    #[arg(long, conflicts_with = "password")]
    pub password_env: Option<String>,

    /// Password, stored inline
    #[arg(long)]
    pub password: Option<String>,
}

/// Resolve the profile file location
pub fn profile_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(ProfileConfig::default_path()?),
    }
}

pub fn run(explicit: Option<&Path>, command: ConfigCommand) -> Result<()> {
    let path = profile_path(explicit)?;

    match command {
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommand::SetNs(args) => {
            let mut profile = load_existing(&path)?;
            set_netstorage(&mut profile, args)?;
            save(&profile, &path, "NetStorage")
        }
        ConfigCommand::SetPulp(args) => {
            let mut profile = load_existing(&path)?;
            set_pulp(&mut profile, args)?;
            save(&profile, &path, "Pulp")
        }
    }
}

/// Load the profile to update; a missing file starts empty
fn load_existing(path: &Path) -> Result<ProfileConfig> {
    if path.exists() {
        Ok(ProfileConfig::load_from(path)?)
    } else {
        Ok(ProfileConfig::default())
    }
}

fn save(profile: &ProfileConfig, path: &Path, section: &str) -> Result<()> {
    profile.save_to(path)?;
    tracing::info!("Wrote profile {}", path.display());
    println!(
        "{} Saved {} settings to {}",
        style("✓").green().bold(),
        section,
        path.display()
    );
    Ok(())
}

fn missing_secret(flag: &str) -> CliError {
    CliError::Validation {
        message: format!("No {} given", flag),
        help: Some(format!("Pass --{}-env NAME or --{} VALUE", flag, flag)),
    }
}

/// Replace the NetStorage section, keeping its transport settings
fn set_netstorage(profile: &mut ProfileConfig, args: SetNsArgs) -> Result<()> {
    if args.secret.is_none() && args.secret_env.is_none() {
        return Err(missing_secret("secret"));
    }
    let transport = profile
        .netstorage
        .take()
        .map(|p| p.transport)
        .unwrap_or_default();

    profile.netstorage = Some(NetStorageProfile {
        host: args.host,
        folder: args.folder,
        prefix: args.prefix,
        key_name: args.key_name,
        secret: args.secret,
        secret_env: args.secret_env,
        insecure_http: args.insecure_http,
        transport,
    });
    Ok(())
}

/// Replace the Pulp section, keeping its transport settings
fn set_pulp(profile: &mut ProfileConfig, args: SetPulpArgs) -> Result<()> {
    if args.password.is_none() && args.password_env.is_none() {
        return Err(missing_secret("password"));
    }
    if !args.endpoint.starts_with("http://") && !args.endpoint.starts_with("https://") {
        return Err(CliError::Validation {
            message: format!("Endpoint '{}' has no scheme", args.endpoint),
            help: Some("Use a full URL such as https://pulp.example.com".to_string()),
        });
    }
    let transport = profile
        .pulp
        .take()
        .map(|p| p.transport)
        .unwrap_or_default();

    profile.pulp = Some(PulpProfile {
        endpoint: args.endpoint,
        username: args.username,
        password: args.password,
        password_env: args.password_env,
        transport,
    });
    Ok(())
}
