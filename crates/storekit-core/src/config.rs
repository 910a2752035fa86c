//! Profile configuration
//!
//! Stores connection profiles in `~/.config/storekit/config.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::transport::TransportSettings;

/// Profile configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    /// Storage service profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netstorage: Option<NetStorageProfile>,

    /// Repository service profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulp: Option<PulpProfile>,
}

impl ProfileConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;

        // Profiles may carry inline secrets
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut options = std::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true).mode(0o600);
            std::io::Write::write_all(&mut options.open(path)?, content.as_bytes())?;
            Ok(())
        }

        #[cfg(not(unix))]
        {
            std::fs::write(path, content)?;
            Ok(())
        }
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| StoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("storekit").join("config.yaml"))
    }
}

/// Connection profile for the storage service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetStorageProfile {
    /// Upload host, e.g. `example-nsu.akamaihd.net`
    pub host: String,

    /// Storage group folder (CP code)
    pub folder: String,

    /// Optional key prefix below the folder
    #[serde(default)]
    pub prefix: String,

    /// Upload account key name
    pub key_name: String,

    /// Inline shared secret
    #[serde(default)]
    pub secret: Option<String>,

    /// Environment variable holding the shared secret
    #[serde(default)]
    pub secret_env: Option<String>,

    /// Use plain HTTP instead of HTTPS
    #[serde(default)]
    pub insecure_http: bool,

    #[serde(default)]
    pub transport: TransportSettings,
}

impl NetStorageProfile {
    pub fn resolve_secret(&self) -> Result<String> {
        resolve_secret(self.secret.as_deref(), self.secret_env.as_deref(), "secret")
    }
}

/// Connection profile for the repository service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulpProfile {
    /// Service endpoint, e.g. `https://pulp.example.com`
    pub endpoint: String,

    pub username: String,

    /// Inline password
    #[serde(default)]
    pub password: Option<String>,

    /// Environment variable holding the password
    #[serde(default)]
    pub password_env: Option<String>,

    #[serde(default)]
    pub transport: TransportSettings,
}

impl PulpProfile {
    pub fn resolve_password(&self) -> Result<String> {
        resolve_secret(
            self.password.as_deref(),
            self.password_env.as_deref(),
            "password",
        )
    }
}

/// Resolve a secret given inline or through an environment variable.
///
/// The inline value takes precedence.
pub fn resolve_secret(inline: Option<&str>, env_var: Option<&str>, what: &str) -> Result<String> {
    if let Some(value) = inline {
        return Ok(value.to_string());
    }

    match env_var {
        Some(var) => std::env::var(var).map_err(|_| StoreError::InvalidConfig {
            message: format!("Environment variable {} not set", var),
        }),
        None => Err(StoreError::InvalidConfig {
            message: format!("No {} configured", what),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profiles() {
        let yaml = r#"
netstorage:
  host: example-nsu.akamaihd.net
  folder: "123456"
  keyName: upload-key
  secretEnv: NS_SECRET
pulp:
  endpoint: https://pulp.example.com
  username: admin
  password: hunter2
  transport:
    insecureSkipTls: true
"#;
        let config: ProfileConfig = serde_yaml::from_str(yaml).unwrap();
        let ns = config.netstorage.unwrap();
        assert_eq!(ns.host, "example-nsu.akamaihd.net");
        assert_eq!(ns.folder, "123456");
        assert_eq!(ns.prefix, "");
        assert_eq!(ns.secret_env.as_deref(), Some("NS_SECRET"));
        assert!(!ns.insecure_http);
        assert!(!ns.transport.insecure_skip_tls);

        let pulp = config.pulp.unwrap();
        assert_eq!(pulp.resolve_password().unwrap(), "hunter2");
        assert!(pulp.transport.insecure_skip_tls);
        assert_eq!(pulp.transport.timeout_secs, 30);
    }

    #[test]
    fn test_resolve_secret_from_env() {
        // SAFETY: Test runs in single thread, no concurrent access to env vars
        unsafe {
            std::env::set_var("STOREKIT_TEST_SECRET_VAR", "s3cret");
        }

        let value = resolve_secret(None, Some("STOREKIT_TEST_SECRET_VAR"), "secret").unwrap();
        assert_eq!(value, "s3cret");

        // Inline wins
        let value =
            resolve_secret(Some("inline"), Some("STOREKIT_TEST_SECRET_VAR"), "secret").unwrap();
        assert_eq!(value, "inline");

        // SAFETY: Test runs in single thread, no concurrent access to env vars
        unsafe {
            std::env::remove_var("STOREKIT_TEST_SECRET_VAR");
        }
    }

    #[test]
    fn test_resolve_secret_missing() {
        assert!(matches!(
            resolve_secret(None, None, "password"),
            Err(StoreError::InvalidConfig { .. })
        ));
        assert!(matches!(
            resolve_secret(None, Some("STOREKIT_TEST_UNSET_VAR"), "password"),
            Err(StoreError::InvalidConfig { .. })
        ));
    }
}
