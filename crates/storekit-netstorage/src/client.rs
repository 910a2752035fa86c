//! NetStorage HTTP API client

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::RequestBuilder;
use std::fmt;
use std::pin::Pin;

use storekit_core::{
    Dispatcher, ErrorFormat, NetStorageProfile, RawResponse, Result, StoreError, TransportSettings,
};

use crate::action::{Action, UploadOptions};
use crate::listing::{StorageListing, parse_listing};
use crate::signer::Signer;

/// Body of a download, consumed chunk by chunk
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Connection settings for a storage group
#[derive(Clone)]
pub struct NetStorageConfig {
    /// Upload host, e.g. `example-nsu.akamaihd.net`
    pub host: String,
    /// Storage group folder (CP code)
    pub folder: String,
    /// Key prefix applied below the folder
    pub prefix: String,
    /// Upload account key name
    pub key_name: String,
    secret: String,
    /// Use plain HTTP instead of HTTPS
    pub insecure_http: bool,
    pub transport: TransportSettings,
}

impl fmt::Debug for NetStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetStorageConfig")
            .field("host", &self.host)
            .field("folder", &self.folder)
            .field("prefix", &self.prefix)
            .field("key_name", &self.key_name)
            .field("secret", &"<redacted>")
            .field("insecure_http", &self.insecure_http)
            .field("transport", &self.transport)
            .finish()
    }
}

impl NetStorageConfig {
    pub fn new(
        host: impl Into<String>,
        folder: impl Into<String>,
        key_name: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            folder: folder.into(),
            prefix: String::new(),
            key_name: key_name.into(),
            secret: secret.into(),
            insecure_http: false,
            transport: TransportSettings::default(),
        }
    }

    /// Build from a profile, resolving the secret
    pub fn from_profile(profile: &NetStorageProfile) -> Result<Self> {
        Ok(Self {
            host: profile.host.clone(),
            folder: profile.folder.clone(),
            prefix: profile.prefix.clone(),
            key_name: profile.key_name.clone(),
            secret: profile.resolve_secret()?,
            insecure_http: profile.insecure_http,
            transport: profile.transport.clone(),
        })
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_insecure_http(mut self, insecure_http: bool) -> Self {
        self.insecure_http = insecure_http;
        self
    }

    pub fn with_transport(mut self, transport: TransportSettings) -> Self {
        self.transport = transport;
        self
    }

    /// Base URL of the upload host
    pub fn base_url(&self) -> String {
        let scheme = if self.insecure_http { "http" } else { "https" };
        format!("{}://{}/", scheme, self.host.trim_end_matches('/'))
    }

    /// Join folder, prefix and key into the resource path.
    ///
    /// Empty segments are dropped; `.` and `..` are rejected.
    pub fn canonical_path(&self, key: &str) -> Result<String> {
        let mut segments = Vec::new();
        for part in [self.folder.as_str(), self.prefix.as_str(), key] {
            for segment in part.split('/').filter(|s| !s.is_empty()) {
                if segment == "." || segment == ".." {
                    return Err(StoreError::validation(format!(
                        "path segment \"{}\" is not allowed in {}",
                        segment, key
                    )));
                }
                segments.push(segment);
            }
        }

        if segments.is_empty() {
            return Err(StoreError::validation("resource path is empty"));
        }
        Ok(segments.join("/"))
    }
}

/// Client for one NetStorage storage group
#[derive(Debug, Clone)]
pub struct NetStorageClient {
    config: NetStorageConfig,
    signer: Signer,
    dispatcher: Dispatcher,
}

impl NetStorageClient {
    pub fn new(config: NetStorageConfig) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(StoreError::InvalidConfig {
                message: "NetStorage host is empty".to_string(),
            });
        }
        if config.key_name.is_empty() || config.secret.is_empty() {
            return Err(StoreError::InvalidConfig {
                message: "NetStorage key name and secret are required".to_string(),
            });
        }

        let dispatcher = Dispatcher::new(&config.base_url(), &config.transport)?;
        let signer = Signer::new(config.key_name.clone(), config.secret.clone());

        Ok(Self {
            config,
            signer,
            dispatcher,
        })
    }

    pub fn config(&self) -> &NetStorageConfig {
        &self.config
    }

    /// Build a request for `key` with fresh auth headers
    fn signed_request(&self, key: &str, action: &Action) -> Result<RequestBuilder> {
        let canonical = self.config.canonical_path(key)?;
        let url = self.dispatcher.url_for(&canonical);
        let path = url.path().trim_start_matches('/');

        let headers = self.signer.sign(
            &action.render(),
            path,
            path,
            chrono::Utc::now().timestamp(),
        );

        let request = self.dispatcher.request(action.method(), &canonical);
        Ok(headers.apply(request))
    }

    async fn call(&self, key: &str, action: Action) -> Result<RawResponse> {
        let request = self.signed_request(key, &action)?;
        self.dispatcher.execute(request, ErrorFormat::Text).await
    }

    async fn listing(&self, key: &str, action: Action) -> Result<StorageListing> {
        let response = self.call(key, action).await?;
        parse_listing(&response.body)
    }

    /// List the children of a directory
    pub async fn dir(&self, path: &str) -> Result<StorageListing> {
        self.listing(path, Action::Dir).await
    }

    /// Aggregate file count and bytes below a directory
    pub async fn du(&self, path: &str) -> Result<StorageListing> {
        self.listing(path, Action::Du).await
    }

    /// Metadata of a single file or directory
    pub async fn stat(&self, path: &str) -> Result<StorageListing> {
        self.listing(path, Action::Stat).await
    }

    pub async fn mkdir(&self, path: &str) -> Result<()> {
        self.call(path, Action::Mkdir).await?;
        tracing::info!("Created directory {}", path);
        Ok(())
    }

    /// Remove an empty directory
    pub async fn rmdir(&self, path: &str) -> Result<()> {
        self.call(path, Action::Rmdir).await?;
        tracing::info!("Removed directory {}", path);
        Ok(())
    }

    /// Delete a file or symlink
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.call(path, Action::Delete).await?;
        tracing::info!("Deleted {}", path);
        Ok(())
    }

    /// Recursively delete a directory tree.
    ///
    /// `confirmation` must be [`QUICK_DELETE_CONFIRMATION`](crate::QUICK_DELETE_CONFIRMATION);
    /// anything else fails before a request is sent.
    pub async fn quick_delete(&self, path: &str, confirmation: &str) -> Result<()> {
        let action = Action::quick_delete(confirmation)?;
        self.call(path, action).await?;
        tracing::info!("Quick-deleted {}", path);
        Ok(())
    }

    /// Rename a file; `destination` is resolved like any other key
    pub async fn rename(&self, path: &str, destination: &str) -> Result<()> {
        let destination = format!("/{}", self.config.canonical_path(destination)?);
        self.call(
            path,
            Action::Rename {
                destination: destination.clone(),
            },
        )
        .await?;
        tracing::info!("Renamed {} to {}", path, destination);
        Ok(())
    }

    /// Create a symlink at `path` pointing to `target`
    pub async fn symlink(&self, path: &str, target: &str) -> Result<()> {
        let target = format!("/{}", self.config.canonical_path(target)?);
        self.call(path, Action::Symlink { target }).await?;
        Ok(())
    }

    /// Set the modification time of a file, unix seconds
    pub async fn set_mtime(&self, path: &str, mtime: i64) -> Result<()> {
        self.call(path, Action::Mtime { mtime }).await?;
        Ok(())
    }

    /// Upload a file in a single request
    pub async fn upload(
        &self,
        path: &str,
        body: impl Into<reqwest::Body>,
        options: UploadOptions,
    ) -> Result<()> {
        let request = self
            .signed_request(path, &Action::Upload(options))?
            .body(body);
        self.dispatcher.execute(request, ErrorFormat::Text).await?;
        tracing::info!("Uploaded {}", path);
        Ok(())
    }

    /// Download a file as a stream of chunks
    pub async fn download(&self, path: &str) -> Result<ByteStream> {
        let request = self.signed_request(path, &Action::Download)?;
        let response = self
            .dispatcher
            .execute_stream(request, ErrorFormat::Text)
            .await?;
        Ok(Box::pin(response.bytes_stream().map_err(StoreError::from)))
    }

    /// Download a file into memory
    pub async fn download_bytes(&self, path: &str) -> Result<Bytes> {
        Ok(self.call(path, Action::Download).await?.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_path() {
        let config = NetStorageConfig::new("example-nsu.akamaihd.net", "123456", "key", "secret")
            .with_prefix("releases/");

        assert_eq!(
            config.canonical_path("/v1/app.tar.gz").unwrap(),
            "123456/releases/v1/app.tar.gz"
        );
        assert_eq!(config.canonical_path("").unwrap(), "123456/releases");
        assert!(config.canonical_path("../escape").is_err());
    }

    #[test]
    fn test_base_url() {
        let config = NetStorageConfig::new("example-nsu.akamaihd.net", "1", "k", "s");
        assert_eq!(config.base_url(), "https://example-nsu.akamaihd.net/");
        assert_eq!(
            config.with_insecure_http(true).base_url(),
            "http://example-nsu.akamaihd.net/"
        );
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = NetStorageConfig::new("h", "1", "k", "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_new_requires_credentials() {
        let err = NetStorageClient::new(NetStorageConfig::new("h", "1", "k", "")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig { .. }));

        let err = NetStorageClient::new(NetStorageConfig::new(" ", "1", "k", "s")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig { .. }));
    }
}
