//! Typed NetStorage action descriptors
//!
//! Each operation has a fixed token and a fixed parameter set. The
//! `X-Akamai-ACS-Action` header value is rendered once from this type, so a
//! malformed action string cannot reach the wire.

use md5::Md5;
use reqwest::Method;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use url::form_urlencoded;

use storekit_core::{Result, StoreError};

/// Action protocol version
pub const ACTION_VERSION: u32 = 1;

/// Confirmation value the server demands for `quick-delete`
pub const QUICK_DELETE_CONFIRMATION: &str = "imreallyreallysure";

/// Optional metadata sent along with an upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Modification time to record, unix seconds
    pub mtime: Option<i64>,
    /// Expected size in bytes; the server rejects a mismatch
    pub size: Option<u64>,
    /// Hex MD5 the server verifies
    pub md5: Option<String>,
    /// Hex SHA-1 the server verifies
    pub sha1: Option<String>,
    /// Hex SHA-256 the server verifies
    pub sha256: Option<String>,
    /// Ask the server to index a zip archive for serve-from-zip
    pub index_zip: bool,
}

impl UploadOptions {
    /// Fill size and all three digests from the payload
    pub fn with_checksums(mut self, data: &[u8]) -> Self {
        self.size = Some(data.len() as u64);
        self.md5 = Some(hex::encode(Md5::digest(data)));
        self.sha1 = Some(hex::encode(Sha1::digest(data)));
        self.sha256 = Some(hex::encode(Sha256::digest(data)));
        self
    }

    pub fn with_mtime(mut self, mtime: i64) -> Self {
        self.mtime = Some(mtime);
        self
    }

    pub fn with_index_zip(mut self) -> Self {
        self.index_zip = true;
        self
    }
}

/// A NetStorage operation and its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Dir,
    Du,
    Stat,
    Download,
    Mkdir,
    Rmdir,
    Delete,
    QuickDelete,
    Rename { destination: String },
    Symlink { target: String },
    Mtime { mtime: i64 },
    Upload(UploadOptions),
}

impl Action {
    /// Build a quick-delete action, checking the caller's confirmation
    pub fn quick_delete(confirmation: &str) -> Result<Self> {
        if confirmation != QUICK_DELETE_CONFIRMATION {
            return Err(StoreError::validation(format!(
                "quick-delete requires the confirmation token \"{}\"",
                QUICK_DELETE_CONFIRMATION
            )));
        }
        Ok(Action::QuickDelete)
    }

    /// Wire token for the `action` parameter
    pub fn token(&self) -> &'static str {
        match self {
            Action::Dir => "dir",
            Action::Du => "du",
            Action::Stat => "stat",
            Action::Download => "download",
            Action::Mkdir => "mkdir",
            Action::Rmdir => "rmdir",
            Action::Delete => "delete",
            Action::QuickDelete => "quick-delete",
            Action::Rename { .. } => "rename",
            Action::Symlink { .. } => "symlink",
            Action::Mtime { .. } => "mtime",
            Action::Upload(_) => "upload",
        }
    }

    /// HTTP method the server expects for this action
    pub fn method(&self) -> Method {
        match self {
            Action::Dir | Action::Du | Action::Stat | Action::Download => Method::GET,
            Action::Upload(_) => Method::PUT,
            Action::Mkdir
            | Action::Rmdir
            | Action::Delete
            | Action::QuickDelete
            | Action::Rename { .. }
            | Action::Symlink { .. }
            | Action::Mtime { .. } => Method::POST,
        }
    }

    /// Whether the server answers with an XML listing
    pub fn returns_listing(&self) -> bool {
        matches!(self, Action::Dir | Action::Du | Action::Stat)
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Action::Dir | Action::Du | Action::Stat => vec![("format", "xml".to_string())],
            Action::QuickDelete => vec![("quick-delete", QUICK_DELETE_CONFIRMATION.to_string())],
            Action::Rename { destination } => vec![("destination", destination.clone())],
            Action::Symlink { target } => vec![("target", target.clone())],
            Action::Mtime { mtime } => vec![("mtime", mtime.to_string())],
            Action::Upload(options) => {
                let mut params = Vec::new();
                if let Some(mtime) = options.mtime {
                    params.push(("mtime", mtime.to_string()));
                }
                if let Some(size) = options.size {
                    params.push(("size", size.to_string()));
                }
                if let Some(md5) = &options.md5 {
                    params.push(("md5", md5.clone()));
                }
                if let Some(sha1) = &options.sha1 {
                    params.push(("sha1", sha1.clone()));
                }
                if let Some(sha256) = &options.sha256 {
                    params.push(("sha256", sha256.clone()));
                }
                if options.index_zip {
                    params.push(("index-zip", "1".to_string()));
                }
                params
            }
            Action::Download | Action::Mkdir | Action::Rmdir | Action::Delete => Vec::new(),
        }
    }

    /// Render the `X-Akamai-ACS-Action` header value
    pub fn render(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer
            .append_pair("version", &ACTION_VERSION.to_string())
            .append_pair("action", self.token());
        for (key, value) in self.params() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_actions() {
        assert_eq!(Action::Dir.render(), "version=1&action=dir&format=xml");
        assert_eq!(Action::Du.render(), "version=1&action=du&format=xml");
        assert_eq!(Action::Stat.render(), "version=1&action=stat&format=xml");
        assert!(Action::Stat.returns_listing());
        assert!(!Action::Download.returns_listing());
    }

    #[test]
    fn test_plain_actions() {
        assert_eq!(Action::Mkdir.render(), "version=1&action=mkdir");
        assert_eq!(Action::Rmdir.render(), "version=1&action=rmdir");
        assert_eq!(Action::Delete.render(), "version=1&action=delete");
        assert_eq!(Action::Download.render(), "version=1&action=download");
        assert_eq!(
            Action::Upload(UploadOptions::default()).render(),
            "version=1&action=upload"
        );
    }

    #[test]
    fn test_rename_encodes_destination() {
        let action = Action::Rename {
            destination: "/123456/new name.txt".to_string(),
        };
        assert_eq!(
            action.render(),
            "version=1&action=rename&destination=%2F123456%2Fnew+name.txt"
        );
        assert_eq!(action.method(), Method::POST);
    }

    #[test]
    fn test_symlink_and_mtime() {
        let action = Action::Symlink {
            target: "/123456/real".to_string(),
        };
        assert_eq!(action.render(), "version=1&action=symlink&target=%2F123456%2Freal");

        let action = Action::Mtime { mtime: 1700000000 };
        assert_eq!(action.render(), "version=1&action=mtime&mtime=1700000000");
    }

    #[test]
    fn test_quick_delete_requires_confirmation() {
        assert!(matches!(
            Action::quick_delete("yes"),
            Err(StoreError::Validation { .. })
        ));
        assert!(Action::quick_delete("").is_err());

        let action = Action::quick_delete("imreallyreallysure").unwrap();
        assert_eq!(
            action.render(),
            "version=1&action=quick-delete&quick-delete=imreallyreallysure"
        );
    }

    #[test]
    fn test_upload_options() {
        let options = UploadOptions::default()
            .with_checksums(b"hello world")
            .with_mtime(1700000000)
            .with_index_zip();
        let rendered = Action::Upload(options).render();

        assert_eq!(
            rendered,
            "version=1&action=upload&mtime=1700000000&size=11\
             &md5=5eb63bbbe01eeed093cb22bb8f5acdc3\
             &sha1=2aae6c35c94fcfb415dbe95f408b9ce91ee846ed\
             &sha256=b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9\
             &index-zip=1"
        );
    }

    #[test]
    fn test_methods() {
        assert_eq!(Action::Dir.method(), Method::GET);
        assert_eq!(Action::Download.method(), Method::GET);
        assert_eq!(Action::Upload(UploadOptions::default()).method(), Method::PUT);
        assert_eq!(Action::Delete.method(), Method::POST);
        assert_eq!(Action::QuickDelete.method(), Method::POST);
    }
}
