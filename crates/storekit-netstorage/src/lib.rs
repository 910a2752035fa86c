//! Akamai NetStorage client
//!
//! Talks to the NetStorage HTTP API. Every request is signed with the
//! upload account's shared secret:
//!
//! - **Signer**: computes the action, auth-data and signature headers
//! - **Action**: typed operation descriptor rendered into the action header
//! - **Listing**: decodes `dir`, `stat` and `du` XML bodies
//!
//! ## Example
//!
//! ```rust,no_run
//! use storekit_netstorage::{NetStorageClient, NetStorageConfig, UploadOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config =
//!     NetStorageConfig::new("example-nsu.akamaihd.net", "123456", "upload-key", "secret");
//! let client = NetStorageClient::new(config)?;
//!
//! let listing = client.dir("/releases").await?;
//! for entry in listing.files() {
//!     println!("{} {:?}", entry.name, entry.size);
//! }
//!
//! let data = b"hello".to_vec();
//! let options = UploadOptions::default().with_checksums(&data);
//! client.upload("/releases/hello.txt", data, options).await?;
//! # Ok(())
//! # }
//! ```

pub mod signer;
pub mod action;
pub mod listing;
pub mod client;

// Re-exports for convenience
pub use signer::{AuthHeaders, Signer, ACTION_HEADER, AUTH_DATA_HEADER, AUTH_SIGN_HEADER};
pub use action::{Action, UploadOptions, ACTION_VERSION, QUICK_DELETE_CONFIRMATION};
pub use listing::{DiskUsage, EntryKind, StorageEntry, StorageListing, parse_listing};
pub use client::{ByteStream, NetStorageClient, NetStorageConfig};
