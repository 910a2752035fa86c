//! storekit core
//!
//! Shared plumbing for the storekit service clients:
//!
//! - **Dispatcher**: builds absolute URLs, sends one request per call and
//!   classifies the status code
//! - **Decoder**: turns success bodies into typed results and error bodies
//!   into a uniform [`ServiceError`]
//! - **Profiles**: YAML connection profiles with environment-backed secrets
//!
//! ## Error taxonomy
//!
//! | variant | meaning |
//! |---|---|
//! | [`StoreError::Transport`], [`StoreError::Timeout`] | no response from the server |
//! | [`StoreError::AuthFailed`] | 401/403, credentials rejected |
//! | [`StoreError::Service`] | any other status in 400..=505 |
//! | [`StoreError::Decode`] | 2xx whose body does not match the expected shape |
//!
//! Nothing is retried automatically; see [`StoreError::is_retryable`].

pub mod error;
pub mod decode;
pub mod transport;
pub mod config;

// Re-exports for convenience
pub use error::{Result, ServiceError, StoreError};
pub use decode::{ErrorFormat, decode_error, decode_json, status_text};
pub use transport::{Dispatcher, RawResponse, TransportSettings, classify_failure};
pub use config::{NetStorageProfile, ProfileConfig, PulpProfile, resolve_secret};
