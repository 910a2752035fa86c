//! Pulp repository manager client
//!
//! Covers the Pulp v2 REST API calls needed to manage repositories and
//! upload requests:
//!
//! - **Login**: trades basic credentials for a client certificate/key pair
//! - **Repositories**: list, get, create
//! - **Upload requests**: list, create, delete
//!
//! ## Example
//!
//! ```rust,no_run
//! use storekit_pulp::{PulpClient, PulpConfig, RepositoryDetails};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PulpClient::new(PulpConfig::new("https://pulp.example.com", "admin", "admin"))?;
//! client.login().await?;
//!
//! let repo = RepositoryDetails::new("hello-world").with_display_name("Hello World");
//! let created = client.create_repository(&repo).await?;
//! println!("{:?}", created.href);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Notes
//!
//! - Login results are held in memory only
//! - A failed login leaves the previous session untouched

pub mod models;
pub mod session;
pub mod client;

// Re-exports for convenience
pub use models::{
    Distributor, Importer, ObjectId, RepositoryDetails, Scratchpad, SessionCertificate, Tag,
    UploadRequest, UploadRequests,
};
pub use session::{Session, SessionCell};
pub use client::{PulpClient, PulpConfig};
