//! CLI error types with exit code handling

use miette::Diagnostic;
use storekit_core::StoreError;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Arguments rejected before any request was sent
    #[error("Validation failed: {message}")]
    #[diagnostic(code(storekit::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Missing or invalid connection settings
    #[error("Configuration error: {message}")]
    #[diagnostic(code(storekit::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Credentials or signature rejected by the server
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(storekit::cli::auth),
        help("Check the key name and secret, or the username and password")
    )]
    Auth { message: String },

    /// Server answered with an error status
    #[error("Service error: {message}")]
    #[diagnostic(code(storekit::cli::service))]
    Service { message: String },

    /// Connection failed or timed out
    #[error("Network error: {message}")]
    #[diagnostic(code(storekit::cli::network))]
    Network { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(storekit::cli::io))]
    Io { message: String },

    /// Internal error (unexpected response, serialization)
    #[error("Internal error: {message}")]
    #[diagnostic(code(storekit::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Auth { .. } => exit_codes::AUTH_ERROR,
            CliError::Service { .. } => exit_codes::SERVICE_ERROR,
            CliError::Network { .. } => exit_codes::NETWORK_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation { message } => CliError::Validation {
                message,
                help: None,
            },
            StoreError::InvalidConfig { message } => CliError::Config {
                message,
                help: None,
            },
            StoreError::InvalidUrl { .. } | StoreError::InvalidCertificate { .. } => {
                CliError::Config {
                    message: err.to_string(),
                    help: None,
                }
            }
            StoreError::AuthFailed(e) => CliError::Auth {
                message: e.to_string(),
            },
            StoreError::Service(e) => CliError::Service {
                message: e.to_string(),
            },
            StoreError::UnexpectedStatus { .. } => CliError::Service {
                message: err.to_string(),
            },
            StoreError::Transport { message } => CliError::Network { message },
            StoreError::Timeout => CliError::Network {
                message: err.to_string(),
            },
            StoreError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            StoreError::Decode { .. } => CliError::internal(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(err.to_string())
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
