//! Exit codes for CLI operations
//!
//! These exit codes follow Unix conventions where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - bad arguments rejected before any request
pub const VALIDATION_ERROR: i32 = 2;

/// Configuration error - missing profile fields, bad endpoint or certificate
pub const CONFIG_ERROR: i32 = 3;

/// Authentication error - credentials or signature rejected
pub const AUTH_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Network error - connection failed or timed out
pub const NETWORK_ERROR: i32 = 6;

/// Service error - the server answered with an error status
pub const SERVICE_ERROR: i32 = 7;
