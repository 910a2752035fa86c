//! Response body decoding
//!
//! Success bodies are decoded into typed results by the caller's chosen
//! format. Error bodies are normalized into [`ServiceError`] regardless of
//! which backend produced them.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, ServiceError, StoreError};

/// How a backend encodes the body of a failed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    /// Raw text; the whole body is the message
    Text,
    /// JSON object with `error_message` and an optional `traceback`
    Json,
}

/// JSON error object returned by the repository service
#[derive(Debug, Deserialize)]
struct JsonErrorBody {
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    traceback: Option<Vec<String>>,
}

/// Reason phrase used when the body carries no usable message
pub fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Normalize an error body into a [`ServiceError`].
///
/// The response status always wins over any status echoed in the body.
pub fn decode_error(status: StatusCode, body: &[u8], format: ErrorFormat) -> ServiceError {
    let code = status.as_u16();
    let fallback = || ServiceError::new(code, status_text(status));

    if body.iter().all(u8::is_ascii_whitespace) {
        return fallback();
    }

    match format {
        ErrorFormat::Text => {
            let text = String::from_utf8_lossy(body);
            ServiceError::new(code, text.trim())
        }
        ErrorFormat::Json => match serde_json::from_slice::<JsonErrorBody>(body) {
            Ok(JsonErrorBody {
                error_message: Some(message),
                traceback,
            }) if !message.is_empty() => {
                ServiceError::new(code, message).with_traceback(traceback.unwrap_or_default())
            }
            Ok(parsed) => fallback().with_traceback(parsed.traceback.unwrap_or_default()),
            Err(e) => {
                tracing::debug!("Unparseable error body for status {}: {}", code, e);
                fallback()
            }
        },
    }
}

/// Decode a JSON success body into `T`
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| StoreError::Decode {
        message: format!("unexpected JSON shape: {}", e),
    })
}
