//! Request and Response message types.
//!
//! Defines the message format for command requests sent to the browser's
//! DevTools endpoint and the responses it returns.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{CommandId, SessionId};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command request to the browser.
///
/// # Format
///
/// ```json
/// {
///   "id": 12,
///   "sessionId": "8E1F...",
///   "method": "Domain.method",
///   "params": { ... }
/// }
/// ```
///
/// `sessionId` is omitted for browser-level commands.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Unique identifier for request/response correlation.
    pub id: CommandId,

    /// Target session (flat mode), `None` for the browser itself.
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a new request with auto-generated ID.
    #[inline]
    #[must_use]
    pub fn new(session_id: Option<SessionId>, command: Command) -> Self {
        Self {
            id: CommandId::next(),
            session_id,
            command,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from the browser.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 12, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 12, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the command `id`.
    pub id: CommandId,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error details (if error).
    #[serde(default)]
    pub error: Option<ProtocolError>,

    /// Session the command ran in.
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<SessionId>,
}

/// Error object of a failed command.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolError {
    /// JSON-RPC style error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Extra detail, if any.
    #[serde(default)]
    pub data: Option<String>,
}

impl Response {
    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the response was an error.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            None => Ok(self.result.unwrap_or(Value::Null)),
            Some(error) => {
                let message = match error.data {
                    Some(data) => format!("{} ({}): {}", error.message, error.code, data),
                    None => format!("{} ({})", error.message, error.code),
                };
                Err(Error::protocol(message))
            }
        }
    }

    /// Gets a string value from the result.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
