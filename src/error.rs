//! Error types for HAR capture.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use har_capture::{CaptureRequest, Result};
//!
//! async fn example(orchestrator: &Orchestrator<Driver>) -> Result<()> {
//!     let outcome = orchestrator.capture(CaptureRequest::new("example.com")).await?;
//!     println!("{} entries", outcome.har.log.entries.len());
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Class | Variants |
//! |-------|----------|
//! | Validation | [`Error::InvalidUrl`] |
//! | Launch | [`Error::BrowserNotFound`], [`Error::LaunchFailed`], [`Error::Profile`] |
//! | Navigation | [`Error::Navigation`], [`Error::PageCrashed`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`], [`Error::RequestTimeout`] |
//! | Configuration | [`Error::Config`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |
//!
//! A navigation that outlives its deadline is not an error at all; it is
//! reported as [`NavigationOutcome::TimedOut`](crate::capture::NavigationOutcome).

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::task::JoinError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::CommandId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// The capture target is missing, empty or not an http(s) URL.
    #[error("Invalid URL: {message}")]
    InvalidUrl {
        /// Why the URL was rejected.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Launch Errors
    // ========================================================================
    /// Browser binary not found at path.
    #[error("Browser not found at: {path}")]
    BrowserNotFound {
        /// Path where the browser was expected.
        path: PathBuf,
    },

    /// The browser process could not be started or never exposed its
    /// DevTools endpoint.
    #[error("Failed to launch browser: {message}")]
    LaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    /// Temporary profile directory could not be prepared.
    #[error("Profile error: {message}")]
    Profile {
        /// Description of the profile error.
        message: String,
    },

    // ========================================================================
    // Navigation Errors
    // ========================================================================
    /// The browser refused or failed the navigation (DNS, TLS, connection).
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL.
        url: String,
        /// Browser-reported error text, e.g. `net::ERR_NAME_NOT_RESOLVED`.
        message: String,
    },

    /// The renderer crashed while the page was loading.
    #[error("Page crashed while loading {url}")]
    PageCrashed {
        /// Target URL.
        url: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Timed out waiting for the DevTools endpoint.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or error response from the browser.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Command request timeout.
    #[error("Command {command_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The command that timed out.
        command_id: CommandId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// The task running a capture panicked or was aborted.
    #[error("Capture task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

// ============================================================================
// ErrorClass
// ============================================================================

/// Coarse classification used at the HTTP boundary and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing or malformed target; nothing was launched.
    Validation,
    /// The browser instance could not start.
    Launch,
    /// The page could not be loaded.
    Navigation,
    /// Everything else: transport, protocol, IO.
    Internal,
}

impl ErrorClass {
    /// Returns the label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Launch => "LaunchFailure",
            Self::Navigation => "NavigationError",
            Self::Internal => "InternalError",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a browser not found error.
    #[inline]
    pub fn browser_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BrowserNotFound { path: path.into() }
    }

    /// Creates a launch failed error.
    #[inline]
    pub fn launch_failed(message: impl Into<String>) -> Self {
        Self::LaunchFailed {
            message: message.into(),
        }
    }

    /// Creates a profile error.
    #[inline]
    pub fn profile(message: impl Into<String>) -> Self {
        Self::Profile {
            message: message.into(),
        }
    }

    /// Creates a navigation error.
    #[inline]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a page crashed error.
    #[inline]
    pub fn page_crashed(url: impl Into<String>) -> Self {
        Self::PageCrashed { url: url.into() }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(command_id: CommandId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            command_id,
            timeout_ms,
        }
    }

    /// Re-labels any error raised while starting the browser as a launch
    /// failure, keeping its message.
    #[must_use]
    pub fn into_launch_failure(self) -> Self {
        match self {
            Self::BrowserNotFound { .. } | Self::LaunchFailed { .. } | Self::Profile { .. } => {
                self
            }
            other => Self::launch_failed(other.to_string()),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns the coarse class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidUrl { .. } => ErrorClass::Validation,
            Self::BrowserNotFound { .. } | Self::LaunchFailed { .. } | Self::Profile { .. } => {
                ErrorClass::Launch
            }
            Self::Navigation { .. } | Self::PageCrashed { .. } => ErrorClass::Navigation,
            _ => ErrorClass::Internal,
        }
    }

    /// Returns `true` if this is a validation error.
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.class() == ErrorClass::Validation
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_navigation_display() {
        let err = Error::navigation("https://nope.invalid/", "net::ERR_NAME_NOT_RESOLVED");
        assert_eq!(
            err.to_string(),
            "Navigation to https://nope.invalid/ failed: net::ERR_NAME_NOT_RESOLVED"
        );
    }

    #[test]
    fn test_classes() {
        assert_eq!(Error::invalid_url("empty").class(), ErrorClass::Validation);
        assert_eq!(Error::launch_failed("boom").class(), ErrorClass::Launch);
        assert_eq!(
            Error::browser_not_found("/nope/chrome").class(),
            ErrorClass::Launch
        );
        assert_eq!(Error::page_crashed("https://a/").class(), ErrorClass::Navigation);
        assert_eq!(Error::ConnectionClosed.class(), ErrorClass::Internal);
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(ErrorClass::Validation.to_string(), "ValidationError");
        assert_eq!(ErrorClass::Launch.as_str(), "LaunchFailure");
        assert_eq!(ErrorClass::Navigation.as_str(), "NavigationError");
    }

    #[test]
    fn test_into_launch_failure() {
        let err = Error::connection_timeout(20_000).into_launch_failure();
        assert_eq!(err.class(), ErrorClass::Launch);
        assert!(err.to_string().contains("20000ms"));

        let err = Error::browser_not_found("/x").into_launch_failure();
        assert!(matches!(err, Error::BrowserNotFound { .. }));
    }

    #[test]
    fn test_is_timeout() {
        assert!(Error::connection_timeout(5000).is_timeout());
        assert!(Error::request_timeout(CommandId::from_raw(7), 30_000).is_timeout());
        assert!(!Error::ConnectionClosed.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("x").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::invalid_url("x").is_connection_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.class(), ErrorClass::Internal);
    }

    #[tokio::test]
    async fn test_join_error_conversion() {
        let handle = tokio::spawn(async {});
        handle.abort();
        let join_err = handle.await.expect_err("aborted task");

        let err: Error = join_err.into();
        assert!(matches!(err, Error::TaskFailed(_)));
        assert_eq!(err.class(), ErrorClass::Internal);
        assert!(err.to_string().starts_with("Capture task failed"));
    }
}
