//! Capture target validation.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// CaptureRequest
// ============================================================================

/// A request to capture one page.
///
/// Holds the target exactly as received; [`CaptureRequest::normalize`] turns
/// it into an absolute URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptureRequest {
    /// Target as supplied by the caller. Missing deserializes as empty.
    #[serde(default)]
    pub url: String,
}

impl CaptureRequest {
    /// Creates a request for `url`.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Returns the raw target.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.url
    }

    /// Validates and normalizes the target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the target is empty, does not parse,
    /// is not `http`/`https`, or has no host.
    pub fn normalize(&self) -> Result<Url> {
        normalize_url(&self.url)
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalizes a user-supplied target.
///
/// Whitespace is trimmed and `https://` is prepended when no scheme is given,
/// so `example.com` becomes `https://example.com/`.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the result is not an absolute
/// `http`/`https` URL with a host.
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_url("URL is required"));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| Error::invalid_url(format!("{trimmed}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_url(format!(
            "{trimmed}: unsupported scheme {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(Error::invalid_url(format!("{trimmed}: missing host"))),
    }
}

/// Returns `true` if `input` starts with `scheme://`.
///
/// Only the leading segment counts; a `://` inside the path or query does
/// not make the input absolute.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// ============================================================================
// Tests
// ============================================================================
