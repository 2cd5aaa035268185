//! Builder pattern for driver configuration.
//!
//! Provides a fluent API for configuring and creating [`Driver`] instances.
//!
//! # Example
//!
//! ```no_run
//! use har_capture::Driver;
//!
//! # fn example() -> har_capture::Result<()> {
//! // Explicit binary
//! let driver = Driver::builder()
//!     .binary("/usr/bin/chromium")
//!     .build()?;
//!
//! // Discovered on PATH
//! let driver = Driver::builder().build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

use super::core::Driver;
use super::options::LaunchOptions;

// ============================================================================
// Constants
// ============================================================================

/// Executable names searched on `PATH`, in order of preference.
pub const BROWSER_CANDIDATES: [&str; 5] = [
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
    "chrome",
];

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct DriverBuilder {
    /// Path to the Chromium binary; discovered on `PATH` when unset.
    binary: Option<PathBuf>,
    /// Launch options.
    options: LaunchOptions,
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a new driver builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path to the Chromium binary executable.
    #[inline]
    #[must_use]
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Sets the binary only when a path is given.
    #[inline]
    #[must_use]
    pub fn binary_opt(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.binary = path;
        }
        self
    }

    /// Replaces the launch options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: LaunchOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the launch timeout.
    #[inline]
    #[must_use]
    pub fn launch_timeout(mut self, launch_timeout: Duration) -> Self {
        self.options.launch_timeout = launch_timeout;
        self
    }

    /// Builds the driver with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::BrowserNotFound`] if an explicit binary path doesn't exist
    /// - [`Error::Config`] if no binary is set and none is found on `PATH`
    /// - [`Error::Config`] if the launch options are invalid
    pub fn build(self) -> Result<Driver> {
        self.options.validate()?;
        let binary = self.resolve_binary()?;

        Ok(Driver::new(binary, self.options))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DriverBuilder {
    /// Resolves the binary from configuration or `PATH`.
    fn resolve_binary(&self) -> Result<PathBuf> {
        match &self.binary {
            Some(binary) if binary.exists() => Ok(binary.clone()),
            Some(binary) => Err(Error::browser_not_found(binary)),
            None => discover_binary(&BROWSER_CANDIDATES).ok_or_else(|| {
                Error::config(format!(
                    "No Chromium binary found on PATH (tried {}).\n\
                     Set one with --chrome-path or CHROME_PATH.",
                    BROWSER_CANDIDATES.join(", ")
                ))
            }),
        }
    }
}

/// Returns the first candidate executable found on `PATH`.
#[must_use]
pub fn discover_binary(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().find_map(|name| match which::which(name) {
        Ok(path) => {
            debug!(name, path = %path.display(), "Discovered browser binary");
            Some(path)
        }
        Err(_) => None,
    })
}

// ============================================================================
// Tests
// ============================================================================
