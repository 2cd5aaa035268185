//! Chromium command-line options and configuration.
//!
//! Provides a type-safe interface for configuring the browser process:
//! headless mode, sandboxing, window size, launch timeout and additional
//! command-line arguments.
//!
//! # Example
//!
//! ```ignore
//! use har_capture::LaunchOptions;
//!
//! let options = LaunchOptions::new()
//!     .with_window_size(1280, 720)
//!     .with_arg("--lang=en-US");
//!
//! let args = options.to_args();
//! // ["--headless=new", "--no-sandbox", ..., "--remote-debugging-port=0", "--lang=en-US"]
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default viewport width in CSS pixels.
pub const DEFAULT_WIDTH: u32 = 1280;

/// Default viewport height in CSS pixels.
pub const DEFAULT_HEIGHT: u32 = 720;

/// Default time allowed for the browser to expose its DevTools endpoint.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Flags that keep Chromium lean inside containers.
const CONTAINER_ARGS: [&str; 3] = [
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--disable-gpu",
];

/// Flags that skip first-run UI and background chatter.
const QUIET_ARGS: [&str; 4] = [
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-background-networking",
    "--disable-sync",
];

// ============================================================================
// LaunchOptions
// ============================================================================

/// Chromium process configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Run without a GUI (`--headless=new`).
    pub headless: bool,

    /// Keep the Chromium sandbox enabled.
    ///
    /// Off by default: restricted container hosts cannot create the sandbox.
    pub sandbox: bool,

    /// Window and viewport dimensions in pixels (width, height).
    pub window_size: (u32, u32),

    /// Time allowed for the DevTools endpoint to appear.
    pub launch_timeout: Duration,

    /// Additional custom command-line arguments.
    pub extra_args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl LaunchOptions {
    /// Creates options for a headless, sandbox-less 1280x720 browser.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headless: true,
            sandbox: false,
            window_size: (DEFAULT_WIDTH, DEFAULT_HEIGHT),
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
            extra_args: Vec::new(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl LaunchOptions {
    /// Shows the browser window.
    #[inline]
    #[must_use]
    pub fn with_headed(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Keeps the Chromium sandbox enabled.
    #[inline]
    #[must_use]
    pub fn with_sandbox(mut self) -> Self {
        self.sandbox = true;
        self
    }

    /// Sets window size in pixels.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Sets the launch timeout.
    #[inline]
    #[must_use]
    pub fn with_launch_timeout(mut self, launch_timeout: Duration) -> Self {
        self.launch_timeout = launch_timeout;
        self
    }

    /// Adds a custom command-line argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Adds multiple custom command-line arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl LaunchOptions {
    /// Converts options to Chromium command-line arguments.
    ///
    /// `--user-data-dir` is not included; it is added per instance at launch.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(12 + self.extra_args.len());

        if self.headless {
            args.push("--headless=new".to_string());
        }

        if !self.sandbox {
            args.push("--no-sandbox".to_string());
            args.push("--disable-setuid-sandbox".to_string());
        }

        args.extend(CONTAINER_ARGS.iter().map(|arg| (*arg).to_string()));
        args.extend(QUIET_ARGS.iter().map(|arg| (*arg).to_string()));

        let (width, height) = self.window_size;
        args.push(format!("--window-size={width},{height}"));
        args.push("--remote-debugging-port=0".to_string());

        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Validates the options configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a dimension or the launch timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.window_size;
        if width == 0 || height == 0 {
            return Err(Error::config("Window dimensions must be greater than zero"));
        }
        if self.launch_timeout.is_zero() {
            return Err(Error::config("Launch timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Returns `true` if headless mode is enabled.
    #[inline]
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        self.headless
    }
}

// ============================================================================
// Tests
// ============================================================================
