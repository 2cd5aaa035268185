//! Chromium launcher.
//!
//! The [`Driver`] holds the resolved binary and launch options and starts one
//! isolated browser instance per call to [`Driver::launch`].
//!
//! # Launch Sequence
//!
//! 1. Create a temporary profile directory
//! 2. Spawn Chromium with stderr piped, wrapped in a kill-on-drop guard
//! 3. Read the DevTools endpoint from stderr (bounded by the launch timeout)
//! 4. Connect the WebSocket
//!
//! A failure at any step drops what was created so far: the process is
//! killed and the profile deleted. There is no retry.
//!
//! # Example
//!
//! ```no_run
//! use har_capture::Driver;
//!
//! # async fn example() -> har_capture::Result<()> {
//! let driver = Driver::builder().build()?;
//! let browser = driver.launch().await?;
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::browser::{Browser, ProcessGuard};
use crate::capture::BrowserLauncher;
use crate::error::{Error, Result};
use crate::transport::{Connection, wait_for_endpoint};

use super::builder::DriverBuilder;
use super::options::LaunchOptions;
use super::profile::Profile;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the driver.
struct DriverInner {
    /// Path to the Chromium binary executable.
    binary: PathBuf,

    /// Launch options applied to every instance.
    options: LaunchOptions,
}

// ============================================================================
// Driver
// ============================================================================

/// Chromium launcher.
///
/// Cheap to clone; clones share the same configuration.
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    inner: Arc<DriverInner>,
}

// ============================================================================
// Driver - Display
// ============================================================================

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("binary", &self.inner.binary)
            .field("options", &self.inner.options)
            .finish()
    }
}

// ============================================================================
// Driver - Public API
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Returns the browser binary.
    #[inline]
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.inner.binary
    }

    /// Returns the launch options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &LaunchOptions {
        &self.inner.options
    }

    /// Launches a new browser instance.
    ///
    /// # Errors
    ///
    /// - [`Error::Profile`] if the profile directory cannot be created
    /// - [`Error::LaunchFailed`] if the process cannot be spawned or exits early
    /// - [`Error::ConnectionTimeout`] if no endpoint appears within the launch timeout
    /// - [`Error::Connection`] if the WebSocket handshake fails
    pub async fn launch(&self) -> Result<Browser> {
        let profile = Profile::new_temp()?;

        let mut child = self.spawn_process(&profile)?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::launch_failed("browser stderr was not captured"))?;
        let process = ProcessGuard::new(child);
        info!(pid = process.pid(), "Chromium process spawned");

        let ws_url = wait_for_endpoint(stderr, self.inner.options.launch_timeout).await?;
        let connection = Connection::connect(&ws_url).await?;

        debug!(pid = process.pid(), url = %ws_url, "Browser connected");

        Ok(Browser::new(
            process,
            connection,
            profile,
            self.inner.options.window_size,
        ))
    }
}

// ============================================================================
// Driver - Internal API
// ============================================================================

impl Driver {
    /// Creates a new driver instance.
    pub(crate) fn new(binary: PathBuf, options: LaunchOptions) -> Self {
        Self {
            inner: Arc::new(DriverInner { binary, options }),
        }
    }

    /// Spawns the Chromium process with the given profile.
    fn spawn_process(&self, profile: &Profile) -> Result<Child> {
        let mut cmd = Command::new(&self.inner.binary);

        cmd.args(self.inner.options.to_args())
            .arg(profile.to_arg())
            .arg("about:blank");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.spawn().map_err(|e| {
            Error::launch_failed(format!(
                "failed to spawn {}: {e}",
                self.inner.binary.display()
            ))
        })
    }
}

// ============================================================================
// BrowserLauncher
// ============================================================================

#[async_trait]
impl BrowserLauncher for Driver {
    type Session = Browser;

    async fn acquire(&self) -> Result<Browser> {
        self.launch().await.map_err(Error::into_launch_failure)
    }
}

// ============================================================================
// Tests
// ============================================================================
