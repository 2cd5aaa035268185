//! Browser instance management.
//!
//! Each [`Browser`] owns:
//! - One Chromium process (child process)
//! - One WebSocket connection to its DevTools endpoint
//! - One temporary profile directory
//! - At most one attached [`Page`]
//!
//! # Example
//!
//! ```no_run
//! use har_capture::Driver;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = Driver::builder().build()?;
//!
//! let mut browser = driver.launch().await?;
//! browser.attach().await?;
//! browser.navigate(&Url::parse("https://example.com/")?).await?;
//!
//! while let Some(event) = browser.next_event().await {
//!     println!("{event:?}");
//! }
//!
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use crate::capture::BrowserSession;
use crate::driver::Profile;
use crate::error::{Error, Result};
use crate::protocol::{BrowserCommand, Command, Request};
use crate::transport::Connection;

use super::page::{Page, PageEvent};

// ============================================================================
// Constants
// ============================================================================

/// Time allowed for `Browser.close` to be answered.
const CLOSE_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Time allowed for the process to exit on its own after `Browser.close`.
const EXIT_GRACE: Duration = Duration::from_secs(3);

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards a child process and ensures it is killed when dropped.
pub(crate) struct ProcessGuard {
    /// The child process handle.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    /// Creates a new process guard.
    pub(crate) fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Returns the process ID.
    #[inline]
    pub(crate) fn pid(&self) -> u32 {
        self.pid
    }

    /// Waits up to `grace` for the process to exit, then kills it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the process could not be killed or reaped.
    pub(crate) async fn shutdown(&mut self, grace: Duration) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        match timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(pid = self.pid, %status, "Process exited");
                return Ok(());
            }
            Ok(Err(e)) => debug!(pid = self.pid, error = %e, "Failed to wait for process"),
            Err(_) => debug!(pid = self.pid, "Process still running, killing"),
        }

        child.kill().await?;
        info!(pid = self.pid, "Process terminated");
        Ok(())
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// Browser
// ============================================================================

/// A running Chromium instance.
///
/// Dropping a `Browser` kills its process and deletes its profile; prefer
/// [`Browser::close`] to observe teardown failures.
pub struct Browser {
    /// Protected process handle.
    process: ProcessGuard,
    /// WebSocket connection.
    connection: Connection,
    /// Profile directory.
    profile: Profile,
    /// Viewport applied to the page.
    viewport: (u32, u32),
    /// The attached page.
    page: Option<Page>,
}

impl fmt::Debug for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser")
            .field("pid", &self.process.pid())
            .field("profile", &self.profile.path())
            .field("attached", &self.page.is_some())
            .finish_non_exhaustive()
    }
}

impl Browser {
    /// Wraps a launched process and its connection.
    pub(crate) fn new(
        process: ProcessGuard,
        connection: Connection,
        profile: Profile,
        viewport: (u32, u32),
    ) -> Self {
        Self {
            process,
            connection,
            profile,
            viewport,
            page: None,
        }
    }

    /// Returns the browser process ID.
    #[inline]
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.process.pid()
    }

    /// Opens a blank page and starts observing its network activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the page cannot be created or attached.
    pub async fn attach(&mut self) -> Result<()> {
        let page = Page::open(self.connection.clone(), self.viewport).await?;
        self.page = Some(page);
        Ok(())
    }

    /// Navigates the attached page.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if no page is attached
    /// - [`Error::Navigation`] if the browser failed the navigation
    pub async fn navigate(&mut self, url: &Url) -> Result<()> {
        self.page_mut()?.navigate(url).await
    }

    /// Waits for the next event of the attached page.
    ///
    /// Returns `None` when nothing is attached or the connection is gone.
    pub async fn next_event(&mut self) -> Option<PageEvent> {
        match self.page.as_mut() {
            Some(page) => page.next_event().await,
            None => None,
        }
    }

    /// Closes the browser and removes its profile.
    ///
    /// Every step runs even if an earlier one failed; the first failure is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the process could not be killed
    /// - [`Error::Profile`] if the profile directory could not be removed
    pub async fn close(mut self) -> Result<()> {
        let pid = self.process.pid();
        debug!(pid, "Closing browser");

        if let Some(page) = self.page.take() {
            page.detach();
        }

        if self.connection.is_open() {
            let request = Request::new(None, Command::Browser(BrowserCommand::Close));
            if let Err(e) = self
                .connection
                .send_with_timeout(request, CLOSE_COMMAND_TIMEOUT)
                .await
            {
                debug!(pid, error = %e, "Browser.close not acknowledged");
            }
        }
        self.connection.shutdown();

        let mut first_error: Option<Error> = None;

        if let Err(e) = self.process.shutdown(EXIT_GRACE).await {
            warn!(pid, error = %e, "Failed to stop browser process");
            first_error.get_or_insert(e);
        }

        if let Err(e) = self.profile.remove() {
            warn!(pid, error = %e, "Failed to remove browser profile");
            first_error.get_or_insert(e);
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(pid, "Browser closed");
                Ok(())
            }
        }
    }

    fn page_mut(&mut self) -> Result<&mut Page> {
        self.page
            .as_mut()
            .ok_or_else(|| Error::protocol("No page attached"))
    }
}

// ============================================================================
// BrowserSession
// ============================================================================

#[async_trait]
impl BrowserSession for Browser {
    async fn attach(&mut self) -> Result<()> {
        Browser::attach(self).await
    }

    async fn navigate(&mut self, url: &Url) -> Result<()> {
        Browser::navigate(self, url).await
    }

    async fn next_event(&mut self) -> Option<PageEvent> {
        Browser::next_event(self).await
    }

    async fn release(self) -> Result<()> {
        self.close().await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::process::Stdio;

    use tokio::net::TcpListener;
    use tokio::process::Command as ProcessCommand;

    async fn spawn_sleeper() -> Option<Child> {
        let sleep = crate::driver::discover_binary(&["sleep"])?;
        ProcessCommand::new(sleep)
            .arg("30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .ok()
    }

    #[tokio::test]
    async fn test_process_guard_kills_running_process() {
        let Some(child) = spawn_sleeper().await else {
            return;
        };
        let mut guard = ProcessGuard::new(child);
        assert!(guard.pid() > 0);

        guard
            .shutdown(Duration::from_millis(50))
            .await
            .expect("shutdown");
        guard
            .shutdown(Duration::from_millis(50))
            .await
            .expect("second shutdown is a no-op");
    }

    #[tokio::test]
    async fn test_close_releases_everything() {
        let Some(child) = spawn_sleeper().await else {
            return;
        };

        // A socket that accepts the WebSocket and then goes away.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let _socket = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
        });
        let connection = Connection::connect(&format!("ws://{addr}"))
            .await
            .expect("connect");

        let profile = Profile::new_temp().expect("profile");
        let profile_path = profile.path().to_path_buf();

        let mut browser = Browser::new(ProcessGuard::new(child), connection, profile, (1280, 720));
        assert!(browser.next_event().await.is_none());
        let err = browser
            .navigate(&Url::parse("https://example.com/").expect("url"))
            .await
            .expect_err("not attached");
        assert!(matches!(err, Error::Protocol { .. }));

        browser.close().await.expect("close");
        assert!(!profile_path.exists());
    }
}
