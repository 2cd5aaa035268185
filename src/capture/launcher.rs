//! Browser acquisition seam.
//!
//! The orchestrator only talks to these traits. [`Driver`](crate::Driver) and
//! [`Browser`](crate::Browser) implement them for a real Chromium; the
//! [`testing`](crate::testing) module provides scripted stand-ins.

use async_trait::async_trait;
use url::Url;

use crate::browser::PageEvent;
use crate::error::Result;

/// Produces isolated browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Session type handed out by [`BrowserLauncher::acquire`].
    type Session: BrowserSession;

    /// Starts a fresh browser instance.
    ///
    /// # Errors
    ///
    /// Any error is a launch failure; nothing needs releasing afterwards.
    async fn acquire(&self) -> Result<Self::Session>;
}

/// One browser instance with a single observed page.
#[async_trait]
pub trait BrowserSession: Send + Sized {
    /// Opens the page and starts network observation.
    ///
    /// Must be called before [`BrowserSession::navigate`]; earlier events are
    /// not observed.
    async fn attach(&mut self) -> Result<()>;

    /// Starts loading `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Navigation`](crate::Error::Navigation) if the browser
    /// failed the navigation outright.
    async fn navigate(&mut self, url: &Url) -> Result<()>;

    /// Waits for the next page event. `None` means the browser is gone.
    ///
    /// Must be cancel-safe: no event may be lost when the future is dropped.
    async fn next_event(&mut self) -> Option<PageEvent>;

    /// Tears the instance down. Called exactly once per acquired session.
    async fn release(self) -> Result<()>;
}
