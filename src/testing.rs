//! Scripted browser stand-ins.
//!
//! [`ScriptedLauncher`] implements [`BrowserLauncher`] without spawning
//! anything. Each acquired [`ScriptedSession`] replays a fixed list of
//! [`PageEvent`]s after `navigate` and then either waits forever or reports
//! the stream as closed. Clones share their counters, so a test can keep one
//! clone and hand the other to an [`Orchestrator`](crate::Orchestrator).
//!
//! # Example
//!
//! ```
//! use har_capture::browser::PageEvent;
//! use har_capture::testing::{ScriptedLauncher, request_sent, response_received};
//!
//! let launcher = ScriptedLauncher::new().with_events([
//!     request_sent("https://example.com/"),
//!     response_received("https://example.com/", 200),
//!     PageEvent::NetworkIdle,
//! ]);
//! assert_eq!(launcher.acquire_count(), 0);
//! ```

use std::collections::VecDeque;
use std::future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::browser::PageEvent;
use crate::capture::{BrowserLauncher, BrowserSession};
use crate::error::{Error, Result};
use crate::har::Headers;
use crate::protocol::{RequestPayload, RequestWillBeSent, ResponsePayload, ResponseReceived};

// ============================================================================
// ScriptedLauncher
// ============================================================================

/// A launcher whose sessions replay a fixed event script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLauncher {
    script: Script,
    stats: Arc<Stats>,
}

#[derive(Debug, Clone, Default)]
struct Script {
    events: Vec<PageEvent>,
    launch_failure: Option<String>,
    navigation_error: Option<String>,
    release_failure: bool,
    close_after_script: bool,
}

#[derive(Debug, Default)]
struct Stats {
    acquired: AtomicUsize,
    released: AtomicUsize,
    navigated: Mutex<Vec<String>>,
}

impl ScriptedLauncher {
    /// Creates a launcher whose pages never become idle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the events replayed after navigation.
    #[must_use]
    pub fn with_events(mut self, events: impl IntoIterator<Item = PageEvent>) -> Self {
        self.script.events = events.into_iter().collect();
        self
    }

    /// Makes every `acquire` fail with [`Error::LaunchFailed`].
    #[must_use]
    pub fn with_launch_failure(mut self, message: impl Into<String>) -> Self {
        self.script.launch_failure = Some(message.into());
        self
    }

    /// Makes `navigate` fail with [`Error::Navigation`].
    #[must_use]
    pub fn with_navigation_error(mut self, message: impl Into<String>) -> Self {
        self.script.navigation_error = Some(message.into());
        self
    }

    /// Makes `release` fail after counting.
    #[must_use]
    pub fn with_release_failure(mut self) -> Self {
        self.script.release_failure = true;
        self
    }

    /// Reports the stream as closed once the script is exhausted.
    #[must_use]
    pub fn closing_after_script(mut self) -> Self {
        self.script.close_after_script = true;
        self
    }

    /// Number of successful acquisitions.
    #[must_use]
    pub fn acquire_count(&self) -> usize {
        self.stats.acquired.load(Ordering::SeqCst)
    }

    /// Number of releases.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.stats.released.load(Ordering::SeqCst)
    }

    /// URLs passed to `navigate`, in order.
    #[must_use]
    pub fn navigated(&self) -> Vec<String> {
        self.stats.navigated.lock().clone()
    }
}

#[async_trait]
impl BrowserLauncher for ScriptedLauncher {
    type Session = ScriptedSession;

    async fn acquire(&self) -> Result<Self::Session> {
        if let Some(message) = &self.script.launch_failure {
            return Err(Error::launch_failed(message.clone()));
        }
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedSession {
            script: self.script.clone(),
            stats: Arc::clone(&self.stats),
            queue: VecDeque::new(),
            attached: false,
        })
    }
}

// ============================================================================
// ScriptedSession
// ============================================================================

/// A session handed out by [`ScriptedLauncher`].
#[derive(Debug)]
pub struct ScriptedSession {
    script: Script,
    stats: Arc<Stats>,
    queue: VecDeque<PageEvent>,
    attached: bool,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn attach(&mut self) -> Result<()> {
        self.attached = true;
        Ok(())
    }

    async fn navigate(&mut self, url: &Url) -> Result<()> {
        if !self.attached {
            return Err(Error::protocol("No page attached"));
        }
        self.stats.navigated.lock().push(url.to_string());
        if let Some(message) = &self.script.navigation_error {
            return Err(Error::navigation(url.as_str(), message.clone()));
        }
        self.queue = self.script.events.iter().cloned().collect();
        Ok(())
    }

    async fn next_event(&mut self) -> Option<PageEvent> {
        if let Some(event) = self.queue.pop_front() {
            return Some(event);
        }
        if self.script.close_after_script {
            return None;
        }
        future::pending().await
    }

    async fn release(self) -> Result<()> {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
        if self.script.release_failure {
            return Err(Error::connection("scripted release failure"));
        }
        Ok(())
    }
}

// ============================================================================
// Event Builders
// ============================================================================

/// A `GET` request for `url`.
#[must_use]
pub fn request_sent(url: &str) -> PageEvent {
    PageEvent::RequestWillBeSent(request_payload(url, None))
}

/// A request for `to` carrying the `status` redirect response of `from`.
#[must_use]
pub fn redirect_sent(from: &str, to: &str, status: u16) -> PageEvent {
    let mut hop = request_payload(to, Some(response_payload(from, status)));
    hop.request.headers.insert("Referer".into(), from.into());
    PageEvent::RequestWillBeSent(hop)
}

/// A `text/html` response for `url`.
#[must_use]
pub fn response_received(url: &str, status: u16) -> PageEvent {
    PageEvent::ResponseReceived(ResponseReceived {
        request_id: String::new(),
        loader_id: "loader".into(),
        timestamp: 0.0,
        response: response_payload(url, status),
        resource_type: Some("Document".into()),
    })
}

fn request_payload(url: &str, redirect_response: Option<ResponsePayload>) -> RequestWillBeSent {
    let mut headers = Headers::new();
    headers.insert("Accept".into(), "*/*".into());
    RequestWillBeSent {
        request_id: url.to_string(),
        loader_id: "loader".into(),
        timestamp: 0.0,
        wall_time: Some(1_714_564_800.0),
        request: RequestPayload {
            url: url.to_string(),
            method: "GET".into(),
            headers,
        },
        redirect_response,
        resource_type: Some("Document".into()),
    }
}

fn response_payload(url: &str, status: u16) -> ResponsePayload {
    let mut headers = Headers::new();
    headers.insert("content-type".into(), "text/html".into());
    ResponsePayload {
        url: url.to_string(),
        status,
        status_text: String::new(),
        headers,
        mime_type: "text/html".into(),
    }
}

// ============================================================================
// Tests
// ============================================================================
