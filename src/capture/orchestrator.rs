//! Capture orchestration.
//!
//! One [`Orchestrator::capture`] call runs one capture end to end on the
//! calling task: validate, acquire a browser, navigate, wait for quiescence
//! or the deadline, collect for a grace period, release, assemble.
//!
//! The browser is released exactly once on every path after a successful
//! acquisition. A release failure is logged and never changes the result.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, Utc};
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{Instrument, debug, info, info_span, warn};
use url::Url;

use crate::browser::{NetworkCollector, PageEvent};
use crate::config::CaptureConfig;
use crate::error::{Error, Result};
use crate::har::{HarAssembler, HarDocument};
use crate::identifiers::CaptureId;

use super::launcher::{BrowserLauncher, BrowserSession};
use super::request::CaptureRequest;
use super::state::{CaptureState, NavigationOutcome};

// ============================================================================
// CaptureOutcome
// ============================================================================

/// A finished capture.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    /// Identifier used in logs.
    pub capture_id: CaptureId,
    /// The assembled document.
    pub har: HarDocument,
    /// Normalized target.
    pub target: Url,
    /// Download name, `{host}.har`.
    pub filename: String,
    /// When the capture finished.
    pub captured_at: DateTime<Utc>,
    /// How the navigation phase ended.
    pub navigation: NavigationOutcome,
}

impl CaptureOutcome {
    /// Returns the target host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        self.target.host_str().unwrap_or("capture")
    }

    /// Returns `{host}_{YYYY-MM-DDTHH-MM-SS}.har`.
    #[must_use]
    pub fn timestamped_filename(&self) -> String {
        format!(
            "{}_{}.har",
            self.host(),
            self.captured_at.format("%Y-%m-%dT%H-%M-%S")
        )
    }

    /// Returns `true` if the navigation deadline cut the capture short.
    #[inline]
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.navigation.is_timed_out()
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Runs captures against browsers from a [`BrowserLauncher`].
///
/// Holds no per-capture state; any number of captures may run concurrently
/// on a shared reference.
#[derive(Debug)]
pub struct Orchestrator<L> {
    launcher: L,
    config: CaptureConfig,
    assembler: HarAssembler,
}

impl<L: BrowserLauncher> Orchestrator<L> {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(launcher: L, config: CaptureConfig) -> Self {
        Self {
            launcher,
            config,
            assembler: HarAssembler::new(),
        }
    }

    /// Returns the launcher.
    #[inline]
    #[must_use]
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Returns the capture configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Captures the network activity of one page load.
    ///
    /// A navigation that outlives `navigation_timeout` is not an error: the
    /// outcome carries [`NavigationOutcome::TimedOut`] and whatever was
    /// collected.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the request does not name an http(s) URL;
    ///   no browser is acquired
    /// - a launch-class error if the browser could not start
    /// - [`Error::Navigation`] or [`Error::PageCrashed`] if the page failed
    /// - connection errors if the browser went away mid-navigation
    pub async fn capture(&self, request: &CaptureRequest) -> Result<CaptureOutcome> {
        let capture_id = CaptureId::generate();
        let span = info_span!("capture", id = %capture_id);
        self.run(capture_id, request).instrument(span).await
    }

    async fn run(&self, capture_id: CaptureId, request: &CaptureRequest) -> Result<CaptureOutcome> {
        let mut progress = Progress::default();

        let target = match request.normalize() {
            Ok(target) => target,
            Err(e) => return Err(progress.fail(e)),
        };

        progress.advance(CaptureState::Launching);
        info!(url = %target, "Starting capture");

        let mut session = match self.launcher.acquire().await {
            Ok(session) => session,
            Err(e) => return Err(progress.fail(e.into_launch_failure())),
        };

        let driven = self.drive(&mut session, &target, &mut progress).await;

        if let Err(e) = session.release().await {
            warn!(class = "TeardownError", error = %e, "Browser release failed");
        }

        let (collector, navigation) = match driven {
            Ok(driven) => driven,
            Err(e) => return Err(progress.fail(e)),
        };

        progress.advance(CaptureState::Assembling);
        if collector.unmatched_count() > 0 {
            debug!(unmatched = collector.unmatched_count(), "Responses dropped");
        }
        let har = self.assembler.assemble(collector.entries());
        progress.advance(CaptureState::Done);

        info!(
            entries = har.log.entries.len(),
            pending = collector.pending_count(),
            timed_out = navigation.is_timed_out(),
            "Capture complete"
        );

        let filename = format!("{}.har", target.host_str().unwrap_or("capture"));
        Ok(CaptureOutcome {
            capture_id,
            har,
            target,
            filename,
            captured_at: Utc::now(),
            navigation,
        })
    }

    /// Navigates and collects. Leaves `progress` in `Settling` on success.
    async fn drive(
        &self,
        session: &mut L::Session,
        target: &Url,
        progress: &mut Progress,
    ) -> Result<(NetworkCollector, NavigationOutcome)> {
        let mut collector = NetworkCollector::new();

        session.attach().await?;
        progress.advance(CaptureState::Navigating);

        let deadline = Instant::now() + self.config.navigation_timeout;
        let navigation = match timeout_at(
            deadline,
            navigate_until_idle(session, target, &mut collector),
        )
        .await
        {
            Ok(result) => {
                result?;
                NavigationOutcome::Settled
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.navigation_timeout.as_millis() as u64,
                    entries = collector.len(),
                    "Navigation timed out, keeping partial capture"
                );
                NavigationOutcome::TimedOut
            }
        };

        progress.advance(CaptureState::Settling);
        self.settle(session, &mut collector).await;

        Ok((collector, navigation))
    }

    /// Keeps collecting until the grace period ends or the page goes away.
    async fn settle(&self, session: &mut L::Session, collector: &mut NetworkCollector) {
        let grace = sleep(self.config.grace_period);
        tokio::pin!(grace);

        loop {
            tokio::select! {
                () = &mut grace => break,
                event = session.next_event() => match event {
                    Some(PageEvent::Crashed) | None => {
                        debug!("Page gone during grace period");
                        break;
                    }
                    Some(event) => collector.observe(&event),
                },
            }
        }
    }
}

/// Issues the navigation and collects until quiescence.
async fn navigate_until_idle<S: BrowserSession>(
    session: &mut S,
    target: &Url,
    collector: &mut NetworkCollector,
) -> Result<()> {
    session.navigate(target).await?;

    loop {
        match session.next_event().await {
            Some(PageEvent::NetworkIdle) => {
                debug!(entries = collector.len(), "Network idle");
                return Ok(());
            }
            Some(PageEvent::Crashed) => return Err(Error::page_crashed(target.as_str())),
            Some(event) => collector.observe(&event),
            None => return Err(Error::ConnectionClosed),
        }
    }
}

// ============================================================================
// Progress
// ============================================================================

/// State of one capture, with logged transitions.
#[derive(Debug)]
struct Progress {
    state: CaptureState,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }
}

impl Progress {
    fn advance(&mut self, next: CaptureState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        debug!(from = %self.state, to = %next, "Capture state");
        self.state = next;
    }

    fn fail(&mut self, error: Error) -> Error {
        let class = error.class();
        self.advance(CaptureState::Failed(class));
        warn!(class = %class, error = %error, "Capture failed");
        error
    }
}

// ============================================================================
// Tests
// ============================================================================
