//! HAR capture - record a page load's network activity as an HTTP Archive.
//!
//! This library launches an isolated headless Chromium per capture, drives it
//! over the Chrome DevTools Protocol, and assembles the observed requests and
//! responses into a HAR 1.2 document.
//!
//! # Architecture
//!
//! - **Transport**: one WebSocket per browser, owned by an event-loop task;
//!   commands are correlated by id, events routed by CDP session
//! - **Browser**: process + profile + connection + one attached [`Page`]
//! - **Capture**: the [`Orchestrator`] runs validate, launch, navigate,
//!   settle and assemble, releasing the browser on every path
//! - **Server**: `POST /api/har` on top of the orchestrator
//!
//! # Quick Start
//!
//! ```no_run
//! use har_capture::{CaptureConfig, CaptureRequest, Orchestrator, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = CaptureConfig::default();
//!     let orchestrator = Orchestrator::new(config.driver()?, config);
//!
//!     let outcome = orchestrator.capture(&CaptureRequest::new("example.com")).await?;
//!     println!("{} entries", outcome.har.log.entries.len());
//!     std::fs::write(outcome.timestamped_filename(), outcome.har.to_json_pretty()?)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Browser instance, page and network collector |
//! | [`capture`] | Capture request, state machine and orchestrator |
//! | [`config`] | Server and capture configuration |
//! | [`driver`] | Chromium discovery and launch |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`har`] | HAR document model and assembler |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`logging`] | Tracing subscriber setup |
//! | [`protocol`] | CDP message types (internal) |
//! | [`server`] | HTTP API |
//! | [`testing`] | Scripted launcher for tests |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Browser entities: instance, page, network collector.
pub mod browser;

/// Capture core.
///
/// Use [`Orchestrator::capture`] to run a capture.
pub mod capture;

/// Service configuration.
pub mod config;

/// Chromium discovery and launch.
///
/// Use [`Driver::builder()`] to create a configured driver instance.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// HAR document model and assembler.
pub mod har;

/// Type-safe identifiers.
pub mod identifiers;

/// Tracing subscriber setup.
pub mod logging;

/// Chrome DevTools Protocol message types.
///
/// Internal module defining command/response/event structures.
pub mod protocol;

/// HTTP API.
pub mod server;

/// Scripted browser stand-ins for tests.
pub mod testing;

/// WebSocket transport layer.
///
/// Internal module handling the DevTools endpoint and connection.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{Browser, NetworkCollector, Page, PageEvent};

// Capture types
pub use capture::{
    BrowserLauncher, BrowserSession, CaptureOutcome, CaptureRequest, CaptureState,
    NavigationOutcome, Orchestrator,
};

// Configuration
pub use config::{AppConfig, CaptureConfig, ServerConfig};

// Driver types
pub use driver::{Driver, DriverBuilder, LaunchOptions, Profile};

// Error types
pub use error::{Error, ErrorClass, Result};

// HAR types
pub use har::{HarAssembler, HarDocument};

// Identifier types
pub use identifiers::{CaptureId, CommandId, SessionId, TargetId};

// Logging
pub use logging::{LogFormat, init_tracing};
