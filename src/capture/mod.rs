//! Capture core.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CaptureRequest`] | Raw target plus URL normalization |
//! | [`CaptureState`] | Lifecycle of one capture |
//! | [`BrowserLauncher`] / [`BrowserSession`] | Browser acquisition seam |
//! | [`Orchestrator`] | Runs captures end to end |
//! | [`CaptureOutcome`] | Result of a finished capture |

// ============================================================================
// Submodules
// ============================================================================

/// Browser acquisition traits.
pub mod launcher;

/// End-to-end capture driver.
pub mod orchestrator;

/// Capture target validation.
pub mod request;

/// Capture lifecycle states.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use launcher::{BrowserLauncher, BrowserSession};
pub use orchestrator::{CaptureOutcome, Orchestrator};
pub use request::{CaptureRequest, normalize_url};
pub use state::{CaptureState, NavigationOutcome};
