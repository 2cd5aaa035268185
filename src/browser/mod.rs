//! Browser entities module.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Browser`] | Chromium instance (owns process + WebSocket + profile) |
//! | [`Page`] | Attached page target and its event stream |
//! | [`PageEvent`] | Events a capture consumes |
//! | [`NetworkCollector`] | Correlates network events into HAR entries |

// ============================================================================
// Submodules
// ============================================================================

/// Browser instance management.
pub mod instance;

/// Network event collection.
pub mod network;

/// Attached page target.
pub mod page;

// ============================================================================
// Re-exports
// ============================================================================

pub use instance::Browser;
pub(crate) use instance::ProcessGuard;
pub use network::NetworkCollector;
pub use page::{NETWORK_ALMOST_IDLE, Page, PageEvent};
