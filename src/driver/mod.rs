//! Chromium driver module.
//!
//! This module launches isolated headless Chromium instances.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Launches browser instances |
//! | [`DriverBuilder`] | Fluent configuration builder |
//! | [`LaunchOptions`] | Browser command-line options |
//! | [`Profile`] | Temporary user data directory |
//!
//! # Example
//!
//! ```no_run
//! use har_capture::{Driver, LaunchOptions, Result};
//!
//! # async fn example() -> Result<()> {
//! let driver = Driver::builder()
//!     .binary("/usr/bin/chromium")
//!     .options(LaunchOptions::new().with_window_size(1280, 720))
//!     .build()?;
//!
//! let browser = driver.launch().await?;
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation.
pub mod core;

/// Chromium launch options.
pub mod options;

/// Temporary profile management.
pub mod profile;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{BROWSER_CANDIDATES, DriverBuilder, discover_binary};
pub use core::Driver;
pub use options::{DEFAULT_HEIGHT, DEFAULT_LAUNCH_TIMEOUT, DEFAULT_WIDTH, LaunchOptions};
pub use profile::Profile;
