//! Service configuration.
//!
//! Configuration is built once at startup (from CLI flags and environment,
//! see `main.rs`) and passed explicitly; there is no global state.
//!
//! | Type | Scope |
//! |------|-------|
//! | [`ServerConfig`] | Listen address and CORS origins |
//! | [`CaptureConfig`] | Browser binary and capture timings |
//! | [`AppConfig`] | Both of the above |

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::driver::{DEFAULT_LAUNCH_TIMEOUT, Driver, LaunchOptions};
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Origin allowed when none is configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://har-mvp.vercel.app";

/// Default upper bound for the navigation phase.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default grace period after the navigation phase.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

// ============================================================================
// ServerConfig
// ============================================================================

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to bind.
    pub port: u16,
    /// Browser origins allowed to call the API.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind.
    #[inline]
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns `true` if `origin` is on the allow list.
    ///
    /// Trailing slashes are ignored on both sides.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins
            .iter()
            .any(|allowed| allowed.trim_end_matches('/') == origin)
    }
}

// ============================================================================
// CaptureConfig
// ============================================================================

/// Browser and timing configuration of a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Explicit browser binary; discovered on `PATH` when `None`.
    pub chrome_path: Option<PathBuf>,
    /// Time allowed for the browser to start.
    pub launch_timeout: Duration,
    /// Upper bound for navigation plus quiescence.
    pub navigation_timeout: Duration,
    /// Extra collection time after the navigation phase.
    pub grace_period: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

impl CaptureConfig {
    /// Sets the navigation timeout.
    #[inline]
    #[must_use]
    pub fn with_navigation_timeout(mut self, navigation_timeout: Duration) -> Self {
        self.navigation_timeout = navigation_timeout;
        self
    }

    /// Sets the grace period.
    #[inline]
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Validates the timings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the navigation timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.navigation_timeout.is_zero() {
            return Err(Error::config("Navigation timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Builds the browser driver for this configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::BrowserNotFound`] if `chrome_path` does not exist
    /// - [`Error::Config`] if no browser is found on `PATH`
    pub fn driver(&self) -> Result<Driver> {
        Driver::builder()
            .binary_opt(self.chrome_path.clone())
            .options(LaunchOptions::new().with_launch_timeout(self.launch_timeout))
            .build()
    }
}

// ============================================================================
// AppConfig
// ============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Capture behavior.
    pub capture: CaptureConfig,
}

impl AppConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.server.allowed_origins.is_empty() {
            return Err(Error::config("At least one allowed origin is required"));
        }
        self.capture.validate()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.capture.navigation_timeout, Duration::from_secs(30));
        assert_eq!(config.capture.grace_period, Duration::from_secs(2));
        assert_eq!(config.capture.launch_timeout, Duration::from_secs(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_origin_matching_ignores_trailing_slash() {
        let server = ServerConfig {
            allowed_origins: vec!["https://har-mvp.vercel.app/".to_string()],
            ..ServerConfig::default()
        };
        assert!(server.is_origin_allowed("https://har-mvp.vercel.app"));
        assert!(server.is_origin_allowed("https://har-mvp.vercel.app/"));
        assert!(!server.is_origin_allowed("https://evil.example"));
        assert!(!server.is_origin_allowed("http://har-mvp.vercel.app"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let capture = CaptureConfig::default().with_navigation_timeout(Duration::ZERO);
        assert!(matches!(capture.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_origins() {
        let mut config = AppConfig::default();
        config.server.allowed_origins.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_driver_with_missing_binary() {
        let capture = CaptureConfig {
            chrome_path: Some(PathBuf::from("/nonexistent/chrome")),
            ..CaptureConfig::default()
        };
        assert!(matches!(capture.driver(), Err(Error::BrowserNotFound { .. })));
    }
}
