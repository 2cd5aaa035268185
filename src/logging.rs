//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the default filter. Output always goes to stderr so
//! `har-capture capture <url> -o -` can write the document to stdout.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tower_http=debug,hyper=info";

/// Filter used with `--verbose` when `RUST_LOG` is unset.
pub const VERBOSE_FILTER: &str = "debug,hyper=info,tungstenite=info,tokio_tungstenite=info";

// ============================================================================
// LogFormat
// ============================================================================

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line, human-readable.
    #[default]
    Pretty,
    /// Single line per event.
    Compact,
}

impl LogFormat {
    /// Returns the format name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!(
                "unknown log format '{other}' (expected json, pretty or compact)"
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`Error::Config`] if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_file(verbose)
                    .with_line_number(verbose)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| Error::config(format!("Failed to install tracing subscriber: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
