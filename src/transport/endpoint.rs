//! DevTools endpoint discovery.
//!
//! Chromium started with `--remote-debugging-port=0` picks a free port and
//! announces the browser WebSocket URL on stderr:
//!
//! ```text
//! DevTools listening on ws://127.0.0.1:41023/devtools/browser/6f0e...
//! ```
//!
//! [`wait_for_endpoint`] reads stderr until that line appears, then keeps
//! draining the pipe in the background so the browser never blocks on a full
//! stderr buffer.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Matches the endpoint announcement line.
static ENDPOINT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"DevTools listening on (ws://\S+)").ok());

/// Number of stderr lines kept for the error message when launch fails.
const STDERR_TAIL: usize = 5;

// ============================================================================
// Discovery
// ============================================================================

/// Extracts the WebSocket URL from one stderr line.
#[must_use]
pub fn parse_endpoint_line(line: &str) -> Option<&str> {
    ENDPOINT_PATTERN
        .as_ref()?
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Waits for the browser to announce its DevTools endpoint.
///
/// # Errors
///
/// - [`Error::ConnectionTimeout`] if nothing is announced within `launch_timeout`
/// - [`Error::LaunchFailed`] if stderr closes first (the browser exited)
pub async fn wait_for_endpoint<R>(stderr: R, launch_timeout: Duration) -> Result<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(stderr).lines();

    let ws_url = timeout(launch_timeout, read_until_endpoint(&mut lines))
        .await
        .map_err(|_| Error::connection_timeout(launch_timeout.as_millis() as u64))??;

    debug!(url = %ws_url, "DevTools endpoint discovered");

    tokio::spawn(async move {
        while let Ok(Some(line)) = lines.next_line().await {
            trace!(line = %line, "browser stderr");
        }
    });

    Ok(ws_url)
}

/// Reads lines until the announcement, keeping a short tail for diagnostics.
async fn read_until_endpoint<R>(lines: &mut Lines<BufReader<R>>) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(STDERR_TAIL);

    while let Some(line) = lines.next_line().await? {
        if let Some(url) = parse_endpoint_line(&line) {
            return Ok(url.to_string());
        }

        trace!(line = %line, "browser stderr");
        if tail.len() == STDERR_TAIL {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    let output = tail.iter().map(String::as_str).collect::<Vec<_>>().join(" | ");
    Err(Error::launch_failed(format!(
        "browser exited before exposing a DevTools endpoint: {output}"
    )))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_parse_endpoint_line() {
        let line = "DevTools listening on ws://127.0.0.1:9222/devtools/browser/abc-123";
        assert_eq!(
            parse_endpoint_line(line),
            Some("ws://127.0.0.1:9222/devtools/browser/abc-123")
        );
        assert_eq!(parse_endpoint_line("[WARNING] something else"), None);
    }

    #[test]
    fn test_endpoint_pattern_compiles() {
        assert!(ENDPOINT_PATTERN.is_some());
        assert_eq!(
            parse_endpoint_line("  DevTools listening on ws://[::1]:9222/devtools/browser/x  "),
            Some("ws://[::1]:9222/devtools/browser/x")
        );
    }

    #[tokio::test]
    async fn test_endpoint_found_after_noise() {
        let stderr: &[u8] = b"[0101/000000.000:WARNING] noise\n\nDevTools listening on ws://127.0.0.1:1/devtools/browser/x\nmore\n";
        let url = wait_for_endpoint(stderr, Duration::from_secs(1))
            .await
            .expect("endpoint");
        assert_eq!(url, "ws://127.0.0.1:1/devtools/browser/x");
    }

    #[tokio::test]
    async fn test_exit_before_endpoint() {
        let stderr: &[u8] = b"error while loading shared libraries: libnss3.so\n";
        let err = wait_for_endpoint(stderr, Duration::from_secs(1))
            .await
            .expect_err("should fail");
        assert!(matches!(err, Error::LaunchFailed { .. }));
        assert!(err.to_string().contains("libnss3.so"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_browser_times_out() {
        let (reader, mut writer) = tokio::io::duplex(64);
        writer.write_all(b"starting\n").await.expect("write");

        let err = wait_for_endpoint(reader, Duration::from_secs(20))
            .await
            .expect_err("should time out");
        assert!(matches!(err, Error::ConnectionTimeout { timeout_ms: 20_000 }));
        drop(writer);
    }
}
