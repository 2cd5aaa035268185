//! WebSocket transport layer.
//!
//! This module handles communication between the local end (Rust) and the
//! browser's DevTools endpoint via WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Browser (Rust) │                              │  Chromium       │
//! │                 │         WebSocket            │                 │
//! │  Connection     │◄────────────────────────────►│  DevTools       │
//! │  → event loop   │  ws://127.0.0.1:PORT/devtools│  endpoint       │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. Launch Chromium with `--remote-debugging-port=0`
//! 2. `wait_for_endpoint` - Read the announced URL from stderr
//! 3. `Connection::connect` - Open the WebSocket, spawn the event loop
//! 4. `Connection::execute` / `subscribe` - Commands and per-session events
//! 5. `Connection::shutdown` - Close the socket, fail pending commands
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `endpoint` | DevTools endpoint discovery |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// DevTools endpoint discovery from browser stderr.
pub mod endpoint;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use endpoint::{parse_endpoint_line, wait_for_endpoint};
