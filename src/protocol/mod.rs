//! Chrome DevTools Protocol message types.
//!
//! This module defines the JSON messages exchanged with the browser's
//! DevTools WebSocket endpoint.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Browser | Command with numeric `id` |
//! | `Response` | Browser → Local | Result or error for an `id` |
//! | `Event` | Browser → Local | Notification, no `id` |
//!
//! Page-level messages carry a `sessionId` (flat session mode); browser-level
//! ones do not.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by domain |
//! | `event` | Event types and typed payloads |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by domain.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{
    BrowserCommand, Command, EmulationCommand, NetworkCommand, PageCommand, TargetCommand,
};
pub use event::{
    Event, Headers, LifecycleEvent, ParsedEvent, RequestPayload, RequestWillBeSent,
    ResponsePayload, ResponseReceived,
};
pub use request::{ProtocolError, Request, Response};
