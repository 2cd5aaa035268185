//! Type-safe identifiers for protocol and capture entities.
//!
//! Newtype wrappers prevent mixing a CDP session id with a target id, or a
//! command id with anything else, at compile time.
//!
//! | Type | Source | Purpose |
//! |------|--------|---------|
//! | [`CommandId`] | local counter | Correlates a command with its response |
//! | [`SessionId`] | browser | Routes events of one attached page |
//! | [`TargetId`] | browser | Names a page target |
//! | [`CaptureId`] | local uuid | Tags the logs of one capture run |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// CommandId
// ============================================================================

/// Process-wide counter for command ids.
static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a CDP command.
///
/// CDP expects a positive integer that is unique per connection. A single
/// process-wide counter satisfies that for every connection at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(u64);

impl CommandId {
    /// Allocates the next command id.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a raw id received from the wire.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// CDP session id returned by `Target.attachToTarget` in flat mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a session id string.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// TargetId
// ============================================================================

/// CDP target id of a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Wraps a target id string.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// CaptureId
// ============================================================================

/// Identifier of one capture run, used as a tracing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureId(Uuid);

impl CaptureId {
    /// Generates a fresh random id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
