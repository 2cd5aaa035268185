//! Capture lifecycle states.
//!
//! ```text
//! Idle ─► Launching ─► Navigating ─► Settling ─► Assembling ─► Done
//!  │          │            │
//!  └──────────┴────────────┴──► Failed
//! ```
//!
//! `Navigating → Settling` happens either on network quiescence or when the
//! navigation deadline passes; the latter is recorded as
//! [`NavigationOutcome::TimedOut`] and still ends in `Done`.

use std::fmt;

use crate::error::ErrorClass;

// ============================================================================
// CaptureState
// ============================================================================

/// Where a capture currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Request received, nothing started.
    Idle,
    /// Waiting for a browser instance.
    Launching,
    /// Navigation issued, waiting for quiescence or the deadline.
    Navigating,
    /// Grace period; events are still collected.
    Settling,
    /// Building the document.
    Assembling,
    /// Document ready.
    Done,
    /// Aborted with an error of the given class.
    Failed(ErrorClass),
}

impl CaptureState {
    /// Returns `true` if `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Launching)
                | (Self::Launching, Self::Navigating)
                | (Self::Navigating, Self::Settling)
                | (Self::Settling, Self::Assembling)
                | (Self::Assembling, Self::Done)
                | (Self::Idle | Self::Launching | Self::Navigating, Self::Failed(_))
        )
    }

    /// Returns `true` for `Done` and `Failed`.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Launching => "launching",
            Self::Navigating => "navigating",
            Self::Settling => "settling",
            Self::Assembling => "assembling",
            Self::Done => "done",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(class) => write!(f, "failed({class})"),
            other => f.write_str(other.as_str()),
        }
    }
}

// ============================================================================
// NavigationOutcome
// ============================================================================

/// How the navigation phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The page reached network quiescence.
    Settled,
    /// The deadline passed first; the capture is partial.
    TimedOut,
}

impl NavigationOutcome {
    /// Returns `true` for [`NavigationOutcome::TimedOut`].
    #[inline]
    #[must_use]
    pub const fn is_timed_out(self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            CaptureState::Idle,
            CaptureState::Launching,
            CaptureState::Navigating,
            CaptureState::Settling,
            CaptureState::Assembling,
            CaptureState::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failure_only_before_settling() {
        let failed = CaptureState::Failed(ErrorClass::Navigation);
        assert!(CaptureState::Idle.can_transition_to(failed));
        assert!(CaptureState::Launching.can_transition_to(failed));
        assert!(CaptureState::Navigating.can_transition_to(failed));
        assert!(!CaptureState::Settling.can_transition_to(failed));
        assert!(!CaptureState::Assembling.can_transition_to(failed));
        assert!(!CaptureState::Done.can_transition_to(failed));
    }

    #[test]
    fn test_no_skipping() {
        assert!(!CaptureState::Idle.can_transition_to(CaptureState::Navigating));
        assert!(!CaptureState::Navigating.can_transition_to(CaptureState::Done));
        assert!(!CaptureState::Done.can_transition_to(CaptureState::Idle));
    }

    #[test]
    fn test_display() {
        assert_eq!(CaptureState::Settling.to_string(), "settling");
        assert_eq!(
            CaptureState::Failed(ErrorClass::Launch).to_string(),
            "failed(LaunchFailure)"
        );
        assert!(CaptureState::Done.is_terminal());
        assert!(!CaptureState::Launching.is_terminal());
    }
}
