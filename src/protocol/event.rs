//! Event message types.
//!
//! Events are notifications the browser pushes over the DevTools connection
//! when page or network activity occurs. They carry no `id`.
//!
//! # Event Types
//!
//! | Domain | Events |
//! |--------|--------|
//! | `Network` | `requestWillBeSent`, `responseReceived` |
//! | `Page` | `lifecycleEvent` |
//! | `Inspector` | `targetCrashed` |
//! | `Target` | `detachedFromTarget` |

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::identifiers::SessionId;

// ============================================================================
// Event
// ============================================================================

/// An event notification from the browser.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.eventName",
///   "params": { ... },
///   "sessionId": "8E1F..."
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,

    /// Session the event belongs to; `None` for browser-level events.
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<SessionId>,
}

impl Event {
    /// Returns the session a `Target.detachedFromTarget` notice refers to.
    ///
    /// The notice arrives on the parent session, not on the detached one.
    #[must_use]
    pub fn detached_session(&self) -> Option<SessionId> {
        if self.method != "Target.detachedFromTarget" {
            return None;
        }
        self.params
            .get("sessionId")
            .and_then(Value::as_str)
            .map(SessionId::new)
    }

    /// Parses the event into a typed variant.
    ///
    /// Events whose params do not match the expected shape become
    /// [`ParsedEvent::Unknown`].
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.method.as_str() {
            "Network.requestWillBeSent" => self
                .params_as()
                .map(ParsedEvent::NetworkRequestWillBeSent),
            "Network.responseReceived" => self
                .params_as()
                .map(ParsedEvent::NetworkResponseReceived),
            "Page.lifecycleEvent" => self.params_as().map(ParsedEvent::PageLifecycle),
            "Inspector.targetCrashed" => Some(ParsedEvent::InspectorTargetCrashed),
            "Target.detachedFromTarget" => Some(ParsedEvent::TargetDetached {
                session_id: self.get_string("sessionId"),
            }),
            _ => None,
        }
        .unwrap_or_else(|| ParsedEvent::Unknown {
            method: self.method.clone(),
            params: self.params.clone(),
        })
    }

    /// Deserializes params into a typed payload.
    fn params_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.params.clone()).ok()
    }

    /// Gets a string from params.
    #[inline]
    fn get_string(&self, key: &str) -> String {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone)]
pub enum ParsedEvent {
    /// A request is about to be sent.
    NetworkRequestWillBeSent(RequestWillBeSent),

    /// Response headers are available.
    NetworkResponseReceived(ResponseReceived),

    /// A page lifecycle milestone.
    PageLifecycle(LifecycleEvent),

    /// The renderer crashed.
    InspectorTargetCrashed,

    /// A session was detached.
    TargetDetached {
        /// Detached session id.
        session_id: String,
    },

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

// ============================================================================
// Payloads
// ============================================================================

/// Header map as reported by the browser.
///
/// Keys keep their original case. A `BTreeMap` gives stable ordering when the
/// map is serialized again.
pub type Headers = BTreeMap<String, String>;

/// Params of `Network.requestWillBeSent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSent {
    /// Browser request id; shared by every hop of a redirect chain.
    pub request_id: String,
    /// Loader that issued the request.
    #[serde(default)]
    pub loader_id: String,
    /// Monotonic timestamp in seconds.
    #[serde(default)]
    pub timestamp: f64,
    /// Wall clock time in seconds since the epoch.
    #[serde(default)]
    pub wall_time: Option<f64>,
    /// The outgoing request.
    pub request: RequestPayload,
    /// Present when this request is a redirect hop; the response that caused it.
    #[serde(default)]
    pub redirect_response: Option<ResponsePayload>,
    /// Resource type (Document, Script, XHR, ...).
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
}

/// Request object inside network events.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    /// Request URL without fragment.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Request headers.
    #[serde(default, deserialize_with = "lossy_headers")]
    pub headers: Headers,
}

/// Params of `Network.responseReceived`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseReceived {
    /// Browser request id.
    pub request_id: String,
    /// Loader that issued the request.
    #[serde(default)]
    pub loader_id: String,
    /// Monotonic timestamp in seconds.
    #[serde(default)]
    pub timestamp: f64,
    /// The response.
    pub response: ResponsePayload,
    /// Resource type.
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
}

/// Response object inside network events.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    /// Response URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// HTTP status text.
    #[serde(default)]
    pub status_text: String,
    /// Response headers.
    #[serde(default, deserialize_with = "lossy_headers")]
    pub headers: Headers,
    /// MIME type as determined by the browser.
    #[serde(default)]
    pub mime_type: String,
}

/// Params of `Page.lifecycleEvent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    /// Frame the milestone belongs to.
    pub frame_id: String,
    /// Loader of the navigation.
    pub loader_id: String,
    /// Milestone name (`init`, `load`, `networkAlmostIdle`, `networkIdle`, ...).
    pub name: String,
    /// Monotonic timestamp in seconds.
    #[serde(default)]
    pub timestamp: f64,
}

/// Deserializes a header object, stringifying non-string values.
fn lossy_headers<'de, D>(deserializer: D) -> Result<Headers, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (name, value)
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
