//! HAR 1.2 document types.
//!
//! Only the subset of the format that a header-level capture can fill is
//! modelled. Sizes and timings the capture does not measure are `-1`, as the
//! format prescribes for unknown values.
//!
//! # Document Shape
//!
//! ```json
//! {
//!   "log": {
//!     "version": "1.2",
//!     "creator": { "name": "har-capture", "version": "0.1.0" },
//!     "pages": [],
//!     "entries": [
//!       {
//!         "startedDateTime": "2024-05-01T12:00:00.123Z",
//!         "request": { "method": "GET", "url": "...", ... },
//!         "response": null,
//!         "cache": {},
//!         "timings": { "send": -1, "wait": -1, "receive": -1 }
//!       }
//!     ]
//!   }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// HAR format version.
pub const HAR_VERSION: &str = "1.2";

/// Value used for sizes and timings that were not measured.
pub const UNKNOWN: i64 = -1;

/// Header map, serialized in sorted key order.
pub type Headers = BTreeMap<String, String>;

// ============================================================================
// Document
// ============================================================================

/// Root of a HAR file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarDocument {
    /// The log.
    pub log: Log,
}

impl HarDocument {
    /// Serializes the document as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The `log` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Log {
    /// Always [`HAR_VERSION`].
    pub version: String,
    /// Producer of the file.
    pub creator: Creator,
    /// Page records; always empty.
    pub pages: Vec<Value>,
    /// Entries in request-sent order.
    pub entries: Vec<Entry>,
}

/// Name and version of the producing application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Creator {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
}

impl Creator {
    /// Identity of this crate.
    #[must_use]
    pub fn this_crate() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// ============================================================================
// Entry
// ============================================================================

/// One observed request and, if it arrived, its response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// RFC 3339 UTC time the request was issued.
    pub started_date_time: String,
    /// The request.
    pub request: Request,
    /// The response; `null` when none was observed.
    pub response: Option<Response>,
    /// Cache information; always empty.
    pub cache: Cache,
    /// Phase timings; always unknown.
    pub timings: Timings,
}

impl Entry {
    /// Creates an entry without a response.
    #[must_use]
    pub fn new(started_date_time: String, request: Request) -> Self {
        Self {
            started_date_time,
            request,
            response: None,
            cache: Cache {},
            timings: Timings::default(),
        }
    }

    /// Returns `true` while no response is attached.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.response.is_none()
    }
}

/// The `request` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// HTTP method.
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: Headers,
    /// Decoded query parameters.
    pub query_string: Vec<QueryParam>,
    /// Always empty.
    pub cookies: Vec<Value>,
    /// Always [`UNKNOWN`].
    pub headers_size: i64,
    /// Always [`UNKNOWN`].
    pub body_size: i64,
}

/// One query string parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParam {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

/// The `response` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// HTTP status text.
    pub status_text: String,
    /// Response headers.
    pub headers: Headers,
    /// Body description.
    pub content: Content,
    /// Target of a redirect, empty otherwise.
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
    /// Always [`UNKNOWN`].
    pub headers_size: i64,
    /// Always [`UNKNOWN`].
    pub body_size: i64,
}

/// The `content` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Always [`UNKNOWN`].
    pub size: i64,
    /// MIME type reported by the browser.
    pub mime_type: String,
}

/// The `cache` object; serialized as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Cache {}

/// The `timings` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timings {
    /// Time to send the request.
    pub send: i64,
    /// Time waiting for the first byte.
    pub wait: i64,
    /// Time to read the response.
    pub receive: i64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            send: UNKNOWN,
            wait: UNKNOWN,
            receive: UNKNOWN,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn request() -> Request {
        Request {
            method: "GET".into(),
            url: "https://example.com/?q=1".into(),
            headers: Headers::from([("Accept".to_string(), "*/*".to_string())]),
            query_string: vec![QueryParam {
                name: "q".into(),
                value: "1".into(),
            }],
            cookies: Vec::new(),
            headers_size: UNKNOWN,
            body_size: UNKNOWN,
        }
    }

    #[test]
    fn test_pending_entry_serialization() {
        let entry = Entry::new("2024-05-01T12:00:00.000Z".into(), request());
        let value = serde_json::to_value(&entry).expect("serialize");

        assert_eq!(
            value,
            json!({
                "startedDateTime": "2024-05-01T12:00:00.000Z",
                "request": {
                    "method": "GET",
                    "url": "https://example.com/?q=1",
                    "headers": { "Accept": "*/*" },
                    "queryString": [{ "name": "q", "value": "1" }],
                    "cookies": [],
                    "headersSize": -1,
                    "bodySize": -1
                },
                "response": null,
                "cache": {},
                "timings": { "send": -1, "wait": -1, "receive": -1 }
            })
        );
    }

    #[test]
    fn test_response_field_names() {
        let response = Response {
            status: 301,
            status_text: "Moved Permanently".into(),
            headers: Headers::new(),
            content: Content {
                size: UNKNOWN,
                mime_type: "text/html".into(),
            },
            redirect_url: "https://www.example.com/".into(),
            headers_size: UNKNOWN,
            body_size: UNKNOWN,
        };
        let value = serde_json::to_value(&response).expect("serialize");

        assert_eq!(value["redirectURL"], "https://www.example.com/");
        assert_eq!(value["statusText"], "Moved Permanently");
        assert_eq!(value["content"]["mimeType"], "text/html");
        assert_eq!(value["content"]["size"], -1);
    }

    #[test]
    fn test_creator_is_this_crate() {
        let creator = Creator::this_crate();
        assert_eq!(creator.name, "har-capture");
        assert!(!creator.version.is_empty());
    }
}
