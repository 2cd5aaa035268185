//! Network event collection.
//!
//! The [`NetworkCollector`] turns the request/response events of one page into
//! HAR entries:
//!
//! - every `Network.requestWillBeSent` appends a new entry with a `null`
//!   response
//! - every `Network.responseReceived` fills the *first* entry whose request
//!   URL equals the response URL and whose response is still `null`
//! - a response that matches nothing is dropped
//!
//! Correlation is by URL, not by request id, so two requests to the same URL
//! are answered in the order they were sent even if their responses arrive
//! the other way round.
//!
//! Redirects never produce a `responseReceived`; the redirect response rides
//! on the next hop's `requestWillBeSent` instead. It is correlated the same
//! way and its `redirectURL` points at the next hop.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;
use url::Url;

use crate::har::{Content, Entry, QueryParam, Request, Response, UNKNOWN};
use crate::protocol::{RequestWillBeSent, ResponsePayload};

use super::page::PageEvent;

// ============================================================================
// NetworkCollector
// ============================================================================

/// Accumulates HAR entries for one page, in request-sent order.
#[derive(Debug, Clone, Default)]
pub struct NetworkCollector {
    /// Entries in request-sent order.
    entries: Vec<Entry>,
    /// Responses that matched no pending entry.
    unmatched: usize,
}

impl NetworkCollector {
    /// Creates an empty collector.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one page event. Non-network events are ignored.
    pub fn observe(&mut self, event: &PageEvent) {
        match event {
            PageEvent::RequestWillBeSent(sent) => self.record_request(sent),
            PageEvent::ResponseReceived(received) => {
                self.record_response(&received.response, String::new());
            }
            PageEvent::NetworkIdle | PageEvent::Crashed => {}
        }
    }

    /// Appends an entry for an outgoing request.
    ///
    /// A carried redirect response is correlated first.
    pub fn record_request(&mut self, sent: &RequestWillBeSent) {
        if let Some(redirect) = &sent.redirect_response {
            self.record_response(redirect, sent.request.url.clone());
        }

        let request = Request {
            method: sent.request.method.clone(),
            url: sent.request.url.clone(),
            headers: sent.request.headers.clone(),
            query_string: query_string(&sent.request.url),
            cookies: Vec::new(),
            headers_size: UNKNOWN,
            body_size: UNKNOWN,
        };

        self.entries
            .push(Entry::new(started_date_time(sent.wall_time), request));
    }

    /// Attaches a response to the first pending entry with the same URL.
    ///
    /// Returns `false` if no entry matched; the response is then dropped.
    pub fn record_response(&mut self, response: &ResponsePayload, redirect_url: String) -> bool {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.is_pending() && entry.request.url == response.url)
        else {
            self.unmatched += 1;
            debug!(url = %response.url, status = response.status, "Dropping unmatched response");
            return false;
        };

        entry.response = Some(Response {
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
            content: Content {
                size: UNKNOWN,
                mime_type: response.mime_type.clone(),
            },
            redirect_url,
            headers_size: UNKNOWN,
            body_size: UNKNOWN,
        });
        true
    }

    /// Returns the collected entries.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries still without a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    /// Returns the number of dropped responses.
    #[inline]
    #[must_use]
    pub fn unmatched_count(&self) -> usize {
        self.unmatched
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Formats the protocol wall time, or now when the event carried none.
fn started_date_time(wall_time: Option<f64>) -> String {
    let time = wall_time
        .and_then(|secs| DateTime::<Utc>::from_timestamp_micros((secs * 1_000_000.0) as i64))
        .unwrap_or_else(Utc::now);
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decodes the query parameters of `url`; empty if it does not parse.
fn query_string(url: &str) -> Vec<QueryParam> {
    Url::parse(url)
        .map(|url| {
            url.query_pairs()
                .map(|(name, value)| QueryParam {
                    name: name.into_owned(),
                    value: value.into_owned(),
                })
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
