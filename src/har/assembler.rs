//! Collected entries to HAR document.
//!
//! Assembly is pure: no I/O, no reordering, no filtering. Entries without a
//! response stay `null` even though strict HAR validators reject that.

use super::model::{Creator, Entry, HAR_VERSION, HarDocument, Log};

/// Builds HAR documents with a fixed creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarAssembler {
    creator: Creator,
}

impl Default for HarAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl HarAssembler {
    /// Creates an assembler that signs documents as this crate.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            creator: Creator::this_crate(),
        }
    }

    /// Creates an assembler with a custom creator.
    #[inline]
    #[must_use]
    pub fn with_creator(creator: Creator) -> Self {
        Self { creator }
    }

    /// Wraps `entries` into a HAR 1.2 document, preserving their order.
    #[must_use]
    pub fn assemble(&self, entries: &[Entry]) -> HarDocument {
        HarDocument {
            log: Log {
                version: HAR_VERSION.to_string(),
                creator: self.creator.clone(),
                pages: Vec::new(),
                entries: entries.to_vec(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::har::model::{Headers, Request, UNKNOWN};

    fn entry(url: &str) -> Entry {
        Entry::new(
            "2024-05-01T12:00:00.000Z".into(),
            Request {
                method: "GET".into(),
                url: url.into(),
                headers: Headers::from([
                    ("b-header".to_string(), "2".to_string()),
                    ("a-header".to_string(), "1".to_string()),
                ]),
                query_string: Vec::new(),
                cookies: Vec::new(),
                headers_size: UNKNOWN,
                body_size: UNKNOWN,
            },
        )
    }

    #[test]
    fn test_empty_document() {
        let har = HarAssembler::new().assemble(&[]);
        assert_eq!(har.log.version, "1.2");
        assert!(har.log.pages.is_empty());
        assert!(har.log.entries.is_empty());
    }

    #[test]
    fn test_order_and_nulls_preserved() {
        let entries = [entry("https://a/"), entry("https://b/"), entry("https://a/")];
        let har = HarAssembler::new().assemble(&entries);

        let urls: Vec<_> = har.log.entries.iter().map(|e| e.request.url.as_str()).collect();
        assert_eq!(urls, ["https://a/", "https://b/", "https://a/"]);
        assert!(har.log.entries.iter().all(Entry::is_pending));

        let json: serde_json::Value =
            serde_json::from_str(&har.to_json_pretty().expect("json")).expect("parse");
        assert!(json["log"]["entries"][0]["response"].is_null());
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let entries = [entry("https://a/?x=1"), entry("https://b/")];
        let assembler = HarAssembler::new();

        let first = assembler.assemble(&entries).to_json_pretty().expect("json");
        let second = assembler.assemble(&entries).to_json_pretty().expect("json");
        assert_eq!(first, second);
        assert!(first.find("a-header") < first.find("b-header"));
    }

    #[test]
    fn test_custom_creator() {
        let creator = Creator {
            name: "HAR Viewer".into(),
            version: "1.0".into(),
        };
        let har = HarAssembler::with_creator(creator.clone()).assemble(&[]);
        assert_eq!(har.log.creator, creator);
    }
}
