//! Encora API response types and fetch results

use core_library::{Collection, CollectionRecord};
use serde::Deserialize;
use std::fmt;

/// One page of the collection endpoint
///
/// ```json
/// { "data": [ ... ], "next_page_url": "https://encora.it/api/collection?page=2" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CollectionPage {
    /// Records on this page
    #[serde(default)]
    pub data: Vec<CollectionRecord>,

    /// Absolute URL of the next page; `null` on the last page
    #[serde(default)]
    pub next_page_url: Option<String>,
}

impl CollectionPage {
    /// The next page URL, treating an empty string as the end
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Why pagination stopped before the last page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The server answered with a non-success, non-429 status
    HttpStatus { status: u16, body: String },

    /// The same page stayed rate limited past the retry budget
    RateLimitExhausted { attempts: u32 },

    /// The server sent a next-page URL that cannot be requested
    InvalidNextPage { url: String, message: String },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::HttpStatus { status, body } => write!(f, "HTTP {} - {}", status, body),
            AbortReason::RateLimitExhausted { attempts } => {
                write!(f, "still rate limited after {} attempts", attempts)
            }
            AbortReason::InvalidNextPage { url, message } => {
                write!(f, "invalid next page URL '{}': {}", url, message)
            }
        }
    }
}

/// Whether every page was retrieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCompletion {
    Complete,
    Aborted(AbortReason),
}

/// Records accumulated by a fetch, complete or not
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Records in the order the pages returned them
    pub collection: Collection,

    /// Pages successfully retrieved
    pub pages: u32,

    pub completion: FetchCompletion,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.completion == FetchCompletion::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_page() {
        let json = r#"{
            "current_page": 1,
            "data": [
                {"id": 10, "recording": {"id": 7}},
                {"id": 11, "recording": {"id": 8}}
            ],
            "next_page_url": "https://encora.it/api/collection?page=2",
            "per_page": 500
        }"#;

        let page: CollectionPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(
            page.next_page(),
            Some("https://encora.it/api/collection?page=2")
        );
    }

    #[test]
    fn test_last_page() {
        let page: CollectionPage =
            serde_json::from_str(r#"{"data": [], "next_page_url": null}"#).unwrap();
        assert!(page.next_page().is_none());

        let page: CollectionPage = serde_json::from_str(r#"{"next_page_url": ""}"#).unwrap();
        assert!(page.data.is_empty());
        assert!(page.next_page().is_none());
    }

    #[test]
    fn test_abort_reason_display() {
        let reason = AbortReason::HttpStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(reason.to_string(), "HTTP 500 - boom");
    }
}
