//! Page URL helpers

use crate::error::{EncoraError, Result};
use url::Url;

/// Query parameter carrying the page size
pub const PER_PAGE_PARAM: &str = "per_page";

/// Pin the `per_page` query parameter of `url` to `per_page`
///
/// Existing `per_page` parameters are rewritten in place; every other
/// parameter keeps its position and its exact encoding. When the URL has no
/// `per_page`, one is appended.
///
/// ```
/// use provider_encora::pagination::with_page_size;
///
/// let url = with_page_size("https://encora.it/api/collection?page=2&per_page=15", 500).unwrap();
/// assert_eq!(url, "https://encora.it/api/collection?page=2&per_page=500");
/// ```
pub fn with_page_size(url: &str, per_page: u32) -> Result<String> {
    let mut parsed = Url::parse(url).map_err(|e| EncoraError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let pinned = format!("{}={}", PER_PAGE_PARAM, per_page);
    let mut found = false;

    let mut segments: Vec<String> = parsed
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let key = segment.split('=').next().unwrap_or(segment);
            if key == PER_PAGE_PARAM {
                found = true;
                pinned.clone()
            } else {
                segment.to_string()
            }
        })
        .collect();

    if !found {
        segments.push(pinned);
    }

    parsed.set_query(Some(&segments.join("&")));
    Ok(parsed.into())
}
