//! Mark-unread targets, resolved once from the item URL shape

use regex::Regex;
use thiserror::Error;

/// URL shape the server has no mark-unread endpoint for
#[derive(Debug, Clone, PartialEq, Error)]
#[error("url not supported for mark-unread: {0}")]
pub struct UnsupportedTarget(pub String);

/// Where to send a mark-unread request for an item.
///
/// The two module families use different endpoints, so the variant is
/// picked once when the URL is parsed instead of re-matching per call.
#[derive(Debug, Clone, PartialEq)]
pub enum UnreadTarget {
    /// Service desk tickets: POST to the item path with `view` swapped for
    /// `make_unread`
    ServiceDesk { path: String },
    /// Tasks: POST to the shared operations endpoint with the task id
    Task { id: u64 },
}

impl UnreadTarget {
    pub fn parse(url: &str) -> Result<Self, UnsupportedTarget> {
        if url.contains("/servicedesk/") {
            return Ok(Self::ServiceDesk {
                path: url.replacen("view", "make_unread", 1),
            });
        }

        if url.contains("/tasks/") {
            let re = Regex::new(r"/view/(\d+)").unwrap();
            if let Some(id) = re.captures(url).and_then(|caps| caps[1].parse().ok()) {
                return Ok(Self::Task { id });
            }
        }

        Err(UnsupportedTarget(url.to_string()))
    }
}

/// Drop any `#fragment` from a URL
pub fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}
