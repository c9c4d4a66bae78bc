//! Noise-tag filtering for aggregation.
//!
//! The event tagger emits boilerplate spans (bylines, datelines, broadcaster
//! names) and numeric artefacts alongside real events. They are kept in the
//! stored tag set and dropped when counting.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DAY_COUNT_RE: Regex = Regex::new(r"\d+-D").unwrap();
    static ref DIGITS_RE: Regex = Regex::new(r"^\d+$").unwrap();
}

/// Boilerplate spans seen in Singapore and Malaysian feeds.
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &[
    "Singapore SINGAPORE",
    "Star Media Group Berhad",
    "KUALA LUMPUR",
    "ST SINGAPORE",
    "FILE SINGAPORE",
    "Report it to us",
    "Astro Awani",
    "Report it",
    "ST FILE SINGAPORE",
    "pleaded guilty",
    "pleading guilty",
    "plead guilty",
    "Astro AWANI",
];

#[derive(Debug, Clone)]
pub struct TagFilter {
    excluded: HashSet<String>,
    drop_numeric: bool,
}

impl TagFilter {
    pub fn new<I, S>(excluded: I, drop_numeric: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
            drop_numeric,
        }
    }

    /// A filter that keeps every tag.
    pub fn permissive() -> Self {
        Self::new(Vec::<String>::new(), false)
    }

    pub fn is_noise(&self, tag: &str) -> bool {
        if self.excluded.contains(tag) {
            return true;
        }
        self.drop_numeric && (DAY_COUNT_RE.is_match(tag) || DIGITS_RE.is_match(tag))
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_TAGS.iter().copied(), true)
    }
}
