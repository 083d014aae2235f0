//! Domain types: blob references and alternate-location hints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque key identifying a blob. For the HTTPS store it is also the literal
/// URL the blob is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    pub fn new(reference: impl Into<String>) -> Self {
        Reference(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Reference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Reference {
    fn from(s: &str) -> Self {
        Reference(s.to_string())
    }
}

impl From<String> for Reference {
    fn from(s: String) -> Self {
        Reference(s)
    }
}

/// A hint that the same blob can also be fetched from another place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub reference: Reference,
}

/// Collects mirror locations from `Link` header values.
///
/// Only entries whose `rel` parameter lists `duplicate` (RFC 6249) count.
/// Entries that cannot be parsed are skipped.
pub fn locations_from_links<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<Location> {
    values
        .into_iter()
        .flat_map(|value| value.split(','))
        .filter_map(parse_duplicate_link)
        .collect()
}

fn parse_duplicate_link(entry: &str) -> Option<Location> {
    let mut parts = entry.split(';');
    let target = parts.next()?.trim();
    let url = target.strip_prefix('<')?.strip_suffix('>')?.trim();
    if url.is_empty() {
        return None;
    }

    let is_duplicate = parts.any(|param| {
        let Some((key, value)) = param.split_once('=') else {
            return false;
        };
        key.trim().eq_ignore_ascii_case("rel")
            && value
                .trim()
                .trim_matches('"')
                .split_ascii_whitespace()
                .any(|rel| rel.eq_ignore_ascii_case("duplicate"))
    });

    is_duplicate.then(|| Location {
        reference: Reference::from(url),
    })
}
