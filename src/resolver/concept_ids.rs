//! Concept identifier parsing.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[\s,]+").ok());

/// Split free text on whitespace and commas into concept identifiers.
///
/// Empty tokens are dropped and duplicates removed, keeping first-seen order.
///
/// # Examples
///
/// ```
/// use ocl_dict::resolver::parse_concept_ids;
///
/// assert_eq!(parse_concept_ids("1, 2\n3,,1"), vec!["1", "2", "3"]);
/// ```
#[must_use]
pub fn parse_concept_ids(input: &str) -> Vec<String> {
    match SEPARATORS.as_ref() {
        Some(separators) => normalize_ids(separators.split(input)),
        None => normalize_ids(input.split(|c: char| c.is_whitespace() || c == ',')),
    }
}

/// Trim, drop empties and deduplicate, keeping first-seen order.
pub fn normalize_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.as_ref().trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

/// Last non-empty path segment of a concept URL.
///
/// `/orgs/CIEL/sources/CIEL/concepts/1234/` yields `1234`.
#[must_use]
pub fn concept_id_from_url(url: &str) -> Option<&str> {
    url.trim_end_matches('/').rsplit('/').next().filter(|segment| !segment.is_empty())
}
