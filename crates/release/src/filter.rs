//! Tag filtering.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// A compiled set of tag patterns. A tag is accepted when at least one
/// pattern finds a match anywhere in it (anchor the pattern with `^`/`$` to
/// match whole tags). An empty filter accepts nothing.
///
/// Patterns are compiled up front, so an invalid pattern is reported when the
/// configuration is loaded rather than halfway through a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TagFilter {
    patterns: Vec<Regex>,
}
impl TagFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|e| {
                    Error::from(ErrorKind::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    })
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    /// Whether any pattern matches the tag.
    pub fn matches(&self, tag: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(tag))
    }

    /// Keep the matching tags, in their original order, dropping duplicates.
    pub fn filter<'a, I, S>(&self, tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + ?Sized + 'a,
    {
        let mut seen = std::collections::HashSet::new();
        tags.into_iter()
            .map(AsRef::as_ref)
            .filter(|tag| self.matches(tag))
            .filter(|tag| seen.insert(*tag))
            .map(str::to_string)
            .collect()
    }
}
impl TryFrom<Vec<String>> for TagFilter {
    type Error = Error;
    fn try_from(patterns: Vec<String>) -> Result<Self> {
        Self::new(patterns)
    }
}
impl From<TagFilter> for Vec<String> {
    fn from(filter: TagFilter) -> Self {
        filter.patterns().map(str::to_string).collect()
    }
}
impl PartialEq for TagFilter {
    fn eq(&self, other: &Self) -> bool {
        self.patterns().eq(other.patterns())
    }
}
impl Eq for TagFilter {}

/// Whether any of `patterns` matches `tag`. Compiles the patterns on every
/// call; prefer a [`TagFilter`] for repeated use.
pub fn matches(tag: &str, patterns: &[&str]) -> Result<bool> {
    Ok(TagFilter::new(patterns)?.matches(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SEMVER: &str = r"^[0-9]+\.[0-9]+\.[0-9]+$";

    #[rstest]
    #[case("1.2.0", &[SEMVER], true)]
    #[case("v1.2.0-rc1", &[SEMVER], false)]
    #[case("1.2.0", &[], false)]
    #[case("cdda-experimental-2024-01-01-1234", &["experimental"], true)]
    #[case("0.G", &[r"^0\.[A-Z]$", r"^0\.[A-Z]-[0-9]+$"], true)]
    #[case("0.G-2", &[r"^0\.[A-Z]$", r"^0\.[A-Z]-[0-9]+$"], true)]
    fn test_matches(#[case] tag: &str, #[case] patterns: &[&str], #[case] expected: bool) {
        assert_eq!(matches(tag, patterns).unwrap(), expected);
    }

    #[test]
    fn test_unanchored_search() {
        let filter = TagFilter::new(["rc"]).unwrap();
        assert!(filter.matches("v1.2.0-rc1"));
        assert!(!filter.matches("1.2.0"));
    }

    #[test]
    fn test_filter_keeps_order_and_drops_duplicates() {
        let filter = TagFilter::new([r"^[0-9]+\.[0-9]+$"]).unwrap();
        let discovered = ["2.0", "1.0", "1.0-beta", "2.0", "1.0"];
        assert_eq!(filter.filter(&discovered), vec!["2.0", "1.0"]);
    }

    #[test]
    fn test_filter_example() {
        let filter = TagFilter::new([r"^[0-9]+\.[0-9]+$"]).unwrap();
        let discovered = vec!["1.0".to_string(), "1.0-beta".to_string(), "2.0".to_string()];
        assert_eq!(filter.filter(&discovered), vec!["1.0", "2.0"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = TagFilter::new(["^[0-9"]).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPattern { pattern, .. } if pattern == "^[0-9"));
    }

    #[test]
    fn test_deserialize() {
        let filter: TagFilter = serde_json::from_str(r#"["^0\\.[A-Z]$"]"#).unwrap();
        assert!(filter.matches("0.F"));
        assert!(serde_json::from_str::<TagFilter>(r#"["("]"#).is_err());
    }
}
