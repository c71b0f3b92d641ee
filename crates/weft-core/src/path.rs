//! Dotted path expressions into a data tree.
//!
//! [`KeyPath`] is the shared path vocabulary: the resolver walks one, the
//! observer stamps change events with one, and the mutation gate reports
//! applied and dropped writes by one.
//!
//! # Invariants
//!
//! 1. **Parsing is infallible.** Any string yields a `KeyPath`; malformed
//!    input degrades at resolution time (a segment that matches no key),
//!    never at parse time.
//! 2. Segments are split on `.` with ASCII whitespace trimmed around each
//!    segment. Empty segments are kept; they simply never match a key.
//! 3. `Display` re-joins segments with `.`; for paths without empty or
//!    whitespace-padded segments, `parse` and `Display` round-trip.

use core::fmt;

/// An ordered list of mapping keys, addressing a node in a data tree.
///
/// The root path (empty segment list) names the tree itself. Note that
/// `KeyPath::parse("")` is *not* the root: it yields a single empty
/// segment, which matches nothing, mirroring how an empty marker
/// expression resolves to nothing rather than the whole tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted path expression. Never fails.
    #[must_use]
    pub fn parse(expr: &str) -> Self {
        Self {
            segments: expr
                .split('.')
                .map(|segment| {
                    segment
                        .trim_matches(|c: char| c.is_ascii_whitespace())
                        .to_string()
                })
                .collect(),
        }
    }

    /// The path naming the tree root (no segments).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from pre-split segments.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The ordered segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Alias for [`is_root`](Self::is_root), for collection-style callers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// A new path with `key` appended.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.into());
        Self { segments }
    }

    /// A new path with every segment of `other` appended after this one.
    #[must_use]
    pub fn concat(&self, other: &KeyPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Segments joined with an arbitrary separator.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.segments.join(separator)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("."))
    }
}

impl From<&str> for KeyPath {
    fn from(expr: &str) -> Self {
        Self::parse(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_dots() {
        let path = KeyPath::parse("info.author");
        assert_eq!(path.segments(), ["info", "author"]);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn parse_trims_ascii_whitespace() {
        let path = KeyPath::parse("  address . street\t.num ");
        assert_eq!(path.segments(), ["address", "street", "num"]);
    }

    #[test]
    fn parse_keeps_empty_segments() {
        assert_eq!(KeyPath::parse("a..b").segments(), ["a", "", "b"]);
        assert_eq!(KeyPath::parse("").segments(), [""]);
        assert_eq!(KeyPath::parse(".").segments(), ["", ""]);
    }

    #[test]
    fn root_has_no_segments() {
        let root = KeyPath::root();
        assert!(root.is_root());
        assert_eq!(root.len(), 0);
        assert_eq!(root.first(), None);
        assert_eq!(root.to_string(), "");
    }

    #[test]
    fn parse_of_empty_string_is_not_root() {
        assert!(!KeyPath::parse("").is_root());
    }

    #[test]
    fn child_appends() {
        let path = KeyPath::parse("a.b").child("c");
        assert_eq!(path.to_string(), "a.b.c");
    }

    #[test]
    fn concat_appends_all_segments() {
        let base = KeyPath::parse("address");
        let rel = KeyPath::parse("street.num");
        assert_eq!(base.concat(&rel).to_string(), "address.street.num");
        assert_eq!(KeyPath::root().concat(&rel), rel);
    }

    #[test]
    fn display_round_trips_plain_paths() {
        for expr in ["name", "info.author", "a.b.c.d"] {
            assert_eq!(KeyPath::parse(expr).to_string(), expr);
        }
    }

    #[test]
    fn join_with_custom_separator() {
        assert_eq!(KeyPath::parse("a.b.c").join("/"), "a/b/c");
    }

    #[test]
    fn from_str_parses() {
        let path: KeyPath = "info.author".into();
        assert_eq!(path, KeyPath::parse("info.author"));
    }

    #[test]
    fn equality_and_hash_vocabulary() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        seen.insert(KeyPath::parse("a.b"));
        assert!(seen.contains(&KeyPath::parse("a.b")));
        assert!(!seen.contains(&KeyPath::parse("a.c")));
    }
}
