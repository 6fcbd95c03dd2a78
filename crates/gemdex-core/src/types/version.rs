//! Dotted-segment version identifiers and their total order.
//!
//! A version is a sequence of `.`-separated segments. Segments that parse as
//! integers compare by magnitude; everything else is an opaque text token
//! compared lexicographically, and any numeric segment orders before any
//! text segment. Missing trailing segments compare lower, so `1.0 < 1.0.1`.
//! This is deliberately not semver: prerelease suffixes get no special
//! treatment and order by the generic segment rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{GemdexError, GemdexResult};

/// Accepted grammar for dependency-requirement versions: a numeric first
/// segment followed by alphanumeric segments (`1`, `1.0`, `1.2.0.rc1`).
static VERSION_GRAMMAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9a-zA-Z]+)*$").unwrap());

/// One `.`-delimited component of a version identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Segment that parses as an integer, compared by magnitude
    Num(u64),
    /// Opaque text segment, compared lexicographically
    Text(String),
}

impl Segment {
    fn from_str_part(part: &str) -> Self {
        match part.parse::<u64>() {
            Ok(n) => Segment::Num(n),
            Err(_) => Segment::Text(part.to_string()),
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Num(a), Segment::Num(b)) => a.cmp(b),
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            // Numeric segments order before text segments. Comparing mixed
            // pairs textually would break transitivity: 9 < 10 < "12a"
            // numerically and lexicographically, but "9" > "12a" as text.
            (Segment::Num(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Num(_)) => Ordering::Greater,
        }
    }
}

/// A dotted version identifier.
///
/// Keeps the original text alongside the parsed segments so downstream
/// emitters can reproduce the version exactly as received.
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    segments: Vec<Segment>,
}

impl Version {
    /// Parse a version, validating it against the requirement grammar.
    ///
    /// Used wherever versions come from untrusted spec metadata (dependency
    /// requirements, spec version fields). Leading/trailing whitespace is
    /// tolerated and trimmed.
    pub fn parse(text: &str) -> GemdexResult<Self> {
        let trimmed = text.trim();
        if !VERSION_GRAMMAR.is_match(trimmed) {
            return Err(GemdexError::InvalidVersion {
                input: text.to_string(),
            });
        }
        Ok(Self::from_raw(trimmed))
    }

    /// Build a version from trusted machine-generated text, verbatim.
    ///
    /// Index streams carry versions that were already validated by the
    /// producer; they are accepted without the grammar check.
    pub fn from_raw(text: &str) -> Self {
        let segments = text.split('.').map(Segment::from_str_part).collect();
        Self {
            text: text.to_string(),
            segments,
        }
    }

    /// Original textual form, exactly as received
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parsed segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.segments.iter();
        let mut b = other.segments.iter();
        loop {
            match (a.next(), b.next()) {
                (Some(x), Some(y)) => match x.cmp(y) {
                    Ordering::Equal => continue,
                    diff => return diff,
                },
                // Shorter version with an equal shared prefix is lesser.
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

impl FromStr for Version {
    type Err = GemdexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = Version;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a dotted version string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Version, E> {
                Ok(Version::from_raw(v))
            }
        }

        deserializer.deserialize_str(VersionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::from_raw(text)
    }

    #[test]
    fn test_parse_accepts_common_shapes() {
        assert!(Version::parse("1").is_ok());
        assert!(Version::parse("1.0").is_ok());
        assert!(Version::parse("10.2.30").is_ok());
        assert!(Version::parse("1.2.0.rc1").is_ok());
        assert!(Version::parse(" 1.0 ").is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_grammar() {
        for bad in ["", "a.b", ".1", "1.", "1..2", "-1.0", "1.0-rc1", "1 0"] {
            assert!(
                Version::parse(bad).is_err(),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_from_raw_is_verbatim() {
        let raw = v("not-even-close");
        assert_eq!(raw.as_str(), "not-even-close");
        assert_eq!(raw.to_string(), "not-even-close");
    }

    #[test]
    fn test_shorter_prefix_is_less() {
        assert!(v("1.0") < v("1.0.1"));
        assert!(v("1") < v("1.0"));
        assert_eq!(v("1.0.1").cmp(&v("1.0")), Ordering::Greater);
    }

    #[test]
    fn test_numeric_segments_compare_by_magnitude() {
        assert!(v("1.9") < v("1.10"));
        assert!(v("0.9.9") < v("0.10.0"));
        assert!(v("2") < v("10"));
    }

    #[test]
    fn test_text_segments_compare_lexicographically() {
        assert!(v("1.0.alpha") < v("1.0.beta"));
        assert!(v("1.0.a") < v("1.0.b"));
    }

    #[test]
    fn test_numeric_segments_order_before_text() {
        assert!(v("1.2") < v("1.10a"));
        assert!(v("1.a") > v("1.9"));
        assert!(v("1.999") < v("1.0a"));
    }

    #[test]
    fn test_mixed_segment_order_is_transitive() {
        // Magnitude, numeric-before-text, and lexicographic comparisons must
        // agree on one chain: 1.9 < 1.10 < 1.12a.
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.10") < v("1.12a"));
        assert!(v("1.9") < v("1.12a"));
    }

    #[test]
    fn test_prerelease_gets_no_special_order() {
        // Strict prefix rule wins; there is no semver-style demotion.
        assert!(v("1.0.0") < v("1.0.0.rc1"));
        assert!(v("1.0.0.pre") > v("1.0.0"));
    }

    #[test]
    fn test_equality_is_segment_wise() {
        assert_eq!(v("1.0"), v("1.0"));
        // Leading zeros collapse under numeric comparison but the original
        // text is preserved for display.
        assert_eq!(v("1.0"), v("1.00"));
        assert_eq!(v("1.00").to_string(), "1.00");
    }

    #[test]
    fn test_display_round_trip() {
        let version = Version::parse("1.2.0.rc1").unwrap();
        assert_eq!(version.to_string(), "1.2.0.rc1");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Segments draw from a small pool so generated versions frequently share
    // prefixes and mix numeric with text segments at the same position.
    fn arb_segment() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u64..12).prop_map(|n| n.to_string()),
            prop::sample::select(vec!["a", "b", "pre", "rc1", "0a", "9a", "10a", "12a"])
                .prop_map(str::to_string),
        ]
    }

    fn arb_version() -> impl Strategy<Value = Version> {
        prop::collection::vec(arb_segment(), 1..5)
            .prop_map(|segments| Version::from_raw(&segments.join(".")))
    }

    proptest! {
        #[test]
        fn ordering_is_total(a in arb_version(), b in arb_version()) {
            let forward = a.cmp(&b);
            let backward = b.cmp(&a);
            prop_assert_eq!(forward, backward.reverse());
            prop_assert_eq!(forward == Ordering::Equal, a == b);
        }
    }

    proptest! {
        #[test]
        fn ordering_is_transitive(
            a in arb_version(),
            b in arb_version(),
            c in arb_version(),
        ) {
            if a < b && b < c {
                prop_assert!(a < c, "transitivity violated: {} < {} < {}", a, b, c);
            }
            if a > b && b > c {
                prop_assert!(a > c, "transitivity violated: {} > {} > {}", a, b, c);
            }
        }
    }

    proptest! {
        #[test]
        fn sorting_agrees_with_pairwise_order(
            mut versions in prop::collection::vec(arb_version(), 0..16)
        ) {
            versions.sort();
            for pair in versions.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
