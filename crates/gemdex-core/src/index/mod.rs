//! Index record decoding, ordering, and emission.
//!
//! A spec index stream decodes to an ordered sequence of
//! `(name, version, platform)` records. Records are sorted by name
//! ascending and version descending, so the first line for a package is its
//! most recent version and the output composes with `sort -u`, `uniq(1)`,
//! and `join(1)` style tooling.

mod marshal;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::io::{self, Write};
use tracing::debug;

use crate::error::{GemdexError, GemdexResult};
use crate::types::Version;
use marshal::RubyValue;

/// One `(name, version, platform)` line of a package index.
///
/// No uniqueness invariant: the same triple may repeat across input
/// sources, and one `(name, version)` may appear once per platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub name: String,
    /// Verbatim version from the trusted index stream (no grammar check)
    pub version: Version,
    /// Free-form platform field (`ruby`, `java`, `x86-mswin32`, ...)
    pub platform: String,
}

impl IndexRecord {
    pub fn new(name: &str, version: &str, platform: &str) -> Self {
        Self {
            name: name.to_string(),
            version: Version::from_raw(version),
            platform: platform.to_string(),
        }
    }
}

/// Decode a raw index stream into records, preserving stream order
pub fn parse_index(bytes: &[u8]) -> GemdexResult<Vec<IndexRecord>> {
    let entries = match marshal::decode(bytes)? {
        RubyValue::Array(entries) => entries,
        // The top-level value's tag sits right after the two header bytes.
        other => {
            return Err(GemdexError::decode(
                2,
                format!("index stream is not an array: {:?}", other),
            ))
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        records.push(record_from(index, entry)?);
    }
    debug!(records = records.len(), "decoded index stream");
    Ok(records)
}

fn record_from(index: usize, entry: RubyValue) -> GemdexResult<IndexRecord> {
    let triple: Result<[RubyValue; 3], _> = match entry {
        RubyValue::Array(fields) => fields.try_into(),
        other => {
            return Err(GemdexError::record(
                index,
                format!("entry is not an array: {:?}", other),
            ))
        }
    };
    let [name, version, platform] = triple.map_err(|fields: Vec<RubyValue>| {
        GemdexError::record(
            index,
            format!("entry has {} fields, expected 3", fields.len()),
        )
    })?;

    let name = string_field(index, name, "name")?;
    let version = match version {
        RubyValue::Version(text) | RubyValue::Str(text) => Version::from_raw(&text),
        other => {
            return Err(GemdexError::record(
                index,
                format!("version field is not a version: {:?}", other),
            ))
        }
    };
    let platform = string_field(index, platform, "platform")?;

    Ok(IndexRecord {
        name,
        version,
        platform,
    })
}

fn string_field(index: usize, value: RubyValue, what: &str) -> GemdexResult<String> {
    match value {
        RubyValue::Str(text) | RubyValue::Sym(text) => Ok(text),
        other => Err(GemdexError::record(
            index,
            format!("{} field is not a string: {:?}", what, other),
        )),
    }
}

/// Sort records by name ascending, then version descending.
///
/// The sort is stable, so records tying on name and version keep their
/// input encounter order.
pub fn sort_records(records: &mut [IndexRecord]) {
    records.sort_by(compare_records);
}

fn compare_records(a: &IndexRecord, b: &IndexRecord) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| b.version.cmp(&a.version))
}

/// Emit one `name version platform` line per record, in slice order,
/// preserving each version's original textual form
pub fn write_records<W: Write>(records: &[IndexRecord], out: &mut W) -> io::Result<()> {
    for record in records {
        writeln!(out, "{} {} {}", record.name, record.version, record.platform)?;
    }
    Ok(())
}

/// Formatted index lines as a single string
pub fn format_records(records: &[IndexRecord]) -> String {
    let mut buf = Vec::new();
    write_records(records, &mut buf).expect("write to Vec cannot fail");
    String::from_utf8(buf).expect("index lines are valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_name_ascending_version_descending() {
        let mut records = vec![
            IndexRecord::new("b", "1.0", "ruby"),
            IndexRecord::new("a", "2.0", "ruby"),
            IndexRecord::new("a", "1.0", "java"),
        ];
        sort_records(&mut records);
        assert_eq!(
            records,
            vec![
                IndexRecord::new("a", "2.0", "ruby"),
                IndexRecord::new("a", "1.0", "java"),
                IndexRecord::new("b", "1.0", "ruby"),
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut records = vec![
            IndexRecord::new("a", "1.0", "ruby"),
            IndexRecord::new("a", "1.0", "java"),
            IndexRecord::new("a", "1.0", "mswin32"),
        ];
        sort_records(&mut records);
        let platforms: Vec<&str> = records.iter().map(|r| r.platform.as_str()).collect();
        assert_eq!(platforms, vec!["ruby", "java", "mswin32"]);
    }

    #[test]
    fn test_sort_uses_segment_order_not_text_order() {
        let mut records = vec![
            IndexRecord::new("devball", "0.9", "ruby"),
            IndexRecord::new("devball", "0.10", "ruby"),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].version.as_str(), "0.10");
    }

    #[test]
    fn test_format_preserves_verbatim_version_text() {
        let records = vec![IndexRecord::new("devball", "0.7.0", "ruby")];
        assert_eq!(format_records(&records), "devball 0.7.0 ruby\n");
    }

    #[test]
    fn test_parse_index_stream() {
        // [[ "b", Gem::Version["1.0"], "ruby" ],
        //  [ "a", Gem::Version["2.0"], "ruby" ]]
        let mut stream = vec![4u8, 8, b'[', 7];
        let entry = |name: &[u8], vers: &[u8], first: bool, platform_link: bool| {
            let mut out = vec![b'[', 8];
            out.extend([b'"', (name.len() + 5) as u8]);
            out.extend_from_slice(name);
            out.push(b'U');
            if first {
                out.extend([b':', 17]);
                out.extend_from_slice(b"Gem::Version");
            } else {
                out.extend([b';', 0]);
            }
            out.extend([b'[', 6, b'"', (vers.len() + 5) as u8]);
            out.extend_from_slice(vers);
            if platform_link {
                // Object slot 6 holds the first entry's platform string
                // (top array, entry array, name, version, payload array,
                // payload string precede it).
                out.extend([b'@', 11]);
            } else {
                out.extend([b'"', 9]);
                out.extend_from_slice(b"ruby");
            }
            out
        };
        stream.extend(entry(b"b", b"1.0", true, false));
        stream.extend(entry(b"a", b"2.0", false, true));

        let records = parse_index(&stream).unwrap();
        assert_eq!(
            records,
            vec![
                IndexRecord::new("b", "1.0", "ruby"),
                IndexRecord::new("a", "2.0", "ruby"),
            ]
        );
    }

    #[test]
    fn test_parse_index_rejects_non_triple() {
        // [[ "a", "1.0" ]]
        let stream = vec![
            4u8, 8, b'[', 6, b'[', 7, b'"', 6, b'a', b'"', 8, b'1', b'.', b'0',
        ];
        let err = parse_index(&stream).unwrap_err();
        assert!(matches!(
            err,
            GemdexError::MalformedIndexRecord { index: 0, .. }
        ));
    }

    #[test]
    fn test_record_errors_carry_stream_position() {
        // [[ "a", Gem::Version["1.0"], "ruby" ], 42]
        let mut stream = vec![4u8, 8, b'[', 7];
        stream.extend([b'[', 8, b'"', 6, b'a', b'U', b':', 17]);
        stream.extend_from_slice(b"Gem::Version");
        stream.extend([b'[', 6, b'"', 8, b'1', b'.', b'0', b'"', 9]);
        stream.extend_from_slice(b"ruby");
        stream.extend([b'i', 47]);

        let err = parse_index(&stream).unwrap_err();
        match err {
            GemdexError::MalformedIndexRecord { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("not an array"), "reason: {}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
