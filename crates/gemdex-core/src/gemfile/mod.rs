//! Manifest (Gemfile) parsing.
//!
//! Reads a Bundler-style Gemfile and extracts plain `name constraint` pairs
//! for top-level `gem` statements. Recognized directives form a closed set:
//! `gem`, `group ... do`, and `end`; every other statement is a no-op.
//! Grouped declarations are parsed but filtered from the output, since only
//! the top-level group is installed.
//!
//! The group context is threaded explicitly through evaluation as an
//! `Option<String>`; opening a group while one is open is rejected up
//! front rather than somewhere deep in a call chain.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Write};
use tracing::debug;

use crate::error::{GemdexError, GemdexResult};
use crate::types::Op;

static GEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^gem\s+['"]([A-Za-z0-9_.-]+)['"](?:\s*,\s*['"]([^'"]+)['"])?"#).unwrap()
});
static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^group\s+:(\w+)").unwrap());
static END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^end\b").unwrap());
static CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([><=~]*)\s*(\d\S*)$").unwrap());

/// One recognized manifest directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    AddDependency {
        name: String,
        /// First version argument, verbatim (e.g. `>= 1.0`), if any
        constraint: Option<String>,
    },
    BeginGroup(String),
    EndGroup,
    /// Unrecognized statement, ignored by design
    Noop,
}

/// One `gem` declaration with its group context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub constraint: Option<String>,
    /// Group the declaration appeared in; `None` for top level
    pub group: Option<String>,
}

/// Classify one manifest line as a directive
pub fn parse_directive(line: &str) -> Directive {
    let line = strip_comment(line);
    let line = line.trim();

    if let Some(captures) = GEM_RE.captures(line) {
        return Directive::AddDependency {
            name: captures[1].to_string(),
            constraint: captures.get(2).map(|m| m.as_str().to_string()),
        };
    }
    if let Some(captures) = GROUP_RE.captures(line) {
        return Directive::BeginGroup(captures[1].to_string());
    }
    if END_RE.is_match(line) {
        return Directive::EndGroup;
    }
    if !line.is_empty() {
        debug!(statement = line, "ignoring unrecognized manifest statement");
    }
    Directive::Noop
}

/// Evaluate manifest text into declarations with group context.
///
/// Fails with `NestedGroupingUnsupported` when a `group` opens inside an
/// open group. A stray `end` with no open group is ignored like any other
/// unrecognized statement.
pub fn parse(text: &str) -> GemdexResult<Vec<ManifestEntry>> {
    let mut entries = Vec::new();
    let mut current_group: Option<String> = None;

    for line in text.lines() {
        match parse_directive(line) {
            Directive::AddDependency { name, constraint } => {
                entries.push(ManifestEntry {
                    name,
                    constraint,
                    group: current_group.clone(),
                });
            }
            Directive::BeginGroup(name) => {
                if let Some(group) = current_group {
                    return Err(GemdexError::NestedGroupingUnsupported { group });
                }
                current_group = Some(name);
            }
            Directive::EndGroup => {
                current_group = None;
            }
            Directive::Noop => {}
        }
    }
    Ok(entries)
}

/// Canonicalize an optional constraint to an `(operator, version)` pair.
///
/// A missing constraint means any version (`>= 0`); a bare version means an
/// exact match. The version part stays textual: the manifest evaluator
/// extracts plain pairs, it does not enforce the spec-metadata grammar.
pub fn canonicalize_constraint(constraint: Option<&str>) -> GemdexResult<(Op, String)> {
    let Some(text) = constraint else {
        return Ok((Op::GreaterEq, "0".to_string()));
    };

    let captures =
        CONSTRAINT_RE
            .captures(text.trim())
            .ok_or_else(|| GemdexError::InvalidConstraint {
                input: text.to_string(),
            })?;
    let op = if captures[1].is_empty() {
        Op::Exact
    } else {
        captures[1].parse()?
    };
    Ok((op, captures[2].to_string()))
}

/// Write one `name op version` line per top-level declaration, in
/// encounter order
pub fn write_packages<W: Write>(entries: &[ManifestEntry], out: &mut W) -> GemdexResult<()> {
    for entry in entries {
        if entry.group.is_some() {
            continue;
        }
        let (op, version) = canonicalize_constraint(entry.constraint.as_deref())?;
        writeln!(out, "{} {} {}", entry.name, op, version)
            .map_err(|e| GemdexError::io("failed to write package list".to_string(), e))?;
    }
    Ok(())
}

/// Parse manifest text and format its top-level package list
pub fn format_packages(text: &str) -> GemdexResult<String> {
    let entries = parse(text)?;
    let mut buf = Vec::new();
    write_packages(&entries, &mut buf)?;
    String::from_utf8(buf).map_err(|_| GemdexError::InvalidConstraint {
        input: "package list is not valid UTF-8".to_string(),
    })
}

/// Truncate a line at the first `#` that is not inside a string literal
fn strip_comment(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => return &line[..i],
            _ => {}
        }
    }
    line
}
