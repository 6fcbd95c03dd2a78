//! Dependency and version-requirement types.
//!
//! A dependency names a package, a kind (runtime or development), and an
//! ordered list of `(operator, version)` requirement pairs. Ordering is
//! significant: several operators may constrain one dependency (`>= 1.0`,
//! `< 2.0`) and consumers rely on encounter order for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Version;
use crate::error::{GemdexError, GemdexResult};

/// Kind of dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Needed at runtime (the default when unspecified)
    Runtime,
    /// Needed only while developing or testing the package
    Development,
}

impl Default for DependencyKind {
    fn default() -> Self {
        DependencyKind::Runtime
    }
}

impl DependencyKind {
    /// Map a raw kind token to the closed enum.
    ///
    /// Accepts the Ruby-symbol spelling (`:runtime`) as well as the bare
    /// word. Anything unrecognized normalizes to runtime, the default.
    pub fn from_token(token: &str) -> Self {
        match token.trim_start_matches(':') {
            "development" => DependencyKind::Development,
            _ => DependencyKind::Runtime,
        }
    }

    /// Check if this dependency is needed at runtime
    pub fn is_runtime(&self) -> bool {
        matches!(self, DependencyKind::Runtime)
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Runtime => f.write_str("runtime"),
            DependencyKind::Development => f.write_str("development"),
        }
    }
}

/// Requirement comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// `=`
    Exact,
    /// `>=`
    GreaterEq,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `<`
    Less,
    /// `~>` (pessimistic constraint)
    Pessimistic,
}

impl Op {
    /// Textual operator exactly as it appears in spec metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Exact => "=",
            Op::GreaterEq => ">=",
            Op::Greater => ">",
            Op::LessEq => "<=",
            Op::Less => "<",
            Op::Pessimistic => "~>",
        }
    }
}

impl FromStr for Op {
    type Err = GemdexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Op::Exact),
            ">=" => Ok(Op::GreaterEq),
            ">" => Ok(Op::Greater),
            "<=" => Ok(Op::LessEq),
            "<" => Ok(Op::Less),
            "~>" => Ok(Op::Pessimistic),
            other => Err(GemdexError::InvalidConstraint {
                input: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(operator, version)` constraint pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub op: Op,
    pub version: Version,
}

impl Requirement {
    /// Parse an `(operator, version)` pair from their textual forms,
    /// validating the version against the requirement grammar
    pub fn new(op: &str, version: &str) -> GemdexResult<Self> {
        Ok(Self {
            op: op.parse()?,
            version: Version::parse(version)?,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

/// Dependency specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub kind: DependencyKind,
    /// Ordered requirement pairs; non-empty after decomposition
    pub requirements: Vec<Requirement>,
}

impl Dependency {
    /// Create a runtime dependency
    pub fn new(name: String, requirements: Vec<Requirement>) -> Self {
        Self {
            name,
            kind: DependencyKind::Runtime,
            requirements,
        }
    }

    /// Create a development dependency
    pub fn development(name: String, requirements: Vec<Requirement>) -> Self {
        Self {
            name,
            kind: DependencyKind::Development,
            requirements,
        }
    }
}
