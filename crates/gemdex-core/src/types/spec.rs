//! Canonical package-specification record and its line-oriented dump.
//!
//! A `PackageSpec` is the flat, typed record the normalizer produces from a
//! tagged gemspec graph: every field is a plain scalar or a plain sequence,
//! never residual nested structure.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use super::{Dependency, Version};

/// Canonical metadata record for one published version of a package.
///
/// `name` + `version` uniquely identify a spec within the package store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    pub version: Version,
    /// Canonical `YYYY-MM-DD` date
    pub date: String,
    pub homepage: Option<String>,
    pub platform: Option<String>,
    pub email: Option<String>,
    pub bindir: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub authors: Option<Vec<String>>,
    pub files: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub executables: Option<Vec<String>>,
    pub test_files: Option<Vec<String>>,
    pub require_paths: Option<Vec<String>>,
    pub dependencies: Vec<Dependency>,
}

/// Scalar fields in emission order, paired with an accessor
macro_rules! scalar_fields {
    ($spec:expr) => {
        [
            ("homepage", &$spec.homepage),
            ("platform", &$spec.platform),
            ("email", &$spec.email),
            ("bindir", &$spec.bindir),
            ("summary", &$spec.summary),
            ("description", &$spec.description),
        ]
    };
}

/// Sequence fields in emission order, paired with their singular dump label
macro_rules! sequence_fields {
    ($spec:expr) => {
        [
            ("author", &$spec.authors),
            ("file", &$spec.files),
            ("extension", &$spec.extensions),
            ("executable", &$spec.executables),
            ("test", &$spec.test_files),
            ("lib", &$spec.require_paths),
        ]
    };
}

impl PackageSpec {
    /// Write the key/value dump: one `key: value` line per scalar field
    /// (empty value for absent scalars), one labeled line per sequence
    /// element, and one `dependency:` line per requirement pair.
    pub fn write_dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "name: {}", self.name)?;
        writeln!(out, "version: {}", self.version)?;
        writeln!(out, "date: {}", self.date)?;
        for (key, value) in scalar_fields!(self) {
            writeln!(out, "{}: {}", key, value.as_deref().unwrap_or(""))?;
        }
        for (label, values) in sequence_fields!(self) {
            if let Some(values) = values {
                for value in values {
                    writeln!(out, "{}: {}", label, value)?;
                }
            }
        }
        for dep in &self.dependencies {
            for req in &dep.requirements {
                writeln!(
                    out,
                    "dependency: {} {} {} {}",
                    dep.kind, dep.name, req.op, req.version
                )?;
            }
        }
        Ok(())
    }

    /// Key/value dump as a string
    pub fn dump(&self) -> String {
        let mut buf = Vec::new();
        // Vec<u8> writes are infallible.
        self.write_dump(&mut buf).expect("write to Vec cannot fail");
        String::from_utf8(buf).expect("dump is valid UTF-8")
    }

    /// Scalar field values keyed by store file name, in store layout order
    pub fn scalar_entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("name", self.name.clone()),
            ("version", self.version.to_string()),
            ("date", self.date.clone()),
        ];
        for (key, value) in scalar_fields!(self) {
            entries.push((key, value.clone().unwrap_or_default()));
        }
        entries
    }

    /// Present sequence fields keyed by store file name
    pub fn sequence_entries(&self) -> Vec<(&'static str, &[String])> {
        [
            ("authors", &self.authors),
            ("files", &self.files),
            ("extensions", &self.extensions),
            ("executables", &self.executables),
            ("test_files", &self.test_files),
            ("require_paths", &self.require_paths),
        ]
        .into_iter()
        .filter_map(|(key, values)| values.as_ref().map(|v| (key, v.as_slice())))
        .collect()
    }
}
