//! Object-graph normalization: tagged gemspec documents to `PackageSpec`.
//!
//! Gemspec YAML is a tagged object graph: the top-level node and several
//! nested nodes carry Ruby object tags (`!ruby/object:Gem::Specification`,
//! `!ruby/object:Gem::Version`, ...). The normalizer walks that graph
//! against an explicit schema: the fields of `PackageSpec` and the two
//! nested shapes that need unwrapping (`version`, `dependencies`). Unknown
//! fields, and schema fields whose value still carries nested structure,
//! are dropped deterministically; the result contains only plain scalars
//! and plain sequences.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::date;
use crate::error::{GemdexError, GemdexResult};
use crate::types::{Dependency, DependencyKind, PackageSpec, Requirement, Version};

/// Schema fields the normalizer recognizes on the top-level node
const SCHEMA_FIELDS: &[&str] = &[
    "name",
    "version",
    "date",
    "homepage",
    "platform",
    "email",
    "bindir",
    "summary",
    "description",
    "authors",
    "files",
    "extensions",
    "executables",
    "test_files",
    "require_paths",
    "dependencies",
];

/// Parse one gemspec YAML document and normalize it
pub fn parse_spec(yaml: &str) -> GemdexResult<PackageSpec> {
    let doc: Value = serde_yaml::from_str(yaml).map_err(|e| GemdexError::MalformedSpec {
        reason: format!("invalid YAML: {}", e),
    })?;
    normalize(&doc)
}

/// Normalize a tagged gemspec object graph into a flat `PackageSpec`.
///
/// Propagates `InvalidVersion` and `UnexpectedDateValue` from the version
/// parser and date canonicalizer unmasked; a record that fails produces no
/// partial output.
pub fn normalize(doc: &Value) -> GemdexResult<PackageSpec> {
    let fields = mapping_of(doc).ok_or_else(|| GemdexError::MalformedSpec {
        reason: "top-level spec node is not a field mapping".to_string(),
    })?;

    for key in fields.keys() {
        if let Value::String(name) = key {
            if !SCHEMA_FIELDS.contains(&name.as_str()) {
                debug!(field = %name, "dropping field outside spec schema");
            }
        }
    }

    let name = match fields.get("name") {
        Some(Value::String(name)) => name.clone(),
        _ => {
            return Err(GemdexError::MalformedSpec {
                reason: "spec has no name".to_string(),
            })
        }
    };

    let version = unwrap_version(fields.get("version").unwrap_or(&Value::Null))?;
    let date = date::canonicalize(fields.get("date").unwrap_or(&Value::Null))?;
    let dependencies = decompose(fields.get("dependencies").unwrap_or(&Value::Null))?;

    Ok(PackageSpec {
        name,
        version,
        date,
        homepage: scalar_field(fields, "homepage"),
        platform: scalar_field(fields, "platform"),
        email: scalar_field(fields, "email"),
        bindir: scalar_field(fields, "bindir"),
        summary: scalar_field(fields, "summary"),
        description: scalar_field(fields, "description"),
        authors: list_field(fields, "authors"),
        files: list_field(fields, "files"),
        extensions: list_field(fields, "extensions"),
        executables: list_field(fields, "executables"),
        test_files: list_field(fields, "test_files"),
        require_paths: list_field(fields, "require_paths"),
        dependencies,
    })
}

/// Decompose a raw dependency sequence into canonical `Dependency` records.
///
/// Both dependency order and requirement-pair order are preserved exactly.
/// Each entry carries a `name`, an optional `type` symbol (absent means
/// runtime), and a nested requirements node wrapping ordered
/// `(operator, version-node)` pairs.
pub fn decompose(raw: &Value) -> GemdexResult<Vec<Dependency>> {
    let entries = match untag(raw) {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(entries) => entries,
        _ => {
            return Err(GemdexError::MalformedSpec {
                reason: "dependencies is not a sequence".to_string(),
            })
        }
    };

    let mut dependencies = Vec::with_capacity(entries.len());
    for entry in entries {
        let fields = mapping_of(entry).ok_or_else(|| GemdexError::MalformedSpec {
            reason: "dependency entry is not a field mapping".to_string(),
        })?;

        let name = match fields.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => {
                return Err(GemdexError::MalformedSpec {
                    reason: "dependency entry has no name".to_string(),
                })
            }
        };

        let kind = match fields.get("type") {
            Some(Value::String(token)) => DependencyKind::from_token(token),
            _ => DependencyKind::default(),
        };

        // `version_requirements` is the canonical location; older emitters
        // wrote the same structure under `requirement`.
        let requirements_node = fields
            .get("version_requirements")
            .or_else(|| fields.get("requirement"))
            .unwrap_or(&Value::Null);
        let requirements = decompose_requirements(&name, requirements_node)?;

        dependencies.push(Dependency {
            name,
            kind,
            requirements,
        });
    }
    Ok(dependencies)
}

fn decompose_requirements(dep: &str, node: &Value) -> GemdexResult<Vec<Requirement>> {
    let pairs = mapping_of(node)
        .and_then(|m| m.get("requirements"))
        .and_then(|v| v.as_sequence())
        .ok_or_else(|| GemdexError::MalformedSpec {
            reason: format!("dependency '{}' has no requirements node", dep),
        })?;

    let mut requirements = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let items = pair
            .as_sequence()
            .filter(|items| items.len() == 2)
            .ok_or_else(|| GemdexError::MalformedSpec {
                reason: format!("dependency '{}' has a malformed requirement pair", dep),
            })?;

        let op = items[0].as_str().ok_or_else(|| GemdexError::MalformedSpec {
            reason: format!("dependency '{}' has a non-string operator", dep),
        })?;
        let version = unwrap_version_text(&items[1]).ok_or_else(|| GemdexError::MalformedSpec {
            reason: format!("dependency '{}' has a malformed version node", dep),
        })?;

        requirements.push(Requirement::new(op, &version)?);
    }

    if requirements.is_empty() {
        return Err(GemdexError::MalformedSpec {
            reason: format!("dependency '{}' has no requirements", dep),
        });
    }
    Ok(requirements)
}

/// Unwrap the nested version node and parse its textual value
fn unwrap_version(node: &Value) -> GemdexResult<Version> {
    match unwrap_version_text(node) {
        Some(text) => Version::parse(&text),
        None => Err(GemdexError::MalformedSpec {
            reason: "spec has no parseable version node".to_string(),
        }),
    }
}

/// Extract the textual version from a version node: either a tagged node
/// wrapping a `version` field, or a bare scalar
fn unwrap_version_text(node: &Value) -> Option<String> {
    match untag(node) {
        Value::String(text) => Some(text.clone()),
        // YAML scalars like `version: 1.2` decode as numbers.
        Value::Number(n) => Some(n.to_string()),
        Value::Mapping(fields) => match fields.get("version") {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// Strip the type tag from a node, if any
fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => &tagged.value,
        other => other,
    }
}

fn mapping_of(value: &Value) -> Option<&Mapping> {
    untag(value).as_mapping()
}

/// Read a schema scalar field. Values that still carry nested structure are
/// dropped, never leaked into output.
fn scalar_field(fields: &Mapping, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        None | Some(Value::Null) => None,
        Some(_) => {
            debug!(field = key, "dropping scalar field with nested structure");
            None
        }
    }
}

/// Read a schema sequence-of-strings field. A sequence containing any
/// element with nested structure is dropped whole.
fn list_field(fields: &Mapping, key: &str) -> Option<Vec<String>> {
    let entries = match fields.get(key) {
        Some(Value::Sequence(entries)) => entries,
        None | Some(Value::Null) => return None,
        Some(_) => {
            debug!(field = key, "dropping sequence field with nested structure");
            return None;
        }
    };

    let mut values = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::String(text) => values.push(text.clone()),
            Value::Number(n) => values.push(n.to_string()),
            Value::Bool(b) => values.push(b.to_string()),
            _ => {
                debug!(field = key, "dropping sequence field with nested element");
                return None;
            }
        }
    }
    Some(values)
}
