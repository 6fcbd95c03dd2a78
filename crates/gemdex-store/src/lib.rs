//! # gemdex-store
//!
//! On-disk package database for normalized specs.
//!
//! The store keeps one directory per package version, keyed
//! `root/name/version/`, with one file per scalar or sequence field and a
//! `dependencies` file with one line per requirement pair. Directory
//! creation is idempotent; a root that cannot be created or confirmed is a
//! fatal, operator-facing error. No handle outlives the import of one
//! record.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use gemdex_core::error::{GemdexError, GemdexResult};
use gemdex_core::types::PackageSpec;

/// Package database rooted at a directory
#[derive(Debug)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    /// Open a store, creating the root directory if absent
    pub fn new<P: AsRef<Path>>(root: P) -> GemdexResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| GemdexError::StoreDirectoryUnavailable {
            path: root.display().to_string(),
            source: e,
        })?;
        Ok(Self { root })
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a spec's files live in
    pub fn package_dir(&self, spec: &PackageSpec) -> PathBuf {
        self.root.join(&spec.name).join(spec.version.to_string())
    }

    /// Write one normalized spec into the database.
    ///
    /// Creates `root/name/version/` (idempotent), then writes one file per
    /// scalar field, one newline-joined file per present sequence field,
    /// and the `dependencies` file. Re-importing a spec overwrites its
    /// files in place.
    pub fn import(&self, spec: &PackageSpec) -> GemdexResult<()> {
        let dir = self.package_dir(spec);
        fs::create_dir_all(&dir).map_err(|e| GemdexError::StoreDirectoryUnavailable {
            path: dir.display().to_string(),
            source: e,
        })?;

        for (key, value) in spec.scalar_entries() {
            write_entry(&dir, key, &value)?;
        }

        for (key, values) in spec.sequence_entries() {
            write_entry(&dir, key, &values.join("\n"))?;
        }

        let mut lines = String::new();
        for dep in &spec.dependencies {
            for req in &dep.requirements {
                lines.push_str(&format!(
                    "{} {} {} {}\n",
                    dep.kind, dep.name, req.op, req.version
                ));
            }
        }
        let path = dir.join("dependencies");
        fs::write(&path, lines)
            .map_err(|e| GemdexError::io(format!("failed to write {}", path.display()), e))?;

        info!(package = %spec.name, version = %spec.version, "imported spec");
        Ok(())
    }
}

fn write_entry(dir: &Path, key: &str, value: &str) -> GemdexResult<()> {
    let path = dir.join(key);
    debug!(file = %path.display(), "writing spec field");
    fs::write(&path, format!("{}\n", value))
        .map_err(|e| GemdexError::io(format!("failed to write {}", path.display()), e))
}
