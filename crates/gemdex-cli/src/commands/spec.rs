//! `gemdex spec`: normalize gemspec YAML and print or import it.

use gemdex_core::error::{GemdexError, GemdexResult};
use gemdex_core::normalize;
use gemdex_store::PackageStore;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::read_input_text;

pub fn execute(import: bool, db: Option<&Path>, files: &[PathBuf]) -> GemdexResult<()> {
    let store = if import {
        Some(PackageStore::new(db.ok_or_else(missing_db)?)?)
    } else {
        None
    };

    let stdout = std::io::stdout();
    for file in files {
        debug!(file = %file.display(), "normalizing spec");
        let yaml = read_input_text(Some(file))?;
        let spec = normalize::parse_spec(&yaml)?;

        match &store {
            Some(store) => store.import(&spec)?,
            None => {
                let mut out = stdout.lock();
                spec.write_dump(&mut out).map_err(|e| {
                    GemdexError::io("failed to write spec dump".to_string(), e)
                })?;
            }
        }
    }
    Ok(())
}

fn missing_db() -> GemdexError {
    GemdexError::StoreDirectoryUnavailable {
        path: "<unset>".to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no database root: pass --db or set GEMDEX_DB",
        ),
    }
}
