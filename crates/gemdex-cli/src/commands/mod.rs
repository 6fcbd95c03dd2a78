//! Command implementations and dispatch logic.
//!
//! Each command reads its input streams to completion, hands the bytes to
//! the core engine, and writes the result to standard output. Errors are
//! fatal for the stream being processed and propagate to the top level.

use gemdex_core::error::{GemdexError, GemdexResult};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::Commands;

pub mod gemfile;
pub mod index;
pub mod spec;

#[cfg(test)]
mod tests;

/// Dispatch a command to its handler
pub fn dispatch(command: Commands) -> GemdexResult<()> {
    match command {
        Commands::Spec { import, db, files } => {
            info!("Normalizing {} spec file(s) (import: {})", files.len(), import);
            spec::execute(import, db.as_deref(), &files)
        }
        Commands::Index { file } => {
            info!("Parsing index stream");
            index::execute(file.as_deref())
        }
        Commands::Gemfile { path } => {
            info!("Parsing Gemfile");
            gemfile::execute(path.as_deref())
        }
    }
}

/// Read a whole input: a file path, or standard input for `None` / `-`
pub fn read_input(path: Option<&Path>) -> GemdexResult<Vec<u8>> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read(path)
            .map_err(|e| GemdexError::io(format!("failed to read {}", path.display()), e)),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(|e| GemdexError::io("failed to read standard input".to_string(), e))?;
            Ok(buf)
        }
    }
}

/// Read a whole input as UTF-8 text
pub fn read_input_text(path: Option<&Path>) -> GemdexResult<String> {
    let bytes = read_input(path)?;
    String::from_utf8(bytes).map_err(|e| {
        GemdexError::io(
            "input is not valid UTF-8".to_string(),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}
