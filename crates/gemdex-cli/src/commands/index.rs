//! `gemdex index`: decode, sort, and print a spec index stream.

use gemdex_core::error::{GemdexError, GemdexResult};
use gemdex_core::index::{parse_index, sort_records, write_records};
use std::path::Path;

use super::read_input;

pub fn execute(file: Option<&Path>) -> GemdexResult<()> {
    let bytes = read_input(file)?;
    let mut records = parse_index(&bytes)?;
    sort_records(&mut records);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_records(&records, &mut out)
        .map_err(|e| GemdexError::io("failed to write index lines".to_string(), e))
}
