//! `gemdex gemfile`: extract an installable package list from a Gemfile.

use gemdex_core::error::GemdexResult;
use gemdex_core::gemfile::{parse, write_packages};
use std::path::Path;

use super::read_input_text;

pub fn execute(path: Option<&Path>) -> GemdexResult<()> {
    let text = read_input_text(path)?;
    let entries = parse(&text)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_packages(&entries, &mut out)
}
