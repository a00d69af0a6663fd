//! `qrbatch check` – validate an input file.

use anyhow::Result;
use qrbatch_core::input;
use std::path::Path;

pub fn run_check(file: &Path) -> Result<()> {
    let ids = input::read_identifiers(file)?;
    println!("Loaded {} lines from {}", ids.len(), file.display());
    Ok(())
}
