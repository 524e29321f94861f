//! URL list input: plain text, one URL per line.

use anyhow::{Context, Result};
use std::path::Path;

/// Read the URL list from `path`. Lines are trimmed, blank lines skipped,
/// order preserved. No well-formedness validation beyond trimming — a bad
/// URL fails at navigation time and is skipped like any other bad URL.
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read URL list {}", path.display()))?;
    Ok(parse_url_lines(&raw))
}

pub fn parse_url_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
