#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::PathBuf;

use crate::client::CliError;

/// Inline value, or the contents of `file` when given (the file wins).
pub fn read_opt_value(
    val: Option<String>,
    file: Option<PathBuf>,
) -> Result<Option<String>, CliError> {
    if let Some(path) = file {
        let data = fs::read_to_string(&path).map_err(|source| CliError::InputFile {
            path: path.display().to_string(),
            source,
        })?;
        return Ok(Some(data.trim_end().to_string()));
    }
    Ok(val)
}

pub fn require_id(id: i64, what: &str) -> Result<i64, CliError> {
    if id == 0 {
        return Err(CliError::InvalidInput(format!("{what} id must be non-zero")));
    }
    Ok(id)
}
