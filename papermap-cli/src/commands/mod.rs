//! Command implementations for the papermap CLI

pub mod generate;
pub mod plan;
pub mod single;

use crate::error::{CliError, CliResult};
use papermap_core::{load_markers, MarkerStore, StoreError};
use std::path::Path;

/// Load a marker file, mapping store errors onto CLI errors with suggestions.
pub fn load_input(path: &Path) -> CliResult<MarkerStore> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()));
    }
    load_markers(path).map_err(|err| match err {
        StoreError::Io(e) => CliError::io(format!("{}: {}", path.display(), e)),
        other => CliError::invalid_input(path.to_path_buf(), other.to_string()),
    })
}
