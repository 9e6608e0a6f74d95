//! Flat-file document I/O: the boundary where movie documents enter and
//! leave the pipeline.

use std::fs;
use std::path::Path;

use cinedex_enrich::MovieRecord;
use cinedex_tmdb::types::Genre;

#[derive(Debug, thiserror::Error)]
pub(crate) enum FileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FileError {
    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, FileError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Read an array of movie documents.
pub(crate) fn read_records(path: &Path) -> Result<Vec<MovieRecord>, FileError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Read the genre id→name table.
pub(crate) fn read_genres(path: &Path) -> Result<Vec<Genre>, FileError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Write any value as pretty-printed JSON.
pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), FileError> {
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents)?;
    Ok(())
}
