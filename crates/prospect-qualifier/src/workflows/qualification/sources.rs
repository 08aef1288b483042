use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Failure to load one of the static sources (region map, preferences, prospect CSV).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source file not found at: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid prospect CSV data: {0}")]
    Csv(#[from] csv::Error),
}

pub(crate) fn open(path: &Path) -> Result<File, SourceError> {
    File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SourceError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SourceError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let file = open(path)?;
    parse_json(BufReader::new(file), &path.display().to_string())
}

pub(crate) fn parse_json<T: DeserializeOwned, R: Read>(
    reader: R,
    origin: &str,
) -> Result<T, SourceError> {
    serde_json::from_reader(reader).map_err(|source| SourceError::Json {
        origin: origin.to_string(),
        source,
    })
}
