use std::fs;
use std::path::{Path, PathBuf};

use nutri_core::Validatable;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::record::{ChildRecord, School};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid entry {index} in '{}': {reason}", .path.display())]
    Invalid {
        path: PathBuf,
        index: usize,
        reason: String,
    },
}

/// Write newline-delimited JSON items to a string buffer
pub fn to_ndjson<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for item in items {
        let line = serde_json::to_string(item)?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Parse newline-delimited JSON items from &str
pub fn from_ndjson<T: DeserializeOwned>(s: &str) -> Result<Vec<T>, serde_json::Error> {
    let mut v = Vec::new();
    for line in s.lines() {
        if line.trim().is_empty() {
            continue;
        }
        v.push(serde_json::from_str::<T>(line)?);
    }
    Ok(v)
}

/// Parses either a JSON array or NDJSON, chosen by the first non-blank byte.
pub fn from_json_or_ndjson<T: DeserializeOwned>(s: &str) -> Result<Vec<T>, serde_json::Error> {
    if s.trim_start().starts_with('[') {
        serde_json::from_str(s)
    } else {
        from_ndjson(s)
    }
}

fn load_validated<T>(path: &Path) -> Result<Vec<T>, LoadError>
where
    T: DeserializeOwned + Validatable,
{
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let items: Vec<T> = from_json_or_ndjson(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for (index, item) in items.iter().enumerate() {
        item.validate().map_err(|e| LoadError::Invalid {
            path: path.to_path_buf(),
            index,
            reason: e.to_string(),
        })?;
    }
    log::debug!("loaded {} entries from {}", items.len(), path.display());
    Ok(items)
}

pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<ChildRecord>, LoadError> {
    load_validated(path.as_ref())
}

pub fn load_schools(path: impl AsRef<Path>) -> Result<Vec<School>, LoadError> {
    load_validated(path.as_ref())
}
