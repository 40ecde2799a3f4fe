use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quiz_core::model::{QuestionNumber, QuestionRecord};
use serde_json::error::Category;
use thiserror::Error;
use tracing::debug;

use crate::atomic::write_atomic;

/// Errors from writing or reading a question file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionFileError {
    #[error("failed to write question file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize questions: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to read question file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("question file {} is not valid JSON", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("question file {} is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Serialize `records` as a pretty JSON array and replace `path` atomically.
///
/// # Errors
///
/// Returns `QuestionFileError::Write` when the target cannot be written. The
/// previous file, if any, is left as it was.
pub fn write_questions(path: &Path, records: &[QuestionRecord]) -> Result<(), QuestionFileError> {
    let mut json = serde_json::to_vec_pretty(records).map_err(QuestionFileError::Serialize)?;
    json.push(b'\n');

    write_atomic(path, &json).map_err(|source| QuestionFileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), count = records.len(), "wrote question file");
    Ok(())
}

/// Read a question file back, validating every record.
///
/// # Errors
///
/// - `Read` if the file cannot be opened or read.
/// - `Malformed` if it is not JSON.
/// - `Invalid` if a record fails validation or a number repeats.
pub fn read_questions(path: &Path) -> Result<Vec<QuestionRecord>, QuestionFileError> {
    let raw = fs::read_to_string(path).map_err(|source| QuestionFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let records: Vec<QuestionRecord> = serde_json::from_str(&raw).map_err(|source| {
        if source.classify() == Category::Data {
            QuestionFileError::Invalid {
                path: path.to_path_buf(),
                reason: source.to_string(),
            }
        } else {
            QuestionFileError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut numbers: BTreeSet<QuestionNumber> = BTreeSet::new();
    for record in &records {
        if !numbers.insert(record.number()) {
            return Err(QuestionFileError::Invalid {
                path: path.to_path_buf(),
                reason: format!("question {} appears more than once", record.number()),
            });
        }
    }

    debug!(path = %path.display(), count = records.len(), "read question file");
    Ok(records)
}
