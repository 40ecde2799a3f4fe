use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quiz_core::model::{CertId, IdError, ProgressEntry, ProgressEntryError, ProgressSummary, QuestionNumber};
use quiz_core::time::Clock;
use serde_json::error::Category;
use thiserror::Error;
use tracing::debug;

use crate::atomic::write_atomic;
use crate::paths::CertPaths;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors surfaced by the progress store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("failed to read progress file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("progress file {} is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        kind: CorruptKind,
    },

    #[error("failed to write progress file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize progress: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Why a progress file that exists could not be used.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CorruptKind {
    #[error("not valid JSON")]
    Malformed(#[source] serde_json::Error),

    #[error("unexpected structure")]
    Schema(#[source] serde_json::Error),

    #[error("invalid question key {key:?}")]
    InvalidKey {
        key: String,
        #[source]
        source: IdError,
    },

    #[error("question {number} appears under more than one key")]
    DuplicateKey { number: QuestionNumber },

    #[error("inconsistent entry for question {number}")]
    InvalidEntry {
        number: QuestionNumber,
        #[source]
        source: ProgressEntryError,
    },
}

impl CorruptKind {
    /// `true` when the file is not JSON at all, as opposed to JSON with bad content.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Attempt history for one certification, backed by a single JSON file.
///
/// Every mutation is written through before it returns.
#[derive(Debug)]
pub struct ProgressStore {
    cert: CertId,
    path: PathBuf,
    clock: Clock,
    entries: BTreeMap<QuestionNumber, ProgressEntry>,
}

impl ProgressStore {
    /// Load the store for `paths.cert()`; an absent file gives an empty store.
    ///
    /// # Errors
    ///
    /// - `Read` if the file exists but cannot be read.
    /// - `Corrupt` if its content is not a valid progress document.
    pub fn load(paths: &CertPaths, clock: Clock) -> Result<Self, ProgressError> {
        Self::open(paths.cert().clone(), paths.progress_file(), clock)
    }

    /// Like [`ProgressStore::load`] but with an explicit file location.
    ///
    /// # Errors
    ///
    /// See [`ProgressStore::load`].
    pub fn open(cert: CertId, path: impl Into<PathBuf>, clock: Clock) -> Result<Self, ProgressError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => decode(&path, &raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(ProgressError::Read { path, source }),
        };
        debug!(cert = %cert, path = %path.display(), entries = entries.len(), "loaded progress");
        Ok(Self {
            cert,
            path,
            clock,
            entries,
        })
    }

    #[must_use]
    pub fn cert(&self) -> &CertId {
        &self.cert
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn entry(&self, number: QuestionNumber) -> Option<&ProgressEntry> {
        self.entries.get(&number)
    }

    /// All entries in ascending question order.
    pub fn entries(&self) -> impl Iterator<Item = (QuestionNumber, &ProgressEntry)> {
        self.entries.iter().map(|(n, e)| (*n, e))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::from_entries(self.entries.values())
    }

    /// Record one attempt and persist the whole store.
    ///
    /// Returns the updated entry.
    ///
    /// # Errors
    ///
    /// Returns `Write` (or `Serialize`) if persisting fails; the in-memory
    /// entry is then restored to its previous state.
    pub fn record_attempt(
        &mut self,
        number: QuestionNumber,
        was_correct: bool,
    ) -> Result<ProgressEntry, ProgressError> {
        let now = self.clock.now();
        let previous = self.entries.get(&number).cloned();
        let entry = self.entries.entry(number).or_default();
        entry.record(was_correct, now);
        let updated = entry.clone();

        if let Err(err) = self.persist() {
            match previous {
                Some(old) => self.entries.insert(number, old),
                None => self.entries.remove(&number),
            };
            return Err(err);
        }
        Ok(updated)
    }

    /// Forget every attempt and delete the file.
    ///
    /// # Errors
    ///
    /// Returns `Write` if an existing file cannot be removed. Entries are kept
    /// in that case.
    pub fn reset(&mut self) -> Result<(), ProgressError> {
        remove_if_present(&self.path)?;
        self.entries.clear();
        debug!(cert = %self.cert, path = %self.path.display(), "reset progress");
        Ok(())
    }

    /// Delete the progress file for `paths.cert()` without reading it.
    ///
    /// This is the way out of a `Corrupt` file.
    ///
    /// # Errors
    ///
    /// Returns `Write` if an existing file cannot be removed.
    pub fn discard(paths: &CertPaths) -> Result<(), ProgressError> {
        let path = paths.progress_file();
        remove_if_present(&path)?;
        debug!(cert = %paths.cert(), path = %path.display(), "discarded progress file");
        Ok(())
    }

    fn persist(&self) -> Result<(), ProgressError> {
        let doc: BTreeMap<String, &ProgressEntry> = self
            .entries
            .iter()
            .map(|(n, e)| (n.to_string(), e))
            .collect();
        let json = serde_json::to_vec_pretty(&doc).map_err(ProgressError::Serialize)?;
        write_atomic(&self.path, &json).map_err(|source| ProgressError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(cert = %self.cert, path = %self.path.display(), entries = doc.len(), "persisted progress");
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<(), ProgressError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ProgressError::Write {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parse and validate the on-disk document.
fn decode(path: &Path, raw: &str) -> Result<BTreeMap<QuestionNumber, ProgressEntry>, ProgressError> {
    let corrupt = |kind| ProgressError::Corrupt {
        path: path.to_path_buf(),
        kind,
    };

    let doc: BTreeMap<String, ProgressEntry> = serde_json::from_str(raw).map_err(|err| {
        if err.classify() == Category::Data {
            corrupt(CorruptKind::Schema(err))
        } else {
            corrupt(CorruptKind::Malformed(err))
        }
    })?;

    let mut entries = BTreeMap::new();
    for (key, entry) in doc {
        let number: QuestionNumber = match key.parse() {
            Ok(number) => number,
            Err(source) => return Err(corrupt(CorruptKind::InvalidKey { key, source })),
        };
        if let Err(source) = entry.validate() {
            return Err(corrupt(CorruptKind::InvalidEntry { number, source }));
        }
        // "07" and "7" name the same question.
        if entries.insert(number, entry).is_some() {
            return Err(corrupt(CorruptKind::DuplicateKey { number }));
        }
    }
    Ok(entries)
}
