//! Shared error types for the services crate.

use std::io;
use std::path::PathBuf;

use quiz_core::model::ChoiceLetter;
use storage::{ProgressError, QuestionFileError};
use thiserror::Error;

/// Errors emitted by `ImportService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Write(#[from] QuestionFileError),
}

/// Why a typed answer could not be graded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("no answer given")]
    Empty,
    #[error("{found:?} is not a choice letter")]
    NotALetter { found: char },
    #[error("there is no choice {letter}")]
    UnknownChoice { letter: ChoiceLetter },
    #[error("expected {expected} choice(s), got {found}")]
    WrongCount { expected: usize, found: usize },
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("invalid answer: {0}")]
    InvalidAnswer(#[from] AnswerError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
