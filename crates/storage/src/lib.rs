//! File persistence for quiz data: the merged question file and the
//! per-certification progress store.

#![forbid(unsafe_code)]

pub mod atomic;
pub mod paths;
pub mod progress_store;
pub mod question_file;

pub use paths::CertPaths;
pub use progress_store::{CorruptKind, ProgressError, ProgressStore};
pub use question_file::{QuestionFileError, read_questions, write_questions};
