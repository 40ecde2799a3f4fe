#![forbid(unsafe_code)]

pub mod error;
pub mod import_service;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::{AnswerError, ImportError, SessionError};
pub use import_service::{ImportReport, ImportRequest, ImportService};
pub use sessions::{AnswerOutcome, QuizSession, SessionMode, SessionTally};
