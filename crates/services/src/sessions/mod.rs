mod answer;
mod plan;
mod progress;
mod service;

// Public API of the session subsystem.
pub use crate::error::{AnswerError, SessionError};
pub use answer::parse_answer;
pub use plan::{SessionMode, UnknownMode, domain_counts};
pub use progress::SessionTally;
pub use service::{AnswerOutcome, QuizSession};
