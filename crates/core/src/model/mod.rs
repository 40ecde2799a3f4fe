mod ids;
mod progress;
mod question;

pub use ids::{CertId, ChoiceLetter, IdError, QuestionNumber};
pub use progress::{AttemptResult, ProgressEntry, ProgressEntryError, ProgressSummary};
pub use question::{Choice, QuestionError, QuestionRecord, expected_answer_count};
