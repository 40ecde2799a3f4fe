use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a persisted progress entry is well-formed JSON but not a valid entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressEntryError {
    #[error("entry has attempts but is not marked seen")]
    AttemptedButUnseen,

    #[error("entry has attempts but no last_attempted_at")]
    MissingTimestamp,

    #[error("last_result is unanswered but {attempts} attempts are recorded")]
    UnansweredWithAttempts { attempts: u32 },

    #[error("last_result is {result} but no matching attempt is recorded")]
    ResultWithoutAttempt { result: AttemptResult },
}

//
// ─── ATTEMPT RESULT ────────────────────────────────────────────────────────────
//

/// Outcome of the most recent attempt at a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptResult {
    Correct,
    Incorrect,
    #[default]
    Unanswered,
}

impl AttemptResult {
    #[must_use]
    pub fn from_correct(was_correct: bool) -> Self {
        if was_correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::Unanswered => "unanswered",
        }
    }
}

impl std::fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── PROGRESS ENTRY ────────────────────────────────────────────────────────────
//

/// Attempt history for one question of one certification.
///
/// Counters only ever grow; `correct_count + incorrect_count` is the number of
/// recorded attempts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub seen: bool,
    pub correct_count: u32,
    pub incorrect_count: u32,
    #[serde(default)]
    pub last_result: AttemptResult,
    #[serde(default)]
    pub last_attempted_at: Option<DateTime<Utc>>,
}

impl ProgressEntry {
    /// Fresh entry with no attempts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one attempt made at `at`.
    pub fn record(&mut self, was_correct: bool, at: DateTime<Utc>) {
        self.seen = true;
        if was_correct {
            self.correct_count = self.correct_count.saturating_add(1);
        } else {
            self.incorrect_count = self.incorrect_count.saturating_add(1);
        }
        self.last_result = AttemptResult::from_correct(was_correct);
        self.last_attempted_at = Some(at);
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.correct_count.saturating_add(self.incorrect_count)
    }

    /// Share of correct attempts, `None` before the first attempt.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let attempts = self.attempts();
        (attempts > 0).then(|| f64::from(self.correct_count) / f64::from(attempts))
    }

    /// A question counts as a weak spot once it has been missed at least once.
    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.incorrect_count > 0
    }

    /// Checks cross-field consistency of an entry loaded from disk.
    ///
    /// # Errors
    ///
    /// Returns `ProgressEntryError` describing the first inconsistency.
    pub fn validate(&self) -> Result<(), ProgressEntryError> {
        let attempts = self.attempts();
        match self.last_result {
            AttemptResult::Unanswered if attempts > 0 => {
                return Err(ProgressEntryError::UnansweredWithAttempts { attempts });
            }
            AttemptResult::Correct if self.correct_count == 0 => {
                return Err(ProgressEntryError::ResultWithoutAttempt {
                    result: self.last_result,
                });
            }
            AttemptResult::Incorrect if self.incorrect_count == 0 => {
                return Err(ProgressEntryError::ResultWithoutAttempt {
                    result: self.last_result,
                });
            }
            _ => {}
        }
        if attempts > 0 {
            if !self.seen {
                return Err(ProgressEntryError::AttemptedButUnseen);
            }
            if self.last_attempted_at.is_none() {
                return Err(ProgressEntryError::MissingTimestamp);
            }
        }
        Ok(())
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Aggregate counts across every entry of a certification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressSummary {
    pub seen: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl ProgressSummary {
    /// Fold a set of entries into totals.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ProgressEntry>) -> Self {
        entries
            .into_iter()
            .fold(Self::default(), |mut acc, entry| {
                if entry.seen {
                    acc.seen = acc.seen.saturating_add(1);
                }
                acc.correct = acc.correct.saturating_add(entry.correct_count);
                acc.incorrect = acc.incorrect.saturating_add(entry.incorrect_count);
                acc
            })
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let attempts = self.attempts();
        (attempts > 0).then(|| f64::from(self.correct) / f64::from(attempts))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen == 0 && self.attempts() == 0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn record_updates_counters_and_result() {
        let mut entry = ProgressEntry::new();
        entry.record(true, fixed_now());
        entry.record(false, fixed_now());

        assert!(entry.seen);
        assert_eq!(entry.correct_count, 1);
        assert_eq!(entry.incorrect_count, 1);
        assert_eq!(entry.last_result, AttemptResult::Incorrect);
        assert_eq!(entry.last_attempted_at, Some(fixed_now()));
        assert_eq!(entry.accuracy(), Some(0.5));
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn fresh_entry_is_valid_and_unanswered() {
        let entry = ProgressEntry::new();
        assert_eq!(entry.attempts(), 0);
        assert_eq!(entry.accuracy(), None);
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inconsistent_entries() {
        let entry = ProgressEntry {
            seen: true,
            correct_count: 2,
            incorrect_count: 0,
            last_result: AttemptResult::Unanswered,
            last_attempted_at: Some(fixed_now()),
        };
        assert_eq!(
            entry.validate(),
            Err(ProgressEntryError::UnansweredWithAttempts { attempts: 2 })
        );

        let entry = ProgressEntry {
            seen: true,
            correct_count: 1,
            incorrect_count: 0,
            last_result: AttemptResult::Correct,
            last_attempted_at: None,
        };
        assert_eq!(entry.validate(), Err(ProgressEntryError::MissingTimestamp));

        let entry = ProgressEntry {
            seen: true,
            correct_count: 1,
            incorrect_count: 0,
            last_result: AttemptResult::Incorrect,
            last_attempted_at: Some(fixed_now()),
        };
        assert!(matches!(
            entry.validate(),
            Err(ProgressEntryError::ResultWithoutAttempt { .. })
        ));
    }

    #[test]
    fn summary_folds_entries() {
        let mut a = ProgressEntry::new();
        a.record(true, fixed_now());
        let mut b = ProgressEntry::new();
        b.record(false, fixed_now());
        b.record(false, fixed_now());

        let summary = ProgressSummary::from_entries([&a, &b]);
        assert_eq!(summary.seen, 2);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.incorrect, 2);
        assert_eq!(summary.attempts(), 3);
        assert!(!summary.is_empty());
        assert!(ProgressSummary::default().is_empty());
    }

    #[test]
    fn result_serializes_lowercase() {
        let json = serde_json::to_string(&AttemptResult::Incorrect).unwrap();
        assert_eq!(json, "\"incorrect\"");
    }
}
