use std::collections::BTreeSet;
use std::fmt;

use quiz_core::model::{ChoiceLetter, QuestionNumber, QuestionRecord};
use storage::ProgressStore;
use tracing::debug;

use super::answer::parse_answer;
use super::plan::{SessionMode, order};
use super::progress::SessionTally;
use crate::error::SessionError;

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Result of grading one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub number: QuestionNumber,
    pub correct: bool,
    pub expected: BTreeSet<ChoiceLetter>,
    pub given: BTreeSet<ChoiceLetter>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One pass over a selection of questions.
///
/// Each graded answer is recorded in the progress store before the session
/// moves on, so an abandoned session keeps everything answered so far.
pub struct QuizSession {
    mode: SessionMode,
    questions: Vec<QuestionRecord>,
    current: usize,
    outcomes: Vec<AnswerOutcome>,
}

impl QuizSession {
    /// Build a session from `questions` (in file order) for `mode`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the mode selects no questions.
    pub fn new(
        questions: Vec<QuestionRecord>,
        mode: SessionMode,
        progress: &ProgressStore,
    ) -> Result<Self, SessionError> {
        let questions = order(questions, &mode, progress);
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        debug!(cert = %progress.cert(), %mode, questions = questions.len(), "session started");
        Ok(Self {
            mode,
            questions,
            current: 0,
            outcomes: Vec::new(),
        })
    }

    #[must_use]
    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    #[must_use]
    pub fn outcomes(&self) -> &[AnswerOutcome] {
        &self.outcomes
    }

    /// The question awaiting an answer, `None` once the session is complete.
    #[must_use]
    pub fn current(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    #[must_use]
    pub fn tally(&self) -> SessionTally {
        SessionTally {
            answered: self.outcomes.len(),
            correct: self.outcomes.iter().filter(|o| o.correct).count(),
            remaining: self.questions.len().saturating_sub(self.current),
        }
    }

    /// Grade `input` against the current question, record it and advance.
    ///
    /// # Errors
    ///
    /// - `Completed` if every question has been answered.
    /// - `InvalidAnswer` if `input` cannot be graded; the session stays on
    ///   the same question and nothing is recorded.
    /// - `Progress` if the attempt could not be saved; the session does not
    ///   advance.
    pub fn answer(
        &mut self,
        progress: &mut ProgressStore,
        input: &str,
    ) -> Result<AnswerOutcome, SessionError> {
        let question = self.current().ok_or(SessionError::Completed)?;
        let given = parse_answer(input, question)?;
        let correct = question.is_correct(&given);
        let outcome = AnswerOutcome {
            number: question.number(),
            correct,
            expected: question.correct().clone(),
            given,
        };

        progress.record_attempt(outcome.number, correct)?;
        debug!(question = outcome.number.value(), correct, "answer recorded");

        self.outcomes.push(outcome.clone());
        self.current += 1;
        Ok(outcome)
    }

    /// Move past the current question without recording anything.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if nothing is left to skip.
    pub fn skip(&mut self) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        self.current += 1;
        Ok(())
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("mode", &self.mode)
            .field("total", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.outcomes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnswerError;
    use quiz_core::model::{CertId, Choice};
    use quiz_core::time::fixed_clock;
    use storage::CertPaths;

    fn letter(c: char) -> ChoiceLetter {
        ChoiceLetter::new(c).unwrap()
    }

    fn question(n: u32, correct: &str) -> QuestionRecord {
        let hint = if correct.len() > 1 { " (Choose two.)" } else { "" };
        QuestionRecord::new(
            QuestionNumber::new(n).unwrap(),
            format!("Question {n}{hint}"),
            vec![
                Choice::new(letter('A'), "one"),
                Choice::new(letter('B'), "two"),
                Choice::new(letter('C'), "three"),
            ],
            correct.chars().map(letter),
            "",
        )
        .unwrap()
    }

    fn store(dir: &std::path::Path) -> ProgressStore {
        let cert: CertId = "test".parse().unwrap();
        ProgressStore::load(&CertPaths::new(dir, &cert), fixed_clock()).unwrap()
    }

    #[test]
    fn grades_records_and_advances() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = store(dir.path());
        let mut session = QuizSession::new(
            vec![question(1, "B"), question(2, "AC")],
            SessionMode::Sequential,
            &progress,
        )
        .unwrap();

        let first = session.answer(&mut progress, "b").unwrap();
        assert!(first.correct);
        assert_eq!(session.current().unwrap().number().value(), 2);

        let second = session.answer(&mut progress, "A, B").unwrap();
        assert!(!second.correct);
        assert_eq!(second.expected, BTreeSet::from([letter('A'), letter('C')]));

        assert!(session.is_complete());
        assert_eq!(
            session.tally(),
            SessionTally {
                answered: 2,
                correct: 1,
                remaining: 0
            }
        );
        let summary = progress.summary();
        assert_eq!((summary.seen, summary.correct, summary.incorrect), (2, 1, 1));
    }

    #[test]
    fn multi_select_letters_in_any_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = store(dir.path());
        let mut session =
            QuizSession::new(vec![question(1, "AC")], SessionMode::Sequential, &progress).unwrap();

        let outcome = session.answer(&mut progress, "ca").unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.given, outcome.expected);
    }

    #[test]
    fn choose_two_with_one_correct_letter_is_graded_wrong() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = store(dir.path());
        let lopsided = QuestionRecord::new(
            QuestionNumber::new(1).unwrap(),
            "Pick (Choose two.)",
            vec![Choice::new(letter('A'), "one"), Choice::new(letter('B'), "two")],
            [letter('A')],
            "",
        )
        .unwrap();
        let mut session =
            QuizSession::new(vec![lopsided], SessionMode::Sequential, &progress).unwrap();

        let outcome = session.answer(&mut progress, "ab").unwrap();
        assert!(!outcome.correct);
        assert_eq!(progress.summary().incorrect, 1);
    }

    #[test]
    fn invalid_answer_keeps_position_and_records_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = store(dir.path());
        let mut session =
            QuizSession::new(vec![question(1, "AC")], SessionMode::Sequential, &progress).unwrap();

        let err = session.answer(&mut progress, "a").unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidAnswer(AnswerError::WrongCount { .. })
        ));
        assert_eq!(session.tally().answered, 0);
        assert!(progress.is_empty());
    }

    #[test]
    fn completed_session_rejects_answers() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = store(dir.path());
        let mut session =
            QuizSession::new(vec![question(1, "A")], SessionMode::Sequential, &progress).unwrap();
        session.skip().unwrap();

        assert!(matches!(
            session.answer(&mut progress, "a"),
            Err(SessionError::Completed)
        ));
        assert!(session.skip().is_err());
    }

    #[test]
    fn empty_selection_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let progress = store(dir.path());
        let err = QuizSession::new(vec![question(1, "A")], SessionMode::WeakSpots, &progress)
            .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }
}
