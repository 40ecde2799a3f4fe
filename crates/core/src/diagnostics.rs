//! Non-fatal warnings collected while parsing and merging raw exam text.
//!
//! Extraction never aborts on a bad block: each skipped or suspicious unit
//! becomes a [`Diagnostic`] carried next to the partial result.

use std::fmt;

use crate::model::QuestionNumber;

/// Which stage of the import pipeline produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSource {
    Questions,
    Solutions,
    Merge,
}

impl DiagnosticSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Questions => "questions",
            Self::Solutions => "solutions",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// A question block with fewer than two recognizable choices.
    MissingChoices { found: usize },
    EmptyPrompt,
    /// Number lower than one already seen; the block was skipped.
    OutOfOrder { previous: QuestionNumber },
    /// Numbers between `previous` and this one never appeared.
    Gap { previous: QuestionNumber },
    DuplicateQuestion,
    DuplicateSolution,
    /// A solution block without a recognizable answer letter.
    MissingAnswer,
    MissingSolution,
    OrphanSolution,
    InvalidRecord { reason: String },
    AnswerCountMismatch { expected: usize, found: usize },
    /// A marker whose number is zero or does not fit.
    BadNumber { raw: String },
}

/// One warning, tied to a question number when the block had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: DiagnosticSource,
    pub question: Option<QuestionNumber>,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    #[must_use]
    pub fn new(source: DiagnosticSource, question: QuestionNumber, kind: DiagnosticKind) -> Self {
        Self {
            source,
            question: Some(question),
            kind,
        }
    }

    #[must_use]
    pub fn unnumbered(source: DiagnosticSource, kind: DiagnosticKind) -> Self {
        Self {
            source,
            question: None,
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self
            .question
            .map_or_else(|| "?".to_owned(), |n| n.to_string());
        match &self.kind {
            DiagnosticKind::MissingChoices { found } => {
                write!(f, "question {q} skipped: found {found} choices, need at least 2")
            }
            DiagnosticKind::EmptyPrompt => write!(f, "question {q} skipped: empty question text"),
            DiagnosticKind::OutOfOrder { previous } => write!(
                f,
                "question {q} skipped: appears after question {previous}"
            ),
            DiagnosticKind::Gap { previous } => {
                write!(f, "question {q} follows question {previous}; numbers in between are missing")
            }
            DiagnosticKind::DuplicateQuestion => write!(
                f,
                "question {q} appears more than once; the last occurrence wins"
            ),
            DiagnosticKind::DuplicateSolution => write!(
                f,
                "solution for question {q} appears more than once; the last occurrence wins"
            ),
            DiagnosticKind::MissingAnswer => {
                write!(f, "solution for question {q} skipped: no answer letter found")
            }
            DiagnosticKind::MissingSolution => write!(f, "no solution found for question {q}"),
            DiagnosticKind::OrphanSolution => write!(
                f,
                "solution for question {q} has no matching question text"
            ),
            DiagnosticKind::InvalidRecord { reason } => {
                write!(f, "question {q} dropped: {reason}")
            }
            DiagnosticKind::AnswerCountMismatch { expected, found } => write!(
                f,
                "question {q} asks for {expected} answers but the solution gives {found}"
            ),
            DiagnosticKind::BadNumber { raw } => {
                write!(f, "{} block skipped: invalid question number {raw:?}", self.source)
            }
        }
    }
}

/// A partial result plus the diagnostics gathered while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Extraction<T> {
    #[must_use]
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_solution_message_names_question() {
        let d = Diagnostic::new(
            DiagnosticSource::Merge,
            QuestionNumber::new(7).unwrap(),
            DiagnosticKind::MissingSolution,
        );
        assert_eq!(d.to_string(), "no solution found for question 7");
    }

    #[test]
    fn orphan_solution_message_names_question() {
        let d = Diagnostic::new(
            DiagnosticSource::Merge,
            QuestionNumber::new(12).unwrap(),
            DiagnosticKind::OrphanSolution,
        );
        assert_eq!(
            d.to_string(),
            "solution for question 12 has no matching question text"
        );
    }

    #[test]
    fn unnumbered_diagnostic_mentions_source() {
        let d = Diagnostic::unnumbered(
            DiagnosticSource::Solutions,
            DiagnosticKind::BadNumber { raw: "0".into() },
        );
        assert!(d.to_string().starts_with("solutions block skipped"));
        assert_eq!(d.question, None);
    }
}
