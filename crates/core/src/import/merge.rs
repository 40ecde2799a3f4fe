use std::collections::BTreeMap;

use super::questions::PartialQuestion;
use super::solutions::SolutionMap;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSource, Extraction};
use crate::model::{QuestionNumber, QuestionRecord};

/// Join extracted questions with their solutions.
///
/// Output is ascending by number. Questions without a solution and records
/// that fail validation are dropped with a diagnostic; solutions without a
/// question only produce a diagnostic. For repeated question numbers the last
/// occurrence is used.
#[must_use]
pub fn merge(
    questions: impl IntoIterator<Item = PartialQuestion>,
    solutions: &SolutionMap,
) -> Extraction<Vec<QuestionRecord>> {
    let by_number: BTreeMap<QuestionNumber, PartialQuestion> =
        questions.into_iter().map(|q| (q.number, q)).collect();

    let mut records = Vec::with_capacity(by_number.len());
    let mut diagnostics = Vec::new();
    let mut warn = |number, kind| {
        diagnostics.push(Diagnostic::new(DiagnosticSource::Merge, number, kind));
    };

    for (number, question) in &by_number {
        let Some(solution) = solutions.get(number) else {
            warn(*number, DiagnosticKind::MissingSolution);
            continue;
        };

        let record = QuestionRecord::new(
            *number,
            question.text.clone(),
            question.choices.clone(),
            solution.correct.iter().copied(),
            solution.explanation.clone(),
        );
        match record {
            Ok(record) => {
                let expected = record.expected_answer_count();
                let found = record.correct().len();
                if expected != found {
                    warn(
                        *number,
                        DiagnosticKind::AnswerCountMismatch { expected, found },
                    );
                }
                records.push(record);
            }
            Err(err) => warn(
                *number,
                DiagnosticKind::InvalidRecord {
                    reason: err.to_string(),
                },
            ),
        }
    }

    for number in solutions.keys().filter(|n| !by_number.contains_key(n)) {
        warn(*number, DiagnosticKind::OrphanSolution);
    }

    Extraction::new(records, diagnostics)
}
