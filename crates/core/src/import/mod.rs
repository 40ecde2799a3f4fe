//! Raw exam text to validated question records.
//!
//! The pipeline is three pure steps: [`extract_questions`] reads the question
//! dump, [`extract_solutions`] reads the solutions document, and [`merge`]
//! joins them by question number. [`parse`] runs all three and concatenates
//! their diagnostics.

mod markers;
mod merge;
mod questions;
mod solutions;

pub use merge::merge;
pub use questions::{PartialQuestion, QuestionExtractor, extract_questions};
pub use solutions::{MAX_EXPLANATION_CHARS, Solution, SolutionMap, extract_solutions};

use crate::diagnostics::Extraction;
use crate::model::QuestionRecord;

/// Counts describing one full parse, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseStats {
    pub questions_found: usize,
    pub solutions_found: usize,
    pub records: usize,
}

/// Extract, merge and validate in one call.
#[must_use]
pub fn parse(questions_text: &str, solutions_text: &str) -> (Extraction<Vec<QuestionRecord>>, ParseStats) {
    let mut extractor = extract_questions(questions_text);
    let partials: Vec<PartialQuestion> = extractor.by_ref().collect();
    let mut diagnostics = extractor.into_diagnostics();

    let solutions = extract_solutions(solutions_text);
    diagnostics.extend(solutions.diagnostics);

    let merged = merge(partials.iter().cloned(), &solutions.value);
    diagnostics.extend(merged.diagnostics);

    let stats = ParseStats {
        questions_found: partials.len(),
        solutions_found: solutions.value.len(),
        records: merged.value.len(),
    };
    (Extraction::new(merged.value, diagnostics), stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::model::ChoiceLetter;

    #[test]
    fn parse_joins_question_and_solution() {
        let questions = "Question 1: Which color is the sky?\nA. Foo\nB. Bar\n";
        let solutions = "Question 1: Answer: B Explanation: Bar is right.\n";

        let (result, stats) = parse(questions, solutions);
        assert!(result.is_clean(), "{:?}", result.diagnostics);
        assert_eq!(stats.records, 1);

        let record = &result.value[0];
        assert_eq!(record.number().value(), 1);
        assert_eq!(record.choices()[0].text, "Foo");
        assert_eq!(record.choices()[1].text, "Bar");
        assert_eq!(
            record.correct().iter().copied().collect::<Vec<_>>(),
            vec![ChoiceLetter::new('B').unwrap()]
        );
        assert_eq!(record.explanation(), "Bar is right.");
    }

    #[test]
    fn parse_handles_single_line_question() {
        let (result, stats) = parse(
            "Question 1: Which one? A. Foo B. Bar",
            "Question 1: Answer: B Explanation: because",
        );
        assert!(result.is_clean(), "{:?}", result.diagnostics);
        assert_eq!(stats.questions_found, 1);

        let record = &result.value[0];
        assert_eq!(record.text(), "Which one?");
        assert_eq!(record.choices()[0].text, "Foo");
        assert_eq!(record.choices()[1].text, "Bar");
        assert_eq!(record.correct().len(), 1);
        assert!(record.correct().contains(&ChoiceLetter::new('B').unwrap()));
        assert_eq!(record.explanation(), "because");
    }

    #[test]
    fn prose_after_answer_letter_is_not_read_as_letters() {
        let questions = "Question 1: Which?\nA. Foo\nB. Bar\nC. Baz\n";
        let (result, _) = parse(questions, "Question 1: Answer: B A NAT gateway is required here.\n");
        assert!(result.is_clean(), "{:?}", result.diagnostics);
        assert_eq!(
            result.value[0].correct().iter().copied().collect::<Vec<_>>(),
            vec![ChoiceLetter::new('B').unwrap()]
        );
    }

    #[test]
    fn parse_collects_diagnostics_from_every_stage() {
        let questions = "Question 1: one?\nA. x\nB. y\nQuestion 2: two?\nA. x\nB. y\n";
        let solutions = "Question 1: Answer: A\nQuestion 9: Answer: B\n";

        let (result, stats) = parse(questions, solutions);
        assert_eq!(stats.questions_found, 2);
        assert_eq!(stats.solutions_found, 2);
        assert_eq!(result.value.len(), 1);

        let kinds: Vec<_> = result.diagnostics.iter().map(|d| d.kind.clone()).collect();
        assert!(kinds.contains(&DiagnosticKind::MissingSolution));
        assert!(kinds.contains(&DiagnosticKind::OrphanSolution));
    }
}
