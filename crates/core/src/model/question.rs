use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::domain::domains_for;
use crate::model::ids::{ChoiceLetter, QuestionNumber};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question needs at least 2 choices, found {found}")]
    TooFewChoices { found: usize },

    #[error("choice letters must run A, B, C, ...; expected {expected} but found {found}")]
    NonContiguousChoices {
        expected: ChoiceLetter,
        found: ChoiceLetter,
    },

    #[error("too many choices: {found}")]
    TooManyChoices { found: usize },

    #[error("choice {letter} has empty text")]
    EmptyChoice { letter: ChoiceLetter },

    #[error("question has no correct answer")]
    NoCorrectAnswer,

    #[error("correct answer {letter} is not one of the choices")]
    UnknownCorrectLetter { letter: ChoiceLetter },
}

//
// ─── CHOICE ────────────────────────────────────────────────────────────────────
//

/// One labelled answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub letter: ChoiceLetter,
    pub text: String,
}

impl Choice {
    #[must_use]
    pub fn new(letter: ChoiceLetter, text: impl Into<String>) -> Self {
        Self {
            letter,
            text: text.into(),
        }
    }
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// A complete quiz question: prompt, ordered choices, correct letters and explanation.
///
/// Only constructible through [`QuestionRecord::new`] (or deserialization, which
/// runs the same checks), so every instance satisfies:
/// - non-empty prompt,
/// - at least two choices lettered contiguously from `A`,
/// - a non-empty set of correct letters, each present among the choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecordWire", into = "QuestionRecordWire")]
pub struct QuestionRecord {
    number: QuestionNumber,
    text: String,
    choices: Vec<Choice>,
    correct: BTreeSet<ChoiceLetter>,
    explanation: String,
}

impl QuestionRecord {
    /// Validates and builds a record.
    ///
    /// # Errors
    ///
    /// Returns a `QuestionError` naming the first violated invariant.
    pub fn new(
        number: QuestionNumber,
        text: impl Into<String>,
        choices: Vec<Choice>,
        correct: impl IntoIterator<Item = ChoiceLetter>,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if choices.len() < 2 {
            return Err(QuestionError::TooFewChoices {
                found: choices.len(),
            });
        }
        for (index, choice) in choices.iter().enumerate() {
            let expected = ChoiceLetter::from_index(index).ok_or(QuestionError::TooManyChoices {
                found: choices.len(),
            })?;
            if choice.letter != expected {
                return Err(QuestionError::NonContiguousChoices {
                    expected,
                    found: choice.letter,
                });
            }
            if choice.text.trim().is_empty() {
                return Err(QuestionError::EmptyChoice {
                    letter: choice.letter,
                });
            }
        }

        let correct: BTreeSet<ChoiceLetter> = correct.into_iter().collect();
        if correct.is_empty() {
            return Err(QuestionError::NoCorrectAnswer);
        }
        if let Some(letter) = correct.iter().find(|l| l.index() >= choices.len()) {
            return Err(QuestionError::UnknownCorrectLetter { letter: *letter });
        }

        Ok(Self {
            number,
            text,
            choices,
            correct,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn number(&self) -> QuestionNumber {
        self.number
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn correct(&self) -> &BTreeSet<ChoiceLetter> {
        &self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Text of the choice labelled `letter`.
    #[must_use]
    pub fn choice(&self, letter: ChoiceLetter) -> Option<&str> {
        self.choices.get(letter.index()).map(|c| c.text.as_str())
    }

    #[must_use]
    pub fn has_choice(&self, letter: ChoiceLetter) -> bool {
        letter.index() < self.choices.len()
    }

    /// Number of answers the prompt asks for ("Choose two" -> 2).
    #[must_use]
    pub fn expected_answer_count(&self) -> usize {
        expected_answer_count(&self.text)
    }

    #[must_use]
    pub fn is_multi_select(&self) -> bool {
        self.correct.len() > 1 || self.expected_answer_count() > 1
    }

    /// Topic domains inferred from the prompt.
    #[must_use]
    pub fn domains(&self) -> Vec<&'static str> {
        domains_for(&self.text)
    }

    /// True when `given` names exactly the correct letters.
    #[must_use]
    pub fn is_correct(&self, given: &BTreeSet<ChoiceLetter>) -> bool {
        *given == self.correct
    }
}

static CHOOSE_N: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bchoose\s+(two|three|four|five|2|3|4|5)\b")
        .expect("choose-count pattern should compile")
});

/// Answer count requested by a "(Choose two.)" style hint, 1 when absent.
#[must_use]
pub fn expected_answer_count(prompt: &str) -> usize {
    let Some(caps) = CHOOSE_N.captures(prompt) else {
        return 1;
    };
    match caps[1].to_ascii_lowercase().as_str() {
        "two" | "2" => 2,
        "three" | "3" => 3,
        "four" | "4" => 4,
        "five" | "5" => 5,
        _ => 1,
    }
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

/// On-disk shape of a question; converted through `QuestionRecord::new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestionRecordWire {
    number: QuestionNumber,
    text: String,
    choices: Vec<Choice>,
    correct: Vec<ChoiceLetter>,
    #[serde(default)]
    explanation: String,
}

impl TryFrom<QuestionRecordWire> for QuestionRecord {
    type Error = QuestionError;

    fn try_from(wire: QuestionRecordWire) -> Result<Self, Self::Error> {
        QuestionRecord::new(
            wire.number,
            wire.text,
            wire.choices,
            wire.correct,
            wire.explanation,
        )
    }
}

impl From<QuestionRecord> for QuestionRecordWire {
    fn from(record: QuestionRecord) -> Self {
        Self {
            number: record.number,
            text: record.text,
            choices: record.choices,
            correct: record.correct.into_iter().collect(),
            explanation: record.explanation,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(c: char) -> ChoiceLetter {
        ChoiceLetter::new(c).unwrap()
    }

    fn choices(texts: &[&str]) -> Vec<Choice> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Choice::new(ChoiceLetter::from_index(i).unwrap(), *t))
            .collect()
    }

    fn number(n: u32) -> QuestionNumber {
        QuestionNumber::new(n).unwrap()
    }

    #[test]
    fn valid_record_builds() {
        let record = QuestionRecord::new(
            number(1),
            "Which service stores objects?",
            choices(&["S3", "EC2"]),
            [letter('A')],
            "S3 is object storage.",
        )
        .unwrap();

        assert_eq!(record.choice(letter('A')), Some("S3"));
        assert_eq!(record.choice(letter('C')), None);
        assert!(!record.is_multi_select());
    }

    #[test]
    fn rejects_correct_letter_outside_choices() {
        let err = QuestionRecord::new(
            number(1),
            "Q",
            choices(&["one", "two"]),
            [letter('C')],
            "",
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuestionError::UnknownCorrectLetter {
                letter: letter('C')
            }
        );
    }

    #[test]
    fn rejects_gaps_in_choice_letters() {
        let bad = vec![Choice::new(letter('A'), "one"), Choice::new(letter('C'), "three")];
        let err = QuestionRecord::new(number(1), "Q", bad, [letter('A')], "").unwrap_err();
        assert!(matches!(err, QuestionError::NonContiguousChoices { .. }));
    }

    #[test]
    fn rejects_single_choice_and_empty_answer() {
        let err =
            QuestionRecord::new(number(1), "Q", choices(&["only"]), [letter('A')], "").unwrap_err();
        assert_eq!(err, QuestionError::TooFewChoices { found: 1 });

        let err = QuestionRecord::new(number(1), "Q", choices(&["a", "b"]), [], "").unwrap_err();
        assert_eq!(err, QuestionError::NoCorrectAnswer);
    }

    #[test]
    fn rejects_blank_prompt() {
        let err = QuestionRecord::new(number(1), "  ", choices(&["a", "b"]), [letter('A')], "")
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn choose_hint_sets_expected_count() {
        assert_eq!(expected_answer_count("Which two? (Choose two.)"), 2);
        assert_eq!(expected_answer_count("pick options (choose THREE.)"), 3);
        assert_eq!(expected_answer_count("Which is correct?"), 1);
    }

    #[test]
    fn json_uses_flat_letter_strings() {
        let record = QuestionRecord::new(
            number(3),
            "Pick two (Choose two.)",
            choices(&["x", "y", "z"]),
            [letter('C'), letter('A')],
            "",
        )
        .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["number"], 3);
        assert_eq!(json["correct"], serde_json::json!(["A", "C"]));
        assert_eq!(json["choices"][1]["letter"], "B");
        assert!(record.is_multi_select());
    }

    #[test]
    fn deserialization_runs_validation() {
        let raw = r#"{"number":1,"text":"Q","choices":[{"letter":"A","text":"a"},{"letter":"B","text":"b"}],"correct":["D"]}"#;
        assert!(serde_json::from_str::<QuestionRecord>(raw).is_err());

        let raw = r#"{"number":1,"text":"Q","choices":[{"letter":"A","text":"a"},{"letter":"B","text":"b"}],"correct":["B"]}"#;
        let record: QuestionRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.explanation(), "");
    }
}
