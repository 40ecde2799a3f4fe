use std::collections::BTreeSet;

use quiz_core::model::{ChoiceLetter, QuestionRecord};

use crate::error::AnswerError;

/// Parse typed letters such as `b`, `A, C` or `ac` against `question`.
///
/// Commas, slashes, `&` and whitespace separate letters; repeats collapse.
/// The number of letters must match what the prompt asks for: one, or the
/// count in a "Choose two" style hint.
///
/// # Errors
///
/// Returns `AnswerError` for empty input, non-letters, letters without a
/// matching choice, or the wrong number of letters.
pub fn parse_answer(
    input: &str,
    question: &QuestionRecord,
) -> Result<BTreeSet<ChoiceLetter>, AnswerError> {
    let mut given = BTreeSet::new();
    for ch in input.chars() {
        if ch.is_whitespace() || matches!(ch, ',' | '/' | '&') {
            continue;
        }
        if !ch.is_ascii_alphabetic() {
            return Err(AnswerError::NotALetter { found: ch });
        }
        let letter = ChoiceLetter::new(ch).map_err(|_| AnswerError::NotALetter { found: ch })?;
        if !question.has_choice(letter) {
            return Err(AnswerError::UnknownChoice { letter });
        }
        given.insert(letter);
    }

    if given.is_empty() {
        return Err(AnswerError::Empty);
    }
    let expected = question.expected_answer_count();
    if given.len() != expected {
        return Err(AnswerError::WrongCount {
            expected,
            found: given.len(),
        });
    }
    Ok(given)
}
