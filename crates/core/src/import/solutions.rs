use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use super::markers::{SEPARATOR, SOLUTION_MARKER, leading_letter};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSource, Extraction};
use crate::model::{ChoiceLetter, QuestionNumber};

/// Explanations longer than this are cut at a character boundary.
pub const MAX_EXPLANATION_CHARS: usize = 1500;

/// Correct letters and explanation for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub correct: BTreeSet<ChoiceLetter>,
    pub explanation: String,
}

pub type SolutionMap = BTreeMap<QuestionNumber, Solution>;

/// `Answer:`, `Answers:`, `Correct answer`, `ans-` followed by the letters.
static ANSWER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:correct[ \t]+answers?|answers?|ans)[ \t]*[:\-–—]*[ \t]*")
        .expect("answer label pattern should compile")
});

static EXPLANATION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bexplanation[ \t]*:").expect("explanation label pattern should compile")
});

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("blank line pattern should compile"));

/// Parse the solutions document into a map keyed by question number.
///
/// Later blocks for the same number replace earlier ones.
#[must_use]
pub fn extract_solutions(text: &str) -> Extraction<SolutionMap> {
    let mut solutions = SolutionMap::new();
    let mut diagnostics = Vec::new();

    let markers: Vec<_> = SOLUTION_MARKER.captures_iter(text).collect();
    for (i, caps) in markers.iter().enumerate() {
        let body_start = caps.get(0).map_or(0, |m| m.end());
        let body_end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let raw_number = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());

        let Ok(number) = raw_number.parse::<QuestionNumber>() else {
            diagnostics.push(Diagnostic::unnumbered(
                DiagnosticSource::Solutions,
                DiagnosticKind::BadNumber {
                    raw: raw_number.to_owned(),
                },
            ));
            continue;
        };

        let Some(solution) = parse_solution_block(&text[body_start..body_end]) else {
            diagnostics.push(Diagnostic::new(
                DiagnosticSource::Solutions,
                number,
                DiagnosticKind::MissingAnswer,
            ));
            continue;
        };

        if solutions.insert(number, solution).is_some() {
            diagnostics.push(Diagnostic::new(
                DiagnosticSource::Solutions,
                number,
                DiagnosticKind::DuplicateSolution,
            ));
        }
    }

    Extraction::new(solutions, diagnostics)
}

fn parse_solution_block(block: &str) -> Option<Solution> {
    let block = match SEPARATOR.find(block) {
        Some(sep) => &block[..sep.start()],
        None => block,
    };

    let (correct, rest) = labelled_answer(block).or_else(|| lettered_lines(block))?;
    Some(Solution {
        correct,
        explanation: explanation_after(rest),
    })
}

/// Letters following an answer label, and the text after them.
fn labelled_answer(block: &str) -> Option<(BTreeSet<ChoiceLetter>, &str)> {
    ANSWER_LABEL.find_iter(block).find_map(|label| {
        let (correct, len) = letter_run(&block[label.end()..])?;
        Some((correct, &block[label.end() + len..]))
    })
}

/// Answer letters at the start of `text` and the byte length they span.
///
/// Accepts `B`, `BD`, `A, C`, `A/C`, `A & C`, `A and E` and `A. C.`. Plain
/// whitespace only joins letters that each carry a `.` or `)`, so in
/// `C A company` the run ends after `C`.
fn letter_run(text: &str) -> Option<(BTreeSet<ChoiceLetter>, usize)> {
    let mut end = upper_word(text)?;
    let mut correct: BTreeSet<ChoiceLetter> = letters_in(&text[..end]).collect();
    while let Some((start, len)) = joined_word(&text[end..]) {
        correct.extend(letters_in(&text[end + start..end + start + len]));
        end += start + len;
    }
    Some((correct, end))
}

fn letters_in(word: &str) -> impl Iterator<Item = ChoiceLetter> + '_ {
    word.chars().filter_map(|c| ChoiceLetter::new(c).ok())
}

/// Length of a whole word of uppercase ASCII letters opening `text`.
fn upper_word(text: &str) -> Option<usize> {
    let len = text.bytes().take_while(u8::is_ascii_uppercase).count();
    let whole = !text[len..].starts_with(char::is_alphanumeric);
    (len > 0 && whole).then_some(len)
}

/// Offset and length of the next letter word joined to the previous one.
fn joined_word(rest: &str) -> Option<(usize, usize)> {
    let skip_blanks = |from: usize| rest.len() - rest[from..].trim_start_matches([' ', '\t']).len();
    let lead = skip_blanks(0);

    let start = if rest[lead..].starts_with([',', '/', '&']) {
        skip_blanks(lead + 1)
    } else if lead > 0 && rest[lead..].starts_with("and") && skip_blanks(lead + 3) > lead + 3 {
        skip_blanks(lead + 3)
    } else if rest.starts_with(['.', ')']) && skip_blanks(1) > 1 {
        let start = skip_blanks(1);
        let len = upper_word(&rest[start..])?;
        let punctuated = rest[start + len..].starts_with(['.', ')']);
        return (len == 1 && punctuated).then_some((start, len));
    } else {
        return None;
    };
    upper_word(&rest[start..]).map(|len| (start, len))
}

/// Letters of the first paragraph whose lines open with `X.` / `X)`.
fn lettered_lines(block: &str) -> Option<(BTreeSet<ChoiceLetter>, &str)> {
    let mut correct = BTreeSet::new();
    let mut offset = 0;
    let mut end = None;

    for line in block.split_inclusive('\n') {
        let line_end = offset + line.len();
        let trimmed = line.trim();
        if correct.is_empty() {
            if let Some((letter, _)) = leading_letter(trimmed) {
                correct.insert(letter);
                end = Some(line_end);
            }
        } else if trimmed.is_empty() {
            break;
        } else {
            if let Some((letter, _)) = leading_letter(trimmed) {
                correct.insert(letter);
            }
            end = Some(line_end);
        }
        offset = line_end;
    }

    let end = end?;
    // Keep the newline that closed the run so a following blank line is still seen.
    let rest_start = block[..end].rfind('\n').unwrap_or(end);
    Some((correct, &block[rest_start..]))
}

/// Explanation text following the answer token.
fn explanation_after(rest: &str) -> String {
    let explanation = if let Some(label) = EXPLANATION_LABEL.find(rest) {
        &rest[label.end()..]
    } else {
        match BLANK_LINE.find(rest) {
            Some(blank) => &rest[blank.end()..],
            None => "",
        }
    };
    truncate_chars(explanation.trim(), MAX_EXPLANATION_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].trim_end().to_owned(),
        None => text.to_owned(),
    }
}
