use std::collections::BTreeSet;
use std::iter::Peekable;

use regex::CaptureMatches;

use super::markers::{QUESTION_MARKER, inline_letter, leading_letter, normalize_whitespace};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSource, Extraction};
use crate::model::{Choice, ChoiceLetter, QuestionNumber};

/// A question as read from the dump: prompt and choices, no answer yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialQuestion {
    pub number: QuestionNumber,
    pub text: String,
    pub choices: Vec<Choice>,
}

/// Lazily walks the question dump block by block.
///
/// Blocks that cannot be used are skipped and recorded as diagnostics, which
/// stay available after the iterator is drained.
pub struct QuestionExtractor<'a> {
    text: &'a str,
    markers: Peekable<CaptureMatches<'static, 'a>>,
    yielded: BTreeSet<QuestionNumber>,
    highest: Option<QuestionNumber>,
    diagnostics: Vec<Diagnostic>,
}

/// Start extracting questions from `text`.
#[must_use]
pub fn extract_questions(text: &str) -> QuestionExtractor<'_> {
    QuestionExtractor {
        text,
        markers: QUESTION_MARKER.captures_iter(text).peekable(),
        yielded: BTreeSet::new(),
        highest: None,
        diagnostics: Vec::new(),
    }
}

impl<'a> QuestionExtractor<'a> {
    /// Diagnostics gathered so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Drain the iterator into a list plus its diagnostics.
    #[must_use]
    pub fn collect_all(mut self) -> Extraction<Vec<PartialQuestion>> {
        let questions: Vec<PartialQuestion> = self.by_ref().collect();
        Extraction::new(questions, self.diagnostics)
    }

    fn warn(&mut self, number: QuestionNumber, kind: DiagnosticKind) {
        self.diagnostics
            .push(Diagnostic::new(DiagnosticSource::Questions, number, kind));
    }

    /// Applies the numbering rules; `false` means the block must be skipped.
    fn accept_number(&mut self, number: QuestionNumber) -> bool {
        if self.yielded.contains(&number) {
            self.warn(number, DiagnosticKind::DuplicateQuestion);
            return true;
        }
        match self.highest {
            Some(previous) if number < previous => {
                self.warn(number, DiagnosticKind::OutOfOrder { previous });
                false
            }
            Some(previous) if number.value() > previous.value().saturating_add(1) => {
                self.warn(number, DiagnosticKind::Gap { previous });
                self.highest = Some(number);
                true
            }
            _ => {
                self.highest = Some(self.highest.map_or(number, |h| h.max(number)));
                true
            }
        }
    }
}

impl Iterator for QuestionExtractor<'_> {
    type Item = PartialQuestion;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let caps = self.markers.next()?;
            let body_start = caps.get(0).map_or(0, |m| m.end());
            let body_end = self
                .markers
                .peek()
                .and_then(|next| next.get(0))
                .map_or(self.text.len(), |m| m.start());
            let raw_number = caps.get(1).map_or("", |m| m.as_str());

            let Ok(number) = raw_number.parse::<QuestionNumber>() else {
                self.diagnostics.push(Diagnostic::unnumbered(
                    DiagnosticSource::Questions,
                    DiagnosticKind::BadNumber {
                        raw: raw_number.to_owned(),
                    },
                ));
                continue;
            };

            if !self.accept_number(number) {
                continue;
            }

            let (prompt, choices) = parse_block(&self.text[body_start..body_end]);
            if prompt.is_empty() {
                self.warn(number, DiagnosticKind::EmptyPrompt);
                continue;
            }
            if choices.len() < 2 {
                self.warn(
                    number,
                    DiagnosticKind::MissingChoices {
                        found: choices.len(),
                    },
                );
                continue;
            }

            self.yielded.insert(number);
            return Some(PartialQuestion {
                number,
                text: prompt,
                choices,
            });
        }
    }
}

/// Split a block body into the prompt and its lettered choices.
fn parse_block(body: &str) -> (String, Vec<Choice>) {
    let mut prompt = String::new();
    let mut choices: Vec<(ChoiceLetter, String)> = Vec::new();
    let mut expected = Some(ChoiceLetter::FIRST);

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let segment = match leading_letter(line) {
            Some((letter, rest)) if Some(letter) == expected => {
                choices.push((letter, String::new()));
                expected = letter.next();
                rest
            }
            _ if choices.is_empty() => match inline_choice_start(line) {
                Some(at) => {
                    push_words(&mut prompt, &line[..at]);
                    choices.push((ChoiceLetter::FIRST, String::new()));
                    expected = ChoiceLetter::FIRST.next();
                    line[at + 2..].trim_start()
                }
                None => {
                    push_words(&mut prompt, line);
                    continue;
                }
            },
            _ => line,
        };

        append_with_inline_splits(&mut choices, &mut expected, segment);
    }

    let choices = choices
        .into_iter()
        .map(|(letter, text)| Choice::new(letter, normalize_whitespace(&text)))
        .collect();
    (normalize_whitespace(&prompt), choices)
}

/// Position of an inline `A.` inside a prompt line, accepted only when a
/// `B.` token follows it on the same line.
fn inline_choice_start(line: &str) -> Option<usize> {
    let at = inline_letter(line, ChoiceLetter::FIRST)?;
    let second = ChoiceLetter::FIRST.next()?;
    inline_letter(&line[at + 2..], second).map(|_| at)
}

/// Append `segment` to the active choice, opening further choices for any
/// inline `B. ...` tokens in sequence.
fn append_with_inline_splits(
    choices: &mut Vec<(ChoiceLetter, String)>,
    expected: &mut Option<ChoiceLetter>,
    mut segment: &str,
) {
    loop {
        let split = expected.and_then(|letter| inline_letter(segment, letter).map(|at| (letter, at)));
        let Some((letter, at)) = split else {
            if let Some((_, text)) = choices.last_mut() {
                push_words(text, segment);
            }
            return;
        };

        if let Some((_, text)) = choices.last_mut() {
            push_words(text, &segment[..at]);
        }
        choices.push((letter, String::new()));
        *expected = letter.next();
        segment = segment[at + 2..].trim_start();
    }
}

fn push_words(buf: &mut String, words: &str) {
    let words = words.trim();
    if words.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(words);
}
