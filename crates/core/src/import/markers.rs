use std::sync::LazyLock;

use regex::Regex;

use crate::model::ChoiceLetter;

/// `Question #12 Topic 1`, `Question 12:`, `question 12)` at the start of a line.
pub(super) static QUESTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*question[ \t]*#?[ \t]*(\d+)(?:[ \t]+topic[ \t]+\d+)?[ \t]*[:.)\-]?")
        .expect("question marker pattern should compile")
});

/// Question markers plus the solutions-document form `12]`.
pub(super) static SOLUTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?i:question)[ \t]*#?[ \t]*(\d+)(?:[ \t]+(?i:topic)[ \t]+\d+)?[ \t]*[:.)\-]?|(\d+)[ \t]*\])",
    )
    .expect("solution marker pattern should compile")
});

/// Line of ten or more dashes closing a solution block.
pub(super) static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*-{10,}[ \t]*$").expect("separator pattern should compile")
});

/// Collapse every whitespace run to a single space and trim.
pub(super) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// If `line` opens with `X.` or `X)` for any uppercase letter, return the
/// letter and the rest of the line.
pub(super) fn leading_letter(line: &str) -> Option<(ChoiceLetter, &str)> {
    let line = line.trim_start();
    let mut chars = line.char_indices();
    let (_, first) = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    let (_, delim) = chars.next()?;
    if delim != '.' && delim != ')' {
        return None;
    }
    let rest = &line[2..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let letter = ChoiceLetter::new(first).ok()?;
    Some((letter, rest.trim()))
}

/// Position of an inline `X.` / `X)` token for `letter` that is preceded by
/// whitespace and followed by whitespace or end of text.
pub(super) fn inline_letter(text: &str, letter: ChoiceLetter) -> Option<usize> {
    let target = letter.as_char();
    let bytes = text.as_bytes();
    text.char_indices().find_map(|(i, c)| {
        if c != target || i == 0 {
            return None;
        }
        let before = bytes[i - 1];
        if !before.is_ascii_whitespace() {
            return None;
        }
        let delim = *bytes.get(i + 1)?;
        if delim != b'.' && delim != b')' {
            return None;
        }
        match bytes.get(i + 2) {
            None => Some(i),
            Some(b) if b.is_ascii_whitespace() => Some(i),
            _ => None,
        }
    })
}
