use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing or validating identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdError {
    #[error("question number must be a positive integer, got {raw:?}")]
    InvalidQuestionNumber { raw: String },

    #[error("choice letter must be a single letter A-Z, got {raw:?}")]
    InvalidChoiceLetter { raw: String },

    #[error("certification id cannot be empty")]
    EmptyCertId,

    #[error("certification id {raw:?} may only contain letters, digits, '-' and '_'")]
    InvalidCertId { raw: String },
}

// ─── Question Number ───────────────────────────────────────────────────────────

/// Stable identifier of a question within one certification.
///
/// Always positive: joins question text with solutions and keys progress entries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QuestionNumber(u32);

impl QuestionNumber {
    /// Creates a `QuestionNumber`, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns `IdError::InvalidQuestionNumber` when `value` is 0.
    pub fn new(value: u32) -> Result<Self, IdError> {
        if value == 0 {
            return Err(IdError::InvalidQuestionNumber {
                raw: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for QuestionNumber {
    type Error = IdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuestionNumber> for u32 {
    fn from(value: QuestionNumber) -> Self {
        value.0
    }
}

// ─── Choice Letter ─────────────────────────────────────────────────────────────

/// Uppercase letter labelling one answer choice.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChoiceLetter(char);

impl ChoiceLetter {
    pub const FIRST: ChoiceLetter = ChoiceLetter('A');

    /// Creates a letter from any ASCII letter, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `IdError::InvalidChoiceLetter` for anything but `a-z`/`A-Z`.
    pub fn new(c: char) -> Result<Self, IdError> {
        if c.is_ascii_alphabetic() {
            Ok(Self(c.to_ascii_uppercase()))
        } else {
            Err(IdError::InvalidChoiceLetter { raw: c.to_string() })
        }
    }

    /// Builds the letter at `index` in the sequence `A, B, C, ...`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        let offset = u8::try_from(index).ok().filter(|o| *o < 26)?;
        Some(Self(char::from(b'A' + offset)))
    }

    /// Zero-based position of this letter in the alphabet.
    #[must_use]
    pub fn index(self) -> usize {
        (self.0 as usize) - ('A' as usize)
    }

    /// The letter that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<String> for ChoiceLetter {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChoiceLetter> for String {
    fn from(value: ChoiceLetter) -> Self {
        value.0.to_string()
    }
}

// ─── Certification Id ──────────────────────────────────────────────────────────

/// Short code identifying an exam, e.g. `saa-c03`.
///
/// Stored lowercase so that file names derived from it are stable.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertId(String);

impl CertId {
    /// Validates and lowercases a certification id.
    ///
    /// # Errors
    ///
    /// Returns `IdError::EmptyCertId` or `IdError::InvalidCertId`.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, IdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdError::EmptyCertId);
        }
        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(IdError::InvalidCertId {
                raw: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form used in titles and conventional file names (`SAA-C03`).
    #[must_use]
    pub fn display_name(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl TryFrom<String> for CertId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CertId> for String {
    fn from(value: CertId) -> Self {
        value.0
    }
}

// ─── Debug / Display ───────────────────────────────────────────────────────────

impl fmt::Debug for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionNumber({})", self.0)
    }
}

impl fmt::Debug for ChoiceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChoiceLetter({})", self.0)
    }
}

impl fmt::Debug for CertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertId({})", self.0)
    }
}

impl fmt::Display for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChoiceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── FromStr ───────────────────────────────────────────────────────────────────

impl FromStr for QuestionNumber {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IdError::InvalidQuestionNumber { raw: s.to_owned() };
        let value = s.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(value).map_err(|_| invalid())
    }
}

impl FromStr for ChoiceLetter {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => Err(IdError::InvalidChoiceLetter { raw: s.to_owned() }),
        }
    }
}

impl FromStr for CertId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_number_rejects_zero() {
        assert!(QuestionNumber::new(0).is_err());
        assert_eq!(QuestionNumber::new(7).unwrap().value(), 7);
    }

    #[test]
    fn question_number_from_str() {
        let n: QuestionNumber = " 42 ".parse().unwrap();
        assert_eq!(n.value(), 42);
        assert!("0".parse::<QuestionNumber>().is_err());
        assert!("-3".parse::<QuestionNumber>().is_err());
        assert!("abc".parse::<QuestionNumber>().is_err());
    }

    #[test]
    fn question_number_deserialize_rejects_zero() {
        let err = serde_json::from_str::<QuestionNumber>("0");
        assert!(err.is_err());
        let ok: QuestionNumber = serde_json::from_str("12").unwrap();
        assert_eq!(ok.value(), 12);
    }

    #[test]
    fn choice_letter_sequence() {
        let a = ChoiceLetter::FIRST;
        assert_eq!(a.index(), 0);
        assert_eq!(a.next().unwrap().as_char(), 'B');
        assert_eq!(ChoiceLetter::from_index(25).unwrap().as_char(), 'Z');
        assert!(ChoiceLetter::from_index(26).is_none());
        assert!(ChoiceLetter::from_index(25).unwrap().next().is_none());
    }

    #[test]
    fn choice_letter_parses_lowercase() {
        let c: ChoiceLetter = "c".parse().unwrap();
        assert_eq!(c.to_string(), "C");
        assert!("AB".parse::<ChoiceLetter>().is_err());
        assert!("1".parse::<ChoiceLetter>().is_err());
    }

    #[test]
    fn cert_id_normalizes_case() {
        let id = CertId::parse("SAA-C03").unwrap();
        assert_eq!(id.as_str(), "saa-c03");
        assert_eq!(id.display_name(), "SAA-C03");
    }

    #[test]
    fn cert_id_rejects_path_characters() {
        assert_eq!(CertId::parse("  "), Err(IdError::EmptyCertId));
        assert!(matches!(
            CertId::parse("../etc"),
            Err(IdError::InvalidCertId { .. })
        ));
    }
}
