use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::domain::all_domains;
use quiz_core::model::QuestionRecord;
use storage::ProgressStore;

/// How a session picks and orders its questions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// File order.
    #[default]
    Sequential,
    /// Random permutation of every question.
    Shuffled,
    /// File order from the first question without any progress.
    Resume,
    /// Questions missed at least once, worst accuracy first.
    WeakSpots,
    /// Questions tagged with a domain; `all` keeps everything.
    Domain(String),
}

impl SessionMode {
    #[must_use]
    pub fn domain(name: impl Into<String>) -> Self {
        Self::Domain(name.into())
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Shuffled => f.write_str("shuffled"),
            Self::Resume => f.write_str("resume"),
            Self::WeakSpots => f.write_str("weak-spots"),
            Self::Domain(name) => write!(f, "domain:{name}"),
        }
    }
}

/// Error for an unrecognised mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown session mode {0:?}")]
pub struct UnknownMode(pub String);

impl FromStr for SessionMode {
    type Err = UnknownMode;

    /// Accepts `sequential`, `shuffled`, `resume`, `weak-spots` and
    /// `domain:<name>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "sequential" => Ok(Self::Sequential),
            "shuffled" | "random" => Ok(Self::Shuffled),
            "resume" => Ok(Self::Resume),
            "weak-spots" | "weak" => Ok(Self::WeakSpots),
            other => match other.strip_prefix("domain:") {
                Some(name) if !name.is_empty() => Ok(Self::Domain(name.to_owned())),
                _ => Err(UnknownMode(s.to_owned())),
            },
        }
    }
}

/// Select and order `questions` for `mode`.
///
/// `questions` is expected in file order.
pub(crate) fn order(
    mut questions: Vec<QuestionRecord>,
    mode: &SessionMode,
    progress: &ProgressStore,
) -> Vec<QuestionRecord> {
    match mode {
        SessionMode::Sequential => questions,
        SessionMode::Shuffled => {
            let mut rng = rng();
            questions.as_mut_slice().shuffle(&mut rng);
            questions
        }
        SessionMode::Resume => {
            let start = questions
                .iter()
                .position(|q| progress.entry(q.number()).is_none())
                .unwrap_or(0);
            questions.split_off(start)
        }
        SessionMode::WeakSpots => {
            let mut weak: Vec<(f64, QuestionRecord)> = questions
                .into_iter()
                .filter_map(|q| {
                    let entry = progress.entry(q.number()).filter(|e| e.is_weak())?;
                    Some((entry.accuracy().unwrap_or(0.0), q))
                })
                .collect();
            weak.sort_by(|(a, qa), (b, qb)| {
                a.partial_cmp(b)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| qa.number().cmp(&qb.number()))
            });
            weak.into_iter().map(|(_, q)| q).collect()
        }
        SessionMode::Domain(name) if name.eq_ignore_ascii_case("all") => questions,
        SessionMode::Domain(name) => questions
            .into_iter()
            .filter(|q| q.domains().iter().any(|d| d.eq_ignore_ascii_case(name)))
            .collect(),
    }
}

/// Domain names with the number of `questions` tagged with each, in table order.
///
/// Domains without questions are left out.
#[must_use]
pub fn domain_counts(questions: &[QuestionRecord]) -> Vec<(&'static str, usize)> {
    all_domains()
        .into_iter()
        .filter_map(|domain| {
            let count = questions
                .iter()
                .filter(|q| q.domains().contains(&domain))
                .count();
            (count > 0).then_some((domain, count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CertId, Choice, ChoiceLetter, QuestionNumber};
    use quiz_core::time::fixed_clock;
    use storage::CertPaths;

    fn question(n: u32, text: &str) -> QuestionRecord {
        let letter = |c| ChoiceLetter::new(c).unwrap();
        QuestionRecord::new(
            QuestionNumber::new(n).unwrap(),
            text,
            vec![Choice::new(letter('A'), "yes"), Choice::new(letter('B'), "no")],
            [letter('A')],
            "",
        )
        .unwrap()
    }

    fn numbers(questions: &[QuestionRecord]) -> Vec<u32> {
        questions.iter().map(|q| q.number().value()).collect()
    }

    fn store(dir: &std::path::Path) -> ProgressStore {
        let cert: CertId = "test".parse().unwrap();
        ProgressStore::load(&CertPaths::new(dir, &cert), fixed_clock()).unwrap()
    }

    fn n(v: u32) -> QuestionNumber {
        QuestionNumber::new(v).unwrap()
    }

    fn sample() -> Vec<QuestionRecord> {
        vec![
            question(1, "Which EC2 instance type fits?"),
            question(2, "Where should backups go in S3?"),
            question(3, "How do you encrypt data with KMS?"),
            question(4, "Which Lambda trigger applies?"),
        ]
    }

    #[test]
    fn sequential_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let ordered = order(sample(), &SessionMode::Sequential, &store(dir.path()));
        assert_eq!(numbers(&ordered), vec![1, 2, 3, 4]);
    }

    #[test]
    fn shuffled_is_a_permutation() {
        let dir = tempfile::tempdir().unwrap();
        let mut got = numbers(&order(sample(), &SessionMode::Shuffled, &store(dir.path())));
        got.sort_unstable();
        assert_eq!(got, vec![1, 2, 3, 4]);
    }

    #[test]
    fn resume_starts_at_first_unattempted() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = store(dir.path());
        progress.record_attempt(n(1), true).unwrap();
        progress.record_attempt(n(2), false).unwrap();

        let ordered = order(sample(), &SessionMode::Resume, &progress);
        assert_eq!(numbers(&ordered), vec![3, 4]);
    }

    #[test]
    fn resume_falls_back_to_everything_when_all_attempted() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = store(dir.path());
        for q in 1..=4 {
            progress.record_attempt(n(q), true).unwrap();
        }
        let ordered = order(sample(), &SessionMode::Resume, &progress);
        assert_eq!(numbers(&ordered), vec![1, 2, 3, 4]);
    }

    #[test]
    fn weak_spots_sorted_worst_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = store(dir.path());
        // 4: 0/1, 2: 1/2, 3: 1/2, 1: only correct
        progress.record_attempt(n(4), false).unwrap();
        progress.record_attempt(n(3), true).unwrap();
        progress.record_attempt(n(3), false).unwrap();
        progress.record_attempt(n(2), false).unwrap();
        progress.record_attempt(n(2), true).unwrap();
        progress.record_attempt(n(1), true).unwrap();

        let ordered = order(sample(), &SessionMode::WeakSpots, &progress);
        assert_eq!(numbers(&ordered), vec![4, 2, 3]);
    }

    #[test]
    fn domain_filter_is_case_insensitive_and_all_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let progress = store(dir.path());

        let compute = order(sample(), &SessionMode::domain("compute"), &progress);
        assert_eq!(numbers(&compute), vec![1, 4]);

        let all = order(sample(), &SessionMode::domain("All"), &progress);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn domain_counts_skip_empty_domains() {
        let counts = domain_counts(&sample());
        assert!(counts.contains(&("Compute", 2)));
        assert!(counts.contains(&("Storage", 1)));
        assert!(counts.iter().all(|(_, c)| *c > 0));
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("Resume".parse::<SessionMode>().unwrap(), SessionMode::Resume);
        assert_eq!(
            "domain:Security".parse::<SessionMode>().unwrap(),
            SessionMode::domain("security")
        );
        assert!("domain:".parse::<SessionMode>().is_err());
        assert!("later".parse::<SessionMode>().is_err());
    }
}
