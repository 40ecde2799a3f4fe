/// Running counts for one session, useful for a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionTally {
    pub answered: usize,
    pub correct: usize,
    pub remaining: usize,
}

impl SessionTally {
    /// Share of answered questions that were right, `None` before the first answer.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> Option<f64> {
        (self.answered > 0).then(|| self.correct as f64 / self.answered as f64)
    }
}
