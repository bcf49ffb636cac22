/// How far a study session has got through its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// One-based position of the presented item, for "3/10" style prompts.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.answered + 1).min(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_one_based_and_capped() {
        let progress = SessionProgress {
            total: 3,
            answered: 0,
            remaining: 3,
            is_complete: false,
        };
        assert_eq!(progress.position(), 1);

        let done = SessionProgress {
            answered: 3,
            remaining: 0,
            is_complete: true,
            ..progress
        };
        assert_eq!(done.position(), 3);
    }
}
