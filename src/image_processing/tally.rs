use std::ops::{Add, AddAssign};

use super::Outcome;

/// Running (processed, skipped, errors) counters for a batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl Tally {
    pub fn new(processed: usize, skipped: usize, errors: usize) -> Self {
        Self {
            processed,
            skipped,
            errors,
        }
    }

    pub fn record(&mut self, outcome: &Outcome) {
        *self += Tally::from(outcome);
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} file(s) processed, {} file(s) skipped, {} error(s) occurred.",
            self.processed, self.skipped, self.errors
        )
    }
}

impl From<&Outcome> for Tally {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Processed { .. } => Tally::new(1, 0, 0),
            Outcome::Skipped(_) => Tally::new(0, 1, 0),
            Outcome::Failed(_) => Tally::new(0, 0, 1),
        }
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally {
            processed: self.processed + rhs.processed,
            skipped: self.skipped + rhs.skipped,
            errors: self.errors + rhs.errors,
        }
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Tally) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::SkipReason;
    use std::path::PathBuf;

    #[test]
    fn test_record_outcomes() {
        let mut tally = Tally::default();
        tally.record(&Outcome::Processed {
            output_path: PathBuf::from("out/a.png"),
            width: 512,
            height: 256,
        });
        tally.record(&Outcome::Skipped(SkipReason::AlreadyFeasible));
        tally.record(&Outcome::Skipped(SkipReason::OverwriteDeclined));
        tally.record(&Outcome::Failed(anyhow::anyhow!("broken")));

        assert_eq!(tally, Tally::new(1, 2, 1));
    }

    #[test]
    fn test_add_is_elementwise() {
        assert_eq!(Tally::new(1, 2, 3) + Tally::new(4, 5, 6), Tally::new(5, 7, 9));
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            Tally::new(3, 1, 0).summary_line(),
            "3 file(s) processed, 1 file(s) skipped, 0 error(s) occurred."
        );
    }
}
