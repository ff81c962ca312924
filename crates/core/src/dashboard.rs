//! Dashboard statistics arithmetic.

use serde::Serialize;

use crate::approval::SubmissionStatus;

/// How many recent submissions the dashboard shows.
pub const RECENT_SUBMISSIONS_LIMIT: usize = 5;

/// Submission counts per review status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn tally(statuses: impl IntoIterator<Item = SubmissionStatus>) -> Self {
        statuses
            .into_iter()
            .fold(Self::default(), |mut counts, status| {
                match status {
                    SubmissionStatus::Pending => counts.pending += 1,
                    SubmissionStatus::Approved => counts.approved += 1,
                    SubmissionStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }

    /// Share of approved submissions, as a percentage with two decimals.
    pub fn completion_rate(&self) -> f64 {
        completion_rate(self.approved, self.total())
    }
}

/// `approved / total * 100`, rounded to two decimals; `0` when `total` is 0.
pub fn completion_rate(approved: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (approved as f64 / total as f64 * 10_000.0).round() / 100.0
}
