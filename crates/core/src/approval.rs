//! Submission review states and decision parsing.
//!
//! Every submission starts `pending`. A reviewer moves it to `approved` or
//! `rejected`; a later decision replaces an earlier one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => STATUS_PENDING,
            SubmissionStatus::Approved => STATUS_APPROVED,
            SubmissionStatus::Rejected => STATUS_REJECTED,
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a reviewer decision. Only `approved` and `rejected` are accepted;
/// a submission cannot be sent back to `pending`.
pub fn parse_decision(decision: &str) -> Result<SubmissionStatus, CoreError> {
    match decision {
        STATUS_APPROVED => Ok(SubmissionStatus::Approved),
        STATUS_REJECTED => Ok(SubmissionStatus::Rejected),
        _ => Err(CoreError::Validation(
            r#"Status must be "approved" or "rejected""#.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_valid_decisions_accepted() {
        assert_eq!(parse_decision("approved").unwrap(), SubmissionStatus::Approved);
        assert_eq!(parse_decision("rejected").unwrap(), SubmissionStatus::Rejected);
    }

    #[test]
    fn test_pending_is_not_a_decision() {
        assert_matches!(
            parse_decision("pending"),
            Err(CoreError::Validation(msg)) if msg == r#"Status must be "approved" or "rejected""#
        );
    }

    #[test]
    fn test_unknown_and_empty_decisions_rejected() {
        assert!(parse_decision("").is_err());
        assert!(parse_decision("Approved").is_err());
        assert!(parse_decision("flagged").is_err());
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(SubmissionStatus::default(), SubmissionStatus::Pending);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_value(SubmissionStatus::Approved).unwrap();
        assert_eq!(json, "approved");
    }
}
