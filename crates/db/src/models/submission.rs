//! Submission model.

use fieldform_core::approval::SubmissionStatus;
use fieldform_core::notify::NotificationEvent;
use fieldform_core::schema::SubmittedData;
use fieldform_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// A stored, validated submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: DbId,
    pub form_id: DbId,
    pub submitted_by: DbId,
    pub data: SubmittedData,
    /// Notifications triggered when the submission was accepted.
    #[serde(default)]
    pub notifications: Vec<NotificationEvent>,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for storing an accepted submission.
#[derive(Debug, Clone)]
pub struct CreateSubmission {
    pub form_id: DbId,
    pub submitted_by: DbId,
    pub data: SubmittedData,
    pub notifications: Vec<NotificationEvent>,
}

/// Optional narrowing applied on top of the caller's access scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionFilter {
    pub form_id: Option<DbId>,
    pub status: Option<SubmissionStatus>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<Timestamp>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<Timestamp>,
}
