//! Role-based access rules for forms and submissions.
//!
//! The rules are pure functions of the acting user and the ownership facts
//! of the record (who created the form, who it is assigned to, who
//! submitted). Handlers look those facts up and ask here.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// The authenticated user a request acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

/// Which forms a listing may include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormScope {
    All,
    CreatedBy(DbId),
    AssignedTo(DbId),
}

/// Which submissions a listing may include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionScope {
    All,
    /// Submissions against forms created by this user.
    FormsCreatedBy(DbId),
    SubmittedBy(DbId),
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn form_scope(&self) -> FormScope {
        match self.role {
            Role::Admin => FormScope::All,
            Role::Manager => FormScope::CreatedBy(self.user_id),
            Role::FieldAgent => FormScope::AssignedTo(self.user_id),
        }
    }

    pub fn submission_scope(&self) -> SubmissionScope {
        match self.role {
            Role::Admin => SubmissionScope::All,
            Role::Manager => SubmissionScope::FormsCreatedBy(self.user_id),
            Role::FieldAgent => SubmissionScope::SubmittedBy(self.user_id),
        }
    }

    /// Generating and creating forms.
    pub fn can_build_forms(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Manager)
    }

    /// Updating, assigning and deleting an existing form.
    pub fn can_edit_form(&self, created_by: DbId) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Manager => created_by == self.user_id,
            Role::FieldAgent => false,
        }
    }

    /// Field agents only see forms assigned to them; managers and admins
    /// may open any form by id.
    pub fn can_view_form(&self, assigned_to: &[DbId]) -> bool {
        match self.role {
            Role::Admin | Role::Manager => true,
            Role::FieldAgent => assigned_to.contains(&self.user_id),
        }
    }

    /// Only field agents submit, and only to forms assigned to them.
    pub fn ensure_can_submit(&self, assigned_to: &[DbId]) -> Result<(), CoreError> {
        if self.role != Role::FieldAgent {
            return Err(CoreError::Forbidden(
                "Only field agents can submit forms".into(),
            ));
        }
        if !assigned_to.contains(&self.user_id) {
            return Err(CoreError::Forbidden(
                "You are not assigned to this form".into(),
            ));
        }
        Ok(())
    }

    /// `form_created_by` is `None` when the form no longer exists.
    pub fn can_view_submission(&self, submitted_by: DbId, form_created_by: Option<DbId>) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Manager => form_created_by == Some(self.user_id),
            Role::FieldAgent => submitted_by == self.user_id,
        }
    }

    /// Approving or rejecting a submission.
    pub fn can_review_submission(&self, form_created_by: Option<DbId>) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Manager => form_created_by == Some(self.user_id),
            Role::FieldAgent => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;

    fn actors() -> (Actor, Actor, Actor) {
        (
            Actor::new(Uuid::new_v4(), Role::Admin),
            Actor::new(Uuid::new_v4(), Role::Manager),
            Actor::new(Uuid::new_v4(), Role::FieldAgent),
        )
    }

    #[test]
    fn scopes_follow_role() {
        let (admin, manager, agent) = actors();
        assert_eq!(admin.form_scope(), FormScope::All);
        assert_eq!(manager.form_scope(), FormScope::CreatedBy(manager.user_id));
        assert_eq!(agent.form_scope(), FormScope::AssignedTo(agent.user_id));

        assert_eq!(admin.submission_scope(), SubmissionScope::All);
        assert_eq!(
            manager.submission_scope(),
            SubmissionScope::FormsCreatedBy(manager.user_id)
        );
        assert_eq!(
            agent.submission_scope(),
            SubmissionScope::SubmittedBy(agent.user_id)
        );
    }

    #[test]
    fn only_owner_manager_or_admin_edits() {
        let (admin, manager, agent) = actors();
        let other = Uuid::new_v4();
        assert!(admin.can_edit_form(other));
        assert!(manager.can_edit_form(manager.user_id));
        assert!(!manager.can_edit_form(other));
        assert!(!agent.can_edit_form(agent.user_id));
        assert!(!agent.can_build_forms());
        assert!(manager.can_build_forms());
    }

    #[test]
    fn agents_see_only_assigned_forms() {
        let (_, manager, agent) = actors();
        assert!(agent.can_view_form(&[agent.user_id]));
        assert!(!agent.can_view_form(&[]));
        assert!(manager.can_view_form(&[]));
    }

    #[test]
    fn submit_requires_assigned_agent() {
        let (admin, _, agent) = actors();
        assert!(agent.ensure_can_submit(&[agent.user_id]).is_ok());
        assert_matches!(
            agent.ensure_can_submit(&[Uuid::new_v4()]),
            Err(CoreError::Forbidden(msg)) if msg == "You are not assigned to this form"
        );
        assert_matches!(
            admin.ensure_can_submit(&[admin.user_id]),
            Err(CoreError::Forbidden(msg)) if msg == "Only field agents can submit forms"
        );
    }

    #[test]
    fn submission_visibility() {
        let (admin, manager, agent) = actors();
        let stranger = Uuid::new_v4();
        assert!(admin.can_view_submission(stranger, None));
        assert!(manager.can_view_submission(stranger, Some(manager.user_id)));
        assert!(!manager.can_view_submission(stranger, Some(stranger)));
        assert!(!manager.can_view_submission(stranger, None));
        assert!(agent.can_view_submission(agent.user_id, Some(stranger)));
        assert!(!agent.can_view_submission(stranger, Some(stranger)));
    }

    #[test]
    fn review_rights() {
        let (admin, manager, agent) = actors();
        assert!(admin.can_review_submission(None));
        assert!(manager.can_review_submission(Some(manager.user_id)));
        assert!(!manager.can_review_submission(Some(agent.user_id)));
        assert!(!agent.can_review_submission(Some(agent.user_id)));
    }
}
