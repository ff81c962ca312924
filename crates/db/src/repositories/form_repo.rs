//! Repository for the `forms` collection.

use chrono::Utc;
use fieldform_core::access::FormScope;
use fieldform_core::types::DbId;

use crate::models::form::{CreateForm, Form, UpdateForm};
use crate::store::{JsonStore, StoreError};

/// Provides CRUD operations for forms.
pub struct FormRepo;

impl FormRepo {
    /// Insert a new active form owned by `created_by`.
    pub async fn create(
        store: &JsonStore,
        created_by: DbId,
        input: &CreateForm,
    ) -> Result<Form, StoreError> {
        let now = Utc::now();
        let form = Form {
            id: DbId::new_v4(),
            title: input.title.clone(),
            description: input.description.clone(),
            schema: input.schema.clone(),
            prompt: input.prompt.clone(),
            created_by,
            assigned_to: dedup(&input.assigned_to),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut data = store.write().await;
        let mut forms = data.forms.clone();
        forms.insert(form.id, form.clone());
        store.commit_forms(&mut data, forms).await?;
        Ok(form)
    }

    pub async fn find_by_id(store: &JsonStore, id: DbId) -> Option<Form> {
        store.read().await.forms.get(&id).cloned()
    }

    /// List forms visible under `scope`, newest first.
    pub async fn list(store: &JsonStore, scope: FormScope) -> Vec<Form> {
        let data = store.read().await;
        let mut forms: Vec<Form> = data
            .forms
            .values()
            .filter(|f| in_scope(f, scope))
            .cloned()
            .collect();
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        forms
    }

    pub async fn count(store: &JsonStore, scope: FormScope) -> usize {
        let data = store.read().await;
        data.forms.values().filter(|f| in_scope(f, scope)).count()
    }

    /// Apply a partial update. Returns `None` if the form does not exist.
    pub async fn update(
        store: &JsonStore,
        id: DbId,
        input: &UpdateForm,
    ) -> Result<Option<Form>, StoreError> {
        let mut data = store.write().await;
        let mut forms = data.forms.clone();
        let Some(form) = forms.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = &input.title {
            form.title = title.clone();
        }
        if let Some(description) = &input.description {
            form.description = Some(description.clone());
        }
        if let Some(schema) = &input.schema {
            form.schema = schema.clone();
        }
        if let Some(is_active) = input.is_active {
            form.is_active = is_active;
        }
        form.updated_at = Utc::now();
        let updated = form.clone();

        store.commit_forms(&mut data, forms).await?;
        Ok(Some(updated))
    }

    /// Replace the set of agents assigned to a form.
    pub async fn assign(
        store: &JsonStore,
        id: DbId,
        agent_ids: &[DbId],
    ) -> Result<Option<Form>, StoreError> {
        let mut data = store.write().await;
        let mut forms = data.forms.clone();
        let Some(form) = forms.get_mut(&id) else {
            return Ok(None);
        };
        form.assigned_to = dedup(agent_ids);
        form.updated_at = Utc::now();
        let updated = form.clone();

        store.commit_forms(&mut data, forms).await?;
        Ok(Some(updated))
    }

    /// Delete a form and every submission made against it. Returns `true`
    /// if the form existed.
    pub async fn delete(store: &JsonStore, id: DbId) -> Result<bool, StoreError> {
        let mut data = store.write().await;
        let mut forms = data.forms.clone();
        if forms.remove(&id).is_none() {
            return Ok(false);
        }
        let mut submissions = data.submissions.clone();
        submissions.retain(|_, s| s.form_id != id);
        let removed = data.submissions.len() - submissions.len();

        // Forms first: failing between the two writes leaves orphans only.
        store.commit_forms(&mut data, forms).await?;
        if removed > 0 {
            store.commit_submissions(&mut data, submissions).await?;
            tracing::debug!(form_id = %id, removed, "Deleted submissions of removed form");
        }
        Ok(true)
    }
}

pub(crate) fn in_scope(form: &Form, scope: FormScope) -> bool {
    match scope {
        FormScope::All => true,
        FormScope::CreatedBy(user) => form.created_by == user,
        FormScope::AssignedTo(user) => form.assigned_to.contains(&user),
    }
}

/// Drop repeated ids, keeping first-seen order.
fn dedup(ids: &[DbId]) -> Vec<DbId> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}
