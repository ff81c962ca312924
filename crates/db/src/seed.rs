//! Demo content for a fresh data directory.

use fieldform_core::schema::FieldSchema;
use fieldform_core::templates;
use fieldform_core::types::DbId;

use crate::models::form::CreateForm;
use crate::repositories::FormRepo;
use crate::store::{JsonStore, StoreError};

/// Owner recorded on seeded forms.
pub const SEED_OWNER: DbId = DbId::nil();

fn demo_forms() -> Vec<(FieldSchema, &'static str)> {
    vec![
        (
            templates::pole_inspection(),
            "Demo: Electrical pole inspection with voltage monitoring",
        ),
        (
            templates::equipment_maintenance(),
            "Demo: Equipment maintenance tracking",
        ),
        (
            templates::site_safety_audit(),
            "Demo: Safety audit with scoring",
        ),
    ]
}

/// Insert the demo forms when the store holds no forms yet. Returns how
/// many were inserted.
pub async fn seed_demo_forms(store: &JsonStore) -> Result<usize, StoreError> {
    if !store.read().await.forms.is_empty() {
        tracing::debug!("Forms present, skipping demo seed");
        return Ok(0);
    }

    let mut inserted = 0;
    for (schema, prompt) in demo_forms() {
        let input = CreateForm {
            title: schema.title.clone(),
            description: None,
            schema,
            prompt: Some(prompt.to_string()),
            assigned_to: Vec::new(),
        };
        FormRepo::create(store, SEED_OWNER, &input).await?;
        inserted += 1;
    }
    tracing::info!(count = inserted, "Seeded demo forms");
    Ok(inserted)
}
