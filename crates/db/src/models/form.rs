//! Form model.

use fieldform_core::schema::FieldSchema;
use fieldform_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// A stored form: its schema plus ownership and assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub schema: FieldSchema,
    /// The natural-language prompt the schema was generated from, if any.
    pub prompt: Option<String>,
    pub created_by: DbId,
    #[serde(default)]
    pub assigned_to: Vec<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new form.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateForm {
    pub title: String,
    pub description: Option<String>,
    pub schema: FieldSchema,
    pub prompt: Option<String>,
    #[serde(default)]
    pub assigned_to: Vec<DbId>,
}

/// DTO for updating a form. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub schema: Option<FieldSchema>,
    pub is_active: Option<bool>,
}
