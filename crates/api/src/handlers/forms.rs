//! Handlers for form generation and form management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fieldform_core::access::Actor;
use fieldform_core::error::CoreError;
use fieldform_core::schema::{FieldSchema, SubmittedData};
use fieldform_core::types::DbId;
use fieldform_db::models::form::{CreateForm, Form, UpdateForm};
use fieldform_db::repositories::FormRepo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::handlers::schemas::ValidationReport;
use crate::middleware::rbac::{RequireAuth, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateFormRequest {
    #[serde(default)]
    pub prompt: String,
    pub title: Option<String>,
}

/// A generated schema, not yet stored.
#[derive(Debug, Serialize)]
pub struct GeneratedForm {
    pub schema: FieldSchema,
    pub prompt: String,
    /// `false` when the schema came from the built-in templates.
    pub ai_generated: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignFormRequest {
    pub agent_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateFormDataRequest {
    #[serde(default)]
    pub data: Value,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a form or fail with 404.
pub(crate) async fn load_form(state: &AppState, id: DbId) -> AppResult<Form> {
    FormRepo::find_by_id(&state.store, id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Form", id }))
}

fn ensure_can_edit(actor: &Actor, form: &Form) -> AppResult<()> {
    if !actor.can_edit_form(form.created_by) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only modify forms you created".into(),
        )));
    }
    Ok(())
}

fn ensure_can_view(actor: &Actor, form: &Form) -> AppResult<()> {
    if !actor.can_view_form(&form.assigned_to) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this form".into(),
        )));
    }
    Ok(())
}

fn check_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".into()));
    }
    Ok(())
}

/// Field names key the submitted data, so they must be unique.
fn check_schema(schema: &FieldSchema) -> AppResult<()> {
    let duplicates = schema.duplicate_names();
    if !duplicates.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Duplicate field names: {}",
            duplicates.join(", ")
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/forms/generate
///
/// Turn a natural-language prompt into a schema. Nothing is stored; the
/// client reviews the schema and posts it to `/forms`.
pub async fn generate_form(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<GenerateFormRequest>,
) -> AppResult<impl IntoResponse> {
    let prompt = input.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest("Prompt is required".into()));
    }

    let schema = state
        .generator
        .generate(prompt, input.title.as_deref())
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        title = %schema.title,
        fields = schema.fields.len(),
        "Form schema generated",
    );

    Ok(Json(DataResponse {
        data: GeneratedForm {
            schema,
            prompt: prompt.to_string(),
            ai_generated: state.generator.is_configured(),
        },
    }))
}

/// POST /api/v1/forms
pub async fn create_form(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateForm>,
) -> AppResult<impl IntoResponse> {
    check_title(&input.title)?;
    check_schema(&input.schema)?;

    let form = FormRepo::create(&state.store, user.user_id, &input).await?;

    tracing::info!(
        form_id = %form.id,
        title = %form.title,
        user_id = %user.user_id,
        "Form created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: form })))
}

/// GET /api/v1/forms
///
/// Admins see every form, managers the forms they created, field agents
/// the forms assigned to them.
pub async fn list_forms(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let forms = FormRepo::list(&state.store, user.actor().form_scope()).await;
    Ok(Json(DataResponse { data: forms }))
}

/// GET /api/v1/forms/{id}
pub async fn get_form(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = load_form(&state, id).await?;
    ensure_can_view(&user.actor(), &form)?;
    Ok(Json(DataResponse { data: form }))
}

/// PUT /api/v1/forms/{id}
pub async fn update_form(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateForm>,
) -> AppResult<impl IntoResponse> {
    let form = load_form(&state, id).await?;
    ensure_can_edit(&user.actor(), &form)?;
    if let Some(title) = &input.title {
        check_title(title)?;
    }
    if let Some(schema) = &input.schema {
        check_schema(schema)?;
    }

    let updated = FormRepo::update(&state.store, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Form", id }))?;

    tracing::info!(form_id = %id, user_id = %user.user_id, "Form updated");

    Ok(Json(DataResponse { data: updated }))
}

/// PUT /api/v1/forms/{id}/assign
///
/// Replace the field agents assigned to a form.
pub async fn assign_form(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AssignFormRequest>,
) -> AppResult<impl IntoResponse> {
    let form = load_form(&state, id).await?;
    ensure_can_edit(&user.actor(), &form)?;

    let updated = FormRepo::assign(&state.store, id, &input.agent_ids)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Form", id }))?;

    tracing::info!(
        form_id = %id,
        agents = updated.assigned_to.len(),
        user_id = %user.user_id,
        "Form assigned",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/forms/{id}
///
/// Deletes the form together with its submissions.
pub async fn delete_form(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let form = load_form(&state, id).await?;
    ensure_can_edit(&user.actor(), &form)?;

    if !FormRepo::delete(&state.store, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Form", id }));
    }

    tracing::info!(form_id = %id, user_id = %user.user_id, "Form deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/forms/{id}/validate
///
/// Dry run: check `data` against the form's schema and report the
/// notifications it would trigger, without storing anything.
pub async fn validate_form_data(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ValidateFormDataRequest>,
) -> AppResult<impl IntoResponse> {
    let form = load_form(&state, id).await?;
    ensure_can_view(&user.actor(), &form)?;

    let data = SubmittedData::from_json(input.data);
    Ok(Json(DataResponse {
        data: ValidationReport::evaluate(&form.schema, &data),
    }))
}
