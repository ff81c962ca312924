//! Integration tests for form generation and form management.

mod common;

use axum::http::StatusCode;
use common::{body_json, pole_form};
use fieldform_core::roles::Role;
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Test: Offline generation picks the pole template and is not stored
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_returns_template_schema() {
    let app = common::build_test_app().await;
    let manager = app.user(Role::Manager);

    let response = app
        .post_json(
            "/api/v1/forms/generate",
            &manager,
            json!({ "prompt": "Inspect electrical poles and flag voltage above 400" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["ai_generated"], false);
    assert_eq!(data["schema"]["title"], "Electrical Pole Inspection Form");
    let voltage = data["schema"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "voltage")
        .unwrap();
    assert_eq!(voltage["notifyIf"], ">400");
    assert_eq!(voltage["max"], 1000);

    let list = body_json(app.get("/api/v1/forms", &manager).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: Generation honours a caller title and rejects empty prompts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_uses_title_and_requires_prompt() {
    let app = common::build_test_app().await;
    let admin = app.user(Role::Admin);

    let response = app
        .post_json(
            "/api/v1/forms/generate",
            &admin,
            json!({ "prompt": "fence walk", "title": "Fence Patrol" }),
        )
        .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["schema"]["title"], "Fence Patrol");

    let response = app
        .post_json("/api/v1/forms/generate", &admin, json!({ "prompt": "   " }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Prompt is required");
}

// ---------------------------------------------------------------------------
// Test: Create then fetch a form
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_form() {
    let app = common::build_test_app().await;
    let manager = app.user(Role::Manager);

    let response = app
        .post_json("/api/v1/forms", &manager, pole_form(&[]))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let form = &json["data"];
    assert_eq!(form["title"], "Pole Inspection");
    assert_eq!(form["created_by"], manager.id.to_string());
    assert_eq!(form["is_active"], true);
    assert_eq!(form["schema"]["fields"].as_array().unwrap().len(), 4);

    let id = form["id"].as_str().unwrap();
    let response = app.get(&format!("/api/v1/forms/{id}"), &manager).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["id"], id);
}

// ---------------------------------------------------------------------------
// Test: Blank titles and duplicate field names are rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_rejects_bad_definitions() {
    let app = common::build_test_app().await;
    let manager = app.user(Role::Manager);

    let mut body = pole_form(&[]);
    body["title"] = json!(" ");
    let response = app.post_json("/api/v1/forms", &manager, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Title is required");

    let body = json!({
        "title": "Dupes",
        "schema": { "fields": [
            { "name": "a", "type": "string" },
            { "name": "a", "type": "number" }
        ]}
    });
    let response = app.post_json("/api/v1/forms", &manager, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Duplicate field names: a");
}

// ---------------------------------------------------------------------------
// Test: Listing is scoped by role
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_scoped_by_role() {
    let app = common::build_test_app().await;
    let admin = app.user(Role::Admin);
    let manager_a = app.user(Role::Manager);
    let manager_b = app.user(Role::Manager);
    let agent = app.user(Role::FieldAgent);

    app.create_form(&manager_a, pole_form(&[agent.id])).await;
    app.create_form(&manager_a, pole_form(&[])).await;
    app.create_form(&manager_b, pole_form(&[])).await;

    let count = |json: serde_json::Value| json["data"].as_array().unwrap().len();
    assert_eq!(count(body_json(app.get("/api/v1/forms", &admin).await).await), 3);
    assert_eq!(count(body_json(app.get("/api/v1/forms", &manager_a).await).await), 2);
    assert_eq!(count(body_json(app.get("/api/v1/forms", &manager_b).await).await), 1);
    assert_eq!(count(body_json(app.get("/api/v1/forms", &agent).await).await), 1);
}

// ---------------------------------------------------------------------------
// Test: Field agents cannot open forms not assigned to them
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unassigned_agent_cannot_view_form() {
    let app = common::build_test_app().await;
    let manager = app.user(Role::Manager);
    let assigned = app.user(Role::FieldAgent);
    let stranger = app.user(Role::FieldAgent);
    let id = app.create_form(&manager, pole_form(&[assigned.id])).await;

    let uri = format!("/api/v1/forms/{id}");
    assert_eq!(app.get(&uri, &assigned).await.status(), StatusCode::OK);
    assert_eq!(app.get(&uri, &stranger).await.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: Only the owning manager or an admin may update, assign, delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_assign_delete_require_ownership() {
    let app = common::build_test_app().await;
    let owner = app.user(Role::Manager);
    let other = app.user(Role::Manager);
    let admin = app.user(Role::Admin);
    let agent = app.user(Role::FieldAgent);
    let id = app.create_form(&owner, pole_form(&[])).await;
    let uri = format!("/api/v1/forms/{id}");

    let response = app
        .put_json(&uri, &other, json!({ "title": "Hijacked" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .put_json(&uri, &owner, json!({ "title": "Renamed", "is_active": false }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Renamed");
    assert_eq!(json["data"]["is_active"], false);

    let response = app
        .put_json(
            &format!("{uri}/assign"),
            &admin,
            json!({ "agent_ids": [agent.id, agent.id] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["assigned_to"], json!([agent.id]));

    assert_eq!(app.delete(&uri, &other).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, &owner).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, &owner).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: Updating a missing form returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_missing_form_returns_404() {
    let app = common::build_test_app().await;
    let admin = app.user(Role::Admin);
    let response = app
        .put_json(
            &format!("/api/v1/forms/{}", Uuid::new_v4()),
            &admin,
            json!({ "title": "Ghost" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: Dry-run validation reports errors and would-be notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validate_endpoint_is_a_dry_run() {
    let app = common::build_test_app().await;
    let manager = app.user(Role::Manager);
    let id = app.create_form(&manager, pole_form(&[])).await;
    let uri = format!("/api/v1/forms/{id}/validate");

    let response = app
        .post_json(
            &uri,
            &manager,
            json!({ "data": { "inspector_name": "Ana", "voltage": 450, "pole_condition": "Good" } }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], true);
    assert_eq!(
        json["data"]["notifications"][0]["message"],
        "Voltage (450) exceeds threshold of 400"
    );

    let response = app
        .post_json(&uri, &manager, json!({ "data": { "voltage": 1500 } }))
        .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], false);
    assert_eq!(
        json["data"]["validation_errors"],
        json!([
            "Inspector Name is required",
            "Voltage must be at most 1000",
            "Pole Condition is required"
        ])
    );
    assert_eq!(json["data"]["notifications"], json!([]));

    let list = body_json(app.get("/api/v1/submissions", &manager).await).await;
    assert_eq!(list["data"]["count"], 0);
}
