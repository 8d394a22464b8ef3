//! End-to-end API tests: real router, real middleware, in-memory SQLite.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use auth::service::AuthConfig;
use auth::AuthModule;
use factoryflow_core::Module;
use factoryflow_sql::{SQLStore, SqliteStore};
use workorders::WorkOrdersModule;

use crate::auth_middleware::JwtState;
use crate::routes::build_router;

const SECRET: &str = "test-secret";
const PASSWORD: &str = "s3cret";

fn test_app() -> Router {
    test_app_with(AuthConfig {
        jwt_secret: SECRET.to_string(),
        ..AuthConfig::default()
    })
}

fn test_app_with(auth_config: AuthConfig) -> Router {
    let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());

    let auth_module = AuthModule::new(Arc::clone(&db), auth_config).unwrap();
    auth_module.service().create_user("root", PASSWORD).unwrap();

    let workorders_module = WorkOrdersModule::new(db).unwrap();

    let jwt_state = Arc::new(JwtState::from_secret(SECRET));
    build_router(
        jwt_state,
        vec![
            (auth_module.name(), auth_module.routes()),
            (workorders_module.name(), workorders_module.routes()),
        ],
    )
}

/// Fire one request at the router and decode the JSON response.
async fn api(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let body = match body {
        Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
        None => Body::empty(),
    };
    let req = builder.body(body).unwrap();

    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::json!(null)
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::json!(null))
    };
    (status, json)
}

/// Obtain an access token for the bootstrap user.
async fn login(router: &Router) -> String {
    let (status, json) = api(
        router,
        "POST",
        "/auth/token/",
        None,
        Some(serde_json::json!({"username": "root", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["access_token"].as_str().unwrap().to_string()
}

async fn create_order(router: &Router, token: &str, title: &str, status: &str) -> String {
    let (s, json) = api(
        router,
        "POST",
        "/workorders/",
        Some(token),
        Some(serde_json::json!({"title": title, "station": "L1", "status": status})),
    )
    .await;
    assert_eq!(s, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public_and_fixed() {
    let app = test_app();
    let (status, json) = api(&app, "GET", "/health/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({
            "status": "ok",
            "service": "factoryflow-lite",
            "version": "1.0.0",
        })
    );
}

// ---------------------------------------------------------------------------
// Auth gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resource_endpoints_require_token() {
    let app = test_app();

    let (status, json) = api(&app, "GET", "/workorders/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHENTICATED");

    // A rejected write must not mutate anything.
    let (status, _) = api(
        &app,
        "POST",
        "/workorders/",
        None,
        Some(serde_json::json!({"title": "sneaky", "station": "L1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let (_, json) = api(&app, "GET", "/workorders/", Some(&token), None).await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn garbage_token_rejected() {
    let app = test_app();
    let (status, json) = api(&app, "GET", "/workorders/", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn expired_token_rejected() {
    // Negative TTL beyond the 60s validation leeway.
    let app = test_app_with(AuthConfig {
        jwt_secret: SECRET.to_string(),
        access_token_ttl: -120,
        refresh_token_ttl: 86400,
    });

    let (status, json) = api(
        &app,
        "POST",
        "/auth/token/",
        None,
        Some(serde_json::json!({"username": "root", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = json["access_token"].as_str().unwrap();

    let (status, _) = api(&app, "GET", "/workorders/", Some(access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_obtain_and_refresh() {
    let app = test_app();

    // Wrong password.
    let (status, json) = api(
        &app,
        "POST",
        "/auth/token/",
        None,
        Some(serde_json::json!({"username": "root", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHENTICATED");

    // Obtain a pair.
    let (status, json) = api(
        &app,
        "POST",
        "/auth/token/",
        None,
        Some(serde_json::json!({"username": "root", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token_type"], "Bearer");
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    // Refresh yields a working access token.
    let (status, json) = api(
        &app,
        "POST",
        "/auth/token/refresh/",
        None,
        Some(serde_json::json!({"refresh_token": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = json["access_token"].as_str().unwrap().to_string();
    let (status, _) = api(&app, "GET", "/workorders/", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    // An access token cannot refresh.
    let (status, _) = api(
        &app,
        "POST",
        "/auth/token/refresh/",
        None,
        Some(serde_json::json!({"refresh_token": access})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_cannot_authenticate_resources() {
    let app = test_app();
    let (_, json) = api(
        &app,
        "POST",
        "/auth/token/",
        None,
        Some(serde_json::json!({"username": "root", "password": PASSWORD})),
    )
    .await;
    let refresh = json["refresh_token"].as_str().unwrap();

    let (status, _) = api(&app, "GET", "/workorders/", Some(refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Work order CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn work_order_crud_roundtrip() {
    let app = test_app();
    let token = login(&app).await;

    // Client-supplied id/created_at are ignored.
    let (status, created) = api(
        &app,
        "POST",
        "/workorders/",
        Some(&token),
        Some(serde_json::json!({
            "id": "client-id",
            "created_at": "1999-01-01T00:00:00+00:00",
            "title": "Fix belt",
            "station": "L1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_ne!(id, "client-id");
    assert_ne!(created["created_at"], "1999-01-01T00:00:00+00:00");
    assert_eq!(created["status"], "OPEN");
    assert_eq!(created["inspections"], serde_json::json!([]));

    // Retrieve.
    let (status, json) = api(&app, "GET", &format!("/workorders/{id}/"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Fix belt");

    // Full update.
    let (status, json) = api(
        &app,
        "PUT",
        &format!("/workorders/{id}/"),
        Some(&token),
        Some(serde_json::json!({"title": "Fix belt drive", "station": "L2", "status": "IN_PROGRESS"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["station"], "L2");
    assert_eq!(json["status"], "IN_PROGRESS");
    assert_eq!(json["created_at"], created["created_at"]);

    // Partial update.
    let (status, json) = api(
        &app,
        "PATCH",
        &format!("/workorders/{id}/"),
        Some(&token),
        Some(serde_json::json!({"status": "DONE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "DONE");
    assert_eq!(json["title"], "Fix belt drive");

    // Delete.
    let (status, _) = api(&app, "DELETE", &format!("/workorders/{id}/"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, json) = api(&app, "GET", &format!("/workorders/{id}/"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn work_order_validation_errors() {
    let app = test_app();
    let token = login(&app).await;

    // Out-of-enum status fails at parse time.
    let (status, _) = api(
        &app,
        "POST",
        "/workorders/",
        Some(&token),
        Some(serde_json::json!({"title": "x", "station": "L1", "status": "STALLED"})),
    )
    .await;
    assert!(status.is_client_error());

    // Missing required field.
    let (status, _) = api(
        &app,
        "POST",
        "/workorders/",
        Some(&token),
        Some(serde_json::json!({"station": "L1"})),
    )
    .await;
    assert!(status.is_client_error());

    // Over-long title.
    let (status, json) = api(
        &app,
        "POST",
        "/workorders/",
        Some(&token),
        Some(serde_json::json!({"title": "x".repeat(201), "station": "L1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn work_order_list_filter_and_pagination() {
    let app = test_app();
    let token = login(&app).await;

    for i in 0..3 {
        create_order(&app, &token, &format!("open-{i}"), "OPEN").await;
    }
    create_order(&app, &token, "done-0", "DONE").await;

    // Status filter returns exactly the matching set.
    let (status, json) = api(&app, "GET", "/workorders/?status=OPEN", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 3);
    let titles: Vec<&str> = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["title"].as_str().unwrap())
        .collect();
    assert!(titles.iter().all(|t| t.starts_with("open-")));

    // Unknown enum value in the filter is a validation error.
    let (status, json) = api(&app, "GET", "/workorders/?status=BOGUS", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_FAILED");

    // Fill up past one page.
    for i in 0..8 {
        create_order(&app, &token, &format!("more-{i}"), "OPEN").await;
    }
    let (_, page1) = api(&app, "GET", "/workorders/", Some(&token), None).await;
    assert_eq!(page1["count"], 12);
    assert_eq!(page1["results"].as_array().unwrap().len(), 10);
    assert_eq!(page1["next"], 2);
    assert_eq!(page1["previous"], serde_json::json!(null));

    let (_, page2) = api(&app, "GET", "/workorders/?page=2", Some(&token), None).await;
    assert_eq!(page2["results"].as_array().unwrap().len(), 2);
    assert_eq!(page2["next"], serde_json::json!(null));
    assert_eq!(page2["previous"], 1);
}

// ---------------------------------------------------------------------------
// Inspections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inspection_crud_and_filter() {
    let app = test_app();
    let token = login(&app).await;

    let order_a = create_order(&app, &token, "a", "OPEN").await;
    let order_b = create_order(&app, &token, "b", "OPEN").await;

    let (status, created) = api(
        &app,
        "POST",
        "/inspections/",
        Some(&token),
        Some(serde_json::json!({"work_order": order_a, "result": "OK"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["notes"], "");
    let inspection_id = created["id"].as_str().unwrap().to_string();

    api(
        &app,
        "POST",
        "/inspections/",
        Some(&token),
        Some(serde_json::json!({"work_order": order_b, "result": "FAIL", "notes": "crack"})),
    )
    .await;

    // Filter by work order returns exactly that order's inspections.
    let (status, json) = api(
        &app,
        "GET",
        &format!("/inspections/?work_order={order_a}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["id"], inspection_id.as_str());

    // The work order embeds its inspections.
    let (_, json) = api(&app, "GET", &format!("/workorders/{order_a}/"), Some(&token), None).await;
    assert_eq!(json["inspections"][0]["id"], inspection_id.as_str());

    // Patch notes.
    let (status, json) = api(
        &app,
        "PATCH",
        &format!("/inspections/{inspection_id}/"),
        Some(&token),
        Some(serde_json::json!({"notes": "re-checked"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["notes"], "re-checked");

    // Delete.
    let (status, _) = api(
        &app,
        "DELETE",
        &format!("/inspections/{inspection_id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn inspection_validation_errors() {
    let app = test_app();
    let token = login(&app).await;
    let order = create_order(&app, &token, "a", "OPEN").await;

    // Unknown work order.
    let (status, json) = api(
        &app,
        "POST",
        "/inspections/",
        Some(&token),
        Some(serde_json::json!({"work_order": "no-such-order", "result": "OK"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_FAILED");

    // Out-of-enum result fails at parse time.
    let (status, _) = api(
        &app,
        "POST",
        "/inspections/",
        Some(&token),
        Some(serde_json::json!({"work_order": order, "result": "MAYBE"})),
    )
    .await;
    assert!(status.is_client_error());

    // Malformed body.
    let req = Request::builder()
        .method("POST")
        .uri("/inspections/")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn deleting_work_order_cascades_to_inspections() {
    let app = test_app();
    let token = login(&app).await;
    let order = create_order(&app, &token, "a", "OPEN").await;

    let (_, i1) = api(
        &app,
        "POST",
        "/inspections/",
        Some(&token),
        Some(serde_json::json!({"work_order": order, "result": "OK"})),
    )
    .await;
    let (_, i2) = api(
        &app,
        "POST",
        "/inspections/",
        Some(&token),
        Some(serde_json::json!({"work_order": order, "result": "FAIL"})),
    )
    .await;

    let (status, _) = api(&app, "DELETE", &format!("/workorders/{order}/"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for inspection in [&i1, &i2] {
        let id = inspection["id"].as_str().unwrap();
        let (status, json) = api(&app, "GET", &format!("/inspections/{id}/"), Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
