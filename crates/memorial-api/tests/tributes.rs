use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use memorial_api::rate_limit::RateLimiter;
use memorial_api::state::{AppState, AppStateInner, ApprovalPolicy};
use memorial_api::storage::PhotoStorage;
use memorial_db::Database;
use memorial_db::queries::NewTribute;

const BOUNDARY: &str = "memorial-test-boundary";

async fn test_state(approval: ApprovalPolicy) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = PhotoStorage::new(dir.path().to_path_buf(), "http://localhost:3000".into())
        .await
        .unwrap();
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        storage,
        rate_limiter: RateLimiter::new(Duration::from_secs(300)),
        approval,
    });
    (state, dir)
}

fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Ada"),
        ("relationship", "Friend"),
        ("message", "In loving memory."),
        ("publishPermission", "yes"),
        ("consent", "true"),
    ]
}

fn form_body(fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn submit(
    app: &Router,
    client: &str,
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri("/tributes")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("x-forwarded-for", client)
        .body(Body::from(form_body(fields, photo)))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn submit_then_list() {
    let (state, _dir) = test_state(ApprovalPolicy::Auto).await;
    let app = memorial_api::router(state);

    let response = submit(&app, "1.1.1.1", &valid_fields(), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert!(body["message"].as_str().unwrap().starts_with("Thank you"));

    let response = get(&app, "/tributes").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["tributes"].as_array().unwrap().len(), 1);
    assert_eq!(body["tributes"][0]["name"], "Ada");
    assert_eq!(body["tributes"][0]["publish_approved"], true);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["hasMore"], false);
}

#[tokio::test]
async fn consent_is_required() {
    let (state, _dir) = test_state(ApprovalPolicy::Auto).await;
    let app = memorial_api::router(state);

    let mut fields = valid_fields();
    fields.retain(|(name, _)| *name != "consent");
    fields.push(("consent", "false"));

    let response = submit(&app, "1.1.1.1", &fields, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Validation failed");
    assert!(
        body["details"]
            .as_array()
            .unwrap()
            .iter()
            .any(|d| d["field"] == "consent")
    );

    // Nothing was inserted
    let body = json_body(get(&app, "/tributes").await).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn second_submission_is_rate_limited() {
    let (state, _dir) = test_state(ApprovalPolicy::Auto).await;
    let app = memorial_api::router(state);

    let response = submit(&app, "1.1.1.1", &valid_fields(), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = submit(&app, "1.1.1.1", &valid_fields(), None).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Too many requests"));

    // A different client is unaffected
    let response = submit(&app, "2.2.2.2", &valid_fields(), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn oversized_photo_is_rejected_before_insert() {
    let (state, _dir) = test_state(ApprovalPolicy::Auto).await;
    let app = memorial_api::router(state);

    let too_big = vec![0u8; 5 * 1024 * 1024 + 1];
    let response = submit(&app, "1.1.1.1", &valid_fields(), Some(("big.jpg", &too_big))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Photo size"));

    let body = json_body(get(&app, "/tributes").await).await;
    assert_eq!(body["pagination"]["total"], 0);

    // Exactly at the cap is accepted
    let at_cap = vec![0u8; 5 * 1024 * 1024];
    let response = submit(&app, "2.2.2.2", &valid_fields(), Some(("ok.jpg", &at_cap))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn publish_permission_no_stays_off_the_wall() {
    let (state, _dir) = test_state(ApprovalPolicy::Auto).await;
    let app = memorial_api::router(state);

    let mut fields = valid_fields();
    fields.retain(|(name, _)| *name != "publishPermission");
    fields.push(("publishPermission", "no"));

    let response = submit(&app, "1.1.1.1", &fields, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(get(&app, "/tributes").await).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn hold_policy_keeps_everything_unapproved() {
    let (state, _dir) = test_state(ApprovalPolicy::Hold).await;
    let app = memorial_api::router(state);

    let response = submit(&app, "1.1.1.1", &valid_fields(), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(get(&app, "/tributes").await).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn pagination_metadata() {
    let (state, _dir) = test_state(ApprovalPolicy::Auto).await;
    for i in 0..15 {
        state
            .db
            .insert_tribute(NewTribute {
                name: &format!("visitor {i}"),
                relationship: None,
                message: "In loving memory.",
                photo_url: None,
                publish_approved: true,
                consent: true,
            })
            .unwrap();
    }
    let app = memorial_api::router(state);

    let body = json_body(get(&app, "/tributes?page=1&limit=10").await).await;
    assert_eq!(body["tributes"].as_array().unwrap().len(), 10);
    assert_eq!(body["pagination"]["total"], 15);
    assert_eq!(body["pagination"]["hasMore"], true);

    let body = json_body(get(&app, "/tributes?page=2&limit=10").await).await;
    assert_eq!(body["tributes"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["hasMore"], false);

    // Hostile knobs are clamped, not honored
    let body = json_body(get(&app, "/tributes?page=0&limit=1000").await).await;
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 100);
}

#[tokio::test]
async fn photo_round_trip() {
    let (state, _dir) = test_state(ApprovalPolicy::Auto).await;
    let app = memorial_api::router(state);

    let photo = b"not really a png";
    let response = submit(&app, "1.1.1.1", &valid_fields(), Some(("flowers.png", photo))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(get(&app, "/tributes").await).await;
    let url = body["tributes"][0]["photo_url"].as_str().unwrap();
    let path = url.strip_prefix("http://localhost:3000").unwrap();
    assert!(path.starts_with("/photos/"));
    assert!(path.ends_with(".png"));

    let response = get(&app, path).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "image/png"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], photo);
}

#[tokio::test]
async fn photo_path_traversal_is_rejected() {
    let (state, _dir) = test_state(ApprovalPolicy::Auto).await;
    let app = memorial_api::router(state);

    let response = get(&app, "/photos/..%2Fsecret").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/photos/missing.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
