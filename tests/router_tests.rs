use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use resume_forge::{
    AppConfig, AppState, InMemoryRepository, create_router,
    models::{Resume, ResumeResponse, TokenResponse, UserProfile},
    repository::RepositoryState,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

fn app_with(repo: InMemoryRepository) -> Router {
    let repo = Arc::new(repo) as RepositoryState;
    create_router(AppState::new(repo, AppConfig::default()))
}

fn app() -> Router {
    app_with(InMemoryRepository::new())
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "Ada", "email": email, "password": "hunter22" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json::<TokenResponse>(response).await.token
}

async fn save(app: &Router, token: &str, name: &str) -> Resume {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/resume",
            Some(token),
            json!({
                "resumeData": {
                    "name": name,
                    "email": "a@x.com",
                    "phone": "1",
                    "address": "addr",
                    "skills": ["x"]
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json::<ResumeResponse>(response).await.resume
}

// --- Public surface ---

#[tokio::test]
async fn test_health_and_root() {
    let app = app();

    for uri in ["/", "/health"] {
        let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let response = app().oneshot(get_request("/health", None)).await.unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = app()
        .oneshot(get_request("/api-docs/openapi.json", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc: Value = body_json(response).await;
    assert!(doc["paths"]["/api/share/{id}"].is_object());
}

#[tokio::test]
async fn test_register_duplicate_returns_400() {
    let app = app();
    register(&app, "ada@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "Ada", "email": "ada@example.com", "password": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(response).await;
    assert_eq!(body["message"], "User already exists");

    // The original account keeps its password and name.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "hunter22" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json::<TokenResponse>(response).await.token;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "ada@example.com", "password": "x" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    let profile: UserProfile = body_json(response).await;
    assert_eq!(profile.name, "Ada");
}

#[tokio::test]
async fn test_malformed_json_body_returns_400_with_message() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(response).await;
    assert!(body["message"].is_string());
}

// --- Access gate ---

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();

    for uri in ["/api/auth/me", "/api/resume", "/api/user/resumes"] {
        let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        let body: Value = body_json(response).await;
        assert_eq!(body["message"], "No token, authorization denied");
    }
}

#[tokio::test]
async fn test_protected_route_rejects_invalid_token() {
    let response = app()
        .oneshot(get_request("/api/auth/me", Some("garbage")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(response).await;
    assert_eq!(body["message"], "Token is not valid");
}

#[tokio::test]
async fn test_me_returns_profile_without_digest() {
    let app = app();
    let token = register(&app, "ada@example.com").await;

    let response = app
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response).await;
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
    let profile: UserProfile = serde_json::from_value(body).unwrap();
    assert_eq!(profile.email, "ada@example.com");
}

// --- Resume flow ---

#[tokio::test]
async fn test_resume_lifecycle_over_router() {
    let app = app();
    let token = register(&app, "ada@example.com").await;

    let first = save(&app, &token, "t1").await;
    let second = save(&app, &token, "t2").await;
    assert_eq!(first.score, 40);
    assert_eq!(first.selected_template, "classic");
    assert_eq!(first.color, "#007bff");

    let response = app
        .clone()
        .oneshot(get_request("/api/resume", Some(&token)))
        .await
        .unwrap();
    let listed: Vec<Resume> = body_json(response).await;
    assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second.id, first.id]);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/resume/{}/rename", first.id),
            Some(&token),
            json!({ "newName": "Renamed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let renamed: ResumeResponse = body_json(response).await;
    assert_eq!(renamed.resume.name, "Renamed");

    // The share link works without any token.
    let response = app
        .oneshot(get_request(&format!("/api/share/{}", first.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let shared: Resume = body_json(response).await;
    assert_eq!(shared.name, "Renamed");
}

#[tokio::test]
async fn test_save_ignores_owner_in_payload() {
    let app = app();
    let token = register(&app, "ada@example.com").await;
    let other_token = register(&app, "bob@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/resume",
            Some(&token),
            json!({
                "resumeData": { "name": "Mine", "ownerId": Uuid::new_v4(), "user": "someone" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get_request("/api/resume", Some(&other_token)))
        .await
        .unwrap();
    let listed: Vec<Resume> = body_json(response).await;
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_rename_by_other_user_returns_403() {
    let app = app();
    let owner = register(&app, "ada@example.com").await;
    let intruder = register(&app, "eve@example.com").await;
    let resume = save(&app, &owner, "Mine").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/resume/{}/rename", resume.id),
            Some(&intruder),
            json!({ "newName": "Stolen" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_share_unknown_id_returns_404() {
    let response = app()
        .oneshot(get_request(&format!("/api/share/{}", Uuid::new_v4()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(response).await;
    assert_eq!(body["message"], "Resume not found");
}

#[tokio::test]
async fn test_store_failure_returns_500_with_generic_message() {
    let app = app_with(InMemoryRepository::new_failing());

    let response = app
        .oneshot(get_request(&format!("/api/share/{}", Uuid::new_v4()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = body_json(response).await;
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_save_accepts_numeric_phone() {
    let app = app();
    let token = register(&app, "ada@example.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/resume",
            Some(&token),
            json!({ "resumeData": { "phone": 5551234 } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: ResumeResponse = body_json(response).await;
    assert_eq!(body.resume.phone, "5551234");
    assert_eq!(body.resume.score, 6);
}

#[tokio::test]
async fn test_rename_checks_body_before_id() {
    let app = app();
    let token = register(&app, "ada@example.com").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/resume/not-a-uuid/rename",
            Some(&token),
            json!({ "newName": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(response).await;
    assert_eq!(body["message"], "New name is required");
}
