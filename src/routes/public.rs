use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that are **unauthenticated**. The share endpoint is deliberately here:
/// a resume id is a capability, and holding it is enough to read the resume.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET / and GET /health
        // Liveness probes for load balancers and local smoke checks.
        .route("/", get(|| async { "Resume Forge API is running" }))
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/register
        .route("/api/auth/register", post(handlers::register_user))
        // POST /api/auth/login
        .route("/api/auth/login", post(handlers::login_user))
        // GET /api/share/{id}
        // Read-only share link; no ownership check by contract.
        .route("/api/share/{id}", get(handlers::get_shared_resume))
}
