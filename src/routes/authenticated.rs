use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Every handler here receives the caller's `AuthUser`; the owner of anything created
/// or modified is always that id, never a value from the request body.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/auth/me
        .route("/api/auth/me", get(handlers::get_me))
        // POST /api/resume saves a new resume; GET /api/resume lists the caller's resumes.
        .route(
            "/api/resume",
            get(handlers::list_resumes).post(handlers::save_resume),
        )
        // PUT /api/resume/{id}/rename
        // Owner-only. Non-owners get 403.
        .route("/api/resume/{id}/rename", put(handlers::rename_resume))
        // GET /api/user/resumes
        .route("/api/user/resumes", get(handlers::get_user_resumes))
}
