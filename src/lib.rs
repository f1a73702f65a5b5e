use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Domain services.
pub mod accounts;
pub mod resumes;
pub mod scoring;

// Access gate, persistence and shared types.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing split by access requirement (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use accounts::AuthService;
pub use auth::TokenKeys;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use resumes::ResumeService;

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` and browsable
/// through the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::login_user, handlers::get_me,
        handlers::save_resume, handlers::list_resumes, handlers::get_user_resumes,
        handlers::rename_resume, handlers::get_shared_resume
    ),
    components(
        schemas(
            models::RegisterRequest, models::LoginRequest, models::TokenResponse,
            models::UserProfile, models::UserId, models::ResumeId,
            models::ResumeData, models::Education, models::Experience, models::Resume,
            models::SaveResumeRequest, models::RenameResumeRequest, models::ResumeResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "resume-forge", description = "Resume builder API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared state of the application. Services are not stored here; they are
/// assembled from these parts per request through the `FromRef` impls below.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for users and resumes.
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Token keys derived once from `config.jwt_secret`.
    pub keys: TokenKeys,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let keys = TokenKeys::from(&config);
        Self { repo, config, keys }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(app_state: &AppState) -> TokenKeys {
        app_state.keys.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(app_state: &AppState) -> AuthService {
        AuthService::new(app_state.repo.clone(), app_state.keys.clone())
    }
}

impl FromRef<AppState> for ResumeService {
    fn from_ref(app_state: &AppState) -> ResumeService {
        ResumeService::new(app_state.repo.clone())
    }
}

/// auth_middleware
///
/// Guards the whole authenticated router. Extracting `AuthUser` runs the access gate;
/// a rejection short-circuits with 401 before any handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies the scoped and global middleware and attaches
/// the state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Echo the id back so clients can quote it in bug reports.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI and the request id, so that every log line
/// of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
