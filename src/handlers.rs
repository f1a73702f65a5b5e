use crate::{
    accounts::AuthService,
    auth::AuthUser,
    error::{ApiJson, AppError, AppResult, ErrorResponse},
    models::{
        LoginRequest, RegisterRequest, RenameResumeRequest, Resume, ResumeId, ResumeResponse,
        SaveResumeRequest, TokenResponse, UserProfile,
    },
    resumes::{ResumeService, require_new_name},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Auth Handlers ---

/// register_user
///
/// [Public Route] Creates an account and returns a bearer token valid for one hour.
/// A duplicate email is reported as `400` with the message "User already exists".
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = TokenResponse),
        (status = 400, description = "Missing field or email already registered", body = ErrorResponse)
    )
)]
pub async fn register_user(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = auth
        .register(payload.name, payload.email, payload.password)
        .await?;
    Ok(Json(TokenResponse { token }))
}

/// login_user
///
/// [Public Route] Exchanges credentials for a bearer token. Unknown email and wrong
/// password share one response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login_user(
    State(auth): State<AuthService>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = auth.login(payload.email, payload.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// get_me
///
/// [Authenticated Route] The token holder's profile. The password digest is never
/// part of the response.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    )
)]
pub async fn get_me(
    AuthUser { id }: AuthUser,
    State(auth): State<AuthService>,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(auth.who_am_i(id).await?))
}

// --- Resume Handlers ---

/// save_resume
///
/// [Authenticated Route] Scores and stores a new resume for the caller. Any owner
/// information inside the payload is ignored.
#[utoipa::path(
    post,
    path = "/api/resume",
    request_body = SaveResumeRequest,
    responses(
        (status = 201, description = "Saved", body = ResumeResponse),
        (status = 400, description = "Resume data missing", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn save_resume(
    AuthUser { id }: AuthUser,
    State(resumes): State<ResumeService>,
    ApiJson(payload): ApiJson<SaveResumeRequest>,
) -> AppResult<(StatusCode, Json<ResumeResponse>)> {
    let resume = resumes
        .create_resume(id, payload.resume_data, payload.selected_template, payload.color)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ResumeResponse {
            message: "Resume saved successfully!".to_string(),
            resume,
        }),
    ))
}

/// list_resumes
///
/// [Authenticated Route] The caller's resumes, newest first.
#[utoipa::path(
    get,
    path = "/api/resume",
    responses(
        (status = 200, description = "My resumes", body = [Resume]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_resumes(
    AuthUser { id }: AuthUser,
    State(resumes): State<ResumeService>,
) -> AppResult<Json<Vec<Resume>>> {
    Ok(Json(resumes.list_resumes(id).await?))
}

/// get_user_resumes
///
/// [Authenticated Route] Same listing as `GET /api/resume`, kept at the account path
/// used by the dashboard.
#[utoipa::path(
    get,
    path = "/api/user/resumes",
    responses(
        (status = 200, description = "My resumes", body = [Resume]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_user_resumes(
    user: AuthUser,
    state: State<ResumeService>,
) -> AppResult<Json<Vec<Resume>>> {
    list_resumes(user, state).await
}

/// rename_resume
///
/// [Authenticated Route] Renames a resume the caller owns.
#[utoipa::path(
    put,
    path = "/api/resume/{id}/rename",
    params(("id" = Uuid, Path, description = "Resume ID")),
    request_body = RenameResumeRequest,
    responses(
        (status = 200, description = "Renamed", body = ResumeResponse),
        (status = 400, description = "New name missing", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Resume not found", body = ErrorResponse)
    )
)]
pub async fn rename_resume(
    AuthUser { id: user_id }: AuthUser,
    State(resumes): State<ResumeService>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<RenameResumeRequest>,
) -> AppResult<Json<ResumeResponse>> {
    let new_name = require_new_name(payload.new_name)?;
    let resume_id = parse_resume_id(&id)?;
    let resume = resumes
        .rename_resume(user_id, resume_id, Some(new_name))
        .await?;
    Ok(Json(ResumeResponse {
        message: "Resume renamed successfully!".to_string(),
        resume,
    }))
}

// --- Sharing ---

/// get_shared_resume
///
/// [Public Route] The share link. Returns the full resume to anyone who has its id.
#[utoipa::path(
    get,
    path = "/api/share/{id}",
    params(("id" = Uuid, Path, description = "Resume ID")),
    responses(
        (status = 200, description = "Shared resume", body = Resume),
        (status = 404, description = "Resume not found", body = ErrorResponse)
    )
)]
pub async fn get_shared_resume(
    State(resumes): State<ResumeService>,
    Path(id): Path<String>,
) -> AppResult<Json<Resume>> {
    let resume_id = parse_resume_id(&id)?;
    Ok(Json(resumes.get_shared_resume(resume_id).await?))
}

/// An id that cannot name any resume is reported the same way as an unknown one.
fn parse_resume_id(raw: &str) -> AppResult<ResumeId> {
    Uuid::parse_str(raw)
        .map(ResumeId)
        .map_err(|_| AppError::NotFound("Resume not found".to_string()))
}
