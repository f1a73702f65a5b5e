use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Template applied when a save request does not name one.
pub const DEFAULT_TEMPLATE: &str = "classic";
/// Accent color applied when a save request does not name one.
pub const DEFAULT_COLOR: &str = "#007bff";

// --- Identifiers ---

/// UserId
///
/// Opaque identifier of a registered account. Ownership checks compare these values
/// directly, so a resume id can never be mistaken for an owner id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(transparent)]
#[ts(export)]
pub struct UserId(pub Uuid);

/// ResumeId
///
/// Opaque identifier of a stored resume. Doubles as the share-link key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(transparent)]
#[ts(export)]
pub struct ResumeId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl ResumeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ResumeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ResumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The account record stored in the `users` table. The password digest stays on the
/// server: it is skipped on serialization and never copied into a response body.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    // Normalized (trimmed, lower-cased). Unique across all users.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// Insert payload for the credential store. The id and creation timestamp are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// UserProfile
///
/// The public view of an account returned by `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Education
///
/// One entry of a resume's education history. Every field is optional on input and
/// accepts either text or a number (`"2021"` or `2021`); values are always stored as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct Education {
    #[serde(default, deserialize_with = "string_or_number")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
}

/// Experience
///
/// One entry of a resume's work history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct Experience {
    #[serde(default, deserialize_with = "string_or_number")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub description: Option<String>,
}

/// ResumeData
///
/// The raw resume content submitted by the editor. This is the input of the scoring
/// engine; absent and empty fields are both legal and simply earn no points. Text fields
/// also accept JSON numbers (a phone number sent as `5551234`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResumeData {
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub profession: Option<String>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
    pub skills: Option<Vec<String>>,
}

impl ResumeData {
    /// True when the payload carries no content at all.
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(str::is_empty);
        blank(&self.name)
            && blank(&self.email)
            && blank(&self.phone)
            && blank(&self.address)
            && blank(&self.profession)
            && self.education.as_ref().is_none_or(Vec::is_empty)
            && self.experience.as_ref().is_none_or(Vec::is_empty)
            && self.skills.as_ref().is_none_or(Vec::is_empty)
    }
}

/// Resume
///
/// A stored resume from the `resumes` table, serialized verbatim by both the owner's
/// listing and the public share endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Resume {
    pub id: ResumeId,
    // FK to users.id. Fixed at creation.
    pub owner_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub profession: String,

    // Stored as JSONB; order is preserved.
    #[sqlx(json)]
    pub education: Vec<Education>,
    #[sqlx(json)]
    pub experience: Vec<Experience>,
    #[sqlx(json)]
    pub skills: Vec<String>,

    pub score: i32,
    pub selected_template: String,
    pub color: String,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// NewResume
///
/// Insert payload for the resume store, assembled by the resume service after scoring.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub owner_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub profession: String,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<String>,
    pub score: i32,
    pub selected_template: String,
    pub color: String,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for `POST /api/auth/register`. Fields are optional at the wire level so
/// that missing values surface as a `400` with a message rather than a decoder error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// LoginRequest
///
/// Input payload for `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// SaveResumeRequest
///
/// Input payload for `POST /api/resume`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaveResumeRequest {
    pub resume_data: Option<ResumeData>,
    pub selected_template: Option<String>,
    pub color: Option<String>,
}

/// RenameResumeRequest
///
/// Input payload for `PUT /api/resume/{id}/rename`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RenameResumeRequest {
    pub new_name: Option<String>,
}

// --- Response Payloads ---

/// TokenResponse
///
/// Returned by register and login: a bearer token for the `Authorization` header.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// ResumeResponse
///
/// Confirmation message plus the affected resume, returned by save and rename.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ResumeResponse {
    pub message: String,
    pub resume: Resume,
}

/// Decodes a value sent either as a JSON string or a JSON number into text. A numeric
/// zero carries no content and decodes to `None`, like an absent field.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => Some(text),
        Some(Raw::Number(number)) if number.as_f64() == Some(0.0) => None,
        Some(Raw::Number(number)) => Some(number.to_string()),
        None => None,
    })
}
