use serde::{Deserialize, Serialize};

use crate::models::Role;

// ---- auth ----

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleTokenRequest {
    pub id_token: String,
}

/// Body returned by login and invite acceptance.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptInviteRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

// ---- users ----

#[derive(Debug, Clone, Serialize)]
pub struct UserUpdateRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteRequest {
    pub to_email: String,
    pub name: String,
    pub surname: String,
}

// ---- problemsets ----

#[derive(Debug, Clone, Serialize)]
pub struct NewProblemsetRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub part_of: Option<String>,
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftRequest {
    pub raw_latex: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompileRequest {
    pub latex_code: String,
}

// ---- tags ----

#[derive(Debug, Clone, Serialize)]
pub struct NewTagRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LectureTagsRequest {
    pub tag_ids: Vec<i64>,
}

// ---- llm ----

#[derive(Debug, Clone, Serialize)]
pub struct TransformRequest {
    pub code: String,
}

// ---- errors ----

/// Error body the backend sends alongside 4xx/5xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}
