//! HTTP surface of the waitlist gateway. Each route re-runs the step's
//! validators before touching storage; clients are never trusted to have
//! validated already.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::waitlist::{Interests, ProfileLinks, WaitlistEntry};
use crate::onboarding::validation::{
    validate_identity, validate_interests_payload, validate_profile, validate_role,
};
use crate::state::AppState;
use crate::upload::UploadForm;

#[derive(Debug, Deserialize)]
pub struct CheckEmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckEmailResponse {
    pub success: bool,
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEntryResponse {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SaveRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileResponse {
    pub success: bool,
    pub resume_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResponse {
    pub success: bool,
    pub data: WaitlistEntry,
}

/// POST /api/v1/waitlist/check-email
pub async fn handle_check_email(
    State(state): State<AppState>,
    AppJson(req): AppJson<CheckEmailRequest>,
) -> Result<Json<CheckEmailResponse>, AppError> {
    let exists = state.waitlist.check_email_exists(req.email.trim()).await?;
    Ok(Json(CheckEmailResponse {
        success: true,
        exists,
    }))
}

/// POST /api/v1/waitlist
pub async fn handle_create_entry(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateEntryRequest>,
) -> Result<(StatusCode, Json<CreateEntryResponse>), AppError> {
    let errors = validate_identity(&req.name, &req.email);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let id = state
        .waitlist
        .create_entry_step1(req.name.trim(), req.email.trim())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateEntryResponse { success: true, id }),
    ))
}

/// PUT /api/v1/waitlist/:id/role
pub async fn handle_save_role(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<SaveRoleRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let role = validate_role(&req.role).map_err(AppError::Validation)?;
    state.waitlist.update_entry_step2(id, role).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// PUT /api/v1/waitlist/:id/interests
pub async fn handle_save_interests(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(interests): AppJson<Interests>,
) -> Result<Json<SuccessResponse>, AppError> {
    let errors = validate_interests_payload(&interests);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let interests = Interests {
        goals: interests.goals.trim().to_string(),
        ..interests
    };
    state.waitlist.update_entry_step3(id, &interests).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// PUT /api/v1/waitlist/:id/profile
///
/// Multipart fields: `linkedinProfile`, `githubProfile`, optional
/// `personalWebsite`, and the `resume` file.
pub async fn handle_save_profile(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<SaveProfileResponse>, AppError> {
    let form = UploadForm::read(multipart).await.map_err(|e| {
        warn!("Rejected profile upload for waitlist entry {id}: {e}");
        AppError::BadRequest("File upload error".to_string())
    })?;

    let field = |key: &str| form.text(key).unwrap_or_default().to_string();
    let links = ProfileLinks {
        linkedin_profile: field("linkedinProfile"),
        github_profile: field("githubProfile"),
        personal_website: field("personalWebsite"),
    };

    let errors = validate_profile(&links, form.resume.as_ref());
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let saved = state
        .waitlist
        .update_entry_step4(id, &links, form.resume.as_ref())
        .await?;
    Ok(Json(SaveProfileResponse {
        success: true,
        resume_url: saved.resume_url,
    }))
}

/// GET /api/v1/waitlist/:id
pub async fn handle_get_entry(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<EntryResponse>, AppError> {
    let data = state.waitlist.get_entry(id).await?;
    Ok(Json(EntryResponse {
        success: true,
        data,
    }))
}
