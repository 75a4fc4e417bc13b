//! Resume intake: turns an uploaded resume or a profile URL into a generated
//! profile record.
//!
//! Pipeline: resolve source → extract text → generate → store record →
//! store raw file. Any stage failing fails the whole request; there is no
//! partial success and no retry. A failed file upload removes the record
//! written just before it.

pub mod extract;
pub mod generator;
pub mod handlers;
pub mod store;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::extract::ResumeSource;
use crate::intake::generator::{ProfileGenerator, UserInfo};
use crate::intake::store::ProfileStore;
use crate::models::catalog::SignupRole;
use crate::storage::{resume_object_key, BlobStore};
use crate::upload::{ResumeFile, UploadForm};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("File upload error")]
    Upload(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("No resume or profile URL provided")]
    NoSource,

    #[error("Unsupported file type")]
    UnsupportedFileType,

    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("Generation API error: {0}")]
    Generation(String),

    #[error("Failed to store profile: {0}")]
    Store(String),

    #[error("Failed to store resume: {0}")]
    Storage(String),
}

impl IntakeError {
    /// Caller mistakes; everything else is a downstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IntakeError::Upload(_)
                | IntakeError::MissingField(_)
                | IntakeError::UnknownRole(_)
                | IntakeError::NoSource
        )
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

/// A parsed intake request.
#[derive(Debug, Clone)]
pub struct JoinSubmission {
    pub name: String,
    pub email: String,
    pub role: SignupRole,
    pub resume: Option<ResumeFile>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
}

impl JoinSubmission {
    /// A missing text source is reported before any missing identity field.
    pub fn from_form(form: UploadForm) -> Result<Self, IntakeError> {
        let linkedin_url = form.text("linkedinUrl").map(str::to_string);
        let portfolio_url = form.text("portfolioUrl").map(str::to_string);
        ResumeSource::resolve(form.resume.as_ref(), linkedin_url.as_deref(), portfolio_url.as_deref())?;

        let required = |key: &'static str| {
            form.text(key)
                .map(str::to_string)
                .ok_or(IntakeError::MissingField(key))
        };
        let name = required("name")?;
        let email = required("email")?;
        let role = required("role")?;
        let role = role
            .parse::<SignupRole>()
            .map_err(|e| IntakeError::UnknownRole(e.0))?;

        Ok(Self {
            name,
            email,
            role,
            linkedin_url,
            portfolio_url,
            resume: form.resume,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub success: bool,
    pub profile: Map<String, Value>,
    pub resume_url: String,
}

pub async fn process_submission(
    generator: &dyn ProfileGenerator,
    profiles: &dyn ProfileStore,
    blobs: &dyn BlobStore,
    submission: JoinSubmission,
) -> Result<JoinResponse, IntakeError> {
    let source = ResumeSource::resolve(
        submission.resume.as_ref(),
        submission.linkedin_url.as_deref(),
        submission.portfolio_url.as_deref(),
    )?;
    let text = source.extract_text().await?;

    let user = UserInfo {
        name: submission.name.clone(),
        email: submission.email.clone(),
        role: submission.role.to_string(),
    };
    let generated = generator
        .generate_profile(&text, &user)
        .await
        .map_err(|e| IntakeError::Generation(e.to_string()))?;

    let profile = build_profile_record(generated, &user, source);

    let id = Uuid::new_v4();
    profiles
        .save_profile(id, &profile)
        .await
        .map_err(|e| IntakeError::Store(e.to_string()))?;

    let mut resume_url = String::new();
    if let Some(file) = &submission.resume {
        let key = resume_object_key(&id.to_string(), Utc::now().timestamp_millis(), &file.file_name);
        match blobs.put(&key, file.bytes.clone(), &file.content_type).await {
            Ok(stored) => resume_url = stored.url,
            Err(e) => {
                if let Err(cleanup) = profiles.delete_profile(id).await {
                    warn!("Profile {id} left behind after failed resume upload: {cleanup}");
                }
                return Err(IntakeError::Storage(e.to_string()));
            }
        }
    }

    info!("Generated profile {id} from {:?} source", source.kind());

    Ok(JoinResponse {
        success: true,
        profile,
        resume_url,
    })
}

/// Generated fields first; submitted fields, `createdAt` and `source`
/// override anything the generator returned under the same keys.
fn build_profile_record(
    mut generated: Map<String, Value>,
    user: &UserInfo,
    source: ResumeSource<'_>,
) -> Map<String, Value> {
    generated.insert("name".to_string(), Value::String(user.name.clone()));
    generated.insert("email".to_string(), Value::String(user.email.clone()));
    generated.insert("role".to_string(), Value::String(user.role.clone()));
    generated.insert("createdAt".to_string(), Value::String(Utc::now().to_rfc3339()));
    generated.insert(
        "source".to_string(),
        serde_json::to_value(source.kind()).unwrap_or(Value::Null),
    );
    generated
}
