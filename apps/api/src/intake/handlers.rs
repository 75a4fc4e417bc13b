//! Axum route handlers for the resume intake endpoint.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{error, warn};

use crate::errors::AppError;
use crate::intake::{process_submission, IntakeError, JoinResponse, JoinSubmission};
use crate::state::AppState;
use crate::upload::UploadForm;

/// POST /api/v1/join
///
/// Multipart fields: `name`, `email`, `role`, and one of `resume` (file),
/// `linkedinUrl`, `portfolioUrl`. Every failure, wherever it happens in the
/// pipeline, is logged and answered with an error body; nothing is retried.
pub async fn handle_join(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<JoinResponse>, AppError> {
    match join(&state, multipart).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            match &e {
                IntakeError::Upload(detail) => warn!("Rejected intake upload: {detail}"),
                e if e.is_client_error() => warn!("Rejected intake request: {e}"),
                e => error!("Intake request failed: {e}"),
            }
            Err(e.into())
        }
    }
}

async fn join(state: &AppState, multipart: Multipart) -> Result<JoinResponse, IntakeError> {
    let form = UploadForm::read(multipart)
        .await
        .map_err(|e| IntakeError::Upload(e.to_string()))?;
    let submission = JoinSubmission::from_form(form)?;
    process_submission(
        state.generator.as_ref(),
        state.profiles.as_ref(),
        state.blobs.as_ref(),
        submission,
    )
    .await
}

/// Any other method on the intake route.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
