//! The persistence gateway between the onboarding flow and the backing
//! store. Every operation reports its outcome as a `Result`; expected
//! failures (duplicate email, unknown entry, out-of-order step) are
//! distinct variants callers must branch on.
//!
//! Implementations: `PgWaitlistGateway` (Postgres + blob store, used by the
//! HTTP routes) and `HttpWaitlistGateway` (drives those routes remotely).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::catalog::WaitlistRole;
use crate::models::waitlist::{Interests, ProfileLinks, WaitlistEntry};
use crate::onboarding::form::{Field, FieldErrors};
use crate::upload::ResumeFile;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "This email is already registered for the waitlist.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("This email is already registered for the waitlist.")]
    DuplicateEmail,

    #[error("No waitlist entry with id {0}")]
    NotFound(Uuid),

    /// The entry has not yet reached the step before `step`.
    #[error("Step {step} cannot be saved before step {} is completed", step - 1)]
    OutOfOrder { step: u8 },

    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),

    /// Network, database or storage failure. Not field-scoped.
    #[error("{0}")]
    Backend(String),
}

impl GatewayError {
    /// The form field this error belongs to, if it is field-scoped.
    pub fn field(&self) -> Option<Field> {
        match self {
            GatewayError::DuplicateEmail => Some(Field::Email),
            _ => None,
        }
    }
}

/// Outcome of a step-4 save. `resume_url` is empty when no file was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSaved {
    pub resume_url: String,
}

#[async_trait]
pub trait WaitlistGateway: Send + Sync {
    async fn check_email_exists(&self, email: &str) -> Result<bool, GatewayError>;

    /// Creates the entry after confirming the email is not yet registered.
    async fn create_entry_step1(&self, name: &str, email: &str) -> Result<Uuid, GatewayError>;

    async fn update_entry_step2(&self, id: Uuid, role: WaitlistRole) -> Result<(), GatewayError>;

    async fn update_entry_step3(&self, id: Uuid, interests: &Interests) -> Result<(), GatewayError>;

    /// Uploads the resume (if any) under `resumes/{id}/{millis}_{name}`,
    /// then writes the profile fields together with the resulting URL.
    async fn update_entry_step4(
        &self,
        id: Uuid,
        links: &ProfileLinks,
        resume: Option<&ResumeFile>,
    ) -> Result<ProfileSaved, GatewayError>;

    async fn get_entry(&self, id: Uuid) -> Result<WaitlistEntry, GatewayError>;
}

/// Checks that an entry currently at `current_step` may save `step`.
/// Resubmitting an already-saved step is allowed; skipping ahead is not.
pub fn ensure_step_order(current_step: i32, step: u8) -> Result<(), GatewayError> {
    if current_step + 1 < i32::from(step) {
        return Err(GatewayError::OutOfOrder { step });
    }
    Ok(())
}
