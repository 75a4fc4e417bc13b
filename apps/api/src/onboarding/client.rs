//! `WaitlistGateway` over HTTP, for driving an `OnboardingFlow` against a
//! running service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::models::catalog::WaitlistRole;
use crate::models::waitlist::{Interests, ProfileLinks, WaitlistEntry};
use crate::onboarding::form::FieldErrors;
use crate::upload::ResumeFile;
use crate::waitlist::gateway::{GatewayError, ProfileSaved, WaitlistGateway};
use crate::waitlist::handlers::{
    CheckEmailResponse, CreateEntryResponse, EntryResponse, SaveProfileResponse, SuccessResponse,
};

/// Error body returned by every route on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub fields: Option<FieldErrors>,
}

/// Which call failed; used to rebuild the error variants that carry context.
#[derive(Debug, Clone, Copy)]
struct CallContext {
    id: Option<Uuid>,
    step: u8,
}

/// Turns a non-success response back into the gateway error it came from.
pub fn error_from_response(status: u16, body: Option<ErrorBody>, id: Option<Uuid>, step: u8) -> GatewayError {
    let Some(body) = body else {
        return GatewayError::Backend(format!("Request failed with status {status}"));
    };
    match body.code.as_str() {
        "DUPLICATE_EMAIL" => GatewayError::DuplicateEmail,
        "OUT_OF_ORDER" => GatewayError::OutOfOrder { step },
        "NOT_FOUND" => GatewayError::NotFound(id.unwrap_or_default()),
        "VALIDATION_ERROR" => GatewayError::Invalid(body.fields.unwrap_or_default()),
        _ if body.error.is_empty() => GatewayError::Backend(format!("Request failed with status {status}")),
        _ => GatewayError::Backend(body.error),
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    warn!("Waitlist request failed: {e}");
    GatewayError::Backend("Network error, please try again".to_string())
}

pub struct HttpWaitlistGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWaitlistGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/waitlist{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, ctx: CallContext) -> Result<T, GatewayError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(transport);
        }
        let body = response.json::<ErrorBody>().await.ok();
        Err(error_from_response(status.as_u16(), body, ctx.id, ctx.step))
    }
}

#[async_trait]
impl WaitlistGateway for HttpWaitlistGateway {
    async fn check_email_exists(&self, email: &str) -> Result<bool, GatewayError> {
        let request = self
            .client
            .post(self.url("/check-email"))
            .json(&json!({ "email": email }));
        let body: CheckEmailResponse = self.send(request, CallContext { id: None, step: 1 }).await?;
        Ok(body.exists)
    }

    async fn create_entry_step1(&self, name: &str, email: &str) -> Result<Uuid, GatewayError> {
        let request = self
            .client
            .post(self.url(""))
            .json(&json!({ "name": name, "email": email }));
        let body: CreateEntryResponse = self.send(request, CallContext { id: None, step: 1 }).await?;
        Ok(body.id)
    }

    async fn update_entry_step2(&self, id: Uuid, role: WaitlistRole) -> Result<(), GatewayError> {
        let request = self
            .client
            .put(self.url(&format!("/{id}/role")))
            .json(&json!({ "role": role }));
        let _: SuccessResponse = self.send(request, CallContext { id: Some(id), step: 2 }).await?;
        Ok(())
    }

    async fn update_entry_step3(&self, id: Uuid, interests: &Interests) -> Result<(), GatewayError> {
        let request = self
            .client
            .put(self.url(&format!("/{id}/interests")))
            .json(interests);
        let _: SuccessResponse = self.send(request, CallContext { id: Some(id), step: 3 }).await?;
        Ok(())
    }

    async fn update_entry_step4(
        &self,
        id: Uuid,
        links: &ProfileLinks,
        resume: Option<&ResumeFile>,
    ) -> Result<ProfileSaved, GatewayError> {
        let mut form = Form::new()
            .text("linkedinProfile", links.linkedin_profile.clone())
            .text("githubProfile", links.github_profile.clone())
            .text("personalWebsite", links.personal_website.clone());
        if let Some(file) = resume {
            let part = Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(transport)?;
            form = form.part("resume", part);
        }

        let request = self
            .client
            .put(self.url(&format!("/{id}/profile")))
            .multipart(form);
        let body: SaveProfileResponse = self.send(request, CallContext { id: Some(id), step: 4 }).await?;
        Ok(ProfileSaved {
            resume_url: body.resume_url,
        })
    }

    async fn get_entry(&self, id: Uuid) -> Result<WaitlistEntry, GatewayError> {
        let request = self.client.get(self.url(&format!("/{id}")));
        let body: EntryResponse = self.send(request, CallContext { id: Some(id), step: 0 }).await?;
        Ok(body.data)
    }
}
