//! Generation client: the single point of entry for calls to the external
//! profile-generation API.
//!
//! No other module may call the generation API directly. The intake
//! pipeline depends on the `ProfileGenerator` trait so tests can substitute
//! a fake.
//!
//! Failures are returned to the caller as-is; nothing here retries.
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status code {status}: {message}")]
    Api { status: u16, message: String },

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Submitter details sent with the extracted text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    text: &'a str,
    user_info: &'a UserInfo,
}

#[async_trait]
pub trait ProfileGenerator: Send + Sync {
    /// Turns resume/profile text into a structured profile object.
    async fn generate_profile(
        &self,
        text: &str,
        user: &UserInfo,
    ) -> Result<Map<String, Value>, GenerationError>;
}

#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GenerationClient {
    /// Uses reqwest's default timeouts; none are configured here.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl ProfileGenerator for GenerationClient {
    async fn generate_profile(
        &self,
        text: &str,
        user: &UserInfo,
    ) -> Result<Map<String, Value>, GenerationError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&GenerateRequest {
                text,
                user_info: user,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let value: Value = response.json().await?;
        debug!("Generation API answered for {}", user.email);
        into_object(value)
    }
}

fn into_object(value: Value) -> Result<Map<String, Value>, GenerationError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(GenerationError::NotAnObject("null")),
        Value::Bool(_) => Err(GenerationError::NotAnObject("a boolean")),
        Value::Number(_) => Err(GenerationError::NotAnObject("a number")),
        Value::String(_) => Err(GenerationError::NotAnObject("a string")),
        Value::Array(_) => Err(GenerationError::NotAnObject("an array")),
    }
}
