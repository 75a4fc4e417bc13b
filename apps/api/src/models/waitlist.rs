use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored waitlist record. Serialized with the camelCase field names the
/// onboarding clients already persist against.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub skills: Vec<String>,
    pub clubs: Vec<String>,
    pub goals: Option<String>,
    pub linkedin_profile: Option<String>,
    pub github_profile: Option<String>,
    pub personal_website: Option<String>,
    pub resume_file_name: Option<String>,
    pub resume_url: Option<String>,
    pub resume_uploaded_at: Option<DateTime<Utc>>,
    pub status: String,
    pub current_step: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Progress marker stored alongside `current_step`. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WaitlistStatus {
    #[serde(rename = "step1_completed")]
    Step1Completed,
    #[serde(rename = "step2_completed")]
    Step2Completed,
    #[serde(rename = "step3_completed")]
    Step3Completed,
    #[serde(rename = "completed")]
    Completed,
}

impl WaitlistStatus {
    /// Status recorded once `step` has been saved.
    pub fn after_step(step: u8) -> Option<Self> {
        match step {
            1 => Some(Self::Step1Completed),
            2 => Some(Self::Step2Completed),
            3 => Some(Self::Step3Completed),
            4 => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Step1Completed => "step1_completed",
            Self::Step2Completed => "step2_completed",
            Self::Step3Completed => "step3_completed",
            Self::Completed => "completed",
        }
    }
}

/// Step 3 payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interests {
    pub skills: Vec<String>,
    pub clubs: Vec<String>,
    pub goals: String,
}

/// Step 4 text fields. `personal_website` is empty when not provided.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLinks {
    pub linkedin_profile: String,
    pub github_profile: String,
    #[serde(default)]
    pub personal_website: String,
}
