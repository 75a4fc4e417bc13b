//! Closed vocabularies shared by the waitlist, sign-up and intake flows.
//!
//! The waitlist flow and the sign-up flow were built with different role
//! sets. They stay two enums so a role accepted by one flow can never be
//! silently stored by the other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role picked on step 2 of the waitlist flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitlistRole {
    Learner,
    Employer,
    Mentor,
    Partner,
    Student,
}

impl WaitlistRole {
    pub const ALL: [WaitlistRole; 5] = [
        WaitlistRole::Learner,
        WaitlistRole::Employer,
        WaitlistRole::Mentor,
        WaitlistRole::Partner,
        WaitlistRole::Student,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaitlistRole::Learner => "learner",
            WaitlistRole::Employer => "employer",
            WaitlistRole::Mentor => "mentor",
            WaitlistRole::Partner => "partner",
            WaitlistRole::Student => "student",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WaitlistRole::Learner => "Learner",
            WaitlistRole::Employer => "Employer",
            WaitlistRole::Mentor => "Mentor",
            WaitlistRole::Partner => "Partner",
            WaitlistRole::Student => "Student",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WaitlistRole::Learner => "I want to develop new skills",
            WaitlistRole::Employer => "I'm looking to hire talent",
            WaitlistRole::Mentor => "I want to guide others",
            WaitlistRole::Partner => "I want to collaborate",
            WaitlistRole::Student => "I'm currently studying",
        }
    }
}

impl fmt::Display for WaitlistRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaitlistRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WaitlistRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Role picked on the account sign-up form and sent to the intake endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupRole {
    Learner,
    Employer,
    Freelancer,
    Mentor,
    Partner,
    Creator,
}

impl SignupRole {
    pub const ALL: [SignupRole; 6] = [
        SignupRole::Learner,
        SignupRole::Employer,
        SignupRole::Freelancer,
        SignupRole::Mentor,
        SignupRole::Partner,
        SignupRole::Creator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignupRole::Learner => "learner",
            SignupRole::Employer => "employer",
            SignupRole::Freelancer => "freelancer",
            SignupRole::Mentor => "mentor",
            SignupRole::Partner => "partner",
            SignupRole::Creator => "creator",
        }
    }
}

impl fmt::Display for SignupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignupRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignupRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

pub const SKILL_CATALOG: [&str; 15] = [
    "Design",
    "AI/ML",
    "Finance",
    "Web Dev",
    "Mobile Dev",
    "Data Science",
    "Marketing",
    "Writing",
    "Photography",
    "Video Editing",
    "Music Production",
    "Business",
    "Entrepreneurship",
    "Public Speaking",
    "Leadership",
];

pub const CLUB_CATALOG: [&str; 15] = [
    "Climate Change",
    "Mental Health",
    "AI Ethics",
    "Social Justice",
    "Gaming",
    "Writing",
    "Cooking",
    "Books",
    "Fitness",
    "Travel",
    "Photography",
    "Music",
    "Art",
    "Tech Innovation",
    "Startups",
];
