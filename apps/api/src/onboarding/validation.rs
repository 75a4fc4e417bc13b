//! Per-step input validation. Pure: nothing here touches the network, and
//! inputs are never modified. The same rules run in the onboarding client
//! before a save and on the server before it writes.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::models::catalog::{WaitlistRole, CLUB_CATALOG, SKILL_CATALOG};
use crate::models::waitlist::{Interests, ProfileLinks};
use crate::onboarding::form::{Field, FieldErrors, WaitlistForm};
use crate::onboarding::step::Step;
use crate::upload::{ResumeFile, MAX_RESUME_BYTES};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: FieldErrors,
}

impl From<FieldErrors> for ValidationResult {
    fn from(errors: FieldErrors) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates the fields collected by `step` against the accumulated form.
/// `Complete` has nothing to validate and always passes.
pub fn validate_step(step: Step, form: &WaitlistForm, resume: Option<&ResumeFile>) -> ValidationResult {
    let errors = match step {
        Step::Identity => validate_identity(&form.name, &form.email),
        Step::Role => validate_role(&form.role).err().unwrap_or_default(),
        Step::Interests => validate_interests(&form.skills, &form.clubs, &form.goals),
        Step::Profile => validate_profile(
            &ProfileLinks {
                linkedin_profile: form.linkedin_profile.clone(),
                github_profile: form.github_profile.clone(),
                personal_website: form.personal_website.clone(),
            },
            resume,
        ),
        Step::Complete => FieldErrors::new(),
    };
    errors.into()
}

/// Name must be at least two characters once trimmed. The email check is
/// deliberately loose: it only needs an `@` and a `.`.
pub fn validate_identity(name: &str, email: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let name = name.trim();
    if name.is_empty() {
        errors.set(Field::Name, "Name is required");
    } else if name.chars().count() < 2 {
        errors.set(Field::Name, "Name must be at least 2 characters");
    }

    if let Some(message) = check_email(email) {
        errors.set(Field::Email, message);
    }

    errors
}

pub fn check_email(email: &str) -> Option<&'static str> {
    let email = email.trim();
    if email.is_empty() {
        Some("Email is required")
    } else if !(email.contains('@') && email.contains('.')) {
        Some("Please enter a valid email address")
    } else {
        None
    }
}

pub fn validate_role(role: &str) -> Result<WaitlistRole, FieldErrors> {
    let mut errors = FieldErrors::new();
    if role.trim().is_empty() {
        errors.set(Field::Role, "Please select a role");
        return Err(errors);
    }
    role.trim().parse::<WaitlistRole>().map_err(|e| {
        errors.set(Field::Role, e.to_string());
        errors
    })
}

pub fn validate_interests(skills: &[String], clubs: &[String], goals: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    check_selection(&mut errors, Field::Skills, skills, &SKILL_CATALOG, "skill");
    check_selection(&mut errors, Field::Clubs, clubs, &CLUB_CATALOG, "club");

    if goals.trim().is_empty() {
        errors.set(Field::Goals, "Please tell us about your goals");
    }

    errors
}

/// Convenience over `validate_interests` for the step-3 payload type.
pub fn validate_interests_payload(interests: &Interests) -> FieldErrors {
    validate_interests(&interests.skills, &interests.clubs, &interests.goals)
}

fn check_selection(errors: &mut FieldErrors, field: Field, selected: &[String], catalog: &[&str], noun: &str) {
    if selected.is_empty() {
        errors.set(field, format!("Please select at least one {noun}"));
        return;
    }
    if let Some(unknown) = selected.iter().find(|s| !catalog.contains(&s.as_str())) {
        errors.set(field, format!("Unknown {noun}: {unknown}"));
    }
}

pub fn validate_profile(links: &ProfileLinks, resume: Option<&ResumeFile>) -> FieldErrors {
    let mut errors = FieldErrors::new();

    check_profile_url(
        &mut errors,
        Field::LinkedinProfile,
        &links.linkedin_profile,
        "linkedin.com",
        "LinkedIn",
    );
    check_profile_url(
        &mut errors,
        Field::GithubProfile,
        &links.github_profile,
        "github.com",
        "GitHub",
    );

    let website = links.personal_website.trim();
    if !website.is_empty() && !website_pattern().is_match(website) {
        errors.set(Field::PersonalWebsite, "Please enter a valid website URL");
    }

    match resume {
        None => errors.set(Field::Resume, "Please upload your resume"),
        Some(file) => {
            if let Err(message) = check_resume_file(file) {
                errors.set(Field::Resume, message);
            }
        }
    }

    errors
}

fn check_profile_url(errors: &mut FieldErrors, field: Field, value: &str, host: &str, label: &str) {
    if value.trim().is_empty() {
        errors.set(field, format!("{label} profile is required"));
    } else if !value.contains(host) {
        errors.set(field, format!("Please enter a valid {label} URL"));
    }
}

/// Size and declared-type rules for a resume, checked when the file is
/// attached and again before it is saved.
pub fn check_resume_file(file: &ResumeFile) -> Result<(), String> {
    if file.size() > MAX_RESUME_BYTES {
        return Err("Please upload a file smaller than 5MB.".to_string());
    }
    if !file.has_accepted_type() {
        return Err("Please upload a PDF or Word document.".to_string());
    }
    Ok(())
}

fn website_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://.+\..+$").expect("website pattern is valid"))
}
