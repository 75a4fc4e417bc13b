use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Every input the waitlist form collects. Errors are keyed by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Role,
    Skills,
    Clubs,
    Goals,
    LinkedinProfile,
    GithubProfile,
    PersonalWebsite,
    Resume,
    /// Account sign-up only.
    Password,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Role => "role",
            Field::Skills => "skills",
            Field::Clubs => "clubs",
            Field::Goals => "goals",
            Field::LinkedinProfile => "linkedinProfile",
            Field::GithubProfile => "githubProfile",
            Field::PersonalWebsite => "personalWebsite",
            Field::Resume => "resume",
            Field::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-scoped error messages. Each field's message is set and cleared
/// independently of the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    /// Replaces this map's entries for `fields` with those from `other`,
    /// leaving errors on every other field untouched.
    pub fn replace_for(&mut self, fields: &[Field], other: FieldErrors) {
        for field in fields {
            self.0.remove(field);
        }
        self.0.extend(other.0);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Everything the user has entered so far, across all steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistForm {
    pub name: String,
    pub email: String,
    /// Raw role id; parsed into a `WaitlistRole` by validation.
    pub role: String,
    pub skills: Vec<String>,
    pub clubs: Vec<String>,
    pub goals: String,
    pub linkedin_profile: String,
    pub github_profile: String,
    pub personal_website: String,
}

impl WaitlistForm {
    /// Sets a text field. Returns false for list fields and the resume,
    /// which have their own editing operations, and for fields the form
    /// does not carry.
    pub fn set_text(&mut self, field: Field, value: String) -> bool {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Role => &mut self.role,
            Field::Goals => &mut self.goals,
            Field::LinkedinProfile => &mut self.linkedin_profile,
            Field::GithubProfile => &mut self.github_profile,
            Field::PersonalWebsite => &mut self.personal_website,
            Field::Skills | Field::Clubs | Field::Resume | Field::Password => return false,
        };
        *slot = value;
        true
    }

    /// Adds `value` to the skills or clubs selection, or removes it if it is
    /// already selected.
    pub fn toggle(&mut self, field: Field, value: &str) -> bool {
        let list = match field {
            Field::Skills => &mut self.skills,
            Field::Clubs => &mut self.clubs,
            _ => return false,
        };
        if let Some(pos) = list.iter().position(|v| v == value) {
            list.remove(pos);
        } else {
            list.push(value.to_string());
        }
        true
    }
}
