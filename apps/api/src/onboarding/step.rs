use serde::{Deserialize, Serialize};

use crate::onboarding::form::Field;

/// Linear onboarding progression: Identity → Role → Interests → Profile →
/// Complete. No skipping, no branching by role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Identity,
    Role,
    Interests,
    Profile,
    Complete,
}

impl Step {
    /// 1-based step number, matching the stored `currentStep`. `Complete` is 5.
    pub fn number(&self) -> u8 {
        match self {
            Step::Identity => 1,
            Step::Role => 2,
            Step::Interests => 3,
            Step::Profile => 4,
            Step::Complete => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Step::Identity),
            2 => Some(Step::Role),
            3 => Some(Step::Interests),
            4 => Some(Step::Profile),
            5 => Some(Step::Complete),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Complete)
    }

    /// Fields this step collects and validates.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Step::Identity => &[Field::Name, Field::Email],
            Step::Role => &[Field::Role],
            Step::Interests => &[Field::Skills, Field::Clubs, Field::Goals],
            Step::Profile => &[
                Field::LinkedinProfile,
                Field::GithubProfile,
                Field::PersonalWebsite,
                Field::Resume,
            ],
            Step::Complete => &[],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Identity => "Let's get to know you",
            Step::Role => "What's your role?",
            Step::Interests => "Customize your experience",
            Step::Profile => "Complete Your Professional Profile",
            Step::Complete => "Welcome aboard!",
        }
    }
}

/// Which flow is being run. The short flow ends after interests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowVariant {
    #[default]
    Full,
    Short,
}

impl FlowVariant {
    pub fn last_step(&self) -> Step {
        match self {
            FlowVariant::Full => Step::Profile,
            FlowVariant::Short => Step::Interests,
        }
    }

    pub fn step_count(&self) -> u8 {
        self.last_step().number()
    }

    /// The step that follows a successful save of `step`.
    pub fn after(&self, step: Step) -> Step {
        if step >= self.last_step() {
            Step::Complete
        } else {
            step.next().unwrap_or(Step::Complete)
        }
    }
}

/// What a client needs to render the current step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub step: Step,
    pub title: &'static str,
    /// "Step N of M"; absent once complete.
    pub position: Option<String>,
    pub progress_percent: u8,
    pub can_submit: bool,
}

impl StepView {
    pub fn new(step: Step, variant: FlowVariant, submitting: bool) -> Self {
        let total = variant.step_count();
        let (position, progress_percent) = if step.is_terminal() {
            (None, 100)
        } else {
            let n = step.number();
            let pct = ((f64::from(n) / f64::from(total)) * 100.0).round() as u8;
            (Some(format!("Step {n} of {total}")), pct)
        };
        Self {
            step,
            title: step.title(),
            position,
            progress_percent,
            can_submit: !submitting && !step.is_terminal(),
        }
    }
}
