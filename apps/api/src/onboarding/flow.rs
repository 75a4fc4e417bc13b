//! The onboarding state machine.
//!
//! The flow owns the current step, the accumulated form and the waitlist id
//! handed back by step 1. It never performs I/O on its own: `begin_submit`
//! validates and produces a `Submission`, the caller dispatches it against a
//! `WaitlistGateway`, and `finish_submit` applies the outcome. `submit` runs
//! all three for callers that just want to await the save.
//!
//! A step only advances when both validation and the gateway call succeed.
//! Only one submission can be in flight at a time.

use thiserror::Error;
use uuid::Uuid;

use crate::models::catalog::WaitlistRole;
use crate::models::waitlist::{Interests, ProfileLinks};
use crate::onboarding::form::{Field, FieldErrors, WaitlistForm};
use crate::onboarding::step::{FlowVariant, Step, StepView};
use crate::onboarding::validation::{check_resume_file, validate_role, validate_step};
use crate::upload::ResumeFile;
use crate::waitlist::gateway::{GatewayError, ProfileSaved, WaitlistGateway};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("Onboarding is already complete")]
    Complete,

    #[error("A submission is already in progress")]
    InFlight,

    #[error("No submission is in progress")]
    NoSubmissionInFlight,

    #[error("Please fix the highlighted fields")]
    Invalid(FieldErrors),

    #[error("Step 1 has not been saved yet")]
    MissingWaitlistId,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// The gateway call for one step, built from validated input.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Identity {
        name: String,
        email: String,
    },
    Role {
        id: Uuid,
        role: WaitlistRole,
    },
    Interests {
        id: Uuid,
        interests: Interests,
    },
    Profile {
        id: Uuid,
        links: ProfileLinks,
        resume: Option<ResumeFile>,
    },
}

/// What a successful gateway call returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Uuid),
    Saved,
    Profile(ProfileSaved),
}

impl Submission {
    pub fn step(&self) -> Step {
        match self {
            Submission::Identity { .. } => Step::Identity,
            Submission::Role { .. } => Step::Role,
            Submission::Interests { .. } => Step::Interests,
            Submission::Profile { .. } => Step::Profile,
        }
    }

    pub async fn dispatch<G>(&self, gateway: &G) -> Result<SubmitOutcome, GatewayError>
    where
        G: WaitlistGateway + ?Sized,
    {
        match self {
            Submission::Identity { name, email } => gateway
                .create_entry_step1(name, email)
                .await
                .map(SubmitOutcome::Created),
            Submission::Role { id, role } => gateway
                .update_entry_step2(*id, *role)
                .await
                .map(|_| SubmitOutcome::Saved),
            Submission::Interests { id, interests } => gateway
                .update_entry_step3(*id, interests)
                .await
                .map(|_| SubmitOutcome::Saved),
            Submission::Profile { id, links, resume } => gateway
                .update_entry_step4(*id, links, resume.as_ref())
                .await
                .map(SubmitOutcome::Profile),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OnboardingFlow {
    step: Step,
    variant: FlowVariant,
    waitlist_id: Option<Uuid>,
    form: WaitlistForm,
    resume: Option<ResumeFile>,
    errors: FieldErrors,
    /// Non-field message: rejected attachments and gateway failures.
    notice: Option<String>,
    in_flight: bool,
    resume_url: Option<String>,
}

impl OnboardingFlow {
    pub fn new(variant: FlowVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn variant(&self) -> FlowVariant {
        self.variant
    }

    pub fn waitlist_id(&self) -> Option<Uuid> {
        self.waitlist_id
    }

    pub fn form(&self) -> &WaitlistForm {
        &self.form
    }

    pub fn resume(&self) -> Option<&ResumeFile> {
        self.resume.as_ref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn is_complete(&self) -> bool {
        self.step.is_terminal()
    }

    /// URL of the stored resume once the profile step has been saved.
    pub fn resume_url(&self) -> Option<&str> {
        self.resume_url.as_deref()
    }

    pub fn view(&self) -> StepView {
        StepView::new(self.step, self.variant, self.in_flight)
    }

    /// Edits a text field and clears that field's error only.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.is_complete() || !self.form.set_text(field, value.into()) {
            return false;
        }
        self.errors.clear(field);
        true
    }

    pub fn toggle_skill(&mut self, label: &str) -> bool {
        self.toggle(Field::Skills, label)
    }

    pub fn toggle_club(&mut self, label: &str) -> bool {
        self.toggle(Field::Clubs, label)
    }

    fn toggle(&mut self, field: Field, label: &str) -> bool {
        if self.is_complete() || !self.form.toggle(field, label) {
            return false;
        }
        self.errors.clear(field);
        true
    }

    /// Attaches a resume if it passes the size and type rules. A rejected
    /// file is not kept and the reason becomes the notice.
    pub fn attach_resume(&mut self, file: ResumeFile) -> Result<(), String> {
        if self.is_complete() {
            return Err(FlowError::Complete.to_string());
        }
        if let Err(message) = check_resume_file(&file) {
            self.notice = Some(message.clone());
            return Err(message);
        }
        self.resume = Some(file);
        self.errors.clear(Field::Resume);
        Ok(())
    }

    pub fn remove_resume(&mut self) -> Option<ResumeFile> {
        if self.is_complete() {
            return None;
        }
        self.resume.take()
    }

    /// Validates the current step and, if it passes, marks a submission in
    /// flight and returns the gateway call to make.
    pub fn begin_submit(&mut self) -> Result<Submission, FlowError> {
        if self.is_complete() {
            return Err(FlowError::Complete);
        }
        if self.in_flight {
            return Err(FlowError::InFlight);
        }

        let result = validate_step(self.step, &self.form, self.resume.as_ref());
        self.errors.replace_for(self.step.fields(), result.errors.clone());
        if !result.valid {
            return Err(FlowError::Invalid(result.errors));
        }

        let submission = match self.step {
            Step::Identity => Submission::Identity {
                name: self.form.name.trim().to_string(),
                email: self.form.email.trim().to_string(),
            },
            Step::Role => Submission::Role {
                id: self.require_id()?,
                role: validate_role(&self.form.role).map_err(FlowError::Invalid)?,
            },
            Step::Interests => Submission::Interests {
                id: self.require_id()?,
                interests: Interests {
                    skills: self.form.skills.clone(),
                    clubs: self.form.clubs.clone(),
                    goals: self.form.goals.trim().to_string(),
                },
            },
            Step::Profile => Submission::Profile {
                id: self.require_id()?,
                links: ProfileLinks {
                    linkedin_profile: self.form.linkedin_profile.trim().to_string(),
                    github_profile: self.form.github_profile.trim().to_string(),
                    personal_website: self.form.personal_website.trim().to_string(),
                },
                resume: self.resume.clone(),
            },
            Step::Complete => return Err(FlowError::Complete),
        };

        self.in_flight = true;
        self.notice = None;
        Ok(submission)
    }

    fn require_id(&self) -> Result<Uuid, FlowError> {
        self.waitlist_id.ok_or(FlowError::MissingWaitlistId)
    }

    /// Applies the result of the in-flight submission. On success the flow
    /// advances and the new step is returned; on failure it stays put with
    /// the form intact so the user can edit and resubmit.
    pub fn finish_submit(
        &mut self,
        outcome: Result<SubmitOutcome, GatewayError>,
    ) -> Result<Step, FlowError> {
        if !self.in_flight {
            return Err(FlowError::NoSubmissionInFlight);
        }
        self.in_flight = false;

        match outcome {
            Ok(outcome) => {
                match outcome {
                    SubmitOutcome::Created(id) => {
                        self.waitlist_id.get_or_insert(id);
                    }
                    SubmitOutcome::Profile(saved) => {
                        self.resume_url = Some(saved.resume_url).filter(|u| !u.is_empty());
                    }
                    SubmitOutcome::Saved => {}
                }
                self.notice = None;
                self.step = self.variant.after(self.step);
                Ok(self.step)
            }
            Err(err) => {
                match &err {
                    GatewayError::Invalid(errors) => {
                        self.errors.replace_for(self.step.fields(), errors.clone());
                    }
                    e => match e.field() {
                        Some(field) => self.errors.set(field, e.to_string()),
                        None => self.notice = Some(e.to_string()),
                    },
                }
                Err(FlowError::Gateway(err))
            }
        }
    }

    /// Validates, saves and advances the current step.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<Step, FlowError>
    where
        G: WaitlistGateway + ?Sized,
    {
        let submission = self.begin_submit()?;
        let outcome = submission.dispatch(gateway).await;
        self.finish_submit(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryWaitlistGateway;
    use crate::upload::{MAX_RESUME_BYTES, PDF_MIME};
    use crate::waitlist::gateway::DUPLICATE_EMAIL_MESSAGE;

    fn pdf() -> ResumeFile {
        ResumeFile::new("cv.pdf", PDF_MIME, b"%PDF-1.4".to_vec())
    }

    fn fill_identity(flow: &mut OnboardingFlow, email: &str) {
        flow.set_field(Field::Name, "Ada Lovelace");
        flow.set_field(Field::Email, email);
    }

    fn fill_interests(flow: &mut OnboardingFlow) {
        flow.toggle_skill("AI/ML");
        flow.toggle_club("Startups");
        flow.set_field(Field::Goals, "Build things");
    }

    #[tokio::test]
    async fn test_full_flow_reaches_complete() {
        let gateway = InMemoryWaitlistGateway::default();
        let mut flow = OnboardingFlow::new(FlowVariant::Full);

        fill_identity(&mut flow, "ada@example.com");
        assert_eq!(flow.submit(&gateway).await, Ok(Step::Role));
        let id = flow.waitlist_id().unwrap();

        flow.set_field(Field::Role, "learner");
        assert_eq!(flow.submit(&gateway).await, Ok(Step::Interests));

        fill_interests(&mut flow);
        assert_eq!(flow.submit(&gateway).await, Ok(Step::Profile));

        flow.set_field(Field::LinkedinProfile, "https://linkedin.com/in/ada");
        flow.set_field(Field::GithubProfile, "https://github.com/ada");
        flow.attach_resume(pdf()).unwrap();
        assert_eq!(flow.submit(&gateway).await, Ok(Step::Complete));

        assert!(flow.is_complete());
        assert_eq!(flow.waitlist_id(), Some(id));
        assert!(flow.resume_url().unwrap().contains(&id.to_string()));
        let entry = gateway.entry(id).unwrap();
        assert_eq!(entry.status, "completed");
        assert_eq!(entry.current_step, 4);
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_step_and_id() {
        let gateway = InMemoryWaitlistGateway::default();
        let mut flow = OnboardingFlow::default();
        fill_identity(&mut flow, "ada@example.com");
        flow.submit(&gateway).await.unwrap();
        let id = flow.waitlist_id();

        flow.set_field(Field::Role, "mentor");
        gateway.fail_next(GatewayError::Backend("network down".to_string()));
        let result = flow.submit(&gateway).await;

        assert_eq!(
            result,
            Err(FlowError::Gateway(GatewayError::Backend("network down".to_string())))
        );
        assert_eq!(flow.step(), Step::Role);
        assert_eq!(flow.waitlist_id(), id);
        assert_eq!(flow.notice(), Some("network down"));
        assert!(flow.errors().is_empty());
        assert!(!flow.is_submitting());

        // User-initiated retry with the same input.
        assert_eq!(flow.submit(&gateway).await, Ok(Step::Interests));
        assert_eq!(flow.notice(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_becomes_email_error() {
        let gateway = InMemoryWaitlistGateway::default();
        let mut first = OnboardingFlow::default();
        fill_identity(&mut first, "ada@example.com");
        first.submit(&gateway).await.unwrap();

        let mut second = OnboardingFlow::default();
        fill_identity(&mut second, "ada@example.com");
        let result = second.submit(&gateway).await;

        assert_eq!(result, Err(FlowError::Gateway(GatewayError::DuplicateEmail)));
        assert_eq!(second.step(), Step::Identity);
        assert_eq!(second.waitlist_id(), None);
        assert_eq!(second.errors().get(Field::Email), Some(DUPLICATE_EMAIL_MESSAGE));
        assert_eq!(second.notice(), None);
        assert_eq!(gateway.len(), 1);

        // Editing the email clears only that error.
        second.set_field(Field::Email, "ada2@example.com");
        assert!(second.errors().is_empty());
        assert_eq!(second.submit(&gateway).await, Ok(Step::Role));
    }

    #[test]
    fn test_second_begin_while_in_flight_is_refused() {
        let mut flow = OnboardingFlow::default();
        fill_identity(&mut flow, "ada@example.com");

        let submission = flow.begin_submit().unwrap();
        assert_eq!(submission.step(), Step::Identity);
        assert!(!flow.view().can_submit);
        assert_eq!(flow.begin_submit(), Err(FlowError::InFlight));

        assert_eq!(flow.finish_submit(Ok(SubmitOutcome::Created(Uuid::new_v4()))), Ok(Step::Role));
        assert_eq!(
            flow.finish_submit(Ok(SubmitOutcome::Saved)),
            Err(FlowError::NoSubmissionInFlight)
        );
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_gateway() {
        let gateway = InMemoryWaitlistGateway::default();
        let mut flow = OnboardingFlow::default();
        flow.set_field(Field::Name, "A");
        flow.set_field(Field::Email, "not-an-email");

        let result = flow.submit(&gateway).await;

        match result {
            Err(FlowError::Invalid(errors)) => {
                assert!(errors.contains(Field::Name));
                assert!(errors.contains(Field::Email));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(gateway.calls(), 0);
        assert!(!flow.is_submitting());
        assert_eq!(flow.step(), Step::Identity);
    }

    #[tokio::test]
    async fn test_editing_one_field_keeps_other_errors() {
        let gateway = InMemoryWaitlistGateway::default();
        let mut flow = OnboardingFlow::default();
        let _ = flow.submit(&gateway).await;
        assert!(flow.errors().contains(Field::Name));
        assert!(flow.errors().contains(Field::Email));

        flow.set_field(Field::Name, "Ada");
        assert!(!flow.errors().contains(Field::Name));
        assert!(flow.errors().contains(Field::Email));
    }

    #[tokio::test]
    async fn test_short_variant_completes_after_interests() {
        let gateway = InMemoryWaitlistGateway::default();
        let mut flow = OnboardingFlow::new(FlowVariant::Short);
        fill_identity(&mut flow, "ada@example.com");
        flow.submit(&gateway).await.unwrap();
        flow.set_field(Field::Role, "student");
        flow.submit(&gateway).await.unwrap();
        fill_interests(&mut flow);

        assert_eq!(flow.submit(&gateway).await, Ok(Step::Complete));
        let entry = gateway.entry(flow.waitlist_id().unwrap()).unwrap();
        assert_eq!(entry.current_step, 3);
    }

    #[tokio::test]
    async fn test_complete_flow_refuses_further_changes() {
        let gateway = InMemoryWaitlistGateway::default();
        let mut flow = OnboardingFlow::new(FlowVariant::Short);
        fill_identity(&mut flow, "ada@example.com");
        flow.submit(&gateway).await.unwrap();
        flow.set_field(Field::Role, "partner");
        flow.submit(&gateway).await.unwrap();
        fill_interests(&mut flow);
        flow.submit(&gateway).await.unwrap();
        let calls = gateway.calls();

        assert_eq!(flow.submit(&gateway).await, Err(FlowError::Complete));
        assert!(!flow.set_field(Field::Goals, "something else"));
        assert!(!flow.toggle_skill("Design"));
        assert_eq!(flow.form().goals, "Build things");
        assert_eq!(gateway.calls(), calls);
        assert_eq!(flow.view().progress_percent, 100);
    }

    #[test]
    fn test_rejected_attachment_sets_notice_and_is_not_kept() {
        let mut flow = OnboardingFlow::default();
        let big = ResumeFile::new("cv.pdf", PDF_MIME, vec![0u8; MAX_RESUME_BYTES + 1]);
        assert!(flow.attach_resume(big).is_err());
        assert_eq!(flow.notice(), Some("Please upload a file smaller than 5MB."));
        assert!(flow.resume().is_none());

        let txt = ResumeFile::new("cv.txt", "text/plain", b"hello".to_vec());
        assert!(flow.attach_resume(txt).is_err());
        assert_eq!(flow.notice(), Some("Please upload a PDF or Word document."));

        flow.attach_resume(pdf()).unwrap();
        assert_eq!(flow.remove_resume(), Some(pdf()));
        assert!(flow.resume().is_none());
    }
}
