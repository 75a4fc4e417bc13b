//! In-memory stand-ins for every backend in `AppState`, and a builder that
//! wires them into a state the real router can serve.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::auth::accounts::{AccountError, AccountStore, NewAccount};
use crate::auth::session::{Session, SessionError, SessionStore};
use crate::intake::generator::{GenerationError, ProfileGenerator, UserInfo};
use crate::intake::store::ProfileStore;
use crate::models::account::AccountRow;
use crate::models::catalog::WaitlistRole;
use crate::models::waitlist::{Interests, ProfileLinks, WaitlistEntry, WaitlistStatus};
use crate::state::AppState;
use crate::storage::{BlobStore, StorageError, StoredBlob};
use crate::upload::ResumeFile;
use crate::waitlist::gateway::{ensure_step_order, GatewayError, ProfileSaved, WaitlistGateway};
use crate::waitlist::repository::store_profile_with_resume;

#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, Bytes>>,
    deleted: Mutex<Vec<String>>,
    fail_puts: bool,
}

impl InMemoryBlobStore {
    /// Rejects every upload.
    pub fn failing() -> Self {
        Self {
            fail_puts: true,
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, _content_type: &str) -> Result<StoredBlob, StorageError> {
        if self.fail_puts {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "bucket unavailable".to_string(),
            });
        }
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(StoredBlob {
            key: key.to_string(),
            url: format!("memory://{key}"),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// Same ordering and duplicate rules as the Postgres gateway. Queued
/// failures are returned by the next calls instead of touching state.
#[derive(Default)]
pub struct InMemoryWaitlistGateway {
    entries: Mutex<HashMap<Uuid, WaitlistEntry>>,
    blobs: InMemoryBlobStore,
    failures: Mutex<VecDeque<GatewayError>>,
    calls: AtomicUsize,
}

impl InMemoryWaitlistGateway {
    pub fn fail_next(&self, err: GatewayError) {
        self.failures.lock().unwrap().push_back(err);
    }

    /// Number of gateway operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn entry(&self, id: Uuid) -> Option<WaitlistEntry> {
        self.entries.lock().unwrap().get(&id).cloned()
    }

    fn enter(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn update(&self, id: Uuid, step: u8, apply: impl FnOnce(&mut WaitlistEntry)) -> Result<(), GatewayError> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(&id).ok_or(GatewayError::NotFound(id))?;
        ensure_step_order(entry.current_step, step)?;
        apply(entry);
        if entry.current_step < i32::from(step) {
            entry.current_step = i32::from(step);
            if let Some(status) = WaitlistStatus::after_step(step) {
                entry.status = status.as_str().to_string();
            }
        }
        entry.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl WaitlistGateway for InMemoryWaitlistGateway {
    async fn check_email_exists(&self, email: &str) -> Result<bool, GatewayError> {
        self.enter()?;
        Ok(self.entries.lock().unwrap().values().any(|e| e.email == email))
    }

    async fn create_entry_step1(&self, name: &str, email: &str) -> Result<Uuid, GatewayError> {
        self.enter()?;
        let mut entries = self.entries.lock().unwrap();
        if entries.values().any(|e| e.email == email) {
            return Err(GatewayError::DuplicateEmail);
        }
        let now = Utc::now();
        let id = Uuid::new_v4();
        entries.insert(
            id,
            WaitlistEntry {
                id,
                name: name.to_string(),
                email: email.to_string(),
                role: None,
                skills: Vec::new(),
                clubs: Vec::new(),
                goals: None,
                linkedin_profile: None,
                github_profile: None,
                personal_website: None,
                resume_file_name: None,
                resume_url: None,
                resume_uploaded_at: None,
                status: WaitlistStatus::Step1Completed.as_str().to_string(),
                current_step: 1,
                created_at: now,
                updated_at: now,
                completed_at: None,
            },
        );
        Ok(id)
    }

    async fn update_entry_step2(&self, id: Uuid, role: WaitlistRole) -> Result<(), GatewayError> {
        self.enter()?;
        self.update(id, 2, |e| e.role = Some(role.as_str().to_string()))
    }

    async fn update_entry_step3(&self, id: Uuid, interests: &Interests) -> Result<(), GatewayError> {
        self.enter()?;
        self.update(id, 3, |e| {
            e.skills = interests.skills.clone();
            e.clubs = interests.clubs.clone();
            e.goals = Some(interests.goals.clone());
        })
    }

    async fn update_entry_step4(
        &self,
        id: Uuid,
        links: &ProfileLinks,
        resume: Option<&ResumeFile>,
    ) -> Result<ProfileSaved, GatewayError> {
        self.enter()?;
        {
            let entries = self.entries.lock().unwrap();
            let entry = entries.get(&id).ok_or(GatewayError::NotFound(id))?;
            ensure_step_order(entry.current_step, 4)?;
        }

        store_profile_with_resume(&self.blobs, id, resume, |resume_url, resume_file_name| {
            let outcome = self.update(id, 4, |e| {
                let now = Utc::now();
                e.linkedin_profile = Some(links.linkedin_profile.clone());
                e.github_profile = Some(links.github_profile.clone());
                e.personal_website = Some(links.personal_website.clone());
                e.resume_file_name = Some(resume_file_name).filter(|n| !n.is_empty());
                e.resume_uploaded_at = resume.map(|_| now);
                e.resume_url = Some(resume_url);
                e.completed_at.get_or_insert(now);
            });
            std::future::ready(outcome)
        })
        .await
    }

    async fn get_entry(&self, id: Uuid) -> Result<WaitlistEntry, GatewayError> {
        self.enter()?;
        self.entry(id).ok_or(GatewayError::NotFound(id))
    }
}

/// Records every text it is asked to generate from.
pub struct FakeGenerator {
    response: Result<Map<String, Value>, String>,
    texts: Mutex<Vec<String>>,
}

impl Default for FakeGenerator {
    fn default() -> Self {
        let mut profile = Map::new();
        profile.insert("summary".to_string(), json!("generated"));
        Self {
            response: Ok(profile),
            texts: Mutex::new(Vec::new()),
        }
    }
}

impl FakeGenerator {
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileGenerator for FakeGenerator {
    async fn generate_profile(&self, text: &str, _user: &UserInfo) -> Result<Map<String, Value>, GenerationError> {
        self.texts.lock().unwrap().push(text.to_string());
        self.response.clone().map_err(|message| GenerationError::Api {
            status: 429,
            message,
        })
    }
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    records: Mutex<HashMap<Uuid, Map<String, Value>>>,
    deleted: AtomicUsize,
}

impl InMemoryProfileStore {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn deleted(&self) -> usize {
        self.deleted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn save_profile(&self, id: Uuid, record: &Map<String, Value>) -> Result<(), sqlx::Error> {
        self.records.lock().unwrap().insert(id, record.clone());
        Ok(())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<(), sqlx::Error> {
        if self.records.lock().unwrap().remove(&id).is_some() {
            self.deleted.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<String, AccountRow>>,
}

impl InMemoryAccountStore {
    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn last_login(&self, email: &str) -> Option<DateTime<Utc>> {
        self.accounts.lock().unwrap().get(email).map(|a| a.last_login)
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<AccountRow, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&account.email) {
            return Err(AccountError::EmailInUse);
        }
        let now = Utc::now();
        let row = AccountRow {
            id: Uuid::new_v4(),
            email: account.email.clone(),
            password_hash: account.password_hash,
            name: account.name,
            role: account.role,
            created_at: now,
            last_login: now,
        };
        accounts.insert(account.email, row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRow>, AccountError> {
        Ok(self.accounts.lock().unwrap().get(email).cloned())
    }

    async fn record_login(&self, id: Uuid) -> Result<AccountRow, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        let row = accounts
            .values_mut()
            .find(|a| a.id == id)
            .ok_or(AccountError::Database(sqlx::Error::RowNotFound))?;
        row.last_login = Utc::now();
        Ok(row.clone())
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> Result<String, SessionError> {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.lock().unwrap().insert(token.clone(), session.clone());
        Ok(token)
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }
}

/// Every backend defaults to a fresh in-memory fake.
pub struct TestAppStateBuilder {
    waitlist: Arc<dyn WaitlistGateway>,
    blobs: Arc<dyn BlobStore>,
    generator: Arc<dyn ProfileGenerator>,
    profiles: Arc<dyn ProfileStore>,
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            waitlist: Arc::new(InMemoryWaitlistGateway::default()),
            blobs: Arc::new(InMemoryBlobStore::default()),
            generator: Arc::new(FakeGenerator::default()),
            profiles: Arc::new(InMemoryProfileStore::default()),
            accounts: Arc::new(InMemoryAccountStore::default()),
            sessions: Arc::new(InMemorySessionStore::default()),
        }
    }

    pub fn with_waitlist(mut self, waitlist: Arc<InMemoryWaitlistGateway>) -> Self {
        self.waitlist = waitlist;
        self
    }

    pub fn with_blobs(mut self, blobs: Arc<InMemoryBlobStore>) -> Self {
        self.blobs = blobs;
        self
    }

    pub fn with_generator(mut self, generator: Arc<FakeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_profiles(mut self, profiles: Arc<InMemoryProfileStore>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_accounts(mut self, accounts: Arc<InMemoryAccountStore>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn build(self) -> AppState {
        AppState {
            waitlist: self.waitlist,
            blobs: self.blobs,
            generator: self.generator,
            profiles: self.profiles,
            accounts: self.accounts,
            sessions: self.sessions,
        }
    }
}
