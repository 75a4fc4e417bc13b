use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::models::catalog::WaitlistRole;
use crate::models::waitlist::{Interests, ProfileLinks, WaitlistEntry, WaitlistStatus};
use crate::storage::{resume_object_key, BlobStore};
use crate::upload::ResumeFile;
use crate::waitlist::gateway::{ensure_step_order, GatewayError, ProfileSaved, WaitlistGateway};

/// Postgres-backed gateway. Resumes go to the blob store.
pub struct PgWaitlistGateway {
    pool: PgPool,
    blobs: Arc<dyn BlobStore>,
}

impl PgWaitlistGateway {
    pub fn new(pool: PgPool, blobs: Arc<dyn BlobStore>) -> Self {
        Self { pool, blobs }
    }

    /// Looks up the entry's progress and checks `step` may be saved next.
    async fn ready_for(&self, id: Uuid, step: u8) -> Result<(), GatewayError> {
        let current: Option<i32> = sqlx::query_scalar("SELECT current_step FROM waitlist WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend("load waitlist progress", e))?;
        let current = current.ok_or(GatewayError::NotFound(id))?;
        ensure_step_order(current, step)
    }
}

fn backend(action: &str, e: sqlx::Error) -> GatewayError {
    error!("Failed to {action}: {e}");
    GatewayError::Backend(format!("Failed to {action}"))
}

fn status_after(step: u8) -> &'static str {
    WaitlistStatus::after_step(step)
        .map(|s| s.as_str())
        .unwrap_or("completed")
}

/// Uploads the resume (if any) under the entry's prefix, then runs `write`
/// with the resulting URL and file name. Both are empty without a resume.
///
/// When `write` fails the uploaded blob is deleted before the error is
/// returned; a retry uploads again under a fresh timestamped key.
pub async fn store_profile_with_resume<F, Fut>(
    blobs: &dyn BlobStore,
    id: Uuid,
    resume: Option<&ResumeFile>,
    write: F,
) -> Result<ProfileSaved, GatewayError>
where
    F: FnOnce(String, String) -> Fut,
    Fut: Future<Output = Result<(), GatewayError>>,
{
    let stored = match resume {
        Some(file) => {
            let key = resume_object_key(&id.to_string(), Utc::now().timestamp_millis(), &file.file_name);
            let blob = blobs
                .put(&key, file.bytes.clone(), &file.content_type)
                .await
                .map_err(|e| {
                    error!("Resume upload for waitlist entry {id} failed: {e}");
                    GatewayError::Backend("Failed to upload resume".to_string())
                })?;
            Some(blob)
        }
        None => None,
    };

    let resume_url = stored.as_ref().map(|b| b.url.clone()).unwrap_or_default();
    let resume_file_name = resume.map(|f| f.file_name.clone()).unwrap_or_default();

    if let Err(e) = write(resume_url.clone(), resume_file_name).await {
        if let Some(blob) = &stored {
            if let Err(cleanup) = blobs.delete(&blob.key).await {
                warn!("Orphaned resume {} left in storage: {cleanup}", blob.key);
            }
        }
        return Err(e);
    }

    Ok(ProfileSaved { resume_url })
}

#[async_trait]
impl WaitlistGateway for PgWaitlistGateway {
    async fn check_email_exists(&self, email: &str) -> Result<bool, GatewayError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM waitlist WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| backend("check waitlist email", e))
    }

    async fn create_entry_step1(&self, name: &str, email: &str) -> Result<Uuid, GatewayError> {
        if self.check_email_exists(email).await? {
            return Err(GatewayError::DuplicateEmail);
        }

        let id = Uuid::new_v4();
        let result = sqlx::query(
            r#"
            INSERT INTO waitlist (id, name, email, status, current_step, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 1, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(status_after(1))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("Created waitlist entry {id}");
                Ok(id)
            }
            // Lost a race with another create for the same email.
            Err(e) if is_unique_violation(&e) => Err(GatewayError::DuplicateEmail),
            Err(e) => Err(backend("create waitlist entry", e)),
        }
    }

    async fn update_entry_step2(&self, id: Uuid, role: WaitlistRole) -> Result<(), GatewayError> {
        self.ready_for(id, 2).await?;

        sqlx::query(
            r#"
            UPDATE waitlist SET
                role = $2,
                status = CASE WHEN current_step >= 2 THEN status ELSE $3 END,
                current_step = GREATEST(current_step, 2),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .bind(status_after(2))
        .execute(&self.pool)
        .await
        .map_err(|e| backend("save waitlist role", e))?;

        info!("Saved role for waitlist entry {id}");
        Ok(())
    }

    async fn update_entry_step3(&self, id: Uuid, interests: &Interests) -> Result<(), GatewayError> {
        self.ready_for(id, 3).await?;

        sqlx::query(
            r#"
            UPDATE waitlist SET
                skills = $2,
                clubs = $3,
                goals = $4,
                status = CASE WHEN current_step >= 3 THEN status ELSE $5 END,
                current_step = GREATEST(current_step, 3),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&interests.skills)
        .bind(&interests.clubs)
        .bind(&interests.goals)
        .bind(status_after(3))
        .execute(&self.pool)
        .await
        .map_err(|e| backend("save waitlist interests", e))?;

        info!("Saved interests for waitlist entry {id}");
        Ok(())
    }

    async fn update_entry_step4(
        &self,
        id: Uuid,
        links: &ProfileLinks,
        resume: Option<&ResumeFile>,
    ) -> Result<ProfileSaved, GatewayError> {
        self.ready_for(id, 4).await?;

        let pool = &self.pool;
        let saved = store_profile_with_resume(self.blobs.as_ref(), id, resume, |resume_url, resume_file_name| async move {
            sqlx::query(
                r#"
                UPDATE waitlist SET
                    linkedin_profile = $2,
                    github_profile = $3,
                    personal_website = $4,
                    resume_url = $5,
                    resume_file_name = $6,
                    resume_uploaded_at = CASE WHEN $5 = '' THEN NULL ELSE NOW() END,
                    status = $7,
                    current_step = 4,
                    updated_at = NOW(),
                    completed_at = COALESCE(completed_at, NOW())
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(&links.linkedin_profile)
            .bind(&links.github_profile)
            .bind(&links.personal_website)
            .bind(&resume_url)
            .bind(&resume_file_name)
            .bind(status_after(4))
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| backend("save waitlist profile", e))
        })
        .await?;

        info!("Completed waitlist entry {id}");
        Ok(saved)
    }

    async fn get_entry(&self, id: Uuid) -> Result<WaitlistEntry, GatewayError> {
        sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend("load waitlist entry", e))?
            .ok_or(GatewayError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryBlobStore;

    fn resume() -> ResumeFile {
        ResumeFile::new("cv.pdf", "application/pdf", b"%PDF-1.4".to_vec())
    }

    #[tokio::test]
    async fn test_failed_write_removes_uploaded_resume() {
        let blobs = InMemoryBlobStore::default();
        let file = resume();

        let err = store_profile_with_resume(&blobs, Uuid::new_v4(), Some(&file), |_, _| async {
            Err(GatewayError::Backend("Failed to save waitlist profile".to_string()))
        })
        .await
        .unwrap_err();

        assert_eq!(err, GatewayError::Backend("Failed to save waitlist profile".to_string()));
        assert!(blobs.keys().is_empty());
        assert_eq!(blobs.deleted().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_write_keeps_resume_and_sees_its_url() {
        let blobs = InMemoryBlobStore::default();
        let file = resume();
        let seen = std::sync::Mutex::new(None);

        let saved = store_profile_with_resume(&blobs, Uuid::new_v4(), Some(&file), |url, name| {
            *seen.lock().unwrap() = Some((url, name));
            async { Ok(()) }
        })
        .await
        .unwrap();

        let keys = blobs.keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(saved.resume_url, format!("memory://{}", keys[0]));
        let (url, name) = seen.into_inner().unwrap().unwrap();
        assert_eq!(url, saved.resume_url);
        assert_eq!(name, "cv.pdf");
    }

    #[tokio::test]
    async fn test_failed_upload_skips_the_write() {
        let blobs = InMemoryBlobStore::failing();
        let file = resume();
        let mut wrote = false;

        let err = store_profile_with_resume(&blobs, Uuid::new_v4(), Some(&file), |_, _| {
            wrote = true;
            async { Ok(()) }
        })
        .await
        .unwrap_err();

        assert_eq!(err, GatewayError::Backend("Failed to upload resume".to_string()));
        assert!(!wrote);
    }

    #[tokio::test]
    async fn test_without_resume_writes_empty_url() {
        let blobs = InMemoryBlobStore::default();

        let saved = store_profile_with_resume(&blobs, Uuid::new_v4(), None, |url, name| async move {
            assert!(url.is_empty());
            assert!(name.is_empty());
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(saved.resume_url, "");
        assert!(blobs.keys().is_empty());
    }
}
