use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::models::account::AccountRow;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("An account with this email already exists")]
    EmailInUse,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Fields captured at sign-up next to the credentials.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: NewAccount) -> Result<AccountRow, AccountError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRow>, AccountError>;

    /// Stamps `last_login` and returns the updated row.
    async fn record_login(&self, id: Uuid) -> Result<AccountRow, AccountError>;
}

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> Result<AccountRow, AccountError> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, password_hash, name, role, created_at, last_login)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.name)
        .bind(&account.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccountError::EmailInUse
            } else {
                AccountError::Database(e)
            }
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRow>, AccountError> {
        Ok(
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn record_login(&self, id: Uuid) -> Result<AccountRow, AccountError> {
        Ok(sqlx::query_as::<_, AccountRow>(
            "UPDATE accounts SET last_login = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?)
    }
}
