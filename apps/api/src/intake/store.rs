use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Destination for generated profile records.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Writes `record` under `id` to both the users and the profiles tables.
    async fn save_profile(&self, id: Uuid, record: &Map<String, Value>) -> Result<(), sqlx::Error>;

    /// Removes both rows written by `save_profile`.
    async fn delete_profile(&self, id: Uuid) -> Result<(), sqlx::Error>;
}

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn save_profile(&self, id: Uuid, record: &Map<String, Value>) -> Result<(), sqlx::Error> {
        let record = Value::Object(record.clone());
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (id, record) VALUES ($1, $2)")
            .bind(id)
            .bind(&record)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO profiles (id, record) VALUES ($1, $2)")
            .bind(id)
            .bind(&record)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Stored generated profile {id}");
        Ok(())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Removed generated profile {id}");
        Ok(())
    }
}
