use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::model::AppStorageDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::app_storage::dsl::*;
use tickerfolio_core::errors::Result;
use tickerfolio_core::persistence::SnapshotStorageTrait;

/// Durable [`SnapshotStorageTrait`] backed by the `app_storage` table.
///
/// Reads go through the pool; writes are serialized by the writer actor.
pub struct SqliteSnapshotStorage {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteSnapshotStorage {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SqliteSnapshotStorage { pool, writer }
    }

    /// Returns the full stored row, including when it was last written.
    pub fn get_entry(&self, key: &str) -> Result<Option<AppStorageDB>> {
        let mut conn = get_connection(&self.pool)?;
        app_storage
            .find(key)
            .select(AppStorageDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()
    }
}

#[async_trait]
impl SnapshotStorageTrait for SqliteSnapshotStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_entry(key)?.map(|row| row.payload))
    }

    async fn write(&self, key: &str, value: String) -> Result<()> {
        let row = AppStorageDB {
            storage_key: key.to_string(),
            payload: value,
            updated_at: Utc::now().naive_utc(),
        };
        let bytes = row.payload.len();

        self.writer
            .exec(move |conn| {
                diesel::replace_into(app_storage)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await?;

        debug!("Stored {} bytes under '{}'", bytes, key);
        Ok(())
    }
}
