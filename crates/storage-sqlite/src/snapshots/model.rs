//! Database model for the key/value storage table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// One stored payload, keyed by a fixed storage key.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::app_storage)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AppStorageDB {
    pub storage_key: String,
    pub payload: String,
    pub updated_at: NaiveDateTime,
}
