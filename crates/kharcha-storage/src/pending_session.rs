//! Pending session storage - byte-level API for intake session persistence.
//!
//! Keys are user ids, so the table itself enforces "at most one record per
//! user". Expiry semantics live in the typed wrapper in kharcha-core; this
//! layer only moves bytes.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::sync::Arc;
use tracing::debug;

const PENDING_SESSIONS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("pending_sessions");

/// Low-level pending session storage with byte-level API
#[derive(Debug, Clone)]
pub struct PendingSessionStorage {
    db: Arc<Database>,
}

impl PendingSessionStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PENDING_SESSIONS_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store raw session data for a user
    pub fn put_raw(&self, user_id: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PENDING_SESSIONS_TABLE)?;
            table.insert(user_id, data)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get raw session data by user id
    pub fn get_raw(&self, user_id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_SESSIONS_TABLE)?;

        if let Some(data) = table.get(user_id)? {
            Ok(Some(data.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// List all raw session data as (user_id, bytes) pairs
    pub fn list_raw(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_SESSIONS_TABLE)?;

        let mut sessions = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            sessions.push((key.value().to_string(), value.value().to_vec()));
        }

        Ok(sessions)
    }

    /// Check if a session record exists for the user
    pub fn exists(&self, user_id: &str) -> Result<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_SESSIONS_TABLE)?;
        Ok(table.get(user_id)?.is_some())
    }

    /// Delete the session record for a user, returns true if one existed
    pub fn delete(&self, user_id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(PENDING_SESSIONS_TABLE)?;
            table.remove(user_id)?.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Delete several users' records in one write transaction.
    ///
    /// Returns the number of records that actually existed. Used by the
    /// expiry sweep so a batch purge is a single commit.
    pub fn delete_many(&self, user_ids: &[String]) -> Result<usize> {
        let write_txn = self.db.begin_write()?;
        let mut deleted = 0;
        {
            let mut table = write_txn.open_table(PENDING_SESSIONS_TABLE)?;
            for user_id in user_ids {
                if table.remove(user_id.as_str())?.is_some() {
                    deleted += 1;
                }
            }
        }
        write_txn.commit()?;
        if deleted > 0 {
            debug!(deleted, "Purged pending session records");
        }
        Ok(deleted)
    }

    /// Count all session records
    pub fn count(&self) -> Result<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_SESSIONS_TABLE)?;
        Ok(table.len()? as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup() -> (PendingSessionStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let storage = PendingSessionStorage::new(db).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_put_and_get_raw() {
        let (storage, _temp_dir) = setup();

        let data = br#"{"step":"amount"}"#;
        storage.put_raw("user-001", data).unwrap();

        let retrieved = storage.get_raw("user-001").unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap(), data);
    }

    #[test]
    fn test_put_overwrites_same_user() {
        let (storage, _temp_dir) = setup();

        storage.put_raw("user-001", b"first").unwrap();
        storage.put_raw("user-001", b"second").unwrap();

        assert_eq!(storage.count().unwrap(), 1);
        assert_eq!(storage.get_raw("user-001").unwrap().unwrap(), b"second");
    }

    #[test]
    fn test_exists_and_delete() {
        let (storage, _temp_dir) = setup();

        assert!(!storage.exists("user-001").unwrap());

        storage.put_raw("user-001", b"data").unwrap();
        assert!(storage.exists("user-001").unwrap());

        let deleted = storage.delete("user-001").unwrap();
        assert!(deleted);
        assert!(!storage.exists("user-001").unwrap());

        // Idempotent
        assert!(!storage.delete("user-001").unwrap());
    }

    #[test]
    fn test_delete_many() {
        let (storage, _temp_dir) = setup();

        storage.put_raw("user-001", b"a").unwrap();
        storage.put_raw("user-002", b"b").unwrap();
        storage.put_raw("user-003", b"c").unwrap();

        let deleted = storage
            .delete_many(&[
                "user-001".to_string(),
                "user-003".to_string(),
                "user-404".to_string(),
            ])
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(storage.count().unwrap(), 1);
        assert!(storage.exists("user-002").unwrap());
    }

    #[test]
    fn test_list_raw() {
        let (storage, _temp_dir) = setup();

        storage.put_raw("user-001", b"data1").unwrap();
        storage.put_raw("user-002", b"data2").unwrap();

        let sessions = storage.list_raw().unwrap();
        assert_eq!(sessions.len(), 2);
    }
}
