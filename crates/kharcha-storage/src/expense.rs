//! Expense storage - byte-level API for finalized expense records.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::sync::Arc;

const EXPENSES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("expenses");

/// Low-level expense storage with byte-level API
#[derive(Debug, Clone)]
pub struct ExpenseStorage {
    db: Arc<Database>,
}

impl ExpenseStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(EXPENSES_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store raw expense data
    pub fn put_raw(&self, id: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(EXPENSES_TABLE)?;
            table.insert(id, data)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get raw expense data by id
    pub fn get_raw(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EXPENSES_TABLE)?;

        if let Some(data) = table.get(id)? {
            Ok(Some(data.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// List all raw expense data as (id, bytes) pairs
    pub fn list_raw(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EXPENSES_TABLE)?;

        let mut expenses = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            expenses.push((key.value().to_string(), value.value().to_vec()));
        }

        Ok(expenses)
    }

    /// Delete an expense by id, returns true if it existed
    pub fn delete(&self, id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(EXPENSES_TABLE)?;
            table.remove(id)?.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Count all expense records
    pub fn count(&self) -> Result<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EXPENSES_TABLE)?;
        Ok(table.len()? as usize)
    }
}
