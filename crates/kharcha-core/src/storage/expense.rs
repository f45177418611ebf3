//! Typed expense storage wrapper.
//!
//! Provides type-safe access to finalized expense records with automatic
//! JSON serialization over the byte-level API from kharcha-storage.

use crate::models::Expense;
use anyhow::Result;
use chrono::{DateTime, Utc};
use kharcha_storage::ExpenseStorage;

#[derive(Debug, Clone)]
pub struct ExpenseStore {
    inner: ExpenseStorage,
}

impl ExpenseStore {
    pub fn new(inner: ExpenseStorage) -> Self {
        Self { inner }
    }

    /// Create a new expense record (fails if the id already exists).
    pub fn create(&self, expense: &Expense) -> Result<()> {
        if self.inner.get_raw(&expense.id)?.is_some() {
            return Err(anyhow::anyhow!("Expense {} already exists", expense.id));
        }
        let json = serde_json::to_vec(expense)?;
        self.inner.put_raw(&expense.id, &json)
    }

    /// Get an expense by id.
    pub fn get(&self, id: &str) -> Result<Option<Expense>> {
        if let Some(bytes) = self.inner.get_raw(id)? {
            Ok(Some(serde_json::from_slice(&bytes)?))
        } else {
            Ok(None)
        }
    }

    /// List all expenses, most recent first.
    pub fn list(&self) -> Result<Vec<Expense>> {
        let mut expenses = Vec::new();
        for (_, bytes) in self.inner.list_raw()? {
            expenses.push(serde_json::from_slice::<Expense>(&bytes)?);
        }

        expenses.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(expenses)
    }

    /// List a user's expenses, most recent first.
    pub fn list_by_user(&self, user_id: &str) -> Result<Vec<Expense>> {
        let expenses = self.list()?;
        Ok(expenses
            .into_iter()
            .filter(|e| e.user_id == user_id)
            .collect())
    }

    /// List a user's expenses occurring at or after `since`, most recent first.
    pub fn list_by_user_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Expense>> {
        let expenses = self.list_by_user(user_id)?;
        Ok(expenses
            .into_iter()
            .filter(|e| e.occurred_at >= since)
            .collect())
    }

    /// Delete an expense by id.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.inner.delete(id)
    }

    /// Count total expense records.
    pub fn count(&self) -> Result<usize> {
        self.inner.count()
    }
}
