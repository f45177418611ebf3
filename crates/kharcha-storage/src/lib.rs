//! Kharcha Storage - Low-level storage abstraction layer
//!
//! This crate provides the persistence layer for Kharcha, using redb as the
//! embedded database. It exposes byte-level APIs so it stays free of the
//! domain models defined in kharcha-core.
//!
//! # Tables
//!
//! - `pending_sessions` - In-progress conversational intake sessions, keyed
//!   by user id (at most one per user)
//! - `expenses` - Finalized expense records, keyed by expense id

pub mod expense;
pub mod pending_session;

use anyhow::Result;
use redb::Database;
use std::sync::Arc;

pub use expense::ExpenseStorage;
pub use pending_session::PendingSessionStorage;

/// Central storage manager that initializes all storage subsystems
pub struct Storage {
    pub pending_sessions: PendingSessionStorage,
    pub expenses: ExpenseStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will create the database file if it doesn't exist and initialize
    /// all required tables. The per-table stores share one database handle.
    pub fn new(path: &str) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);

        let pending_sessions = PendingSessionStorage::new(db.clone())?;
        let expenses = ExpenseStorage::new(db)?;

        Ok(Self {
            pending_sessions,
            expenses,
        })
    }
}
