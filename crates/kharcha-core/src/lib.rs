//! Kharcha Core - conversational expense intake.
//!
//! The reviewable heart of the system is the pending-session store: one
//! in-progress expense-collection session per user, expired 30 minutes
//! after creation, mutated field-by-field as chat messages arrive. On top
//! of it sit the per-user serialization service, the background expiry
//! sweep, and the conversation engine that drives the chat flow and
//! finalizes sessions into expense records.

pub mod channel;
pub mod conversation;
pub mod error;
pub mod models;
pub mod paths;
pub mod services;
pub mod storage;

pub use error::IntakeError;
pub use models::*;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use services::SessionService;
use storage::{ExpenseStore, PendingSessionStore};

/// Core application state shared between the CLI and channel adapters
pub struct AppCore {
    pub storage: Arc<kharcha_storage::Storage>,
    pub sessions: SessionService,
    pub expenses: ExpenseStore,
}

impl AppCore {
    pub fn new(db_path: &str) -> Result<Self> {
        let storage = Arc::new(kharcha_storage::Storage::new(db_path)?);

        let sessions = SessionService::new(PendingSessionStore::new(
            storage.pending_sessions.clone(),
        ));
        let expenses = ExpenseStore::new(storage.expenses.clone());

        info!("Initializing Kharcha");

        Ok(Self {
            storage,
            sessions,
            expenses,
        })
    }

    /// Spawn the periodic expiry sweep for pending sessions.
    pub fn start_expiry_sweep(&self) -> tokio::task::JoinHandle<()> {
        services::sweeper::spawn_expiry_sweep(self.sessions.store().clone())
    }

    /// Run one expiry sweep pass, returning the number of purged sessions.
    pub fn sweep_now(&self) -> Result<usize> {
        services::sweep_once(self.sessions.store())
    }
}
