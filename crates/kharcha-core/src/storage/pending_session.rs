//! Typed pending session store.
//!
//! Wraps the byte-level API from kharcha-storage with the domain model and
//! the intake contract: one live session per user, a fixed
//! retention window measured from creation, and partial field updates with
//! forward-only step transitions.
//!
//! Expired records read as absent even before the sweep has purged them, so
//! "expired" and "deleted" are the same observable state.

use crate::error::IntakeError;
use crate::models::{PendingExpenseSession, SessionUpdate};
use anyhow::Result;
use kharcha_storage::PendingSessionStorage;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PendingSessionStore {
    inner: PendingSessionStorage,
}

impl PendingSessionStore {
    pub fn new(inner: PendingSessionStorage) -> Self {
        Self { inner }
    }

    /// Create a fresh session for the user.
    ///
    /// Fails with `Conflict` if a live session already exists. An expired
    /// record that the sweep has not yet purged is replaced, since it
    /// already reads as absent.
    pub fn create(
        &self,
        user_id: &str,
        channel_address: &str,
    ) -> Result<PendingExpenseSession, IntakeError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        if let Some(existing) = self.load(user_id)?
            && !existing.is_expired(now_ms)
        {
            return Err(IntakeError::Conflict(user_id.to_string()));
        }

        let session = PendingExpenseSession::new(user_id, channel_address);
        self.persist(&session)?;
        Ok(session)
    }

    /// Get the live session for a user.
    ///
    /// Fails with `NotFound` when no record exists or when the record's
    /// retention window has elapsed.
    pub fn get(&self, user_id: &str) -> Result<PendingExpenseSession, IntakeError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        match self.load(user_id)? {
            Some(session) if !session.is_expired(now_ms) => Ok(session),
            _ => Err(IntakeError::NotFound(user_id.to_string())),
        }
    }

    /// Apply a partial update to the live session and refresh `updated_at`.
    ///
    /// Fails with `NotFound` when no live session exists and with
    /// `Validation` when the update would move `step` backward. No
    /// cross-field sequencing is enforced here; the conversation engine
    /// drives that.
    pub fn update(
        &self,
        user_id: &str,
        update: SessionUpdate,
    ) -> Result<PendingExpenseSession, IntakeError> {
        let mut session = self.get(user_id)?;

        if let Some(step) = update.step
            && step < session.step
        {
            return Err(IntakeError::Validation(format!(
                "step cannot move backward from {:?} to {:?}",
                session.step, step
            )));
        }

        session.apply(update);
        self.persist(&session)?;
        Ok(session)
    }

    /// Remove the user's session. Idempotent; returns false if absent.
    pub fn delete(&self, user_id: &str) -> Result<bool> {
        self.inner.delete(user_id)
    }

    /// Delete all records whose retention window elapsed before `now_ms`.
    ///
    /// Returns the number of deleted records. Unreadable records are purged
    /// as well; they can never be served again.
    pub fn purge_expired(&self, now_ms: i64) -> Result<usize> {
        let mut stale = Vec::new();
        for (user_id, bytes) in self.inner.list_raw()? {
            match serde_json::from_slice::<PendingExpenseSession>(&bytes) {
                Ok(session) => {
                    if session.is_expired(now_ms) {
                        stale.push(user_id);
                    }
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Purging undecodable session record");
                    stale.push(user_id);
                }
            }
        }

        if stale.is_empty() {
            return Ok(0);
        }
        self.inner.delete_many(&stale)
    }

    /// Count physical records, including expired-but-unpurged ones.
    pub fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn load(&self, user_id: &str) -> Result<Option<PendingExpenseSession>> {
        if let Some(bytes) = self.inner.get_raw(user_id)? {
            Ok(Some(serde_json::from_slice(&bytes)?))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn persist(&self, session: &PendingExpenseSession) -> Result<()> {
        let json = serde_json::to_vec(session)?;
        self.inner.put_raw(&session.user_id, &json)
    }
}
