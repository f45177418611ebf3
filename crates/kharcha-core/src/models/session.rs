//! Pending intake session models for conversational expense capture.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How long a pending session stays readable, measured from `created_at`.
pub const SESSION_RETENTION_MS: i64 = 30 * 60 * 1000;

/// Stage of the intake conversation.
///
/// Determines how the next inbound message from the user is interpreted.
/// Transitions only move forward (Amount -> Description).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStep {
    Amount,
    Description,
}

/// Receipt image reference supplied by the image storage collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillImage {
    pub url: String,
    pub storage_id: String,
}

/// One in-progress expense-collection session per user
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PendingExpenseSession {
    pub user_id: String,
    pub channel_address: String,
    pub step: IntakeStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_image: Option<BillImage>,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl PendingExpenseSession {
    pub fn new(user_id: impl Into<String>, channel_address: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            user_id: user_id.into(),
            channel_address: channel_address.into(),
            step: IntakeStep::Amount,
            amount: None,
            description: None,
            category: None,
            vendor: None,
            occurred_at: None,
            attached_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the retention window has elapsed since creation.
    ///
    /// Expiry is measured from `created_at` only; activity does not extend
    /// the window.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.created_at > SESSION_RETENTION_MS
    }

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// Field sequencing and step direction are validated by the store, not
    /// here.
    pub fn apply(&mut self, update: SessionUpdate) {
        if let Some(step) = update.step {
            self.step = step;
        }
        if let Some(amount) = update.amount {
            self.amount = Some(amount);
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(vendor) = update.vendor {
            self.vendor = Some(vendor);
        }
        if let Some(occurred_at) = update.occurred_at {
            self.occurred_at = Some(occurred_at);
        }
        if let Some(image) = update.attached_image {
            self.attached_image = Some(image);
        }
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

/// Partial field update for a pending session.
///
/// Any subset of fields may be set; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub step: Option<IntakeStep>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub attached_image: Option<BillImage>,
}

impl SessionUpdate {
    pub fn step(step: IntakeStep) -> Self {
        Self {
            step: Some(step),
            ..Default::default()
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn with_image(mut self, image: BillImage) -> Self {
        self.attached_image = Some(image);
        self
    }
}
