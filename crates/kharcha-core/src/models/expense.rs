//! Finalized expense record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Stored image attached to an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseImage {
    pub url: String,
    pub storage_id: String,
    pub filename: String,
}

/// A finalized expense record
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub vendor: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub images: Vec<ExpenseImage>,
    #[ts(type = "number")]
    pub created_at: i64,
}

impl Expense {
    pub fn new(user_id: impl Into<String>, amount: f64, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            amount,
            description: description.into(),
            category: "Miscellaneous".to_string(),
            vendor: "N/A".to_string(),
            occurred_at: chrono::Utc::now(),
            images: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    pub fn with_image(mut self, image: ExpenseImage) -> Self {
        self.images.push(image);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_new() {
        let expense = Expense::new("user-1", 250.0, "lunch");
        assert!(!expense.id.is_empty());
        assert_eq!(expense.amount, 250.0);
        assert_eq!(expense.category, "Miscellaneous");
        assert_eq!(expense.vendor, "N/A");
        assert!(expense.images.is_empty());
    }

    #[test]
    fn test_expense_builders() {
        let expense = Expense::new("user-1", 80.0, "coffee at Starbucks")
            .with_category("Meals - Snacks")
            .with_vendor("Starbucks")
            .with_image(ExpenseImage {
                url: "https://img.example/1.jpg".to_string(),
                storage_id: "bills/1".to_string(),
                filename: "receipt.jpg".to_string(),
            });

        assert_eq!(expense.category, "Meals - Snacks");
        assert_eq!(expense.vendor, "Starbucks");
        assert_eq!(expense.images.len(), 1);
    }
}
