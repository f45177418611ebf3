//! Expense summary reports formatted as chat text.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::models::Expense;

/// Reporting period for summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPeriod {
    Today,
    Week,
    Month,
    AllTime,
}

impl SummaryPeriod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Week => "This Week",
            Self::Month => "This Month",
            Self::AllTime => "All Time",
        }
    }

    /// Inclusive lower bound of the period, relative to `now`.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .unwrap_or(now),
            Self::Week => now - Duration::days(7),
            Self::Month => now - Duration::days(30),
            Self::AllTime => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Render a chat-friendly summary of the given expenses.
///
/// Shows total, count, a per-category breakdown sorted by spend, and up to
/// five recent items. Expenses are expected most-recent-first, as the
/// expense store returns them.
pub fn format_summary(period: SummaryPeriod, expenses: &[Expense]) -> String {
    let mut message = format!("📊 *{}'s Expenses*\n\n", period.label());

    if expenses.is_empty() {
        message.push_str("_No expenses recorded_");
        return message;
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    message.push_str(&format!("💰 *Total: ₹{:.0}*\n", total));
    message.push_str(&format!(
        "📝 {} expense{}\n\n",
        expenses.len(),
        if expenses.len() > 1 { "s" } else { "" }
    ));

    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for expense in expenses {
        *by_category.entry(expense.category.as_str()).or_insert(0.0) += expense.amount;
    }

    let mut categories: Vec<(&str, f64)> = by_category.into_iter().collect();
    categories.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    message.push_str("📁 *By Category:*\n");
    for (category, amount) in &categories {
        message.push_str(&format!("• {}: ₹{:.0}\n", category, amount));
    }

    message.push_str("\n📋 *Recent:*\n");
    for (i, expense) in expenses.iter().take(5).enumerate() {
        message.push_str(&format!(
            "{}. {} - ₹{}\n",
            i + 1,
            expense.description,
            expense.amount
        ));
    }

    message
}
