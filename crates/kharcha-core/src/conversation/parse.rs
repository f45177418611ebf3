//! Inbound text parsing: amounts and the one-shot "500 lunch" form.

use regex::Regex;
use std::sync::OnceLock;

/// Parsed one-shot expense message
#[derive(Debug, Clone, PartialEq)]
pub struct InstantExpense {
    pub amount: f64,
    pub description: String,
}

/// Parse an amount reply, tolerating currency noise ("₹500", "Rs 1,200").
///
/// Returns None for non-numeric or non-positive input.
pub fn parse_amount(input: &str) -> Option<f64> {
    let cleaned: String = input
        .trim()
        .trim_start_matches(['₹'])
        .replace("Rs.", "")
        .replace("Rs", "")
        .replace("rs.", "")
        .replace("rs", "")
        .replace([',', ' '], "");

    let amount: f64 = cleaned.parse().ok()?;
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

fn amount_first_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "150 lunch" or "₹150 lunch"
    RE.get_or_init(|| {
        Regex::new(r"^(?i)[₹]?(?:rs\.?\s*)?(\d+(?:\.\d{1,2})?)\s+(.+)$").expect("valid regex")
    })
}

fn amount_last_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "lunch 150" or "lunch ₹150"
    RE.get_or_init(|| {
        Regex::new(r"^(?i)(.+?)\s+[₹]?(?:rs\.?\s*)?(\d+(?:\.\d{1,2})?)$").expect("valid regex")
    })
}

/// Parse the instant-add form: "<amount> <description>" in either order.
///
/// Used when a message arrives with no live session and matches neither a
/// command nor a media attachment.
pub fn parse_instant(message: &str) -> Option<InstantExpense> {
    let message = message.trim();

    if let Some(captures) = amount_first_pattern().captures(message) {
        let amount: f64 = captures[1].parse().ok()?;
        let description = captures[2].trim().to_string();
        // Reject "12 34" style input where both halves are numeric
        if amount > 0.0 && !description.is_empty() && description.parse::<f64>().is_err() {
            return Some(InstantExpense {
                amount,
                description,
            });
        }
    }

    if let Some(captures) = amount_last_pattern().captures(message) {
        let amount: f64 = captures[2].parse().ok()?;
        let description = captures[1].trim().to_string();
        if amount > 0.0 && !description.is_empty() && description.parse::<f64>().is_err() {
            return Some(InstantExpense {
                amount,
                description,
            });
        }
    }

    None
}
