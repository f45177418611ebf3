//! Vendor extraction from expense descriptions.

use regex::Regex;
use std::sync::OnceLock;

const KNOWN_VENDORS: &[&str] = &[
    "amazon",
    "flipkart",
    "swiggy",
    "zomato",
    "uber",
    "ola",
    "rapido",
    "starbucks",
    "ccd",
    "dominos",
    "mcdonalds",
    "kfc",
    "subway",
    "bigbasket",
    "blinkit",
    "zepto",
    "dmart",
    "reliance",
    "apollo",
];

/// Words that describe the expense itself rather than a vendor.
const COMMON_EXPENSE_WORDS: &[&str] = &[
    "lunch",
    "dinner",
    "breakfast",
    "coffee",
    "tea",
    "snack",
    "food",
    "grocery",
    "medicine",
    "fuel",
    "petrol",
    "recharge",
];

pub const UNKNOWN_VENDOR: &str = "N/A";

fn at_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:\bat|\bfrom|@)\s+(.+)").expect("valid regex"))
}

/// Extract a vendor name from a description.
///
/// "Lunch at St Martha" -> "St Martha", "Amazon order" -> "Amazon".
/// Falls back to the description itself when it is one or two words that
/// are not generic expense words, otherwise [`UNKNOWN_VENDOR`].
pub fn extract_vendor(description: &str) -> String {
    let desc = description.trim();

    // "X at Y" / "X from Y" / "X @ Y"
    if let Some(captures) = at_pattern().captures(desc)
        && let Some(vendor) = captures.get(1)
    {
        return capitalize_words(vendor.as_str().trim());
    }

    let desc_lower = desc.to_lowercase();
    for vendor in KNOWN_VENDORS {
        if desc_lower.contains(vendor) {
            return capitalize_words(vendor);
        }
    }

    let words: Vec<&str> = desc.split_whitespace().collect();
    if !words.is_empty()
        && words.len() <= 2
        && !COMMON_EXPENSE_WORDS.contains(&words[0].to_lowercase().as_str())
    {
        return capitalize_words(desc);
    }

    UNKNOWN_VENDOR.to_string()
}

fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
