//! Conversational expense intake.
//!
//! Turns inbound chat messages into pending-session mutations and, on
//! completion, finalized expense records.

pub mod category;
pub mod engine;
pub mod parse;
pub mod summary;
pub mod vendor;

pub use category::detect_category;
pub use engine::IntakeEngine;
pub use parse::{parse_amount, parse_instant};
pub use summary::{SummaryPeriod, format_summary};
pub use vendor::extract_vendor;
