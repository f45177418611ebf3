//! Domain models shared across the intake pipeline.

pub mod expense;
pub mod session;

pub use expense::{Expense, ExpenseImage};
pub use session::{
    BillImage, IntakeStep, PendingExpenseSession, SESSION_RETENTION_MS, SessionUpdate,
};
