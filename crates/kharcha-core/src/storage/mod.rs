//! Typed storage wrappers over the byte-level kharcha-storage APIs.

pub mod expense;
pub mod pending_session;

pub use expense::ExpenseStore;
pub use pending_session::PendingSessionStore;
