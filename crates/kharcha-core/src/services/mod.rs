//! Application services built on the typed stores.

pub mod session;
pub mod sweeper;

pub use session::{SessionService, UserSession};
pub use sweeper::{spawn_expiry_sweep, sweep_once};
