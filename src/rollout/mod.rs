//! Rolling Restart Module
//!
//! Name filtering, restart application and run coordination on top of the
//! [`crate::domain::WorkloadApi`] port.

pub mod applier;
pub mod coordinator;
pub mod filter;
pub mod state;

pub use applier::*;
pub use coordinator::*;
pub use state::*;
