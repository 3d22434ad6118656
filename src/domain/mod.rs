//! Domain layer - Controller types, restart patch and the cluster port

pub mod patch;
pub mod ports;

pub use patch::*;
pub use ports::*;
