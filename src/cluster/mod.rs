//! Cluster Adapters
//!
//! - connection: namespace and client resolution
//! - workloads: apps/v1 list/patch against a live cluster

pub mod connection;
#[cfg(test)]
pub(crate) mod memory;
pub mod workloads;

pub use connection::*;
pub use workloads::*;
