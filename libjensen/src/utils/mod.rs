// libjensen/src/utils/mod.rs

//! Small helpers shared across the crate: hex dumps for logging and
//! timeout bookkeeping.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
