// libjensen/src/lib.rs

//! libjensen
//!
//! Pure Rust client for the Jensen protocol spoken by HiDock voice
//! recorders over USB bulk endpoints.

#![warn(missing_docs)]

pub mod constants;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod test_support;
pub mod transfer;
pub mod transport;
pub mod types;
pub mod utils;

#[cfg(feature = "async")]
pub mod asynchronous;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the domain types in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
