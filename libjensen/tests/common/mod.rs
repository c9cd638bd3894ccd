// Shared helpers for the integration tests. Each aggregator includes this
// module on its own, so not every helper is used everywhere.
#![allow(dead_code)]

pub mod fixtures;

pub use libjensen::test_support as helpers;

/// Route `log` output through env_logger; RUST_LOG=debug shows the
/// dispatcher's packet trace.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
