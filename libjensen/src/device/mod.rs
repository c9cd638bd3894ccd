// libjensen/src/device/mod.rs

//! Client facade and the machinery behind it: lifecycle, events and the
//! background health monitor.

pub mod builder;
pub mod config;
pub mod events;
pub mod handle;
pub mod health;
pub mod lifecycle;

pub use builder::JensenBuilder;
pub use config::ClientConfig;
pub use events::{ActivityEntry, ActivityLevel, ClientEvent, EventHub};
pub use handle::Jensen;
pub use health::HealthMonitor;
pub use lifecycle::Lifecycle;
