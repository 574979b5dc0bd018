//! Custom Axum extractors.

pub mod auth;

pub use auth::{AdminScope, DeviceAuth, PairedDevice};
