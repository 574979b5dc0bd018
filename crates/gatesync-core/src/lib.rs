//! # gatesync-core
//!
//! Shared foundation for the GateSync attendance backend: the unified
//! error type, configuration schemas, pagination types, and the
//! push-provider trait implemented by the realtime crate.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;
