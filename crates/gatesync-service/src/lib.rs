//! # gatesync-service
//!
//! Business logic for the device protocol: license registry, device
//! pairing, cursor-based roster sync, and the attendance ingestion
//! pipeline with its smart-scan resolver.

pub mod attendance;
pub mod context;
pub mod license;
pub mod pairing;
pub mod sync;
