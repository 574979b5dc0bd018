//! Concrete repository implementations, one per entity.

pub mod attendance;
pub mod connection;
pub mod gate;
pub mod license;
pub mod notification;
pub mod person;
pub mod push_token;
pub mod sync_audit;
