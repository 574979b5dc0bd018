//! HTTP request handlers.

pub mod attendance;
pub mod device;
pub mod health;
pub mod license_admin;
pub mod public;
pub mod ws;
