//! License registry: issue, validate, regenerate, and revoke device keys.

pub mod keygen;
pub mod service;

pub use service::LicenseService;
