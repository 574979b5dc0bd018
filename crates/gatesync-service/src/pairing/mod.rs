//! Device pairing: connect, heartbeat, and status.

pub mod service;

pub use service::{ConnectDescriptor, DeviceStatus, PairingService};
