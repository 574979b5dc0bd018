//! Incremental roster sync over a timestamp cursor.

pub mod service;

pub use service::{RosterPull, SyncMetadata, SyncService};
