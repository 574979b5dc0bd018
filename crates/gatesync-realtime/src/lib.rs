//! # gatesync-realtime
//!
//! The guardian-facing realtime gateway: per-guardian private rooms over
//! WebSocket, the HTTP push provider, and the three-channel attendance
//! notification fan-out (socket, push, durable inbox).

pub mod connection;
pub mod fanout;
pub mod message;
pub mod push;
pub mod rooms;
pub mod server;

pub use server::RealtimeEngine;
