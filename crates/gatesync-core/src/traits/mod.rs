//! Provider traits defined at the crate seams.

pub mod push;
