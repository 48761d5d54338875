//! Domain types shared by the OpsView crates.
//!
//! Holds the stats snapshot, the validated event input, and the error type
//! that the store, cache, and HTTP layers all map into.

pub mod error;
pub mod event;
pub mod stats;
pub mod types;
