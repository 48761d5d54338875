//! Row structs for the event log.

pub mod event;
