//! OpsView API server library.
//!
//! Exposes the building blocks (config, state, error handling, metrics,
//! routes, the stats service) so integration tests and the binary
//! entrypoint can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
