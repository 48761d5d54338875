//! Request handlers.
//!
//! Handlers validate input, delegate to [`StatsService`](crate::services::StatsService)
//! and map errors via [`AppError`](crate::error::AppError).

pub mod events;
pub mod stats;
