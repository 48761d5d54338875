//! Services that sit between the HTTP handlers and the store/cache.

pub mod stats;

pub use stats::StatsService;
