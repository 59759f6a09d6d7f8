//! Performance reporting — per-entity metric tracking, derived rates,
//! account benchmarks, and the account overview aggregate.

pub mod overview;
pub mod tracker;

pub use overview::AccountOverview;
pub use tracker::{PerformanceSnapshot, PerformanceTracker, RecordOutcome};
