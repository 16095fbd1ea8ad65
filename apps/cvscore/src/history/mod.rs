//! Append-only score history and the analytics derived from it.

pub mod models;
pub mod postgres;
pub mod store;
pub mod tracker;

pub use models::{
    ComparisonStatus, HistoryEntry, HistoryReport, HistoryStats, IndustryBenchmark,
    NewHistoryEntry, ScoreComparison, ScoreDataPoint, Trend,
};
pub use postgres::PgStore;
pub use store::{HistoryStore, MemoryStore};
