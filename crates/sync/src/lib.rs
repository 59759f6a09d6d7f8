//! Platform metrics ingestion — reporting clients, the paginated
//! fetch-and-upsert loop, and the per-platform connector registry.

pub mod clients;
pub mod runner;
pub mod service;

pub use clients::{ConnectorConfig, PlatformConnector, PlatformRow, ReportPage};
pub use runner::{SyncReport, SyncRunner};
pub use service::SyncService;
