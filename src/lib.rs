//! Behavioral-event analytics pipeline.
//!
//! Ingests feature-flag evaluations and end-user actions into one of two
//! storage backends, either a columnar analytical store behind an ingestion
//! queue (clustered mode) or a document store (standalone mode), and
//! serves statistics through a content-addressed, single-flight cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod migrate;
pub mod schema;
pub mod stats;
pub mod store;

pub use cache::StatsCache;
pub use config::{AnalyticsConfig, DeploymentMode};
pub use error::{GriddleError, Result};
pub use event::Event;
pub use migrate::{MigrateOptions, MigrationReport, Migrator};
pub use stats::{QueryClass, StatisticsProvider, StatisticsRequest};
pub use store::{EventWriter, StoreContext};
