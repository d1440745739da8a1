//! Columnar schema derivation for the event table family.
//!
//! Everything here is a pure function of the deployment configuration:
//! topology clauses, the ingestion table chain, and insert statement
//! shapes. Nothing is persisted; callers recompute on every schema
//! operation.

pub mod ingestion;
pub mod sql;
pub mod topology;

pub use ingestion::{build_chain, DdlStatement, IngestionChain};
pub use topology::EventTableTopology;
