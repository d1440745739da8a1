use crate::config::AnalyticsConfig;
use crate::error::{GriddleError, Result};

/// Bare local merge-tree table.
pub const EVENTS_TABLE: &str = "events";
/// Queue table backed by the message broker.
pub const KAFKA_EVENTS_QUEUE_TABLE: &str = "kafka_events_queue";
/// Pass-through materialized view, queue -> local.
pub const EVENTS_MV: &str = "events_mv";
/// Cluster-wide proxy over the local table.
pub const DISTRIBUTED_EVENTS_TABLE: &str = "distributed_events";

/// Derived DDL clause set and resolved table names for the event table
/// family. Recomputed from configuration on every schema operation,
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTableTopology {
    pub partition_by: String,
    pub order_by: String,
    pub sample_by: String,
    pub storage_policy: String,
    pub cluster_clause: String,
    /// Table targeted by logical reads.
    pub read_table: String,
    /// Table targeted by event inserts.
    pub write_table: String,
}

fn partition_by() -> String {
    "PARTITION BY (env_id, toYYYYMM(timestamp))".to_string()
}

fn order_by() -> String {
    "ORDER BY (env_id, toDate(timestamp), event, cityHash64(distinct_id))".to_string()
}

fn sample_by() -> String {
    "SAMPLE BY cityHash64(distinct_id)".to_string()
}

fn storage_policy(config: &AnalyticsConfig) -> String {
    if config.columnar.storage_policy {
        "SETTINGS storage_policy = 'hot_to_cold'".to_string()
    } else {
        String::new()
    }
}

fn cluster_clause(config: &AnalyticsConfig) -> String {
    if config.columnar.replication {
        format!("ON CLUSTER {}", config.columnar.cluster)
    } else {
        String::new()
    }
}

/// Derive the event table topology from the deployment configuration.
///
/// Fails with a configuration error when the sampling expression is not
/// the trailing term of the sort key; the storage engine requires the
/// sample key to be a prefix-compatible suffix of `ORDER BY`, and emitting
/// incompatible clauses would only surface as a cryptic DDL failure later.
pub fn compile(config: &AnalyticsConfig) -> Result<EventTableTopology> {
    EventTableTopology::try_new(
        partition_by(),
        order_by(),
        sample_by(),
        storage_policy(config),
        cluster_clause(config),
        config,
    )
}

impl EventTableTopology {
    pub fn try_new(
        partition_by: String,
        order_by: String,
        sample_by: String,
        storage_policy: String,
        cluster_clause: String,
        config: &AnalyticsConfig,
    ) -> Result<Self> {
        validate_sampling(&order_by, &sample_by)?;

        let read_table = if config.columnar.replication {
            DISTRIBUTED_EVENTS_TABLE
        } else {
            EVENTS_TABLE
        };
        let write_table = if config.columnar.kafka_ingestion {
            KAFKA_EVENTS_QUEUE_TABLE
        } else {
            EVENTS_TABLE
        };

        Ok(Self {
            partition_by,
            order_by,
            sample_by,
            storage_policy,
            cluster_clause,
            read_table: read_table.to_string(),
            write_table: write_table.to_string(),
        })
    }

    /// The merge-tree clause block, in engine-mandated order.
    pub fn merge_tree_clauses(&self) -> String {
        let mut clauses = vec![
            self.partition_by.as_str(),
            self.order_by.as_str(),
            self.sample_by.as_str(),
        ];
        if !self.storage_policy.is_empty() {
            clauses.push(self.storage_policy.as_str());
        }
        clauses.join("\n")
    }
}

/// The sample expression must equal the trailing term of the `ORDER BY`
/// tuple. Anything else is rejected here, at startup, instead of being
/// handed to the engine.
fn validate_sampling(order_by: &str, sample_by: &str) -> Result<()> {
    let sample_expr = sample_by
        .strip_prefix("SAMPLE BY")
        .map(str::trim)
        .unwrap_or(sample_by);
    if sample_expr.is_empty() {
        return Ok(());
    }

    let tail = order_by
        .trim_end_matches(')')
        .rsplit(',')
        .next()
        .map(str::trim)
        .unwrap_or("");
    // Trailing term may itself be a call like cityHash64(distinct_id);
    // re-attach the paren stripped above if the term has an open paren.
    let tail = if tail.matches('(').count() > tail.matches(')').count() {
        format!("{})", tail)
    } else {
        tail.to_string()
    };

    if tail != sample_expr {
        return Err(GriddleError::Config(format!(
            "sample key '{}' is not the trailing ORDER BY term '{}'",
            sample_expr, tail
        )));
    }
    Ok(())
}
