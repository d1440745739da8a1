use crate::config::AnalyticsConfig;
use crate::schema::topology::{
    EventTableTopology, DISTRIBUTED_EVENTS_TABLE, EVENTS_MV, EVENTS_TABLE,
    KAFKA_EVENTS_QUEUE_TABLE,
};

/// Columns as stored. The queue table omits the ingest metadata pair;
/// those arrive as broker virtual columns and are mapped by the view.
const STORED_COLUMNS: &str = "\
    uuid UUID,
    distinct_id VARCHAR,
    env_id VARCHAR,
    event VARCHAR,
    properties VARCHAR,
    timestamp DateTime64(3, 'UTC'),
    _timestamp DateTime,
    _offset UInt64";

const QUEUE_COLUMNS: &str = "\
    uuid UUID,
    distinct_id VARCHAR,
    env_id VARCHAR,
    event VARCHAR,
    properties VARCHAR,
    timestamp DateTime64(3, 'UTC')";

/// One DDL statement plus the table it creates, so existence checks never
/// have to parse SQL.
#[derive(Debug, Clone)]
pub struct DdlStatement {
    pub name: &'static str,
    pub table: String,
    pub sql: String,
}

/// The clustered-mode table chain, already topologically ordered: the
/// queue table precedes its materialized view, and the local table
/// precedes both the view and the distributed proxy. Callers execute the
/// statements in the returned order.
#[derive(Debug, Clone)]
pub struct IngestionChain {
    pub statements: Vec<DdlStatement>,
}

/// Build the ingestion chain for clustered mode.
pub fn build_chain(topology: &EventTableTopology, config: &AnalyticsConfig) -> IngestionChain {
    let mut statements = vec![
        DdlStatement {
            name: "kafka-events-queue",
            table: KAFKA_EVENTS_QUEUE_TABLE.to_string(),
            sql: kafka_queue_table_sql(topology, config),
        },
        DdlStatement {
            name: "events-local",
            table: EVENTS_TABLE.to_string(),
            sql: local_table_sql(topology, config),
        },
        DdlStatement {
            name: "events-materialized-view",
            table: EVENTS_MV.to_string(),
            sql: materialized_view_sql(topology),
        },
    ];

    if config.columnar.replication {
        statements.push(DdlStatement {
            name: "distributed-events",
            table: DISTRIBUTED_EVENTS_TABLE.to_string(),
            sql: distributed_table_sql(topology, config),
        });
    }

    IngestionChain { statements }
}

fn with_cluster(clause: &str) -> String {
    if clause.is_empty() {
        String::new()
    } else {
        format!(" {}", clause)
    }
}

fn kafka_queue_table_sql(topology: &EventTableTopology, config: &AnalyticsConfig) -> String {
    let topic = format!("{}events", config.columnar.kafka_prefix);
    format!(
        "CREATE TABLE IF NOT EXISTS {table}{cluster}\n(\n{columns}\n)\nENGINE = Kafka('{hosts}', '{topic}', 'griddle-events', 'JSONEachRow')",
        table = KAFKA_EVENTS_QUEUE_TABLE,
        cluster = with_cluster(&topology.cluster_clause),
        columns = QUEUE_COLUMNS,
        hosts = config.columnar.kafka_hosts,
        topic = topic,
    )
}

fn local_table_sql(topology: &EventTableTopology, config: &AnalyticsConfig) -> String {
    // ReplacingMergeTree keyed on _timestamp keeps re-written uuids from
    // surfacing as duplicate rows on the read path.
    let engine = if config.columnar.replication {
        "ReplicatedReplacingMergeTree('/clickhouse/tables/{shard}/events', '{replica}', _timestamp)"
            .to_string()
    } else {
        "ReplacingMergeTree(_timestamp)".to_string()
    };
    format!(
        "CREATE TABLE IF NOT EXISTS {table}{cluster}\n(\n{columns}\n)\nENGINE = {engine}\n{clauses}",
        table = EVENTS_TABLE,
        cluster = with_cluster(&topology.cluster_clause),
        columns = STORED_COLUMNS,
        engine = engine,
        clauses = topology.merge_tree_clauses(),
    )
}

fn materialized_view_sql(topology: &EventTableTopology) -> String {
    // Pass-through shape mapping only; _timestamp and _offset are the
    // broker's virtual columns.
    format!(
        "CREATE MATERIALIZED VIEW IF NOT EXISTS {view}{cluster}\nTO {target}\nAS SELECT uuid, distinct_id, env_id, event, properties, timestamp, _timestamp, _offset\nFROM {source}",
        view = EVENTS_MV,
        cluster = with_cluster(&topology.cluster_clause),
        target = EVENTS_TABLE,
        source = KAFKA_EVENTS_QUEUE_TABLE,
    )
}

fn distributed_table_sql(topology: &EventTableTopology, config: &AnalyticsConfig) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table}{cluster}\n(\n{columns}\n)\nENGINE = Distributed('{cluster_name}', '{database}', '{local}', sipHash64(distinct_id))",
        table = DISTRIBUTED_EVENTS_TABLE,
        cluster = with_cluster(&topology.cluster_clause),
        columns = STORED_COLUMNS,
        cluster_name = config.columnar.cluster,
        database = config.columnar.database,
        local = EVENTS_TABLE,
    )
}
