//! Tests for the ingestion path builder: statement ordering, DDL shape,
//! and the insert statement shapes.

use griddle::config::AnalyticsConfig;
use griddle::schema::{build_chain, sql, topology};

mod common;
use common::make_event;

#[test]
fn chain_is_topologically_ordered() {
    let cfg = AnalyticsConfig::clustered();
    let topo = topology::compile(&cfg).unwrap();
    let chain = build_chain(&topo, &cfg);

    let names: Vec<&str> = chain.statements.iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        vec![
            "kafka-events-queue",
            "events-local",
            "events-materialized-view",
            "distributed-events",
        ]
    );
}

#[test]
fn no_distributed_statement_without_replication() {
    let mut cfg = AnalyticsConfig::clustered();
    cfg.columnar.replication = false;
    let topo = topology::compile(&cfg).unwrap();
    let chain = build_chain(&topo, &cfg);

    assert_eq!(chain.statements.len(), 3);
    assert!(chain.statements.iter().all(|s| s.table != "distributed_events"));
}

#[test]
fn queue_table_uses_broker_engine_and_prefixed_topic() {
    let mut cfg = AnalyticsConfig::clustered();
    cfg.columnar.kafka_hosts = "broker-a:9092,broker-b:9092".to_string();
    cfg.columnar.kafka_prefix = "prod-".to_string();
    let topo = topology::compile(&cfg).unwrap();
    let chain = build_chain(&topo, &cfg);

    let queue = &chain.statements[0];
    assert!(queue.sql.contains("ENGINE = Kafka('broker-a:9092,broker-b:9092', 'prod-events'"));
    assert!(queue.sql.contains("JSONEachRow"));
}

#[test]
fn local_table_uses_topology_clauses_verbatim() {
    let cfg = AnalyticsConfig::clustered();
    let topo = topology::compile(&cfg).unwrap();
    let chain = build_chain(&topo, &cfg);

    let local = &chain.statements[1];
    assert!(local.sql.contains(&topo.partition_by));
    assert!(local.sql.contains(&topo.order_by));
    assert!(local.sql.contains(&topo.sample_by));
    assert!(local.sql.contains("ReplicatedReplacingMergeTree"));
}

#[test]
fn unreplicated_local_table_uses_plain_replacing_engine() {
    let mut cfg = AnalyticsConfig::clustered();
    cfg.columnar.replication = false;
    let topo = topology::compile(&cfg).unwrap();
    let chain = build_chain(&topo, &cfg);

    let local = &chain.statements[1];
    assert!(local.sql.contains("ENGINE = ReplacingMergeTree(_timestamp)"));
    assert!(!local.sql.contains("Replicated"));
}

#[test]
fn materialized_view_is_pass_through() {
    let cfg = AnalyticsConfig::clustered();
    let topo = topology::compile(&cfg).unwrap();
    let chain = build_chain(&topo, &cfg);

    let mv = &chain.statements[2];
    assert!(mv.sql.contains("TO events"));
    assert!(mv.sql.contains("FROM kafka_events_queue"));
    assert!(mv.sql.contains("_timestamp, _offset"));
}

#[test]
fn distributed_table_proxies_the_local_table() {
    let mut cfg = AnalyticsConfig::clustered();
    cfg.columnar.cluster = "c1".to_string();
    cfg.columnar.database = "analytics".to_string();
    let topo = topology::compile(&cfg).unwrap();
    let chain = build_chain(&topo, &cfg);

    let distributed = chain.statements.last().unwrap();
    assert!(distributed.sql.contains("ENGINE = Distributed('c1', 'analytics', 'events'"));
    assert!(distributed.sql.contains("ON CLUSTER c1"));
}

#[test]
fn bulk_insert_targets_write_table_with_one_row_per_event() {
    let cfg = AnalyticsConfig::clustered();
    let topo = topology::compile(&cfg).unwrap();
    let events = vec![
        make_event("env-1", "FlagValue"),
        make_event("env-1", "click"),
        make_event("env-2", "FlagValue"),
    ];

    let stmt = sql::bulk_insert_events_sql(&topo, &events);
    assert!(stmt.starts_with("INSERT INTO kafka_events_queue (uuid, distinct_id"));
    assert_eq!(stmt.matches("fromUnixTimestamp64Milli").count(), 3);
    assert_eq!(stmt.matches("now(), 0").count(), 3);
}

#[test]
fn insert_escapes_string_literals() {
    let cfg = AnalyticsConfig::clustered();
    let topo = topology::compile(&cfg).unwrap();
    let mut event = make_event("env-1", "user's click");
    event.distinct_id = "o'brien".to_string();

    let stmt = sql::insert_event_sql(&topo, &event);
    assert!(stmt.contains("o''brien"));
    assert!(stmt.contains("user''s click"));
}

#[test]
fn optimize_statement_respects_cluster_clause() {
    let mut cfg = AnalyticsConfig::clustered();
    cfg.columnar.cluster = "c1".to_string();
    let topo = topology::compile(&cfg).unwrap();
    assert_eq!(sql::optimize_events_sql(&topo), "OPTIMIZE TABLE events ON CLUSTER c1 FINAL");

    cfg.columnar.replication = false;
    let topo = topology::compile(&cfg).unwrap();
    assert_eq!(sql::optimize_events_sql(&topo), "OPTIMIZE TABLE events FINAL");
}
