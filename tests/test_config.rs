//! Environment configuration tests. Serialized because they mutate
//! process-wide environment variables.

use serial_test::serial;

use griddle::config::{AnalyticsConfig, DeploymentMode};

fn clear_griddle_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("GRIDDLE_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn defaults_select_standalone_mode() {
    clear_griddle_env();
    let cfg = AnalyticsConfig::from_env();

    assert_eq!(cfg.mode, DeploymentMode::Standalone);
    assert!(!cfg.mode.is_clustered());
    assert_eq!(cfg.document.events_collection, "Events");
    assert_eq!(cfg.document.max_pool_size, 100);
}

#[test]
#[serial]
fn pro_flag_selects_clustered_mode() {
    clear_griddle_env();
    std::env::set_var("GRIDDLE_PRO", "true");
    let cfg = AnalyticsConfig::from_env();
    clear_griddle_env();

    assert_eq!(cfg.mode, DeploymentMode::Clustered);
    assert!(cfg.columnar.replication, "replication defaults on in clustered mode");
    assert!(cfg.columnar.kafka_ingestion);
}

#[test]
#[serial]
fn boolean_variables_accept_common_spellings() {
    clear_griddle_env();
    for value in ["1", "true", "YES", "on"] {
        std::env::set_var("GRIDDLE_PRO", value);
        assert_eq!(AnalyticsConfig::from_env().mode, DeploymentMode::Clustered, "value {:?}", value);
    }
    std::env::set_var("GRIDDLE_PRO", "0");
    assert_eq!(AnalyticsConfig::from_env().mode, DeploymentMode::Standalone);
    clear_griddle_env();
}

#[test]
#[serial]
fn columnar_settings_come_from_the_environment() {
    clear_griddle_env();
    std::env::set_var("GRIDDLE_PRO", "true");
    std::env::set_var("GRIDDLE_CLICKHOUSE_URL", "http://ch:8123");
    std::env::set_var("GRIDDLE_CLICKHOUSE_CLUSTER", "c1");
    std::env::set_var("GRIDDLE_CLICKHOUSE_REPLICATION", "false");
    std::env::set_var("GRIDDLE_KAFKA_PREFIX", "prod-");
    std::env::set_var("GRIDDLE_STORE_TIMEOUT_SECS", "5");
    let cfg = AnalyticsConfig::from_env();
    clear_griddle_env();

    assert_eq!(cfg.columnar.url, "http://ch:8123");
    assert_eq!(cfg.columnar.cluster, "c1");
    assert!(!cfg.columnar.replication);
    assert_eq!(cfg.columnar.kafka_prefix, "prod-");
    assert_eq!(cfg.columnar.request_timeout_secs, 5);
}

#[test]
#[serial]
fn malformed_numeric_variables_fall_back_to_defaults() {
    clear_griddle_env();
    std::env::set_var("GRIDDLE_MONGO_POOL_MAX", "not-a-number");
    let cfg = AnalyticsConfig::from_env();
    clear_griddle_env();

    assert_eq!(cfg.document.max_pool_size, 100);
}
