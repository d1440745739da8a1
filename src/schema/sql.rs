use crate::event::Event;
use crate::schema::topology::EventTableTopology;

/// Column list shared by every insert shape and the ingestion chain.
pub const EVENT_COLUMNS: &str =
    "uuid, distinct_id, env_id, event, properties, timestamp, _timestamp, _offset";

/// Escape a value for use inside a single-quoted SQL literal.
/// Backslashes count as escapes in the columnar store's literals.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

fn event_values(event: &Event) -> String {
    let properties = serde_json::to_string(&event.properties).unwrap_or_else(|_| "{}".to_string());
    format!(
        "('{}', '{}', '{}', '{}', '{}', fromUnixTimestamp64Milli({}), now(), 0)",
        event.uuid,
        escape(&event.distinct_id),
        escape(&event.env_id),
        escape(&event.event),
        escape(&properties),
        event.timestamp
    )
}

/// Single-row insert targeting the topology's write table.
pub fn insert_event_sql(topology: &EventTableTopology, event: &Event) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        topology.write_table,
        EVENT_COLUMNS,
        event_values(event)
    )
}

/// Multi-row insert targeting the topology's write table. Batch size is
/// caller-controlled; no internal limit beyond what the store accepts in
/// one statement.
pub fn bulk_insert_events_sql(topology: &EventTableTopology, events: &[Event]) -> String {
    let rows: Vec<String> = events.iter().map(event_values).collect();
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        topology.write_table,
        EVENT_COLUMNS,
        rows.join(", ")
    )
}

/// Explicit merge of the local event table. An operational action, not a
/// timer-driven loop.
pub fn optimize_events_sql(topology: &EventTableTopology) -> String {
    if topology.cluster_clause.is_empty() {
        format!("OPTIMIZE TABLE {} FINAL", super::topology::EVENTS_TABLE)
    } else {
        format!(
            "OPTIMIZE TABLE {} {} FINAL",
            super::topology::EVENTS_TABLE,
            topology.cluster_clause
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_doubles_quotes() {
        assert_eq!(escape("o'brien"), "o''brien");
        assert_eq!(escape(r"a\b"), r"a\\b");
    }
}
