//! Statistics request decoding and the computation capability seam.
//!
//! The analysis algorithms themselves are a black box behind
//! [`StatisticsProvider`]; this module owns the query-class discriminator,
//! the typed parameter shapes, and the per-class cache TTLs.

pub mod provider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::error::{GriddleError, Result};

pub use provider::EventCountProvider;

/// Statistics query classes served by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryClass {
    FeatureFlagInterval,
    EndUserInterval,
    ExperimentResult,
}

impl QueryClass {
    /// Resolve the endpoint discriminator. Unknown classes are rejected
    /// before any cache or computation work happens.
    pub fn from_event_class(event_class: &str) -> Result<Self> {
        match event_class {
            "featureflag" => Ok(QueryClass::FeatureFlagInterval),
            "enduser" => Ok(QueryClass::EndUserInterval),
            "experiment" => Ok(QueryClass::ExperimentResult),
            other => Err(GriddleError::UnsupportedEventClass(other.to_string())),
        }
    }

    /// Cache TTL for this class: short for high-churn interval statistics,
    /// longer for expensive experiment analysis.
    pub fn ttl(&self) -> Duration {
        match self {
            QueryClass::FeatureFlagInterval | QueryClass::EndUserInterval => {
                Duration::from_secs(1)
            }
            QueryClass::ExperimentResult => Duration::from_secs(10),
        }
    }
}

/// Interval statistics over one feature flag's evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalParams {
    pub env_id: String,
    #[serde(default)]
    pub flag_key: String,
    #[serde(default)]
    pub interval_type: Option<String>,
    /// Window bounds, epoch milliseconds. Zero means unbounded.
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Interval statistics over end-user actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndUserParams {
    pub env_id: String,
    #[serde(default)]
    pub interval_type: Option<String>,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Parameters of one experiment analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentParams {
    pub env_id: String,
    #[serde(default)]
    pub expt_id: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub start_expt_time: i64,
    #[serde(default)]
    pub end_expt_time: i64,
    #[serde(default)]
    pub baseline_variation: Option<String>,
    #[serde(default)]
    pub variations: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A statistics request, tagged by query class with its typed parameters.
#[derive(Debug, Clone)]
pub enum StatisticsRequest {
    FeatureFlagInterval(IntervalParams),
    EndUserInterval(EndUserParams),
    ExperimentResult(ExperimentParams),
}

impl StatisticsRequest {
    /// Decode a raw request payload for the given class. The raw bytes,
    /// not this decoded form, are what the cache fingerprints.
    pub fn decode(class: QueryClass, payload: &[u8]) -> Result<Self> {
        match class {
            QueryClass::FeatureFlagInterval => {
                Ok(StatisticsRequest::FeatureFlagInterval(serde_json::from_slice(payload)?))
            }
            QueryClass::EndUserInterval => {
                Ok(StatisticsRequest::EndUserInterval(serde_json::from_slice(payload)?))
            }
            QueryClass::ExperimentResult => {
                Ok(StatisticsRequest::ExperimentResult(serde_json::from_slice(payload)?))
            }
        }
    }

    pub fn class(&self) -> QueryClass {
        match self {
            StatisticsRequest::FeatureFlagInterval(_) => QueryClass::FeatureFlagInterval,
            StatisticsRequest::EndUserInterval(_) => QueryClass::EndUserInterval,
            StatisticsRequest::ExperimentResult(_) => QueryClass::ExperimentResult,
        }
    }
}

/// The black-box analysis capability: takes structured parameters,
/// returns an opaque result value.
#[async_trait]
pub trait StatisticsProvider: Send + Sync {
    async fn compute(&self, request: &StatisticsRequest) -> Result<serde_json::Value>;
}
