use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Map, Value};
use tracing::warn;

const METRIC_NAMESPACE: &str = "OrderRouter/Pipeline";
const METRIC_STAGE_LATENCY: &str = "StageLatencyMs";
const METRIC_ROUTE_COMPLETION: &str = "RouteCompletion";
const METRIC_QUOTER_GAS_P99: &str = "ApproxGasUsedPerSuccessCall";
const DIM_STAGE: &str = "Stage";
const DIM_STATUS: &str = "Status";

#[derive(Debug, Clone, Copy)]
pub enum RouteOutcome {
    Planned,
    NoRoute,
    Failed,
}

impl RouteOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::NoRoute => "no_route",
            Self::Failed => "failed",
        }
    }
}

pub fn emit_stage_latency(stage: &'static str, millis: u64) {
    emit_value_metric(
        METRIC_STAGE_LATENCY,
        "Milliseconds",
        millis,
        &[(DIM_STAGE, json!(stage))],
    );
}

pub fn emit_route_completion(outcome: RouteOutcome) {
    emit_value_metric(
        METRIC_ROUTE_COMPLETION,
        "Count",
        1,
        &[(DIM_STATUS, json!(outcome.as_str()))],
    );
}

/// Pooled gas statistic from the batched quoter. Unused by the pipeline
/// itself; published so capacity dashboards can track simulated call cost.
pub fn emit_quoter_gas_p99(gas_used: u64) {
    emit_value_metric(METRIC_QUOTER_GAS_P99, "Count", gas_used, &[]);
}

fn emit_value_metric(metric_name: &str, unit: &str, value: u64, dimensions: &[(&str, Value)]) {
    // Emit CloudWatch Embedded Metric Format as a raw JSON log line.
    // Tracing's JSON wrapper would prevent EMF extraction, so we write directly to stdout.
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as i64)
        .unwrap_or(0);

    let dimension_names: Vec<&str> = dimensions.iter().map(|(name, _)| *name).collect();
    let aws = json!({
        "Timestamp": timestamp_ms,
        "CloudWatchMetrics": [{
            "Namespace": METRIC_NAMESPACE,
            "Dimensions": [dimension_names],
            "Metrics": [{
                "Name": metric_name,
                "Unit": unit,
            }],
        }],
    });

    let mut event = Map::new();
    event.insert("_aws".to_string(), aws);
    event.insert(metric_name.to_string(), json!(value));
    for (name, value) in dimensions {
        event.insert((*name).to_string(), value.clone());
    }

    match serde_json::to_string(&Value::Object(event)) {
        Ok(line) => println!("{line}"),
        Err(err) => warn!(error = %err, metric = metric_name, "Failed to serialize EMF metric"),
    }
}
