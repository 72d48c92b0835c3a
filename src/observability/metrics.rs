//! Metrics collection.
//!
//! # Metrics
//! - `router_decisions_total` (counter): routing decisions by terminal state
//! - `build_duration_seconds` (histogram): wall time of one build run
//! - `build_routes_total` (counter): routes compiled, by group
//! - `cache_behavior_triggers_discarded_total` (counter): reserved triggers
//!   dropped from user configuration

use std::time::Duration;

pub fn record_route_decision(state: &'static str) {
    metrics::counter!("router_decisions_total", "state" => state).increment(1);
}

pub fn record_build_duration(elapsed: Duration) {
    metrics::histogram!("build_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_routes(group: &'static str, count: usize) {
    metrics::counter!("build_routes_total", "group" => group).increment(count as u64);
}

pub fn record_discarded_trigger(path_pattern: &str) {
    metrics::counter!(
        "cache_behavior_triggers_discarded_total",
        "path_pattern" => path_pattern.to_owned()
    )
    .increment(1);
}
