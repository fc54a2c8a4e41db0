//! Metrics collection.
//!
//! # Metrics
//! - `deployer_provider_constructions_total` (counter): signing providers built, by network
//! - `deployer_deployments_total` (counter): finished attempts, by network and outcome
//! - `deployer_confirmations_observed` (gauge): confirmations seen by the last poll, by network

use metrics::{counter, gauge};

pub fn record_provider_constructed(network: &str) {
    counter!("deployer_provider_constructions_total", "network" => network.to_string()).increment(1);
}

pub fn record_deployment_outcome(network: &str, outcome: &'static str) {
    counter!(
        "deployer_deployments_total",
        "network" => network.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_confirmations(network: &str, confirmations: u32) {
    gauge!("deployer_confirmations_observed", "network" => network.to_string())
        .set(confirmations as f64);
}
