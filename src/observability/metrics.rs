//! # Metrics Collection
//!
//! Prometheus counters for authentication outcomes.

use crate::config::ObservabilityConfig;
use crate::errors::{ClassgateError, Result};
use metrics::{counter, describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// Outcome labels recorded on `auth_authentications_total`.
pub const AUTHENTICATION_OUTCOMES: &[&str] = &[
    "success",
    "missing_token",
    "malformed",
    "invalid_token",
    "not_found",
    "forbidden",
    "error",
];

/// Metrics recorder that tracks application metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Record authentication attempt outcome
    pub fn record_authentication(&self, status: &str) {
        counter!("auth_authentications_total").increment(1);
        counter!("auth_authentications_total", "status" => status.to_string()).increment(1);
    }

    /// Record a password login attempt
    pub fn record_login(&self, success: bool) {
        let status = if success { "success" } else { "failure" };
        counter!("auth_logins_total", "status" => status).increment(1);
    }

    /// Record a newly issued token
    pub fn record_token_issued(&self) {
        counter!("auth_tokens_issued_total").increment(1);
    }

    /// Register baseline auth metrics so Prometheus exports appear before events occur.
    pub fn register_auth_metrics(&self) {
        describe_counter!(
            "auth_authentications_total",
            Unit::Count,
            "Authentication attempts grouped by outcome"
        );
        describe_counter!("auth_logins_total", Unit::Count, "Password logins grouped by outcome");
        describe_counter!("auth_tokens_issued_total", Unit::Count, "Number of tokens issued");

        counter!("auth_tokens_issued_total").absolute(0);
        counter!("auth_logins_total", "status" => "success").absolute(0);
        counter!("auth_logins_total", "status" => "failure").absolute(0);
        for status in AUTHENTICATION_OUTCOMES {
            counter!("auth_authentications_total", "status" => *status).absolute(0);
        }
    }
}

/// Initialize the Prometheus exporter when a metrics port is configured
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    let Some(metrics_addr) = config.metrics_bind_address() else {
        return Ok(());
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        ClassgateError::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name)
        .install()
        .map_err(|e| {
            ClassgateError::config(format!("Failed to initialize metrics exporter: {}", e))
        })?;

    MetricsRecorder::new().register_auth_metrics();

    info!(metrics_addr = %metrics_addr, "Metrics collection initialized");
    Ok(())
}

/// Record authentication attempt outcome on the global recorder
pub fn record_authentication(status: &str) {
    MetricsRecorder.record_authentication(status);
}

/// Record a password login attempt on the global recorder
pub fn record_login(success: bool) {
    MetricsRecorder.record_login(success);
}

/// Record token issuance on the global recorder
pub fn record_token_issued() {
    MetricsRecorder.record_token_issued();
}
