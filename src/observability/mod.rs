//! # Observability Infrastructure
//!
//! Structured logging and Prometheus metrics for the classgate service.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_config_info};
pub use metrics::{init_metrics, record_authentication, MetricsRecorder};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize logging and metrics from configuration
pub fn init_observability(config: &ObservabilityConfig) -> Result<()> {
    init_logging(&config.log_level, config.json_logging)?;
    init_metrics(config)?;

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        metrics_enabled = config.metrics_port.is_some(),
        "Observability initialized"
    );

    Ok(())
}
