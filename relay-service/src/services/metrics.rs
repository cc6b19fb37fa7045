//! Prometheus metrics for relay-service.
//!
//! The recorder is installed once at startup; until then every `metrics`
//! macro is a no-op, which is what the tests rely on.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// How a single relayed request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Success,
    Incomplete,
    ProviderError,
}

impl RelayOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayOutcome::Success => "success",
            RelayOutcome::Incomplete => "incomplete",
            RelayOutcome::ProviderError => "provider_error",
        }
    }
}

/// Install the global Prometheus recorder. Must be called once at startup.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| {
            AppError::InternalError(anyhow::anyhow!(
                "failed to install Prometheus recorder: {}",
                e
            ))
        })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to set metrics handle: already initialized"
        ))
    })
}

/// Render the Prometheus exposition text, if the recorder is installed.
pub fn get_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

/// Record one provider round trip.
pub fn record_provider_call(provider: &'static str, outcome: RelayOutcome, elapsed: Duration) {
    counter!(
        "relay_provider_requests_total",
        "provider" => provider,
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!("relay_provider_latency_seconds", "provider" => provider)
        .record(elapsed.as_secs_f64());
}

/// Record a provider failure by kind.
pub fn record_provider_error(provider: &'static str, kind: &'static str) {
    counter!(
        "relay_provider_errors_total",
        "provider" => provider,
        "kind" => kind
    )
    .increment(1);
}

/// Record tokens billed for one generation.
pub fn record_token_usage(provider: &'static str, tokens: u64) {
    counter!("relay_provider_tokens_total", "provider" => provider).increment(tokens);
}
