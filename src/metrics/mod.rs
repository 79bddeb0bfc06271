//! Prometheus metrics module
//!
//! Routing counters and dispatch latency for the share router service.

use crate::error::RouterError;
use crate::share::{RoutingOutcome, ShareKind};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;

/// Router metrics collector
#[derive(Clone)]
pub struct RouterMetrics {
    handle: Arc<PrometheusHandle>,
}

impl RouterMetrics {
    /// Install the process-wide Prometheus recorder. Call once at startup.
    pub fn install() -> Result<Self, RouterError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| RouterError::MetricsInstall(e.to_string()))?;

        Self::register_metrics();

        Ok(Self {
            handle: Arc::new(handle),
        })
    }

    /// Register metric descriptions
    fn register_metrics() {
        describe_counter!(
            "share_requests_received_total",
            Unit::Count,
            "Total inbound share deliveries"
        );
        describe_counter!(
            "share_requests_forwarded_total",
            Unit::Count,
            "Share requests dispatched to the entry point"
        );
        describe_counter!(
            "share_requests_ignored_total",
            Unit::Count,
            "Share deliveries that produced no forward request"
        );
        describe_counter!(
            "share_dispatch_failures_total",
            Unit::Count,
            "Forward requests the dispatch sink could not deliver"
        );

        describe_histogram!(
            "share_dispatch_duration_seconds",
            Unit::Seconds,
            "Time to classify and dispatch one delivery"
        );

        describe_gauge!(
            "share_nats_connected",
            Unit::Count,
            "NATS connection status (1=connected, 0=disconnected)"
        );
    }

    /// Record a delivery received
    pub fn record_received(&self) {
        counter!("share_requests_received_total").increment(1);
    }

    /// Record a routed delivery
    pub fn record_outcome(&self, outcome: &RoutingOutcome, duration: Duration) {
        let (name, label, value) = outcome_labels(outcome);
        counter!(name, label => value).increment(1);

        if outcome.forward_request().is_some() {
            histogram!("share_dispatch_duration_seconds").record(duration.as_secs_f64());
        }
    }

    /// Record a failed dispatch
    pub fn record_failure(&self, error: &RouterError) {
        counter!(
            "share_dispatch_failures_total",
            "error_type" => error.error_type_label()
        )
        .increment(1);
    }

    /// Set NATS connection status
    pub fn set_nats_connected(&self, connected: bool) {
        gauge!("share_nats_connected").set(if connected { 1.0 } else { 0.0 });
    }

    /// Render metrics in Prometheus format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Counter name and label pair for an outcome
fn outcome_labels(outcome: &RoutingOutcome) -> (&'static str, &'static str, &'static str) {
    match outcome {
        RoutingOutcome::Forward(request) => (
            "share_requests_forwarded_total",
            "kind",
            ShareKind::of(&request.action, request.content_type.as_deref()).label(),
        ),
        RoutingOutcome::Ignore { reason } => {
            ("share_requests_ignored_total", "reason", reason.label())
        }
    }
}
