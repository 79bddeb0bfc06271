//! Inbound share deliveries over NATS
//!
//! Every message on the inbound subject is one delivery, routed on its own.

use crate::dispatch::{DispatchSink, InboundSource};
use crate::error::RouterError;
use crate::metrics::RouterMetrics;
use crate::share::{InboundRequest, ShareRouter};
use async_nats::Client;
use futures_util::StreamExt as _;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument as _};
use uuid::Uuid;

/// One NATS message payload as an inbound source
pub struct NatsDelivery<'a> {
    payload: Option<&'a [u8]>,
}

impl<'a> NatsDelivery<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            payload: Some(payload),
        }
    }
}

impl InboundSource for NatsDelivery<'_> {
    fn read_inbound(&mut self) -> Option<InboundRequest> {
        let payload = self.payload.take()?;

        if payload.is_empty() {
            return None;
        }

        match serde_json::from_slice(payload) {
            Ok(request) => Some(request),
            Err(e) => {
                warn!(error = %e, bytes = payload.len(), "Undecodable inbound share request");
                None
            }
        }
    }
}

/// Subscribe to `subject` and route every delivery until the subscription ends
pub async fn run_subscription<D>(
    client: &Client,
    subject: &str,
    router: &ShareRouter,
    sink: &D,
    metrics: &RouterMetrics,
) -> Result<(), RouterError>
where
    D: DispatchSink + ?Sized,
{
    let mut subscriber = client
        .subscribe(subject.to_string())
        .await
        .map_err(|e| RouterError::NatsSubscribeFailed {
            subject: subject.to_string(),
            source: Box::new(e),
        })?;

    info!(subject, "Listening for inbound share requests");

    while let Some(message) = subscriber.next().await {
        let delivery_id = Uuid::new_v4();
        let span = info_span!("delivery", %delivery_id, subject = %message.subject);

        metrics.record_received();
        let start = Instant::now();
        let mut delivery = NatsDelivery::new(&message.payload);

        match router.route(&mut delivery, sink).instrument(span).await {
            Ok(outcome) => metrics.record_outcome(&outcome, start.elapsed()),
            Err(e) => {
                metrics.record_failure(&e);
                warn!(%delivery_id, error = %e, "Share delivery failed");
            }
        }
    }

    info!(subject, "Inbound subscription ended");
    Ok(())
}
