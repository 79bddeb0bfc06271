//! NATS forward request publisher
//!
//! Publishes forward requests to a JetStream subject and waits for the ack.

use crate::dispatch::DispatchSink;
use crate::error::RouterError;
use crate::share::ForwardRequest;
use async_nats::connection::State;
use async_nats::jetstream::{self, Context as JsContext};
use async_nats::Client;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stream holding forward requests
pub const FORWARD_STREAM: &str = "SHARE_FORWARD";

/// Dispatch sink backed by NATS JetStream
pub struct NatsDispatcher {
    client: Client,
    jetstream: JsContext,
    subject: String,
    closed: AtomicBool,
    messages_published: AtomicU64,
    publish_failures: AtomicU64,
}

impl NatsDispatcher {
    /// Connect to NATS server
    pub async fn connect(servers: &str, subject: impl Into<String>) -> Result<Arc<Self>, RouterError> {
        info!(servers, "Connecting to NATS");

        let client = async_nats::connect(servers)
            .await
            .map_err(|e| RouterError::NatsConnectionFailed(Box::new(e)))?;

        let jetstream = jetstream::new(client.clone());

        info!("Connected to NATS JetStream");

        Ok(Arc::new(Self {
            client,
            jetstream,
            subject: subject.into(),
            closed: AtomicBool::new(false),
            messages_published: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
        }))
    }

    /// Underlying client, for subscribing to inbound deliveries
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn jetstream(&self) -> &JsContext {
        &self.jetstream
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Check if connected: the client's live connection state, unless we
    /// closed it ourselves
    pub fn is_connected(&self) -> bool {
        is_live(self.closed.load(Ordering::SeqCst), self.client.connection_state())
    }

    /// Get total messages published
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    /// Get total publish failures
    pub fn publish_failures(&self) -> u64 {
        self.publish_failures.load(Ordering::Relaxed)
    }

    async fn publish(&self, payload: Vec<u8>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ack = self
            .jetstream
            .publish(self.subject.clone(), payload.into())
            .await?
            .await?;

        debug!(
            subject = %self.subject,
            stream = %ack.stream,
            seq = ack.sequence,
            "Forward request published"
        );
        Ok(())
    }

    /// Graceful shutdown
    pub async fn close(&self) {
        info!("Closing NATS connection");
        self.closed.store(true, Ordering::SeqCst);
        if let Err(e) = self.client.flush().await {
            warn!(error = %e, "Failed to flush NATS connection");
        }
    }
}

#[async_trait]
impl DispatchSink for NatsDispatcher {
    async fn dispatch(&self, request: &ForwardRequest) -> Result<(), RouterError> {
        let payload = serde_json::to_vec(request)
            .map_err(|source| RouterError::SerializationFailed { source })?;

        match self.publish(payload).await {
            Ok(()) => {
                self.messages_published.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(source) => {
                self.publish_failures.fetch_add(1, Ordering::Relaxed);
                warn!(subject = %self.subject, error = %source, "Failed to publish forward request");
                Err(RouterError::dispatch_failed(request.action.as_str(), source))
            }
        }
    }
}

fn is_live(closed: bool, state: State) -> bool {
    !closed && state == State::Connected
}

/// Ensure the forward stream exists and captures `subject`
///
/// Memory storage with a short max age: the entry point either consumes a
/// forward request promptly or the share flow is stale anyway.
pub async fn ensure_forward_stream(js: &JsContext, subject: &str) -> Result<(), RouterError> {
    use async_nats::jetstream::stream::{Config, RetentionPolicy, StorageType};

    let config = Config {
        name: FORWARD_STREAM.to_string(),
        subjects: vec![subject.to_string()],
        retention: RetentionPolicy::Limits,
        max_age: std::time::Duration::from_secs(300),
        storage: StorageType::Memory,
        ..Default::default()
    };

    js.get_or_create_stream(config)
        .await
        .map_err(|e| RouterError::NatsStreamSetupFailed {
            stream: FORWARD_STREAM.to_string(),
            source: Box::new(e),
        })?;

    info!(stream = FORWARD_STREAM, subject, "Forward stream configured");
    Ok(())
}
