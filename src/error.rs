//! Domain error types for the share router
//!
//! main.rs is the ONLY module allowed to use anyhow::Result (process boundary).
//! All library code returns Result<T, RouterError>.
//!
//! An action/content-type pair no branch recognizes is not an error: it is
//! forwarded through the generic pass-through path and never shows up here.

use crate::share::ForwardRequest;
use thiserror::Error;

/// Router domain errors
///
/// Every variant carries structured context fields for diagnostics.
///
/// Example log output:
/// ```text
/// RouterError::DispatchFailed { action: "android.intent.action.SEND", .. }
/// → "dispatch failed for android.intent.action.SEND"
/// ```
#[derive(Error, Debug)]
pub enum RouterError {
    /// Inbound delivery absent or undecodable (recovered as an Ignore outcome)
    #[error("invalid inbound request: {reason}")]
    InvalidInput { reason: String },

    /// Dispatch sink could not deliver the forward request
    ///
    /// `request` is the request as built, attached by the router so a host
    /// can log or re-dispatch it. Sinks leave it empty.
    #[error("dispatch failed for {action}")]
    DispatchFailed {
        action: String,
        request: Option<Box<ForwardRequest>>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// NATS connection failed
    #[error("NATS connection failed")]
    NatsConnectionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JetStream stream could not be created or looked up
    #[error("NATS stream setup failed for stream '{stream}'")]
    NatsStreamSetupFailed {
        stream: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// NATS subscription failed for a specific subject
    #[error("NATS subscribe failed for subject '{subject}'")]
    NatsSubscribeFailed {
        subject: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Forward request serialization failed
    #[error("forward request serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Local host I/O failed (stdin/stdout adapters)
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Configuration error (environment variable missing or invalid)
    #[error("configuration error: {0}")]
    Config(String),

    /// Prometheus recorder could not be installed
    #[error("metrics recorder install failed: {0}")]
    MetricsInstall(String),
}

impl RouterError {
    /// Wrap any sink-side error as a dispatch failure for `action`
    pub fn dispatch_failed(
        action: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DispatchFailed {
            action: action.into(),
            request: None,
            source: source.into(),
        }
    }

    /// Forward request a failed dispatch left undelivered, if attached
    pub fn undelivered_request(&self) -> Option<&ForwardRequest> {
        match self {
            Self::DispatchFailed {
                request: Some(request),
                ..
            } => Some(request),
            _ => None,
        }
    }

    /// Returns a static label string suitable for Prometheus metrics.
    pub fn error_type_label(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::DispatchFailed { .. } => "dispatch",
            Self::NatsConnectionFailed(_) => "nats_connection",
            Self::NatsStreamSetupFailed { .. } => "nats_stream",
            Self::NatsSubscribeFailed { .. } => "nats_subscribe",
            Self::SerializationFailed { .. } => "serialization",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::MetricsInstall(_) => "metrics_install",
        }
    }
}
