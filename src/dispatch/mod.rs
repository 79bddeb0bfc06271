//! Host collaborator boundary
//!
//! The router reads one inbound request from an [`InboundSource`] and hands
//! the resulting forward request to a [`DispatchSink`]. Both are provided by
//! the host; the router never retries a failed dispatch.

pub mod local;

use crate::error::RouterError;
use crate::share::{ForwardRequest, IgnoreReason, InboundRequest, RoutingOutcome, ShareKind, ShareRouter};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub use local::{ReaderSource, WriterSink};

/// Supplies one inbound request per delivery
pub trait InboundSource {
    /// None when the host delivered nothing usable
    fn read_inbound(&mut self) -> Option<InboundRequest>;
}

/// A request already in hand is a delivery of its own
impl InboundSource for Option<InboundRequest> {
    fn read_inbound(&mut self) -> Option<InboundRequest> {
        self.take()
    }
}

/// Routes a forward request to the app entry point, honoring its flags
#[async_trait]
pub trait DispatchSink: Send + Sync {
    async fn dispatch(&self, request: &ForwardRequest) -> Result<(), RouterError>;
}

#[async_trait]
impl<T: DispatchSink + ?Sized> DispatchSink for Arc<T> {
    async fn dispatch(&self, request: &ForwardRequest) -> Result<(), RouterError> {
        (**self).dispatch(request).await
    }
}

impl ShareRouter {
    /// Handle one delivery: read once, classify, dispatch a Forward outcome.
    ///
    /// A missing delivery is an `Ignore`, not an error. A sink failure is
    /// returned as [`RouterError::DispatchFailed`] carrying the request as
    /// built; it is not retried.
    pub async fn route<S, D>(&self, source: &mut S, sink: &D) -> Result<RoutingOutcome, RouterError>
    where
        S: InboundSource + ?Sized,
        D: DispatchSink + ?Sized,
    {
        let Some(request) = source.read_inbound() else {
            warn!("No inbound request delivered");
            return Ok(RoutingOutcome::ignore(IgnoreReason::NoInboundRequest));
        };

        let forward = match self.classify(&request) {
            RoutingOutcome::Forward(forward) => forward,
            RoutingOutcome::Ignore { reason } => {
                info!(action = %request.action, %reason, "Share ignored");
                return Ok(RoutingOutcome::ignore(reason));
            }
        };

        let kind = ShareKind::of(&forward.action, forward.content_type.as_deref());

        if let Err(e) = sink.dispatch(&forward).await {
            let source: Box<dyn std::error::Error + Send + Sync> = match e {
                RouterError::DispatchFailed { source, .. } => source,
                other => Box::new(other),
            };
            return Err(RouterError::DispatchFailed {
                action: forward.action.to_string(),
                request: Some(Box::new(forward)),
                source,
            });
        }

        info!(
            action = %forward.action,
            kind = kind.label(),
            "Share forwarded"
        );

        Ok(RoutingOutcome::Forward(forward))
    }
}
