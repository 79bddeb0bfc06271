//! Share Router
//!
//! Receives inbound share requests from other apps and turns each one into a
//! single normalized forward request for the app entry point:
//! - Classifies by action and content type, merging the extras bag
//! - Ignores MAIN relaunches that carry nothing to share
//! - Dispatches through a host-provided sink (NATS JetStream or stdout)

pub mod config;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod metrics;
pub mod nats;
pub mod share;

pub use dispatch::{DispatchSink, InboundSource};
pub use error::RouterError;
pub use share::{
    ContentRef, ExtraValue, ForwardFlags, ForwardRequest, IgnoreReason, InboundRequest,
    RoutingOutcome, ShareAction, ShareKind, ShareRouter,
};
