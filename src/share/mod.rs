//! Share request handling module
//!
//! Provides the share data model and the classifier that turns one inbound
//! request into one routing outcome.

pub mod classify;
pub mod model;

pub use classify::{ShareKind, ShareRouter};
pub use model::{
    ContentRef, ExtraValue, Extras, ForwardFlags, ForwardRequest, IgnoreReason, InboundRequest,
    RoutingOutcome, ShareAction,
};
