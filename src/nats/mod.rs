//! NATS integration
//!
//! Inbound share requests arrive on a core NATS subject; forward requests are
//! published to a JetStream subject.

mod publisher;
mod subscriber;

pub use publisher::{ensure_forward_stream, NatsDispatcher};
pub use subscriber::{run_subscription, NatsDelivery};
