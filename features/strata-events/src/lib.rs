//! Strata Events lets components notify each other without knowing who listens.
//!
//! 1. EventPublisher: Registers subscribers per event type and publishes events
//! 2. Dispatcher: Delivers every notification on a worker pool, isolating failures
//!
//! Delivery is fire and forget. There is no ordering between subscribers and no back-pressure.

pub mod dispatcher;
pub mod errors;
pub mod publisher;

pub use dispatcher::Dispatcher;
pub use errors::EventError;
pub use publisher::EventPublisher;

/// Errors returned by subscribers
pub type DynError = Box<dyn std::error::Error + Send + Sync>;
