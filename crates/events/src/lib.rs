//! In-process event bus and the engine's `EventPublisher` port adapter.

pub mod bus;
pub mod publisher;

pub use bus::{EventBus, MotivationEvent};
pub use publisher::BusPublisher;
