//! `EventPublisher` port adapter backed by the in-process [`EventBus`].

use std::sync::Arc;

use motivator_core::ports::EventPublisher;

use crate::bus::{EventBus, MotivationEvent};

/// Publishes engine events onto the shared bus. Best-effort by
/// construction: the bus drops events with no subscribers.
pub struct BusPublisher {
    bus: Arc<EventBus>,
}

impl BusPublisher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl EventPublisher for BusPublisher {
    fn publish(&self, topic: &str, payload: serde_json::Value) {
        tracing::info!(topic, "publishing event");
        self.bus
            .publish(MotivationEvent::new(topic).with_payload(payload));
    }
}
