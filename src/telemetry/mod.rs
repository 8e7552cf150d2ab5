//! Controller telemetry.
//!
//! The worker publishes every lifecycle transition and command outcome on a
//! bounded broadcast channel. Slow subscribers lag and lose old events; the
//! worker never waits on them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::broadcast;

pub mod events;

pub use events::{TelemetryEvent, TelemetryEventKind};

/// Stamps and publishes [`TelemetryEvent`]s.
pub struct EventPublisher {
    tx: broadcast::Sender<TelemetryEvent>,
    sequence: AtomicU64,
    start_instant: Instant,
}

impl EventPublisher {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self {
            tx,
            sequence: AtomicU64::new(0),
            start_instant: Instant::now(),
        }
    }

    pub fn publish(&self, kind: TelemetryEventKind) {
        let event = TelemetryEvent {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            timestamp_ms: self.start_instant.elapsed().as_millis() as u64,
            kind,
        };
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_assigns_increasing_sequence() {
        let publisher = EventPublisher::new(8);
        let mut rx = publisher.subscribe();

        publisher.publish(TelemetryEventKind::EngineCreated { handle: 1 });
        publisher.publish(TelemetryEventKind::EngineDestroyed { handle: 1 });

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(second.kind, TelemetryEventKind::EngineDestroyed { handle: 1 });
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = EventPublisher::new(16);
        publisher.publish(TelemetryEventKind::ControllerShutdown);
    }

    #[test]
    fn test_event_json_shape() {
        let kind = TelemetryEventKind::EngineCreated { handle: 3 };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"type":"engine_created","payload":{"handle":3}}"#);
    }
}
