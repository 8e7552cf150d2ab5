//! Telemetry event types published by the synthesizer controller.

use serde::{Deserialize, Serialize};

use crate::synth::SynthCommand;

/// Timestamped controller event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryEvent {
    /// Monotonic per-controller sequence number, starting at 0.
    pub sequence: u64,
    /// Milliseconds since the controller was created.
    pub timestamp_ms: u64,
    pub kind: TelemetryEventKind,
}

/// Lifecycle transitions and command outcomes.
///
/// Handles are reported by their raw identifier only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum TelemetryEventKind {
    EngineCreated { handle: u64 },
    EngineCreateFailed { reason: String },
    EngineDestroyed { handle: u64 },
    EngineDestroyFailed { handle: u64, reason: String },
    HandleInvalidated { handle: u64, operation: String },
    CommandForwarded { command: SynthCommand },
    CommandFailed { command: SynthCommand, code: i32 },
    RequestAbandoned { command: SynthCommand },
    ControllerShutdown,
}
