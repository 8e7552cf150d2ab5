//! Testability harness utilities.
//!
//! The recording backend stands in for the engine resource in unit tests,
//! integration tests and the CLI stress harness. It is compiled into every
//! build so the `synth_cli stress` command can verify a release binary.

pub mod recording_backend;

pub use recording_backend::{BoundaryCall, CallRecorder, RecordingBackend};
