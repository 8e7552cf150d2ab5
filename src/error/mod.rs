// Error types for the audio synthesizer
//
// This module defines the error type surfaced by the synthesizer controller and
// its engine backends, with numeric error codes suitable for FFI communication.

mod synth;

pub use synth::{log_synth_error, SynthError, SynthErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the FFI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
