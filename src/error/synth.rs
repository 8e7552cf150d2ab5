// Synthesizer error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Synthesizer error code constants exposed across the FFI boundary
///
/// Single source of truth for the numeric codes reported to the host
/// (JNI exceptions, CLI output, telemetry).
///
/// Error code range: 1001-1007
pub struct SynthErrorCodes {}

impl SynthErrorCodes {
    /// Engine resource could not be created
    pub const RESOURCE_CREATION_FAILED: i32 = 1001;

    /// A forwarded engine call failed
    pub const ENGINE_CALL_FAILED: i32 = 1002;

    /// The engine rejected the handle as unusable
    pub const HANDLE_INVALID: i32 = 1003;

    /// Programming-contract violation at the engine boundary
    pub const INVALID_STATE: i32 = 1004;

    /// Controller worker is no longer running
    pub const CONTROLLER_CLOSED: i32 = 1005;

    /// Controller worker thread could not be started
    pub const WORKER_SPAWN_FAILED: i32 = 1006;

    /// Configured backend is not compiled into this build
    pub const BACKEND_UNAVAILABLE: i32 = 1007;
}

/// Log a synthesizer error with structured context
///
/// Logs the error code, component and message together with the call site
/// (`context`) that raised it. Never panics.
pub fn log_synth_error(err: &SynthError, context: &str) {
    error!(
        "Synth error in {}: code={}, component=SynthController, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Synthesizer errors
///
/// These cover engine resource creation, forwarded engine calls and the
/// controller's own worker lifecycle.
///
/// Error code range: 1001-1007
#[derive(Debug, Clone, PartialEq)]
pub enum SynthError {
    /// Engine `create()` failed; the controller stays absent and retries later
    ResourceCreationFailed { reason: String },

    /// A forwarded engine call failed; the handle is kept
    EngineCallFailed { operation: String, reason: String },

    /// The engine reports the handle itself is unusable
    HandleInvalid { operation: String },

    /// Boundary contract violated (destroy of an unknown handle and similar)
    InvalidState { details: String },

    /// The controller has shut down
    ControllerClosed,

    /// The controller worker thread could not be spawned
    WorkerSpawnFailed { reason: String },

    /// The configured backend is not available in this build
    BackendUnavailable { backend: String },
}

impl SynthError {
    /// Whether this failure means the engine handle must be dropped.
    pub fn invalidates_handle(&self) -> bool {
        matches!(self, SynthError::HandleInvalid { .. })
    }
}

impl ErrorCode for SynthError {
    fn code(&self) -> i32 {
        match self {
            SynthError::ResourceCreationFailed { .. } => {
                SynthErrorCodes::RESOURCE_CREATION_FAILED
            }
            SynthError::EngineCallFailed { .. } => SynthErrorCodes::ENGINE_CALL_FAILED,
            SynthError::HandleInvalid { .. } => SynthErrorCodes::HANDLE_INVALID,
            SynthError::InvalidState { .. } => SynthErrorCodes::INVALID_STATE,
            SynthError::ControllerClosed => SynthErrorCodes::CONTROLLER_CLOSED,
            SynthError::WorkerSpawnFailed { .. } => SynthErrorCodes::WORKER_SPAWN_FAILED,
            SynthError::BackendUnavailable { .. } => SynthErrorCodes::BACKEND_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            SynthError::ResourceCreationFailed { reason } => {
                format!("Failed to create synthesizer engine: {}", reason)
            }
            SynthError::EngineCallFailed { operation, reason } => {
                format!("Engine call {}() failed: {}", operation, reason)
            }
            SynthError::HandleInvalid { operation } => {
                format!("Engine handle rejected during {}()", operation)
            }
            SynthError::InvalidState { details } => {
                format!("Invalid engine state: {}", details)
            }
            SynthError::ControllerClosed => {
                "Synthesizer controller has shut down".to_string()
            }
            SynthError::WorkerSpawnFailed { reason } => {
                format!("Failed to start controller worker: {}", reason)
            }
            SynthError::BackendUnavailable { backend } => {
                format!("Engine backend '{}' is not compiled into this build", backend)
            }
        }
    }
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SynthError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SynthError {}

impl From<std::io::Error> for SynthError {
    fn from(err: std::io::Error) -> Self {
        SynthError::WorkerSpawnFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synth_error_codes() {
        assert_eq!(
            SynthError::ResourceCreationFailed {
                reason: "test".to_string()
            }
            .code(),
            SynthErrorCodes::RESOURCE_CREATION_FAILED
        );
        assert_eq!(
            SynthError::EngineCallFailed {
                operation: "play".to_string(),
                reason: "test".to_string()
            }
            .code(),
            SynthErrorCodes::ENGINE_CALL_FAILED
        );
        assert_eq!(
            SynthError::HandleInvalid {
                operation: "play".to_string()
            }
            .code(),
            SynthErrorCodes::HANDLE_INVALID
        );
        assert_eq!(
            SynthError::InvalidState {
                details: "test".to_string()
            }
            .code(),
            SynthErrorCodes::INVALID_STATE
        );
        assert_eq!(
            SynthError::ControllerClosed.code(),
            SynthErrorCodes::CONTROLLER_CLOSED
        );
        assert_eq!(
            SynthError::BackendUnavailable {
                backend: "native".to_string()
            }
            .code(),
            SynthErrorCodes::BACKEND_UNAVAILABLE
        );
    }

    #[test]
    fn test_synth_error_messages() {
        let err = SynthError::ResourceCreationFailed {
            reason: "no audio device".to_string(),
        };
        assert_eq!(
            err.message(),
            "Failed to create synthesizer engine: no audio device"
        );

        let err = SynthError::EngineCallFailed {
            operation: "set_volume".to_string(),
            reason: "stream closed".to_string(),
        };
        assert!(err.message().contains("set_volume()"));

        let err = SynthError::ControllerClosed;
        assert!(err.message().contains("shut down"));
    }

    #[test]
    fn test_synth_error_display() {
        let err = SynthError::ControllerClosed;
        let display = format!("{}", err);
        assert!(display.contains("SynthError"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn test_only_handle_invalid_invalidates() {
        assert!(SynthError::HandleInvalid {
            operation: "stop".to_string()
        }
        .invalidates_handle());
        assert!(!SynthError::EngineCallFailed {
            operation: "stop".to_string(),
            reason: "busy".to_string()
        }
        .invalidates_handle());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("thread limit reached");
        let synth_err: SynthError = io_err.into();
        match synth_err {
            SynthError::WorkerSpawnFailed { reason } => {
                assert!(reason.contains("thread limit reached"));
            }
            _ => panic!("Expected WorkerSpawnFailed"),
        }
    }
}
