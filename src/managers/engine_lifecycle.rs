// EngineLifecycleManager: single owner of the engine handle
//
// Single Responsibility: engine resource creation/destruction and command forwarding
// Runs inside the controller's exclusion domain; never shared across threads

use std::sync::Arc;

use log::{debug, info, warn};

use crate::engine::backend::{EngineBackend, EngineHandle};
use crate::error::{log_synth_error, ErrorCode, SynthError};
use crate::synth::{CommandOutput, SynthCommand};
use crate::telemetry::{EventPublisher, TelemetryEventKind};

/// Whether an engine resource currently exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Absent,
    Live,
}

/// Two-state machine around one engine resource
///
/// Single Responsibility: engine handle lifecycle
///
/// This manager handles:
/// - Lazy creation of the engine on first use (`ensure_live`)
/// - Destruction on lifecycle pause, idempotently
/// - Forwarding commands against the live handle only
/// - Dropping a handle the engine reports as unusable
///
/// Every method takes `&mut self`, so exclusive access is a precondition
/// enforced by the borrow checker rather than a lock. The controller keeps
/// the manager on its worker thread.
///
/// # Example
/// ```ignore
/// let mut manager = EngineLifecycleManager::new(LoggingEngineBackend::new());
/// manager.execute(SynthCommand::Play)?;   // creates, then plays
/// manager.on_pause();                     // destroys
/// ```
pub struct EngineLifecycleManager<B: EngineBackend> {
    backend: B,
    handle: Option<EngineHandle>,
    events: Option<Arc<EventPublisher>>,
}

impl<B: EngineBackend> EngineLifecycleManager<B> {
    /// Create a manager in the `Absent` state.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            handle: None,
            events: None,
        }
    }

    /// Publish lifecycle transitions and command outcomes to `events`.
    pub fn with_events(mut self, events: Arc<EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> EngineState {
        if self.handle.is_some() {
            EngineState::Live
        } else {
            EngineState::Absent
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Make sure an engine resource exists
    ///
    /// # Returns
    /// * `Ok(EngineHandle)` - The live handle (newly created or existing)
    /// * `Err(SynthError::ResourceCreationFailed)` - `create()` failed; state stays `Absent`
    pub fn ensure_live(&mut self) -> Result<EngineHandle, SynthError> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }

        match self.backend.create() {
            Ok(handle) => {
                info!(
                    "[EngineLifecycle] Created engine {} via {} backend",
                    handle,
                    self.backend.name()
                );
                self.handle = Some(handle);
                self.emit(TelemetryEventKind::EngineCreated {
                    handle: handle.as_raw(),
                });
                Ok(handle)
            }
            Err(err) => {
                let err = match err {
                    err @ SynthError::ResourceCreationFailed { .. } => err,
                    other => SynthError::ResourceCreationFailed {
                        reason: other.message(),
                    },
                };
                log_synth_error(&err, "ensure_live");
                self.emit(TelemetryEventKind::EngineCreateFailed {
                    reason: err.message(),
                });
                Err(err)
            }
        }
    }

    /// Host came to the foreground.
    pub fn on_resume(&mut self) -> Result<(), SynthError> {
        self.ensure_live().map(|_| ())
    }

    /// Host went to the background
    ///
    /// Destroys the live engine, if any. A failing `destroy()` is logged and
    /// the handle is still forgotten, so the next use starts from a fresh
    /// engine instead of reusing a half-released one.
    pub fn on_pause(&mut self) {
        let Some(handle) = self.handle.take() else {
            debug!("[EngineLifecycle] Pause with no engine, nothing to release");
            return;
        };

        match self.backend.destroy(handle) {
            Ok(()) => {
                info!("[EngineLifecycle] Destroyed engine {}", handle);
                self.emit(TelemetryEventKind::EngineDestroyed {
                    handle: handle.as_raw(),
                });
            }
            Err(err) => {
                warn!(
                    "[EngineLifecycle] destroy({}) failed, treating engine as released: {}",
                    handle,
                    err.message()
                );
                self.emit(TelemetryEventKind::EngineDestroyFailed {
                    handle: handle.as_raw(),
                    reason: err.message(),
                });
            }
        }
    }

    /// Forward one command, creating the engine first if needed
    ///
    /// # Arguments
    /// * `command` - Control call to issue
    ///
    /// # Returns
    /// * `Ok(CommandOutput)` - Engine accepted the call
    /// * `Err(SynthError)` - Creation or the call itself failed
    ///
    /// # Errors
    /// - `ResourceCreationFailed` when no engine could be created
    /// - `HandleInvalid` when the engine rejected the handle; the manager
    ///   returns to `Absent` without calling `destroy()`
    /// - Any other backend error, with the handle kept
    pub fn execute(&mut self, command: SynthCommand) -> Result<CommandOutput, SynthError> {
        let handle = self.ensure_live()?;

        match command.apply(&mut self.backend, handle) {
            Ok(output) => {
                self.emit(TelemetryEventKind::CommandForwarded { command });
                Ok(output)
            }
            Err(err) => {
                log_synth_error(&err, command.operation());
                if err.invalidates_handle() {
                    self.invalidate(handle, command.operation());
                }
                self.emit(TelemetryEventKind::CommandFailed {
                    command,
                    code: err.code(),
                });
                Err(err)
            }
        }
    }

    /// Final teardown when the owning controller goes away.
    pub fn shutdown(&mut self) {
        self.on_pause();
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    fn invalidate(&mut self, handle: EngineHandle, operation: &str) {
        if self.handle == Some(handle) {
            warn!(
                "[EngineLifecycle] Engine {} rejected during {}(), dropping handle",
                handle, operation
            );
            self.handle = None;
            self.emit(TelemetryEventKind::HandleInvalidated {
                handle: handle.as_raw(),
                operation: operation.to_string(),
            });
        }
    }

    fn emit(&self, kind: TelemetryEventKind) {
        if let Some(events) = &self.events {
            events.publish(kind);
        }
    }
}
