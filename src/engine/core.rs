//! SynthController: lifecycle-bound access to the synthesizer engine.
//!
//! Each controller owns one worker thread and one bounded request queue.
//! The worker owns the [`EngineLifecycleManager`] and therefore the engine
//! handle; commands and lifecycle signals reach it only as queued requests,
//! so creation, destruction and every forwarded call are serialized without
//! a lock held across an await. Callers suspend on the queue and on a
//! oneshot reply while the worker makes the (blocking) engine call.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use futures::future::{BoxFuture, FutureExt};
use futures::Stream;
use log::{debug, info, warn};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::config::{AppConfig, BackendKind, ControllerConfig};
use crate::engine::backend::{EngineBackend, LoggingEngineBackend};
#[cfg(feature = "native_engine")]
use crate::engine::backend::NativeEngineBackend;
use crate::error::{log_synth_error, SynthError};
use crate::managers::{EngineLifecycleManager, EngineState};
use crate::synth::{AudioSynthesizer, CommandOutput, SynthCommand, Waveform};
use crate::telemetry::{EventPublisher, TelemetryEvent, TelemetryEventKind};

/// Work item for the controller worker.
enum Request {
    Command {
        command: SynthCommand,
        reply: oneshot::Sender<Result<CommandOutput, SynthError>>,
    },
    Resume {
        reply: oneshot::Sender<Result<(), SynthError>>,
    },
    Pause {
        reply: oneshot::Sender<()>,
    },
    State {
        reply: oneshot::Sender<EngineState>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Lifecycle controller in front of one engine resource.
///
/// Implements [`AudioSynthesizer`] for control surfaces and accepts the
/// host's `resume`/`pause` signals. The `*_blocking` variants serve hosts
/// that call in from plain threads (JNI); they panic if used from inside an
/// async runtime, like every tokio blocking call.
///
/// Dropping the controller closes its queue; the worker then destroys any
/// live engine and exits.
pub struct SynthController {
    requests: mpsc::Sender<Request>,
    events: Arc<EventPublisher>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SynthController {
    /// Start a controller whose worker builds its backend with `make_backend`.
    ///
    /// The backend is constructed on the worker thread and never leaves it,
    /// so it does not need to be `Send`.
    pub fn spawn<B, F>(make_backend: F, config: &ControllerConfig) -> Result<Self, SynthError>
    where
        B: EngineBackend + 'static,
        F: FnOnce() -> B + Send + 'static,
    {
        let (requests, rx) = mpsc::channel(config.request_queue_capacity.max(1));
        let events = Arc::new(EventPublisher::new(config.event_buffer));
        let worker_events = Arc::clone(&events);

        let worker = std::thread::Builder::new()
            .name(config.worker_thread_name.clone())
            .spawn(move || {
                let _span = tracing::info_span!("synth_worker").entered();
                let manager = EngineLifecycleManager::new(make_backend())
                    .with_events(Arc::clone(&worker_events));
                run_worker(manager, rx, worker_events);
            })
            .map_err(|err| {
                let err = SynthError::from(err);
                log_synth_error(&err, "spawn_controller");
                err
            })?;

        Ok(Self {
            requests,
            events,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Start a controller with the backend named in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, SynthError> {
        match config.synthesizer.backend {
            BackendKind::Logging => Self::spawn(LoggingEngineBackend::new, &config.controller),
            BackendKind::Native => Self::spawn_native(&config.controller),
        }
    }

    #[cfg(feature = "native_engine")]
    fn spawn_native(config: &ControllerConfig) -> Result<Self, SynthError> {
        Self::spawn(NativeEngineBackend::new, config)
    }

    #[cfg(not(feature = "native_engine"))]
    fn spawn_native(_config: &ControllerConfig) -> Result<Self, SynthError> {
        let err = SynthError::BackendUnavailable {
            backend: "native".to_string(),
        };
        log_synth_error(&err, "spawn_native");
        Err(err)
    }

    // ========================================================================
    // ASYNC API
    // ========================================================================

    /// Forward one command, creating the engine first if it is absent.
    pub async fn execute(&self, command: SynthCommand) -> Result<CommandOutput, SynthError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Command { command, reply }).await?;
        rx.await.map_err(|_| SynthError::ControllerClosed)?
    }

    /// Host moved to the foreground: make sure the engine exists.
    pub async fn on_resume(&self) -> Result<(), SynthError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Resume { reply }).await?;
        rx.await.map_err(|_| SynthError::ControllerClosed)?
    }

    /// Host moved to the background: release the engine.
    ///
    /// Waits behind any command already executing.
    pub async fn on_pause(&self) -> Result<(), SynthError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Pause { reply }).await?;
        rx.await.map_err(|_| SynthError::ControllerClosed)
    }

    /// Current engine state, observed in queue order.
    pub async fn state(&self) -> Result<EngineState, SynthError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::State { reply }).await?;
        rx.await.map_err(|_| SynthError::ControllerClosed)
    }

    /// Destroy the engine, stop the worker and wait for it to exit.
    ///
    /// Requests queued behind the shutdown fail with `ControllerClosed`.
    /// Every caller returns only after the worker thread has exited, including
    /// callers that race an in-progress shutdown. Calling this again is a no-op.
    pub async fn shutdown(&self) -> Result<(), SynthError> {
        let (reply, rx) = oneshot::channel();
        if self.requests.send(Request::Shutdown { reply }).await.is_ok() {
            // Dropped unanswered when another shutdown got there first.
            let _ = rx.await;
        }
        self.join_worker();
        Ok(())
    }

    // ========================================================================
    // BLOCKING API
    // ========================================================================

    pub fn execute_blocking(&self, command: SynthCommand) -> Result<CommandOutput, SynthError> {
        let (reply, rx) = oneshot::channel();
        self.send_blocking(Request::Command { command, reply })?;
        rx.blocking_recv().map_err(|_| SynthError::ControllerClosed)?
    }

    pub fn resume_blocking(&self) -> Result<(), SynthError> {
        let (reply, rx) = oneshot::channel();
        self.send_blocking(Request::Resume { reply })?;
        rx.blocking_recv().map_err(|_| SynthError::ControllerClosed)?
    }

    pub fn pause_blocking(&self) -> Result<(), SynthError> {
        let (reply, rx) = oneshot::channel();
        self.send_blocking(Request::Pause { reply })?;
        rx.blocking_recv().map_err(|_| SynthError::ControllerClosed)
    }

    pub fn state_blocking(&self) -> Result<EngineState, SynthError> {
        let (reply, rx) = oneshot::channel();
        self.send_blocking(Request::State { reply })?;
        rx.blocking_recv().map_err(|_| SynthError::ControllerClosed)
    }

    // ========================================================================
    // TELEMETRY
    // ========================================================================

    pub fn subscribe_events(&self) -> broadcast::Receiver<TelemetryEvent> {
        self.events.subscribe()
    }

    /// Telemetry as a stream; events missed by a lagging consumer are skipped.
    pub fn event_stream(&self) -> impl Stream<Item = TelemetryEvent> {
        BroadcastStream::new(self.events.subscribe()).filter_map(|event| match event {
            Ok(event) => Some(event),
            Err(err) => {
                warn!("[SynthController] Telemetry subscriber lagged: {}", err);
                None
            }
        })
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    async fn send(&self, request: Request) -> Result<(), SynthError> {
        self.requests
            .send(request)
            .await
            .map_err(|_| SynthError::ControllerClosed)
    }

    fn send_blocking(&self, request: Request) -> Result<(), SynthError> {
        self.requests
            .blocking_send(request)
            .map_err(|_| SynthError::ControllerClosed)
    }

    fn join_worker(&self) {
        // The guard stays held across the join so concurrent callers wait for it.
        let mut slot = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(worker) = slot.take() {
            if worker.join().is_err() {
                warn!("[SynthController] Worker thread panicked during shutdown");
            }
        }
    }

    async fn forward(&self, command: SynthCommand) -> Result<(), SynthError> {
        self.execute(command).await.map(|_| ())
    }
}

impl AudioSynthesizer for SynthController {
    fn play(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        self.forward(SynthCommand::Play).boxed()
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        self.forward(SynthCommand::Stop).boxed()
    }

    fn is_playing(&self) -> BoxFuture<'_, Result<bool, SynthError>> {
        async move {
            self.execute(SynthCommand::IsPlaying)
                .await
                .map(CommandOutput::is_playing)
        }
        .boxed()
    }

    fn set_frequency(&self, frequency_hz: f32) -> BoxFuture<'_, Result<(), SynthError>> {
        self.forward(SynthCommand::SetFrequency { hz: frequency_hz })
            .boxed()
    }

    fn set_volume(&self, volume_db: f32) -> BoxFuture<'_, Result<(), SynthError>> {
        self.forward(SynthCommand::SetVolume { db: volume_db }).boxed()
    }

    fn set_waveform(&self, waveform: Waveform) -> BoxFuture<'_, Result<(), SynthError>> {
        self.forward(SynthCommand::SetWaveform { waveform }).boxed()
    }

    fn on_resume(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        SynthController::on_resume(self).boxed()
    }

    fn on_pause(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        SynthController::on_pause(self).boxed()
    }

    fn shutdown(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        SynthController::shutdown(self).boxed()
    }

    fn telemetry(&self) -> Option<broadcast::Receiver<TelemetryEvent>> {
        Some(self.subscribe_events())
    }
}

/// Worker loop: drain requests in order until shutdown or until every
/// sender is gone, then tear the engine down.
fn run_worker<B: EngineBackend>(
    mut manager: EngineLifecycleManager<B>,
    mut rx: mpsc::Receiver<Request>,
    events: Arc<EventPublisher>,
) {
    info!(
        "[SynthController] Worker started with {} backend",
        manager.backend().name()
    );

    let mut shutdown_ack = None;
    while let Some(request) = rx.blocking_recv() {
        match request {
            Request::Command { command, reply } => {
                if reply.is_closed() {
                    debug!(
                        "[SynthController] Skipping {}(), caller went away",
                        command.operation()
                    );
                    events.publish(TelemetryEventKind::RequestAbandoned { command });
                    continue;
                }
                let _ = reply.send(manager.execute(command));
            }
            Request::Resume { reply } => {
                let _ = reply.send(manager.on_resume());
            }
            Request::Pause { reply } => {
                manager.on_pause();
                let _ = reply.send(());
            }
            Request::State { reply } => {
                let _ = reply.send(manager.state());
            }
            Request::Shutdown { reply } => {
                shutdown_ack = Some(reply);
                break;
            }
        }
    }

    // Queued requests fail with ControllerClosed once the receiver is gone.
    drop(rx);
    manager.shutdown();
    events.publish(TelemetryEventKind::ControllerShutdown);
    info!("[SynthController] Worker stopped");

    if let Some(ack) = shutdown_ack {
        let _ = ack.send(());
    }
}
