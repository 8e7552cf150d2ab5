//! Command interface of the synthesizer.
//!
//! [`AudioSynthesizer`] is what a control surface talks to. Two
//! implementations exist: the lifecycle-managed
//! [`SynthController`](crate::engine::SynthController) and the engine-less
//! [`LoggingSynthesizer`]. [`build_synthesizer`] picks one from configuration.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::{AppConfig, SynthImplementation};
use crate::engine::SynthController;
use crate::error::{log_synth_error, SynthError};
use crate::telemetry::TelemetryEvent;

pub mod command;
pub mod logging;
pub mod waveform;

pub use command::{CommandOutput, SynthCommand};
pub use logging::LoggingSynthesizer;
pub use waveform::Waveform;

/// Control operations exposed to a control surface.
///
/// Every call returns a future: implementations may queue the call behind
/// lifecycle transitions, so callers must be able to suspend. Frequency and
/// volume values are forwarded untouched; range checks belong to the engine.
///
/// Hosts deliver their foreground/background signals through the same
/// object, so a configuration-selected implementation can be driven without
/// knowing which one it is.
pub trait AudioSynthesizer: Send + Sync {
    fn play(&self) -> BoxFuture<'_, Result<(), SynthError>>;
    fn stop(&self) -> BoxFuture<'_, Result<(), SynthError>>;
    fn is_playing(&self) -> BoxFuture<'_, Result<bool, SynthError>>;
    fn set_frequency(&self, frequency_hz: f32) -> BoxFuture<'_, Result<(), SynthError>>;
    fn set_volume(&self, volume_db: f32) -> BoxFuture<'_, Result<(), SynthError>>;
    fn set_waveform(&self, waveform: Waveform) -> BoxFuture<'_, Result<(), SynthError>>;

    /// Host moved to the foreground. No-op for implementations without an engine.
    fn on_resume(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        async { Ok(()) }.boxed()
    }

    /// Host moved to the background. No-op for implementations without an engine.
    fn on_pause(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        async { Ok(()) }.boxed()
    }

    /// Release everything before the host exits.
    fn shutdown(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        async { Ok(()) }.boxed()
    }

    /// Lifecycle telemetry, for implementations that publish any.
    fn telemetry(&self) -> Option<broadcast::Receiver<TelemetryEvent>> {
        None
    }
}

/// Tone parameters a control surface keeps and replays onto a fresh engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthParameters {
    pub frequency_hz: f32,
    pub volume_db: f32,
    pub waveform: Waveform,
}

impl Default for SynthParameters {
    fn default() -> Self {
        Self {
            frequency_hz: 440.0,
            volume_db: -12.0,
            waveform: Waveform::Sine,
        }
    }
}

/// Replay a full parameter set.
///
/// A recreated engine starts from its own defaults, so hosts call this after
/// resuming. Waveform goes first so the new frequency applies to the right
/// table.
pub async fn apply_parameters(
    synth: &dyn AudioSynthesizer,
    parameters: &SynthParameters,
) -> Result<(), SynthError> {
    synth.set_waveform(parameters.waveform).await?;
    synth.set_frequency(parameters.frequency_hz).await?;
    synth.set_volume(parameters.volume_db).await
}

/// Build the command-interface implementation selected by `config`
///
/// # Returns
/// * `Ok(Arc<dyn AudioSynthesizer>)` - Ready-to-use synthesizer
/// * `Err(SynthError::BackendUnavailable)` - Native backend requested but not compiled in
/// * `Err(SynthError::WorkerSpawnFailed)` - Controller worker could not start
pub fn build_synthesizer(config: &AppConfig) -> Result<Arc<dyn AudioSynthesizer>, SynthError> {
    match config.synthesizer.implementation {
        SynthImplementation::Logging => {
            info!("[Synth] Using logging synthesizer (no engine)");
            Ok(Arc::new(LoggingSynthesizer::new()))
        }
        SynthImplementation::Controller => {
            let controller = SynthController::from_config(config).map_err(|err| {
                log_synth_error(&err, "build_synthesizer");
                err
            })?;
            info!(
                "[Synth] Using controller with {:?} backend",
                config.synthesizer.backend
            );
            Ok(Arc::new(controller))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use crate::telemetry::TelemetryEventKind;

    #[tokio::test]
    async fn test_build_logging_implementation() {
        let mut config = AppConfig::default();
        config.synthesizer.implementation = SynthImplementation::Logging;

        let synth = build_synthesizer(&config).unwrap();
        synth.play().await.unwrap();
        assert!(synth.is_playing().await.unwrap());
    }

    #[tokio::test]
    async fn test_build_controller_with_logging_backend() {
        let mut config = AppConfig::default();
        config.synthesizer.backend = BackendKind::Logging;

        let synth = build_synthesizer(&config).unwrap();
        apply_parameters(synth.as_ref(), &SynthParameters::default())
            .await
            .unwrap();
        assert!(!synth.is_playing().await.unwrap());
    }

    #[tokio::test]
    async fn test_logging_implementation_ignores_lifecycle() {
        let mut config = AppConfig::default();
        config.synthesizer.implementation = SynthImplementation::Logging;

        let synth = build_synthesizer(&config).unwrap();
        assert!(synth.telemetry().is_none());

        synth.play().await.unwrap();
        synth.on_pause().await.unwrap();
        synth.on_resume().await.unwrap();
        // No engine was torn down, so the play flag survives the cycle.
        assert!(synth.is_playing().await.unwrap());
        synth.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_controller_implementation_reports_lifecycle() {
        let mut config = AppConfig::default();
        config.synthesizer.backend = BackendKind::Logging;

        let synth = build_synthesizer(&config).unwrap();
        let mut events = synth.telemetry().expect("controller publishes telemetry");

        synth.on_resume().await.unwrap();
        synth.on_pause().await.unwrap();
        synth.shutdown().await.unwrap();

        let kinds: Vec<TelemetryEventKind> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|event| event.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TelemetryEventKind::EngineCreated { handle: 1 },
                TelemetryEventKind::EngineDestroyed { handle: 1 },
                TelemetryEventKind::ControllerShutdown,
            ]
        );
        assert_eq!(synth.play().await, Err(SynthError::ControllerClosed));
    }

    #[cfg(not(feature = "native_engine"))]
    #[test]
    fn test_native_backend_unavailable() {
        let mut config = AppConfig::default();
        config.synthesizer.backend = BackendKind::Native;

        assert!(matches!(
            build_synthesizer(&config),
            Err(SynthError::BackendUnavailable { .. })
        ));
    }

    #[test]
    fn test_parameters_default() {
        let parameters = SynthParameters::default();
        assert_eq!(parameters.frequency_hz, 440.0);
        assert_eq!(parameters.volume_db, -12.0);
        assert_eq!(parameters.waveform, Waveform::Sine);
    }
}
