// Process-wide synthesizer entry points
// Blocking functions used by the Android JNI bridge and other non-async hosts

use once_cell::sync::OnceCell;

use crate::config::{AppConfig, SynthImplementation};
use crate::engine::SynthController;
use crate::error::{log_synth_error, SynthError};
use crate::managers::EngineState;
use crate::synth::{CommandOutput, SynthCommand, Waveform};

/// Global controller instance
///
/// Created on first use from `AppConfig::load_platform()`. A failed start is
/// not cached, so the next call retries.
static CONTROLLER: OnceCell<SynthController> = OnceCell::new();

fn controller() -> Result<&'static SynthController, SynthError> {
    CONTROLLER.get_or_try_init(|| start_controller(&AppConfig::load_platform()))
}

/// Start the controller behind the native bridge
///
/// The bridge exists to drive an engine, so a configuration selecting the
/// engine-less logging implementation is rejected; hosts wanting that stub
/// use it on their side of the bridge.
///
/// # Returns
/// * `Ok(SynthController)` - Controller with the configured backend
/// * `Err(SynthError::InvalidState)` - Configuration selects the logging implementation
/// * `Err(SynthError::BackendUnavailable)` - Native backend requested but not compiled in
fn start_controller(config: &AppConfig) -> Result<SynthController, SynthError> {
    let result = match config.synthesizer.implementation {
        SynthImplementation::Controller => SynthController::from_config(config),
        SynthImplementation::Logging => Err(SynthError::InvalidState {
            details: "native bridge requires the controller implementation, \
                      configuration selects logging"
                .to_string(),
        }),
    };
    result.map_err(|err| {
        log_synth_error(&err, "api_controller");
        err
    })
}

fn execute(command: SynthCommand) -> Result<CommandOutput, SynthError> {
    controller()?.execute_blocking(command)
}

/// Get the version of the synthesizer library
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Host came to the foreground
///
/// Creates the engine if it does not exist yet.
///
/// # Returns
/// * `Ok(())` - Engine is live
/// * `Err(SynthError::ResourceCreationFailed)` - Engine could not be created; retried on next use
pub fn resume() -> Result<(), SynthError> {
    controller()?.resume_blocking()
}

/// Host went to the background
///
/// Releases the engine. Safe to call when no engine exists.
pub fn pause() -> Result<(), SynthError> {
    controller()?.pause_blocking()
}

pub fn play() -> Result<(), SynthError> {
    execute(SynthCommand::Play).map(|_| ())
}

pub fn stop() -> Result<(), SynthError> {
    execute(SynthCommand::Stop).map(|_| ())
}

pub fn is_playing() -> Result<bool, SynthError> {
    execute(SynthCommand::IsPlaying).map(CommandOutput::is_playing)
}

/// Forward a frequency in Hertz; the engine clamps out-of-range values
pub fn set_frequency(frequency_hz: f32) -> Result<(), SynthError> {
    execute(SynthCommand::SetFrequency { hz: frequency_hz }).map(|_| ())
}

/// Forward a volume in decibels; the engine clamps out-of-range values
pub fn set_volume(volume_db: f32) -> Result<(), SynthError> {
    execute(SynthCommand::SetVolume { db: volume_db }).map(|_| ())
}

pub fn set_waveform(waveform: Waveform) -> Result<(), SynthError> {
    execute(SynthCommand::SetWaveform { waveform }).map(|_| ())
}

/// Engine state of the global controller (for diagnostics)
pub fn engine_state() -> Result<EngineState, SynthError> {
    controller()?.state_blocking()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;

    #[test]
    fn test_logging_implementation_is_rejected() {
        let mut config = AppConfig::default();
        config.synthesizer.implementation = SynthImplementation::Logging;

        assert!(matches!(
            start_controller(&config),
            Err(SynthError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_controller_implementation_starts() {
        let mut config = AppConfig::default();
        config.synthesizer.backend = BackendKind::Logging;

        let controller = start_controller(&config).unwrap();
        controller.resume_blocking().unwrap();
        assert_eq!(controller.state_blocking().unwrap(), EngineState::Live);
    }

    // One test drives the global controller so ordering stays deterministic.
    #[test]
    fn test_global_controller_lifecycle() {
        assert!(!get_version().is_empty());

        pause().unwrap();
        assert_eq!(engine_state().unwrap(), EngineState::Absent);

        resume().unwrap();
        assert_eq!(engine_state().unwrap(), EngineState::Live);

        set_waveform(Waveform::Triangle).unwrap();
        set_frequency(261.63).unwrap();
        set_volume(-6.0).unwrap();
        play().unwrap();
        assert!(is_playing().unwrap());

        pause().unwrap();
        assert_eq!(engine_state().unwrap(), EngineState::Absent);
        // A recreated engine starts stopped.
        assert!(!is_playing().unwrap());
        stop().unwrap();
    }
}
