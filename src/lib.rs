// Audio Synthesizer Core - Rust lifecycle controller
// Serializes engine creation, teardown and commands behind one worker queue

// Module declarations
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod managers;
pub mod synth;
pub mod telemetry;
pub mod testing;

#[cfg(target_os = "android")]
mod android;

// Re-exports for convenience
pub use config::{AppConfig, BackendKind, ControllerConfig, SynthImplementation};
pub use engine::{EngineBackend, EngineHandle, SynthController};
pub use error::{SynthError, SynthErrorCodes};
pub use managers::EngineState;
pub use synth::{
    apply_parameters, build_synthesizer, AudioSynthesizer, SynthCommand, SynthParameters,
    Waveform,
};

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Install the process-wide tracing subscriber.
///
/// Safe to call more than once; only the first call has an effect. `log`
/// records from the library are bridged into tracing.
#[cfg(target_os = "android")]
pub fn init_logging() {
    use tracing_subscriber::prelude::*;

    LOGGING_INIT.call_once(|| match tracing_android::layer("AudioSynthesizer") {
        Ok(layer) => {
            let _ = tracing_subscriber::registry().with(layer).try_init();
        }
        Err(err) => eprintln!("failed to create logcat layer: {err}"),
    });
}

/// Install the process-wide tracing subscriber.
///
/// Safe to call more than once; only the first call has an effect. The
/// filter comes from `RUST_LOG` and defaults to `info`.
#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    LOGGING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// JNI_OnLoad is called when the native library is loaded by Android
#[cfg(target_os = "android")]
#[no_mangle]
pub extern "system" fn JNI_OnLoad(
    _vm: jni::JavaVM,
    _reserved: *mut std::ffi::c_void,
) -> jni::sys::jint {
    init_logging();
    log::info!("JNI_OnLoad called - audio synthesizer {}", api::get_version());

    // Return JNI version
    jni::sys::JNI_VERSION_1_6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        log::info!("logging initialised twice without panicking");
    }
}
