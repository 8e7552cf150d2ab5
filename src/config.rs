//! Configuration management for the synthesizer
//!
//! Selects which command-interface implementation and engine backend the
//! process uses, tunes the controller's queues, and carries the parameter set
//! replayed onto a fresh engine. Loaded from JSON so a desktop run can switch
//! backends without recompiling.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::synth::SynthParameters;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub synthesizer: SynthesizerConfig,
    pub controller: ControllerConfig,
}

/// Which implementation serves the command interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthImplementation {
    /// Lifecycle controller in front of an engine backend
    Controller,
    /// Logging stub with no engine, for exercising a control surface
    Logging,
}

/// Engine resource behind the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Native wavetable engine (requires the `native_engine` feature)
    Native,
    /// In-memory engine that logs every call
    Logging,
}

impl Default for BackendKind {
    fn default() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(feature = "native_engine")] {
                BackendKind::Native
            } else {
                BackendKind::Logging
            }
        }
    }
}

/// Synthesizer selection and start-up parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    pub implementation: SynthImplementation,
    pub backend: BackendKind,
    /// Parameters the host replays after resuming
    pub initial_parameters: SynthParameters,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            implementation: SynthImplementation::Controller,
            backend: BackendKind::default(),
            initial_parameters: SynthParameters::default(),
        }
    }
}

/// Controller worker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Requests that may wait for the worker before callers suspend
    pub request_queue_capacity: usize,
    /// Telemetry events retained for slow subscribers
    pub event_buffer: usize,
    /// Name of the worker thread (shows up in debuggers and logcat)
    pub worker_thread_name: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            request_queue_capacity: 64,
            event_buffer: 128,
            worker_thread_name: "synth-controller".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration. A missing or malformed file logs a warning
    /// and yields the defaults; absent fields take their default values.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration on Android
    ///
    /// APK assets are not reachable without an AssetManager, so Android
    /// always runs with the compiled-in defaults.
    #[cfg(target_os = "android")]
    pub fn load_android() -> Self {
        log::info!("[Config] Using default configuration on Android");
        Self::default()
    }

    /// Load configuration for non-Android platforms
    #[cfg(not(target_os = "android"))]
    pub fn load() -> Self {
        Self::load_from_file("assets/synth_config.json")
    }

    /// Load configuration the way the current platform expects.
    pub fn load_platform() -> Self {
        #[cfg(target_os = "android")]
        {
            Self::load_android()
        }

        #[cfg(not(target_os = "android"))]
        {
            Self::load()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Waveform;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(
            config.synthesizer.implementation,
            SynthImplementation::Controller
        );
        assert_eq!(config.controller.request_queue_capacity, 64);
        assert_eq!(config.controller.event_buffer, 128);
        assert_eq!(config.synthesizer.initial_parameters.frequency_hz, 440.0);
        assert_eq!(config.synthesizer.initial_parameters.waveform, Waveform::Sine);
    }

    #[cfg(not(feature = "native_engine"))]
    #[test]
    fn test_default_backend_without_native_engine() {
        assert_eq!(BackendKind::default(), BackendKind::Logging);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "synthesizer": { "implementation": "logging" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.synthesizer.implementation, SynthImplementation::Logging);
        assert_eq!(config.synthesizer.backend, BackendKind::default());
        assert_eq!(config.controller, ControllerConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = AppConfig::default();
        config.synthesizer.initial_parameters.waveform = Waveform::Sawtooth;
        config.controller.worker_thread_name = "synth-test".to_string();

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("does/not/exist/synth_config.json");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "synth_config_invalid_{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").unwrap();

        let config = AppConfig::load_from_file(&path);
        assert_eq!(config, AppConfig::default());

        let _ = fs::remove_file(&path);
    }
}
