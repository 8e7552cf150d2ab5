use std::collections::HashMap;

use log::debug;

use crate::error::SynthError;
use crate::synth::Waveform;

use super::{EngineBackend, EngineHandle};

/// Parameters a simulated engine remembers between calls.
#[derive(Debug, Clone, PartialEq)]
struct SimulatedEngine {
    playing: bool,
    frequency_hz: f32,
    volume_db: f32,
    waveform: Waveform,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self {
            playing: false,
            frequency_hz: 440.0,
            volume_db: 0.0,
            waveform: Waveform::Sine,
        }
    }
}

/// Desktop stand-in for the native engine.
///
/// Logs every boundary call and keeps per-handle parameters in memory so the
/// controller can be driven end to end without audio hardware. State is lost
/// when a handle is destroyed, matching the real engine.
pub struct LoggingEngineBackend {
    next_id: u64,
    engines: HashMap<EngineHandle, SimulatedEngine>,
}

impl LoggingEngineBackend {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            engines: HashMap::new(),
        }
    }

    /// Number of engines currently allocated.
    pub fn live_engines(&self) -> usize {
        self.engines.len()
    }

    fn engine_mut(
        &mut self,
        handle: EngineHandle,
        operation: &str,
    ) -> Result<&mut SimulatedEngine, SynthError> {
        self.engines
            .get_mut(&handle)
            .ok_or_else(|| SynthError::HandleInvalid {
                operation: operation.to_string(),
            })
    }
}

impl Default for LoggingEngineBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for LoggingEngineBackend {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn create(&mut self) -> Result<EngineHandle, SynthError> {
        let handle =
            EngineHandle::from_raw(self.next_id).ok_or_else(|| SynthError::ResourceCreationFailed {
                reason: "handle space exhausted".to_string(),
            })?;
        self.next_id += 1;
        self.engines.insert(handle, SimulatedEngine::default());
        debug!("[LoggingEngine] create() -> {}", handle);
        Ok(handle)
    }

    fn destroy(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        debug!("[LoggingEngine] destroy({})", handle);
        self.engines
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| SynthError::InvalidState {
                details: format!("destroy of unknown handle {}", handle),
            })
    }

    fn play(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        debug!("[LoggingEngine] play({})", handle);
        self.engine_mut(handle, "play")?.playing = true;
        Ok(())
    }

    fn stop(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        debug!("[LoggingEngine] stop({})", handle);
        self.engine_mut(handle, "stop")?.playing = false;
        Ok(())
    }

    fn is_playing(&mut self, handle: EngineHandle) -> Result<bool, SynthError> {
        let playing = self.engine_mut(handle, "is_playing")?.playing;
        debug!("[LoggingEngine] is_playing({}) -> {}", handle, playing);
        Ok(playing)
    }

    fn set_frequency(
        &mut self,
        handle: EngineHandle,
        frequency_hz: f32,
    ) -> Result<(), SynthError> {
        debug!(
            "[LoggingEngine] set_frequency({}, {:.2} Hz)",
            handle, frequency_hz
        );
        self.engine_mut(handle, "set_frequency")?.frequency_hz = frequency_hz;
        Ok(())
    }

    fn set_volume(&mut self, handle: EngineHandle, volume_db: f32) -> Result<(), SynthError> {
        debug!("[LoggingEngine] set_volume({}, {:.2} dB)", handle, volume_db);
        self.engine_mut(handle, "set_volume")?.volume_db = volume_db;
        Ok(())
    }

    fn set_waveform(&mut self, handle: EngineHandle, ordinal: i32) -> Result<(), SynthError> {
        debug!("[LoggingEngine] set_waveform({}, {})", handle, ordinal);
        let waveform = Waveform::from_ordinal(ordinal).ok_or_else(|| {
            SynthError::EngineCallFailed {
                operation: "set_waveform".to_string(),
                reason: format!("unknown waveform ordinal {}", ordinal),
            }
        })?;
        self.engine_mut(handle, "set_waveform")?.waveform = waveform;
        Ok(())
    }
}
