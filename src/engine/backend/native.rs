//! Native engine backend over the `libaudiosynthesizer` C ABI.
//!
//! The library owns the oscillator and the platform audio stream; this side
//! only holds the opaque pointers it hands out. Pointers never leave the
//! worker thread that owns the backend.

use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr::NonNull;

use log::{debug, warn};

use crate::error::SynthError;

use super::{EngineBackend, EngineHandle};

#[link(name = "audiosynthesizer")]
extern "C" {
    fn audiosynthesizer_create() -> *mut c_void;
    fn audiosynthesizer_delete(synthesizer: *mut c_void);
    fn audiosynthesizer_play(synthesizer: *mut c_void);
    fn audiosynthesizer_stop(synthesizer: *mut c_void);
    fn audiosynthesizer_is_playing(synthesizer: *mut c_void) -> bool;
    fn audiosynthesizer_set_frequency(synthesizer: *mut c_void, frequency_in_hz: f32);
    fn audiosynthesizer_set_volume(synthesizer: *mut c_void, volume_in_db: f32);
    fn audiosynthesizer_set_wavetable(synthesizer: *mut c_void, wavetable: i32);
}

/// Backend that drives the native wavetable synthesizer.
pub struct NativeEngineBackend {
    next_id: u64,
    instances: HashMap<EngineHandle, NonNull<c_void>>,
}

impl NativeEngineBackend {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            instances: HashMap::new(),
        }
    }

    fn instance(&self, handle: EngineHandle, operation: &str) -> Result<*mut c_void, SynthError> {
        self.instances
            .get(&handle)
            .map(|ptr| ptr.as_ptr())
            .ok_or_else(|| SynthError::HandleInvalid {
                operation: operation.to_string(),
            })
    }
}

impl Default for NativeEngineBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NativeEngineBackend {
    fn drop(&mut self) {
        for (handle, ptr) in self.instances.drain() {
            warn!("[NativeEngine] Releasing leaked instance {}", handle);
            // SAFETY: `ptr` came from audiosynthesizer_create and has not been deleted.
            unsafe { audiosynthesizer_delete(ptr.as_ptr()) };
        }
    }
}

impl EngineBackend for NativeEngineBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn create(&mut self) -> Result<EngineHandle, SynthError> {
        // SAFETY: no preconditions; a null return signals failure.
        let raw = unsafe { audiosynthesizer_create() };
        let ptr = NonNull::new(raw).ok_or_else(|| SynthError::ResourceCreationFailed {
            reason: "audiosynthesizer_create returned null".to_string(),
        })?;

        let Some(handle) = EngineHandle::from_raw(self.next_id) else {
            // SAFETY: freshly created and not yet shared.
            unsafe { audiosynthesizer_delete(ptr.as_ptr()) };
            return Err(SynthError::ResourceCreationFailed {
                reason: "handle space exhausted".to_string(),
            });
        };
        self.next_id += 1;
        self.instances.insert(handle, ptr);
        debug!("[NativeEngine] Created instance {}", handle);
        Ok(handle)
    }

    fn destroy(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        let ptr = self
            .instances
            .remove(&handle)
            .ok_or_else(|| SynthError::InvalidState {
                details: format!("destroy of unknown handle {}", handle),
            })?;
        // SAFETY: removed from the map, so this is the only delete for `ptr`.
        unsafe { audiosynthesizer_delete(ptr.as_ptr()) };
        debug!("[NativeEngine] Destroyed instance {}", handle);
        Ok(())
    }

    fn play(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        let ptr = self.instance(handle, "play")?;
        // SAFETY: `ptr` is live until destroy() removes it.
        unsafe { audiosynthesizer_play(ptr) };
        Ok(())
    }

    fn stop(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        let ptr = self.instance(handle, "stop")?;
        // SAFETY: see play().
        unsafe { audiosynthesizer_stop(ptr) };
        Ok(())
    }

    fn is_playing(&mut self, handle: EngineHandle) -> Result<bool, SynthError> {
        let ptr = self.instance(handle, "is_playing")?;
        // SAFETY: see play().
        Ok(unsafe { audiosynthesizer_is_playing(ptr) })
    }

    fn set_frequency(
        &mut self,
        handle: EngineHandle,
        frequency_hz: f32,
    ) -> Result<(), SynthError> {
        let ptr = self.instance(handle, "set_frequency")?;
        // SAFETY: see play().
        unsafe { audiosynthesizer_set_frequency(ptr, frequency_hz) };
        Ok(())
    }

    fn set_volume(&mut self, handle: EngineHandle, volume_db: f32) -> Result<(), SynthError> {
        let ptr = self.instance(handle, "set_volume")?;
        // SAFETY: see play().
        unsafe { audiosynthesizer_set_volume(ptr, volume_db) };
        Ok(())
    }

    fn set_waveform(&mut self, handle: EngineHandle, ordinal: i32) -> Result<(), SynthError> {
        let ptr = self.instance(handle, "set_waveform")?;
        // SAFETY: see play().
        unsafe { audiosynthesizer_set_wavetable(ptr, ordinal) };
        Ok(())
    }
}
