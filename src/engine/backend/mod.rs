//! Engine resource boundary.
//!
//! The synthesizer engine is an opaque, expensive resource addressed through
//! an [`EngineHandle`]. Backends implement [`EngineBackend`] to expose the
//! create/destroy/control calls; the lifecycle manager is the only caller.

use std::fmt;
use std::num::NonZeroU64;

use crate::error::SynthError;

/// Opaque identifier of a live engine resource.
///
/// Absence is modelled as `Option<EngineHandle>`; a handle value itself is
/// always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(NonZeroU64);

impl EngineHandle {
    /// Wrap a raw backend identifier. Zero is the absent sentinel and yields `None`.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn as_raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Calls across the engine resource boundary.
///
/// Every control call receives the handle returned by a successful
/// [`create`](EngineBackend::create). Implementations report an unusable
/// handle with [`SynthError::HandleInvalid`] so the caller can drop it.
///
/// Backends do not need to be `Send`: the controller constructs its backend
/// on the worker thread that will own it.
pub trait EngineBackend {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn create(&mut self) -> Result<EngineHandle, SynthError>;
    /// Release everything owned by `handle`. Called at most once per handle.
    fn destroy(&mut self, handle: EngineHandle) -> Result<(), SynthError>;

    fn play(&mut self, handle: EngineHandle) -> Result<(), SynthError>;
    fn stop(&mut self, handle: EngineHandle) -> Result<(), SynthError>;
    fn is_playing(&mut self, handle: EngineHandle) -> Result<bool, SynthError>;
    fn set_frequency(&mut self, handle: EngineHandle, frequency_hz: f32)
        -> Result<(), SynthError>;
    fn set_volume(&mut self, handle: EngineHandle, volume_db: f32) -> Result<(), SynthError>;
    /// `ordinal` is [`Waveform::ordinal`](crate::synth::Waveform::ordinal).
    fn set_waveform(&mut self, handle: EngineHandle, ordinal: i32) -> Result<(), SynthError>;
}

#[cfg(feature = "native_engine")]
mod native;
#[cfg(feature = "native_engine")]
pub use native::NativeEngineBackend;

mod logging;
pub use logging::LoggingEngineBackend;
