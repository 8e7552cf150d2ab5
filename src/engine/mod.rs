//! Engine module housing the synthesizer core.
//!
//! This module exposes the engine resource boundary (`backend`) and the
//! `SynthController` lifecycle layer (`core`) that owns it.

pub mod backend;
pub mod core;

#[cfg(feature = "native_engine")]
pub use backend::NativeEngineBackend;
pub use backend::{EngineBackend, EngineHandle, LoggingEngineBackend};
pub use self::core::SynthController;
