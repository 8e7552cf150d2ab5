use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::{BoxFuture, FutureExt};
use log::debug;

use crate::error::SynthError;

use super::{AudioSynthesizer, Waveform};

/// Engine-less synthesizer for driving a control surface in isolation.
///
/// Logs each call and remembers only the play flag. There is no engine and
/// no lifecycle: host signals are only logged, and calls never fail.
pub struct LoggingSynthesizer {
    playing: AtomicBool,
}

impl LoggingSynthesizer {
    pub fn new() -> Self {
        Self {
            playing: AtomicBool::new(false),
        }
    }
}

impl Default for LoggingSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSynthesizer for LoggingSynthesizer {
    fn play(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        async move {
            debug!("[LoggingSynthesizer] play() called");
            self.playing.store(true, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        async move {
            debug!("[LoggingSynthesizer] stop() called");
            self.playing.store(false, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }

    fn is_playing(&self) -> BoxFuture<'_, Result<bool, SynthError>> {
        async move {
            debug!("[LoggingSynthesizer] is_playing() called");
            Ok(self.playing.load(Ordering::SeqCst))
        }
        .boxed()
    }

    fn set_frequency(&self, frequency_hz: f32) -> BoxFuture<'_, Result<(), SynthError>> {
        async move {
            debug!(
                "[LoggingSynthesizer] set_frequency() called with {:.2} Hz",
                frequency_hz
            );
            Ok(())
        }
        .boxed()
    }

    fn set_volume(&self, volume_db: f32) -> BoxFuture<'_, Result<(), SynthError>> {
        async move {
            debug!(
                "[LoggingSynthesizer] set_volume() called with {:.2} dB",
                volume_db
            );
            Ok(())
        }
        .boxed()
    }

    fn set_waveform(&self, waveform: Waveform) -> BoxFuture<'_, Result<(), SynthError>> {
        async move {
            debug!("[LoggingSynthesizer] set_waveform() called with {}", waveform);
            Ok(())
        }
        .boxed()
    }

    fn on_resume(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        async move {
            debug!("[LoggingSynthesizer] on_resume() called, no engine to create");
            Ok(())
        }
        .boxed()
    }

    fn on_pause(&self) -> BoxFuture<'_, Result<(), SynthError>> {
        async move {
            debug!("[LoggingSynthesizer] on_pause() called, no engine to release");
            Ok(())
        }
        .boxed()
    }
}
