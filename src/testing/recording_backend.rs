//! Instrumented engine backend.
//!
//! Records every call crossing the engine boundary, checks that no two calls
//! are ever in flight at once, and can inject creation failures, call
//! failures, handle invalidation and per-call latency.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::error;

use crate::engine::backend::{EngineBackend, EngineHandle};
use crate::error::SynthError;

/// One call observed at the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCall {
    Create(EngineHandle),
    CreateFailed,
    Destroy(EngineHandle),
    Play(EngineHandle),
    Stop(EngineHandle),
    IsPlaying(EngineHandle),
    SetFrequency(EngineHandle, f32),
    SetVolume(EngineHandle, f32),
    SetWaveform(EngineHandle, i32),
}

#[derive(Default)]
struct EngineTable {
    live: HashSet<EngineHandle>,
    playing: HashMap<EngineHandle, bool>,
}

/// Shared record of boundary traffic plus fault-injection switches.
pub struct CallRecorder {
    calls: Mutex<Vec<BoundaryCall>>,
    engines: Mutex<EngineTable>,
    violations: Mutex<Vec<String>>,
    next_id: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    overlap_detected: AtomicBool,
    pending_create_failures: AtomicUsize,
    fail_next_call: AtomicBool,
    invalidate_next_call: AtomicBool,
    fail_next_destroy: AtomicBool,
    call_delay_us: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CallRecorder {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            engines: Mutex::new(EngineTable::default()),
            violations: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            overlap_detected: AtomicBool::new(false),
            pending_create_failures: AtomicUsize::new(0),
            fail_next_call: AtomicBool::new(false),
            invalidate_next_call: AtomicBool::new(false),
            fail_next_destroy: AtomicBool::new(false),
            call_delay_us: AtomicU64::new(0),
        }
    }

    // ========================================================================
    // OBSERVATION
    // ========================================================================

    pub fn calls(&self) -> Vec<BoundaryCall> {
        lock(&self.calls).clone()
    }

    /// Successful `create()` calls.
    pub fn create_count(&self) -> usize {
        self.count(|call| matches!(call, BoundaryCall::Create(_)))
    }

    pub fn destroy_count(&self) -> usize {
        self.count(|call| matches!(call, BoundaryCall::Destroy(_)))
    }

    /// Engines created and not yet destroyed or invalidated.
    pub fn live_count(&self) -> usize {
        lock(&self.engines).live.len()
    }

    /// Highest number of boundary calls observed executing at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }

    /// Contract violations: calls on handles that are not live.
    pub fn violations(&self) -> Vec<String> {
        lock(&self.violations).clone()
    }

    // ========================================================================
    // FAULT INJECTION
    // ========================================================================

    /// Make the next `count` calls to `create()` fail.
    pub fn fail_next_creates(&self, count: usize) {
        self.pending_create_failures.store(count, Ordering::SeqCst);
    }

    /// Make the next control call fail without affecting the handle.
    pub fn fail_next_call(&self) {
        self.fail_next_call.store(true, Ordering::SeqCst);
    }

    /// Make the next control call report the handle as unusable.
    pub fn invalidate_next_call(&self) {
        self.invalidate_next_call.store(true, Ordering::SeqCst);
    }

    /// Make the next `destroy()` report failure (the engine is still released).
    pub fn fail_next_destroy(&self) {
        self.fail_next_destroy.store(true, Ordering::SeqCst);
    }

    /// Sleep inside every boundary call to widen race windows.
    pub fn set_call_delay(&self, delay: Duration) {
        self.call_delay_us
            .store(delay.as_micros() as u64, Ordering::SeqCst);
    }

    // ========================================================================
    // PRIVATE HELPERS
    // ========================================================================

    fn count(&self, predicate: impl Fn(&BoundaryCall) -> bool) -> usize {
        lock(&self.calls).iter().filter(|call| predicate(call)).count()
    }

    fn enter(&self) -> InFlightGuard<'_> {
        let previous = self.in_flight.fetch_add(1, Ordering::SeqCst);
        if previous > 0 {
            self.overlap_detected.store(true, Ordering::SeqCst);
            error!("[RecordingBackend] Concurrent entry detected ({} in flight)", previous + 1);
        }
        self.max_in_flight.fetch_max(previous + 1, Ordering::SeqCst);

        let delay = self.call_delay_us.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_micros(delay));
        }
        InFlightGuard { recorder: self }
    }

    fn record(&self, call: BoundaryCall) {
        lock(&self.calls).push(call);
    }

    fn violation(&self, details: String) {
        error!("[RecordingBackend] {}", details);
        lock(&self.violations).push(details);
    }

    fn check_live(&self, handle: EngineHandle, operation: &str) -> Result<(), SynthError> {
        if !lock(&self.engines).live.contains(&handle) {
            self.violation(format!("{}() on non-live handle {}", operation, handle));
            return Err(SynthError::HandleInvalid {
                operation: operation.to_string(),
            });
        }

        if self.invalidate_next_call.swap(false, Ordering::SeqCst) {
            let mut engines = lock(&self.engines);
            engines.live.remove(&handle);
            engines.playing.remove(&handle);
            return Err(SynthError::HandleInvalid {
                operation: operation.to_string(),
            });
        }

        if self.fail_next_call.swap(false, Ordering::SeqCst) {
            return Err(SynthError::EngineCallFailed {
                operation: operation.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn set_playing(&self, handle: EngineHandle, playing: bool) {
        lock(&self.engines).playing.insert(handle, playing);
    }
}

struct InFlightGuard<'a> {
    recorder: &'a CallRecorder,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.recorder.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Engine backend that records instead of producing audio.
///
/// Clones share one [`CallRecorder`], so a test keeps a clone for inspection
/// while the controller owns another.
#[derive(Clone)]
pub struct RecordingBackend {
    recorder: Arc<CallRecorder>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            recorder: Arc::new(CallRecorder::new()),
        }
    }

    pub fn recorder(&self) -> &Arc<CallRecorder> {
        &self.recorder
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn create(&mut self) -> Result<EngineHandle, SynthError> {
        let recorder = &self.recorder;
        let _guard = recorder.enter();

        let injected = recorder
            .pending_create_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            recorder.record(BoundaryCall::CreateFailed);
            return Err(SynthError::ResourceCreationFailed {
                reason: "injected failure".to_string(),
            });
        }

        let raw = recorder.next_id.fetch_add(1, Ordering::SeqCst);
        let handle = EngineHandle::from_raw(raw).ok_or_else(|| {
            SynthError::ResourceCreationFailed {
                reason: "handle space exhausted".to_string(),
            }
        })?;

        let already_live = {
            let mut engines = lock(&recorder.engines);
            let already_live = !engines.live.is_empty();
            engines.live.insert(handle);
            engines.playing.insert(handle, false);
            already_live
        };
        if already_live {
            recorder.violation("create() while another engine is live".to_string());
        }
        recorder.record(BoundaryCall::Create(handle));
        Ok(handle)
    }

    fn destroy(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        let recorder = &self.recorder;
        let _guard = recorder.enter();

        let removed = {
            let mut engines = lock(&recorder.engines);
            engines.playing.remove(&handle);
            engines.live.remove(&handle)
        };
        if !removed {
            recorder.violation(format!("destroy() of non-live handle {}", handle));
            return Err(SynthError::InvalidState {
                details: format!("destroy of unknown handle {}", handle),
            });
        }

        recorder.record(BoundaryCall::Destroy(handle));
        if recorder.fail_next_destroy.swap(false, Ordering::SeqCst) {
            return Err(SynthError::EngineCallFailed {
                operation: "destroy".to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn play(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        let recorder = &self.recorder;
        let _guard = recorder.enter();
        recorder.check_live(handle, "play")?;
        recorder.record(BoundaryCall::Play(handle));
        recorder.set_playing(handle, true);
        Ok(())
    }

    fn stop(&mut self, handle: EngineHandle) -> Result<(), SynthError> {
        let recorder = &self.recorder;
        let _guard = recorder.enter();
        recorder.check_live(handle, "stop")?;
        recorder.record(BoundaryCall::Stop(handle));
        recorder.set_playing(handle, false);
        Ok(())
    }

    fn is_playing(&mut self, handle: EngineHandle) -> Result<bool, SynthError> {
        let recorder = &self.recorder;
        let _guard = recorder.enter();
        recorder.check_live(handle, "is_playing")?;
        recorder.record(BoundaryCall::IsPlaying(handle));
        let playing = lock(&recorder.engines)
            .playing
            .get(&handle)
            .copied()
            .unwrap_or(false);
        Ok(playing)
    }

    fn set_frequency(
        &mut self,
        handle: EngineHandle,
        frequency_hz: f32,
    ) -> Result<(), SynthError> {
        let recorder = &self.recorder;
        let _guard = recorder.enter();
        recorder.check_live(handle, "set_frequency")?;
        recorder.record(BoundaryCall::SetFrequency(handle, frequency_hz));
        Ok(())
    }

    fn set_volume(&mut self, handle: EngineHandle, volume_db: f32) -> Result<(), SynthError> {
        let recorder = &self.recorder;
        let _guard = recorder.enter();
        recorder.check_live(handle, "set_volume")?;
        recorder.record(BoundaryCall::SetVolume(handle, volume_db));
        Ok(())
    }

    fn set_waveform(&mut self, handle: EngineHandle, ordinal: i32) -> Result<(), SynthError> {
        let recorder = &self.recorder;
        let _guard = recorder.enter();
        recorder.check_live(handle, "set_waveform")?;
        recorder.record(BoundaryCall::SetWaveform(handle, ordinal));
        Ok(())
    }
}
