use std::sync::Arc;
use std::time::Duration;

use audio_synthesizer::config::{AppConfig, BackendKind, ControllerConfig};
use audio_synthesizer::testing::{BoundaryCall, RecordingBackend};
use audio_synthesizer::{AudioSynthesizer, EngineState, SynthController, SynthError, Waveform};

fn spawn_controller() -> (Arc<SynthController>, RecordingBackend) {
    let backend = RecordingBackend::new();
    let worker_backend = backend.clone();
    let controller = SynthController::spawn(move || worker_backend, &ControllerConfig::default())
        .expect("controller should start");
    (Arc::new(controller), backend)
}

fn lifecycle_calls(backend: &RecordingBackend) -> Vec<BoundaryCall> {
    backend
        .recorder()
        .calls()
        .into_iter()
        .filter(|call| matches!(call, BoundaryCall::Create(_) | BoundaryCall::Destroy(_)))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commands_and_lifecycle_never_overlap() {
    let (controller, backend) = spawn_controller();
    backend.recorder().set_call_delay(Duration::from_micros(100));

    let mut tasks = Vec::new();
    for task in 0..8usize {
        let controller = Arc::clone(&controller);
        tasks.push(tokio::spawn(async move {
            for step in 0..50usize {
                let result = match (task + step) % 6 {
                    0 => controller.play().await,
                    1 => controller.set_frequency(100.0 + step as f32).await,
                    2 => controller.on_pause().await,
                    3 => controller.is_playing().await.map(|_| ()),
                    4 => controller.on_resume().await,
                    _ => controller.set_waveform(Waveform::Square).await,
                };
                result.expect("recording backend injects no failures here");
            }
        }));
    }
    for task in tasks {
        task.await.expect("task should not panic");
    }
    controller.shutdown().await.unwrap();

    let recorder = backend.recorder();
    assert!(!recorder.overlap_detected());
    assert_eq!(recorder.max_in_flight(), 1);
    assert!(recorder.violations().is_empty(), "{:?}", recorder.violations());
    assert_eq!(recorder.live_count(), 0);
    assert_eq!(recorder.create_count(), recorder.destroy_count());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_use_creates_exactly_once() {
    let (controller, backend) = spawn_controller();
    backend.recorder().set_call_delay(Duration::from_millis(1));

    let mut tasks = Vec::new();
    for index in 0..16 {
        let controller = Arc::clone(&controller);
        tasks.push(tokio::spawn(async move {
            controller.set_volume(-(index as f32)).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(backend.recorder().create_count(), 1);
    assert_eq!(controller.state().await.unwrap(), EngineState::Live);
}

#[tokio::test]
async fn repeated_resume_creates_once() {
    let (controller, backend) = spawn_controller();
    for _ in 0..5 {
        controller.on_resume().await.unwrap();
    }
    assert_eq!(backend.recorder().create_count(), 1);
    assert_eq!(backend.recorder().destroy_count(), 0);
}

#[tokio::test]
async fn repeated_pause_destroys_once() {
    let (controller, backend) = spawn_controller();
    controller.play().await.unwrap();
    for _ in 0..5 {
        controller.on_pause().await.unwrap();
    }
    assert_eq!(backend.recorder().create_count(), 1);
    assert_eq!(backend.recorder().destroy_count(), 1);
    assert_eq!(controller.state().await.unwrap(), EngineState::Absent);
}

#[tokio::test]
async fn command_after_pause_recreates_engine() {
    let (controller, backend) = spawn_controller();
    controller.on_resume().await.unwrap();
    controller.play().await.unwrap();
    controller.on_pause().await.unwrap();
    controller.stop().await.unwrap();

    let calls = lifecycle_calls(&backend);
    assert_eq!(calls.len(), 3, "{:?}", calls);
    let (BoundaryCall::Create(first), BoundaryCall::Destroy(destroyed), BoundaryCall::Create(second)) =
        (calls[0], calls[1], calls[2])
    else {
        panic!("expected create, destroy, create; got {:?}", calls);
    };
    assert_eq!(first, destroyed);
    assert_ne!(first, second);
}

#[tokio::test]
async fn waveform_ordinals_are_stable() {
    let (controller, backend) = spawn_controller();
    for waveform in [
        Waveform::Sawtooth,
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sine,
    ] {
        controller.set_waveform(waveform).await.unwrap();
    }

    let ordinals: Vec<i32> = backend
        .recorder()
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            BoundaryCall::SetWaveform(_, ordinal) => Some(ordinal),
            _ => None,
        })
        .collect();
    assert_eq!(ordinals, vec![3, 0, 2, 1, 0]);
}

#[tokio::test]
async fn create_failure_is_contained() {
    let (controller, backend) = spawn_controller();
    backend.recorder().fail_next_creates(1);

    let err = controller.play().await.unwrap_err();
    assert!(
        matches!(err, SynthError::ResourceCreationFailed { .. }),
        "unexpected error {err:?}"
    );
    assert_eq!(controller.state().await.unwrap(), EngineState::Absent);

    controller.play().await.unwrap();
    assert!(controller.is_playing().await.unwrap());
    assert_eq!(controller.state().await.unwrap(), EngineState::Live);
}

#[tokio::test]
async fn invalidated_handle_is_dropped_without_destroy() {
    let (controller, backend) = spawn_controller();
    controller.on_resume().await.unwrap();
    backend.recorder().invalidate_next_call();

    let err = controller.play().await.unwrap_err();
    assert!(matches!(err, SynthError::HandleInvalid { .. }));
    assert_eq!(controller.state().await.unwrap(), EngineState::Absent);
    assert_eq!(backend.recorder().destroy_count(), 0);

    controller.play().await.unwrap();
    assert_eq!(backend.recorder().create_count(), 2);
}

#[tokio::test]
async fn scenario_play_on_fresh_controller() {
    let (controller, backend) = spawn_controller();
    controller.play().await.unwrap();

    let calls = backend.recorder().calls();
    let BoundaryCall::Create(handle) = calls[0] else {
        panic!("expected create first, got {:?}", calls);
    };
    assert_eq!(calls, vec![BoundaryCall::Create(handle), BoundaryCall::Play(handle)]);
    assert_eq!(controller.state().await.unwrap(), EngineState::Live);
}

#[tokio::test]
async fn scenario_query_after_background() {
    let (controller, backend) = spawn_controller();
    controller.play().await.unwrap();
    controller.on_pause().await.unwrap();
    assert!(!controller.is_playing().await.unwrap());

    let calls = backend.recorder().calls();
    let [BoundaryCall::Create(first), BoundaryCall::Play(_), BoundaryCall::Destroy(destroyed), BoundaryCall::Create(second), BoundaryCall::IsPlaying(queried)] =
        calls[..]
    else {
        panic!("unexpected call sequence {:?}", calls);
    };
    assert_eq!(first, destroyed);
    assert_eq!(second, queried);
    assert_ne!(first, second);
}

#[tokio::test]
async fn scenario_frequency_on_absent_controller() {
    let (controller, backend) = spawn_controller();
    controller.set_frequency(440.0).await.unwrap();

    let calls = backend.recorder().calls();
    let BoundaryCall::Create(handle) = calls[0] else {
        panic!("expected create first, got {:?}", calls);
    };
    assert_eq!(
        calls,
        vec![
            BoundaryCall::Create(handle),
            BoundaryCall::SetFrequency(handle, 440.0)
        ]
    );
}

#[tokio::test]
async fn out_of_range_values_are_forwarded_untouched() {
    let (controller, backend) = spawn_controller();
    controller.set_frequency(-5.0).await.unwrap();
    controller.set_volume(12.0).await.unwrap();

    let calls = backend.recorder().calls();
    assert!(matches!(calls[1], BoundaryCall::SetFrequency(_, hz) if hz == -5.0));
    assert!(matches!(calls[2], BoundaryCall::SetVolume(_, db) if db == 12.0));
}

#[cfg(not(feature = "native_engine"))]
#[test]
fn native_backend_is_reported_unavailable() {
    let mut config = AppConfig::default();
    config.synthesizer.backend = BackendKind::Native;

    assert!(matches!(
        SynthController::from_config(&config),
        Err(SynthError::BackendUnavailable { .. })
    ));
}

#[test]
fn logging_backend_from_config_round_trips_commands() {
    let mut config = AppConfig::default();
    config.synthesizer.backend = BackendKind::Logging;

    let controller = SynthController::from_config(&config).unwrap();
    controller.resume_blocking().unwrap();
    assert_eq!(controller.state_blocking().unwrap(), EngineState::Live);
    controller.pause_blocking().unwrap();
    assert_eq!(controller.state_blocking().unwrap(), EngineState::Absent);
}
