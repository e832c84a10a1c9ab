//! Integration tests for the complete fusion pipeline
//!
//! These tests validate the end-to-end workflow including:
//! - Color engine output for the reference spectral sample
//! - Simulated rig frames flowing through a session
//! - Recorded row replay and its startup errors
//! - Control messages steering the rig
//! - Scheduled ticks over shared session state

use approx::assert_relative_eq;
use colorsense::config::SimulationConfig;
use colorsense::{
    calculate_color_temperature, FilterStrategy, PeriodicTask, RawRow, RecordSource, SenseError,
    SensorRig, Session, SessionConfig, SpectralChannels,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn reference_channels() -> SpectralChannels {
    SpectralChannels::new(34.2, 38.9, 54.5, 61.1, 57.5, 48.5)
}

fn seeded_rig(seed: u64) -> SensorRig {
    SensorRig::new(&SimulationConfig {
        seed: Some(seed),
        ..Default::default()
    })
}

// ============================================================================
// Color Engine
// ============================================================================

#[test]
fn test_reference_sample() {
    let result = calculate_color_temperature(&reference_channels());

    assert_eq!(result.cct, 3500.0);
    assert_eq!(result.cct % 50.0, 0.0);
    assert!((-10.0..=10.0).contains(&result.tint));
    assert_relative_eq!(result.chromaticity.x, 0.406706, epsilon = 1e-5);
    assert_relative_eq!(result.chromaticity.y, 0.385610, epsilon = 1e-5);
}

#[test]
fn test_degenerate_inputs_never_fail() {
    for channels in [
        SpectralChannels::default(),
        SpectralChannels::from_array([-5.0; 6]),
        SpectralChannels::from_array([f64::NAN; 6]),
        SpectralChannels::from_array([f64::INFINITY, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ] {
        let result = calculate_color_temperature(&channels);
        assert!(result.cct.is_finite());
        assert!(result.tint.is_finite());
    }
}

// ============================================================================
// Simulated Rig Through a Session
// ============================================================================

#[test]
fn test_simulated_run_produces_valid_records() {
    init_logging();
    let mut rig = seeded_rig(42);
    let mut session = Session::new();

    for _ in 0..50 {
        let frame = rig.step();
        let record = session.process_frame(&frame);

        assert!((2000.0..=7000.0).contains(&record.color_temperature_k));
        assert_eq!(record.color_temperature_k % 50.0, 0.0);
        assert!((-10.0..=10.0).contains(&record.tint));
        for weight in [
            record.confidence.as7262,
            record.confidence.tsl2591,
            record.confidence.sen0611,
        ] {
            assert!((0.1..=1.0).contains(&weight));
        }
        assert_eq!(record.row.sensor_cct, Some(frame.sen0611.cct));
    }
    assert_eq!(session.processed_count(), 50);
}

#[test]
fn test_same_seed_same_records() {
    let mut a = (seeded_rig(7), Session::new());
    let mut b = (seeded_rig(7), Session::new());

    for _ in 0..10 {
        let ra = a.1.process_frame(&a.0.step());
        let rb = b.1.process_frame(&b.0.step());
        assert_eq!(ra.color_temperature_k, rb.color_temperature_k);
        assert_eq!(ra.tint, rb.tint);
        assert_eq!(ra.filtered_channels(), rb.filtered_channels());
    }
}

#[test]
fn test_session_from_config() {
    let mut config = SessionConfig::default();
    config.filter.strategy = FilterStrategy::Exponential;
    config.camera.target_cct = 3200.0;
    config.simulation.seed = Some(5);

    let mut session = Session::from_config(&config).unwrap();
    let mut rig = SensorRig::new(&config.simulation);
    let record = session.process_frame(&rig.step());

    assert_eq!(session.strategy(), FilterStrategy::Exponential);
    assert_eq!(
        record.camera_settings.cct_deviation,
        record.color_temperature_k - 3200.0
    );
}

#[test]
fn test_rejected_target_keeps_previous() {
    let mut session = Session::new();
    session.set_target_cct(4500.0).unwrap();

    let err = session.set_target_cct(15000.0).unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(session.target_cct(), 4500.0);
}

// ============================================================================
// Control Messages
// ============================================================================

#[test]
fn test_darkness_drives_spectral_to_zero() {
    let mut rig = seeded_rig(11);
    rig.handle_json(
        r#"{"command": "setEnvironment", "environment": {"lightIntensity": 0.0, "cloudCover": 0.0}}"#,
    )
    .unwrap();

    let frame = rig.step();
    assert_eq!(frame.as7262.channels.total(), 0.0);

    let record = Session::new().process_frame(&frame);
    assert!(record.color_temperature_k.is_finite());
}

#[test]
fn test_unknown_message_leaves_rig_untouched() {
    let mut rig = seeded_rig(12);
    let before = *rig.environment();
    let err = rig.handle_json(r#"{"sensor": "as7262"}"#).unwrap_err();
    assert!(matches!(err, SenseError::MalformedMessage { .. }));
    assert_eq!(rig.environment(), &before);
}

// ============================================================================
// Replay
// ============================================================================

#[tokio::test]
async fn test_replay_through_session() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.json");
    let rows = vec![
        RawRow::from_channels(&reference_channels()),
        RawRow::from_channels(&SpectralChannels::from_array([50.0; 6])),
    ];
    std::fs::write(&path, serde_json::to_string(&rows).unwrap()).unwrap();

    let source = RecordSource::load_json(&path).await.unwrap();
    let mut replay = source.into_replay();
    let mut session = Session::new();

    let first = session.process_row(replay.next_row());
    assert_eq!(first.color_temperature_k, 3500.0);
    session.process_row(replay.next_row());
    assert_eq!(replay.position(), 0);
}

#[tokio::test]
async fn test_replay_startup_errors() {
    let dir = tempfile::tempdir().unwrap();

    let err = RecordSource::load_json(dir.path().join("missing.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, SenseError::DataSourceMissing { .. }));
    assert!(!err.is_recoverable());

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, "[]").unwrap();
    let err = RecordSource::load_json(&empty).await.unwrap_err();
    assert!(matches!(err, SenseError::EmptyDataSource { .. }));
}

// ============================================================================
// Scheduling
// ============================================================================

#[tokio::test]
async fn test_scheduled_ticks_share_session() {
    init_logging();
    let session = Arc::new(Mutex::new(Session::new()));
    let rig = Arc::new(Mutex::new(seeded_rig(3)));
    let records = Arc::new(Mutex::new(Vec::new()));

    let (s, r, out) = (session.clone(), rig.clone(), records.clone());
    let task = PeriodicTask::spawn("simulator", Duration::from_millis(1), move |n| {
        let (s, r, out) = (s.clone(), r.clone(), out.clone());
        async move {
            let frame = r.lock().await.step();
            let record = s.lock().await.process_frame(&frame);
            out.lock().await.push(record);
            if n == 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    });

    assert_eq!(task.join().await.unwrap(), 5);
    assert_eq!(records.lock().await.len(), 5);
    assert_eq!(session.lock().await.processed_count(), 5);
}

#[tokio::test]
async fn test_stop_halts_scheduling() {
    let session = Arc::new(Mutex::new(Session::new()));
    let s = session.clone();
    let task = PeriodicTask::spawn("dashboard", Duration::from_millis(5), move |_| {
        let s = s.clone();
        async move {
            s.lock()
                .await
                .process_row(&RawRow::from_channels(&reference_channels()));
            ControlFlow::Continue(())
        }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    let ticks = task.stop().await.unwrap();
    let processed = session.lock().await.processed_count();
    assert_eq!(processed, ticks);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(session.lock().await.processed_count(), processed);
}
