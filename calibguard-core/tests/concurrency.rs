//! Concurrent producer/evaluator stress tests
//!
//! Three producers (calibration, environment, telemetry-driven evaluation)
//! hammer one shared manager. The assertions are about consistency, not
//! timing: no torn snapshot ever surfaces, every assessment respects the
//! confidence bounds, and the history contains exactly the epochs that were
//! recorded.

use std::sync::Arc;
use std::thread;

use calibguard_core::{CalibrationManager, EnvSnapshot, SessionKey, SessionStore, TelemetrySignals};

/// Snapshots are written whole; a torn read would mix these two.
fn snapshot_a() -> EnvSnapshot {
    EnvSnapshot {
        temperature_f: Some(70.0),
        humidity_pct: Some(60.0),
        wind_mph: Some(10.0),
        rig_vibration_idx: Some(0.1),
    }
}

fn snapshot_b() -> EnvSnapshot {
    EnvSnapshot {
        temperature_f: Some(90.0),
        humidity_pct: Some(80.0),
        wind_mph: Some(25.0),
        rig_vibration_idx: Some(0.6),
    }
}

#[test]
fn concurrent_writers_and_evaluators_stay_consistent() {
    let manager = Arc::new(CalibrationManager::with_defaults());
    manager.record_calibration("busch_iii", "g1", 0.95, 0);

    let calibrator = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            for i in 0..200u64 {
                manager.record_calibration("busch_iii", "g1", 0.95, i * 1_000);
            }
        })
    };

    let observer = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            for i in 0..200 {
                let snapshot = if i % 2 == 0 { snapshot_a() } else { snapshot_b() };
                manager.record_environment(snapshot);
            }
        })
    };

    let evaluator = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            for i in 0..500u64 {
                let assessment =
                    manager.evaluate(i * 1_000, None, &TelemetrySignals::default());
                assert!(assessment.confidence >= 0.5);
                assert!(assessment.confidence <= 1.0);
                assert!(assessment.minutes_since_calibration.is_some());
            }
        })
    };

    calibrator.join().expect("calibrator thread panicked");
    observer.join().expect("observer thread panicked");
    evaluator.join().expect("evaluator thread panicked");

    // 1 seed epoch + 200 from the calibrator thread, in arrival order
    assert_eq!(manager.epoch_count(), 201);

    // The stored snapshot is one of the two written wholes, never a mix
    let last = manager.last_environment().expect("env was observed");
    assert!(last == snapshot_a() || last == snapshot_b());
}

#[test]
fn concurrent_sessions_do_not_interfere() {
    let store = Arc::new(SessionStore::with_defaults());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let key = SessionKey::new("busch_iii", format!("session_{i}"));
                let manager = store.get_or_create(&key);
                for j in 0..50u64 {
                    manager.record_calibration("busch_iii", &key.session_id, 0.9, j);
                }
                manager.epoch_count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("session thread panicked"), 50);
    }
    assert_eq!(store.len(), 4);
}

#[test]
fn get_or_create_race_yields_one_manager() {
    let store = Arc::new(SessionStore::with_defaults());
    let key = SessionKey::new("busch_iii", "g1");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let key = key.clone();
            thread::spawn(move || store.get_or_create(&key))
        })
        .collect();

    let managers: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    for manager in &managers[1..] {
        assert!(Arc::ptr_eq(&managers[0], manager));
    }
    assert_eq!(store.len(), 1);
}
