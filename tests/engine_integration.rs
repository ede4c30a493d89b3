//! Integration tests for the signal engine
//!
//! Drives the engine through a manual clock so time windows are exact.

use pretty_assertions::assert_eq;
use signal_calibrator::core::{ManualClock, SignalEngine};
use signal_calibrator::types::{Severity, SignalState, SignalStatus, MSG_SEARCH_INITIATED};
use signal_calibrator::{FAILURE_TIME_WINDOW_MS, LOG_CAPACITY, SIGNAL_LOST_HOLD_MS};

/// Comfortably outside the rapid-movement window
const SLOW: u64 = FAILURE_TIME_WINDOW_MS + 100;

fn engine() -> (SignalEngine<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    (SignalEngine::with_clock(clock.clone()), clock)
}

fn error_count(engine: &SignalEngine<ManualClock>) -> usize {
    engine.logs().iter().filter(|e| e.severity == Severity::Error).count()
}

#[test]
fn test_ideal_controls_lock() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    engine.set_frequency(50.0);
    clock.advance(SLOW);
    engine.set_phase(75.0);
    clock.advance(SLOW);
    let state = engine.set_noise_suppression(30.0);

    assert_eq!(state.coherence, 100.0);
    assert_eq!(state.noise_level, 0.0);
    assert_eq!(state.signal_strength, 100.0);
    assert_eq!(state.status, SignalStatus::SignalLock);
    assert!(state.is_locked);
}

#[test]
fn test_frequency_is_clamped() {
    let (mut engine, clock) = engine();
    for (input, expected) in [(-50.0, 0.0), (0.0, 0.0), (37.5, 37.5), (100.0, 100.0), (250.0, 100.0)] {
        clock.advance(SLOW);
        let state = engine.set_frequency(input);
        assert_eq!(state.frequency, expected, "input {}", input);
    }
}

#[test]
fn test_frequency_extremes_zero_strength() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    assert_eq!(engine.set_frequency(0.0).signal_strength, 0.0);
    clock.advance(SLOW);
    assert_eq!(engine.set_frequency(100.0).signal_strength, 0.0);
}

#[test]
fn test_repeat_set_is_idempotent() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    let first = engine.set_frequency(50.0);
    clock.advance(SLOW);
    let second = engine.set_frequency(50.0);

    assert_eq!(first, second);
    assert_eq!(second.status, SignalStatus::SignalLock);
}

#[test]
fn test_rapid_movement_drops_signal() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    engine.set_frequency(50.0);
    let before_len = engine.logs().len();
    let before_errors = error_count(&engine);

    clock.advance(100);
    let state = engine.set_frequency(80.0);

    assert_eq!(state.status, SignalStatus::SignalLost);
    assert!(!state.is_locked);
    assert_eq!(state.coherence, 0.0);
    assert_eq!(state.noise_level, 100.0);
    assert_eq!(state.frequency, 80.0);
    assert_eq!(state.last_failure_time, Some(SLOW + 100));
    assert_eq!(engine.logs().len(), before_len + 1);
    assert_eq!(error_count(&engine), before_errors + 1);
    assert_eq!(
        engine.logs().last().unwrap().message,
        "SIGNAL LOST - FREQUENCY MOVED TOO FAST"
    );
}

// Suppression above 80 is read from the state before the update, whatever
// control is moving. This coupling is intended.
#[test]
fn test_suppression_lockout_hits_every_control() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    let state = engine.set_noise_suppression(85.0);
    assert_eq!(state.status, SignalStatus::PatternDetected);

    clock.advance(SLOW);
    let state = engine.set_phase(52.0);
    assert_eq!(state.status, SignalStatus::SignalLost);
    assert_eq!(engine.logs().last().unwrap().message, "SIGNAL LOST - NOISE SUPPRESSION TOO HIGH");

    clock.advance(SLOW);
    let state = engine.set_frequency(26.0);
    assert_eq!(state.status, SignalStatus::SignalLost);

    // lowering suppression trips the same check, but the new value lands
    clock.advance(SLOW);
    let state = engine.set_noise_suppression(40.0);
    assert_eq!(state.status, SignalStatus::SignalLost);
    assert_eq!(state.noise_suppression, 40.0);

    // f26 p55 s40 → coherence 82
    clock.advance(SLOW);
    let state = engine.set_phase(55.0);
    assert_eq!(state.status, SignalStatus::SignalLock);
}

#[test]
fn test_phase_out_of_band_drops_any_update() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    engine.set_phase(95.0);
    assert_eq!(engine.state().phase, 95.0);

    clock.advance(SLOW);
    let state = engine.set_frequency(30.0);
    assert_eq!(state.status, SignalStatus::SignalLost);
    assert_eq!(engine.logs().last().unwrap().message, "SIGNAL LOST - PHASE MISALIGNMENT");
}

#[test]
fn test_signal_lost_holds_then_expires() {
    let (mut engine, clock) = engine();
    clock.set(600);
    engine.set_phase(25.0);
    clock.set(1200);
    engine.set_noise_suppression(70.0);
    clock.set(1800);
    engine.set_frequency(45.0);

    clock.set(1900);
    let state = engine.set_frequency(0.0);
    assert_eq!(state.status, SignalStatus::SignalLost);
    let logged = engine.logs().len();

    // coherence 52.7, 100 ms after failure
    clock.set(2000);
    let state = engine.set_noise_suppression(72.0);
    assert_eq!(state.status, SignalStatus::SignalLost);
    assert!(state.coherence > 50.0 && state.coherence < 60.0);

    clock.set(1900 + SIGNAL_LOST_HOLD_MS);
    let state = engine.set_noise_suppression(70.0);
    assert_eq!(state.status, SignalStatus::Searching);
    assert_eq!(engine.logs().len(), logged);
}

#[test]
fn test_lost_recovers_on_good_update() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    engine.set_frequency(50.0);
    clock.advance(100);
    engine.set_frequency(80.0);
    let logged = engine.logs().len();

    clock.advance(100);
    let state = engine.set_phase(55.0);
    assert_eq!(state.status, SignalStatus::PatternDetected);
    // only SEARCHING → PATTERN_DETECTED is announced
    assert_eq!(engine.logs().len(), logged);
}

#[test]
fn test_status_change_logging() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    // f25 p25 s50 → coherence 68.3
    engine.set_phase(25.0);
    clock.advance(SLOW);
    // f45 p25 s50 → coherence 75
    engine.set_frequency(45.0);
    clock.advance(SLOW);
    // f45 p45 s50 → coherence 81.7
    engine.set_phase(45.0);

    let logs = engine.logs();
    let messages: Vec<_> = logs.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![MSG_SEARCH_INITIATED, "COHERENCE 68% - PATTERN DETECTED", "COHERENCE 82% - SIGNAL LOCK"]
    );
    assert_eq!(logs[1].severity, Severity::Info);
    assert_eq!(logs[2].severity, Severity::Success);

    // dropping out of lock is silent
    clock.advance(SLOW);
    engine.set_phase(25.0);
    assert_eq!(engine.logs().len(), 3);
}

#[test]
fn test_log_keeps_most_recent_ten() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    engine.set_frequency(50.0);
    for _ in 0..14 {
        clock.advance(SLOW);
        engine.set_frequency(0.0);
        clock.advance(SLOW);
        engine.set_frequency(50.0);
    }

    let logs = engine.logs();
    assert_eq!(logs.len(), LOG_CAPACITY);
    let ids: Vec<u64> = logs.iter().map(|e| e.id).collect();
    assert_eq!(ids, (7..=16).collect::<Vec<u64>>());
    assert!(logs.iter().all(|e| e.severity == Severity::Success));
}

#[test]
fn test_reset_restores_defaults_and_log() {
    let (mut engine, clock) = engine();
    clock.advance(SLOW);
    engine.set_frequency(50.0);
    clock.advance(100);
    engine.set_frequency(90.0);

    let state = engine.reset();
    assert_eq!(state, SignalState::default());
    assert_eq!(state.frequency, 25.0);
    assert_eq!(state.phase, 50.0);
    assert_eq!(state.noise_suppression, 50.0);
    assert_eq!(state.coherence, 0.0);
    assert_eq!(state.noise_level, 100.0);

    let logs = engine.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, MSG_SEARCH_INITIATED);
    assert_eq!(logs[0].severity, Severity::Info);
}

#[test]
fn test_log_timestamps_follow_clock() {
    let (mut engine, clock) = engine();
    clock.set(3_725_000);
    engine.set_frequency(50.0);
    assert_eq!(engine.logs().last().unwrap().timestamp, "13:02:05");
}

#[test]
fn test_locked_iff_signal_lock() {
    let (mut engine, clock) = engine();
    for (i, f) in [50.0, 70.0, 100.0, 60.0, 35.0, 10.0].into_iter().enumerate() {
        clock.advance(if i % 2 == 0 { SLOW } else { 50 });
        let state = engine.set_frequency(f);
        assert_eq!(state.is_locked, state.status == SignalStatus::SignalLock);
        assert!((0.0..=100.0).contains(&state.coherence));
        assert!((0.0..=100.0).contains(&state.noise_level));
        assert!((0.0..=100.0).contains(&state.signal_strength));
    }
}
