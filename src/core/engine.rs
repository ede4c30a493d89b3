//! Signal Engine: coherence derivation with rapid-movement failure
//!
//! Status transitions (evaluated on every successful control update):
//! - any → SIGNAL_LOCK: coherence ≥ 80
//! - any → PATTERN_DETECTED: 60 ≤ coherence < 80
//! - SIGNAL_LOST holds for 2 s after a failure while coherence < 60
//! - otherwise → SEARCHING
//!
//! Any control update that trips a failure condition drops straight to
//! SIGNAL_LOST and skips derivation for that update.

use tracing::{debug, info, warn};

use crate::core::clock::{Clock, SystemClock};
use crate::core::log_recorder::LogRecorder;
use crate::types::{
    Control, FailureReason, LogEntry, Severity, SignalReading, SignalState, SignalStatus,
    MSG_SEARCH_INITIATED, pattern_detected_message, signal_lock_message,
};
use crate::{
    clamp_value, FAILURE_SPEED_THRESHOLD, FAILURE_TIME_WINDOW_MS, IDEAL_FREQUENCY, IDEAL_PHASE,
    IDEAL_SUPPRESSION, INITIAL_FREQUENCY, INITIAL_PHASE, INITIAL_SUPPRESSION, LOCK_THRESHOLD,
    PATTERN_THRESHOLD, PHASE_MAX, PHASE_MIN, SIGNAL_LOST_HOLD_MS, SUPPRESSION_LIMIT,
};

/// Derive readings from the three controls.
///
/// `status` and `last_failure_time` are the state before this update; they
/// only matter for keeping SIGNAL_LOST inside its hold window.
pub fn compute_signal(
    frequency: f64,
    phase: f64,
    suppression: f64,
    status: SignalStatus,
    last_failure_time: Option<u64>,
    now_ms: u64,
) -> SignalReading {
    let freq_dist = (frequency - IDEAL_FREQUENCY).abs();
    let phase_dist = (phase - IDEAL_PHASE).abs();
    let supp_dist = (suppression - IDEAL_SUPPRESSION).abs();

    let total_dist = (freq_dist + phase_dist + supp_dist) / 3.0;

    let coherence = clamp_value(100.0 - total_dist);
    let noise_level = clamp_value(total_dist);
    let signal_strength = clamp_value(100.0 - freq_dist * 2.0);

    let lost_hold = status == SignalStatus::SignalLost
        && now_ms.saturating_sub(last_failure_time.unwrap_or(0)) < SIGNAL_LOST_HOLD_MS;

    let status = if coherence >= LOCK_THRESHOLD {
        SignalStatus::SignalLock
    } else if coherence >= PATTERN_THRESHOLD {
        SignalStatus::PatternDetected
    } else if lost_hold {
        SignalStatus::SignalLost
    } else {
        SignalStatus::Searching
    };

    SignalReading {
        signal_strength,
        noise_level,
        coherence,
        status,
        is_locked: status == SignalStatus::SignalLock,
    }
}

/// Failure check for one control update, first match wins.
///
/// Suppression and phase limits are read from `current`, the state before
/// this update, whichever control is moving. Moving frequency while
/// suppression is pinned above its limit fails too.
pub fn check_failure(
    control: Control,
    new_value: f64,
    old_value: f64,
    elapsed_ms: u64,
    current: &SignalState,
) -> Option<FailureReason> {
    if elapsed_ms < FAILURE_TIME_WINDOW_MS && (new_value - old_value).abs() > FAILURE_SPEED_THRESHOLD {
        return Some(FailureReason::RapidMovement(control));
    }

    if current.noise_suppression > SUPPRESSION_LIMIT {
        return Some(FailureReason::SuppressionTooHigh);
    }

    if current.phase < PHASE_MIN || current.phase > PHASE_MAX {
        return Some(FailureReason::PhaseMisalignment);
    }

    None
}

/// Last accepted value of a control and when it was accepted
#[derive(Debug, Clone, Copy)]
struct ControlTrack {
    previous: f64,
    changed_at: u64,
}

fn slot(control: Control) -> usize {
    match control {
        Control::Frequency => 0,
        Control::Phase => 1,
        Control::NoiseSuppression => 2,
    }
}

/// Signal calibration state machine
#[derive(Debug)]
pub struct SignalEngine<C: Clock = SystemClock> {
    clock: C,
    state: SignalState,
    log: LogRecorder,
    tracks: [ControlTrack; 3],
    update_count: u64,
}

impl Default for SignalEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalEngine<SystemClock> {
    /// Engine on the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl<C: Clock> SignalEngine<C> {
    /// Engine on an injected clock, initialized to defaults
    pub fn with_clock(clock: C) -> Self {
        let now = clock.now_ms();
        let mut engine = Self {
            clock,
            state: SignalState::default(),
            log: LogRecorder::new(),
            tracks: initial_tracks(now),
            update_count: 0,
        };
        engine.record(MSG_SEARCH_INITIATED, Severity::Info);
        engine
    }

    pub fn set_frequency(&mut self, value: f64) -> SignalState {
        self.set(Control::Frequency, value)
    }

    pub fn set_phase(&mut self, value: f64) -> SignalState {
        self.set(Control::Phase, value)
    }

    pub fn set_noise_suppression(&mut self, value: f64) -> SignalState {
        self.set(Control::NoiseSuppression, value)
    }

    /// Move a control relative to its current value
    pub fn nudge(&mut self, control: Control, delta: f64) -> SignalState {
        let target = self.state.control(control) + delta;
        self.set(control, target)
    }

    /// Apply one control update and return the resulting state
    pub fn set(&mut self, control: Control, value: f64) -> SignalState {
        let clamped = clamp_value(value);
        let now = self.clock.now_ms();
        let track = self.tracks[slot(control)];
        let elapsed = now.saturating_sub(track.changed_at);
        self.update_count += 1;

        if let Some(reason) = check_failure(control, clamped, track.previous, elapsed, &self.state) {
            warn!(%control, value = clamped, elapsed_ms = elapsed, %reason, "signal lost");
            self.state.set_control(control, clamped);
            self.state.status = SignalStatus::SignalLost;
            self.state.is_locked = false;
            self.state.last_failure_time = Some(now);
            self.state.coherence = 0.0;
            self.state.noise_level = 100.0;
            self.record(reason.message(), Severity::Error);
            return self.state.clone();
        }

        let prev_status = self.state.status;
        let was_locked = self.state.is_locked;

        self.state.set_control(control, clamped);
        let reading = compute_signal(
            self.state.frequency,
            self.state.phase,
            self.state.noise_suppression,
            prev_status,
            self.state.last_failure_time,
            now,
        );
        debug!(
            %control,
            value = clamped,
            coherence = reading.coherence,
            noise = reading.noise_level,
            strength = reading.signal_strength,
            status = %reading.status,
            "signal derived"
        );
        self.state.apply(reading);
        self.tracks[slot(control)] = ControlTrack { previous: clamped, changed_at: now };

        self.log_status_change(prev_status, was_locked);
        self.state.clone()
    }

    fn log_status_change(&mut self, prev_status: SignalStatus, was_locked: bool) {
        let coherence = self.state.coherence_percent();

        if prev_status == SignalStatus::Searching && self.state.status == SignalStatus::PatternDetected {
            info!(coherence, "pattern detected");
            self.record(pattern_detected_message(coherence), Severity::Info);
        } else if self.state.is_locked && !was_locked {
            info!(coherence, "signal lock");
            self.record(signal_lock_message(coherence), Severity::Success);
        } else if prev_status != self.state.status {
            debug!(from = %prev_status, to = %self.state.status, "status changed");
        }
    }

    /// Back to defaults with a fresh log
    pub fn reset(&mut self) -> SignalState {
        let now = self.clock.now_ms();
        self.state = SignalState::default();
        self.tracks = initial_tracks(now);
        self.log.clear();
        info!("signal search reset");
        self.record(MSG_SEARCH_INITIATED, Severity::Info);
        self.state.clone()
    }

    fn record(&mut self, message: impl Into<String>, severity: Severity) {
        let at = self.clock.wall_time();
        self.log.record(message, severity, at);
    }

    /// Current state
    pub fn state(&self) -> &SignalState {
        &self.state
    }

    /// Log entries, oldest first
    pub fn logs(&self) -> Vec<LogEntry> {
        self.log.to_vec()
    }

    pub fn log(&self) -> &LogRecorder {
        &self.log
    }

    /// Number of control updates since creation
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

fn initial_tracks(now: u64) -> [ControlTrack; 3] {
    [
        ControlTrack { previous: INITIAL_FREQUENCY, changed_at: now },
        ControlTrack { previous: INITIAL_PHASE, changed_at: now },
        ControlTrack { previous: INITIAL_SUPPRESSION, changed_at: now },
    ]
}

// =============================================================================
// TESTS
// =============================================================================
