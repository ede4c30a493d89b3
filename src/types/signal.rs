//! Signal state and derived readings

use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};

use crate::types::{Control, SignalStatus};
use crate::{
    INITIAL_FREQUENCY, INITIAL_PHASE, INITIAL_SUPPRESSION, LOCK_THRESHOLD, PATTERN_THRESHOLD,
};

/// Full state of a calibration session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalState {
    /// 0-100, falls off with frequency distance from ideal
    pub signal_strength: f64,
    /// 0-100, aggregate control error
    pub noise_level: f64,
    /// 0-100, drives status
    pub coherence: f64,
    pub frequency: f64,
    pub phase: f64,
    pub noise_suppression: f64,
    pub status: SignalStatus,
    /// True iff status is SIGNAL_LOCK
    pub is_locked: bool,
    /// Monotonic ms of the most recent failure
    pub last_failure_time: Option<u64>,
}

impl Default for SignalState {
    fn default() -> Self {
        Self {
            signal_strength: 0.0,
            noise_level: 100.0,
            coherence: 0.0,
            frequency: INITIAL_FREQUENCY,
            phase: INITIAL_PHASE,
            noise_suppression: INITIAL_SUPPRESSION,
            status: SignalStatus::Searching,
            is_locked: false,
            last_failure_time: None,
        }
    }
}

impl SignalState {
    /// Current value of one control
    pub fn control(&self, control: Control) -> f64 {
        match control {
            Control::Frequency => self.frequency,
            Control::Phase => self.phase,
            Control::NoiseSuppression => self.noise_suppression,
        }
    }

    pub(crate) fn set_control(&mut self, control: Control, value: f64) {
        match control {
            Control::Frequency => self.frequency = value,
            Control::Phase => self.phase = value,
            Control::NoiseSuppression => self.noise_suppression = value,
        }
    }

    /// Replace derived fields with a fresh reading
    pub(crate) fn apply(&mut self, reading: SignalReading) {
        self.signal_strength = reading.signal_strength;
        self.noise_level = reading.noise_level;
        self.coherence = reading.coherence;
        self.status = reading.status;
        self.is_locked = reading.is_locked;
    }

    /// Coherence as shown to the operator
    pub fn coherence_percent(&self) -> i64 {
        self.coherence.round() as i64
    }

    /// Color band for the coherence readout
    pub fn coherence_color(&self) -> Color {
        if self.coherence >= LOCK_THRESHOLD {
            Color::Green
        } else if self.coherence >= PATTERN_THRESHOLD {
            Color::Yellow
        } else {
            Color::Red
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        format!(
            "{} {} | coherence={} | strength={:.0} | noise={:.0} | f={:.0} p={:.0} s={:.0}",
            self.status.glyph().color(self.status.color()),
            self.status.label().color(self.status.color()).bold(),
            format!("{}%", self.coherence_percent()).color(self.coherence_color()),
            self.signal_strength,
            self.noise_level,
            self.frequency,
            self.phase,
            self.noise_suppression,
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "status={} | coherence={:.1} | strength={:.1} | noise={:.1} | frequency={:.1} | phase={:.1} | suppression={:.1}",
            self.status,
            self.coherence,
            self.signal_strength,
            self.noise_level,
            self.frequency,
            self.phase,
            self.noise_suppression,
        )
    }
}

/// Output of the signal derivation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReading {
    pub signal_strength: f64,
    pub noise_level: f64,
    pub coherence: f64,
    pub status: SignalStatus,
    pub is_locked: bool,
}
