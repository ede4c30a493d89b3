//! Signal Calibrator: coherence engine behind the dimensional signal panel
//!
//! Three controls (frequency, phase, noise suppression) are steered toward
//! fixed targets. The engine derives coherence, noise and signal strength,
//! classifies the result and drops the signal when controls move too fast.

pub mod config;
pub mod core;
pub mod types;

// =============================================================================
// TARGETS [C]
// =============================================================================

/// Frequency the operator is steering toward
pub const IDEAL_FREQUENCY: f64 = 50.0;

/// Phase alignment target
pub const IDEAL_PHASE: f64 = 75.0;

/// Noise suppression target
pub const IDEAL_SUPPRESSION: f64 = 30.0;

// =============================================================================
// THRESHOLDS [C]
// =============================================================================

/// Coherence at or above this is SIGNAL_LOCK
pub const LOCK_THRESHOLD: f64 = 80.0;

/// Coherence at or above this (below lock) is PATTERN_DETECTED
pub const PATTERN_THRESHOLD: f64 = 60.0;

/// Largest single jump allowed inside the failure window
pub const FAILURE_SPEED_THRESHOLD: f64 = 20.0;

/// Window for rapid-movement detection (milliseconds)
pub const FAILURE_TIME_WINDOW_MS: u64 = 500;

/// How long SIGNAL_LOST holds before falling back to SEARCHING (milliseconds)
pub const SIGNAL_LOST_HOLD_MS: u64 = 2000;

/// Suppression above this drops the signal
pub const SUPPRESSION_LIMIT: f64 = 80.0;

/// Phase must stay within [PHASE_MIN, PHASE_MAX]
pub const PHASE_MIN: f64 = 20.0;
pub const PHASE_MAX: f64 = 90.0;

/// Lower / upper bound for every numeric field
pub const VALUE_MIN: f64 = 0.0;
pub const VALUE_MAX: f64 = 100.0;

// =============================================================================
// INITIAL CONTROLS [C]
// =============================================================================

pub const INITIAL_FREQUENCY: f64 = 25.0;
pub const INITIAL_PHASE: f64 = 50.0;
pub const INITIAL_SUPPRESSION: f64 = 50.0;

/// Log entries kept by the recorder
pub const LOG_CAPACITY: usize = 10;

/// Keyboard step for arrow keys
pub const KEY_STEP: f64 = 5.0;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";

/// Clamp a raw input into [0, 100]. NaN is read as 0.
pub fn clamp_value(value: f64) -> f64 {
    if value.is_nan() {
        return VALUE_MIN;
    }
    value.clamp(VALUE_MIN, VALUE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_value_bounds() {
        assert_eq!(clamp_value(-5.0), 0.0);
        assert_eq!(clamp_value(150.0), 100.0);
        assert_eq!(clamp_value(42.5), 42.5);
        assert_eq!(clamp_value(f64::NAN), 0.0);
        assert_eq!(clamp_value(f64::INFINITY), 100.0);
        assert_eq!(clamp_value(f64::NEG_INFINITY), 0.0);
    }
}
