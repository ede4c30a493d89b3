//! Core types for the signal calibrator

mod status;
mod control;
mod signal;
mod log;
mod intercept;
mod audio;

pub use status::SignalStatus;
pub use control::{Control, ParseControlError};
pub use signal::{SignalState, SignalReading};
pub use log::{
    LogEntry, Severity, FailureReason, MSG_SEARCH_INITIATED, pattern_detected_message,
    signal_lock_message,
};
pub use intercept::{DecodedMessage, Intercept};
pub use audio::{AudioCue, CuePlan};
