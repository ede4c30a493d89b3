//! System log entries

use serde::{Deserialize, Serialize};

use crate::types::Control;

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn color(&self) -> colored::Color {
        match self {
            Severity::Info => colored::Color::White,
            Severity::Success => colored::Color::Green,
            Severity::Warning => colored::Color::Yellow,
            Severity::Error => colored::Color::Red,
        }
    }
}

/// One immutable line of the system log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Increases with every recorded entry
    pub id: u64,
    /// Wall clock, 24h `HH:MM:SS`
    pub timestamp: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
}

impl LogEntry {
    pub(crate) fn new(id: u64, timestamp: String, message: String, severity: Severity) -> Self {
        Self { id, timestamp, message, severity }
    }
}

/// Why a control update dropped the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "control", rename_all = "snake_case")]
pub enum FailureReason {
    /// Large jump inside the failure window
    RapidMovement(Control),
    /// Suppression was already above its limit
    SuppressionTooHigh,
    /// Phase was already outside its band
    PhaseMisalignment,
}

impl FailureReason {
    pub fn message(&self) -> String {
        match self {
            FailureReason::RapidMovement(control) => {
                format!("SIGNAL LOST - {} MOVED TOO FAST", control.log_name())
            }
            FailureReason::SuppressionTooHigh => "SIGNAL LOST - NOISE SUPPRESSION TOO HIGH".to_string(),
            FailureReason::PhaseMisalignment => "SIGNAL LOST - PHASE MISALIGNMENT".to_string(),
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

pub const MSG_SEARCH_INITIATED: &str = "SIGNAL SEARCH INITIATED";

pub fn pattern_detected_message(coherence: i64) -> String {
    format!("COHERENCE {}% - PATTERN DETECTED", coherence)
}

pub fn signal_lock_message(coherence: i64) -> String {
    format!("COHERENCE {}% - SIGNAL LOCK", coherence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            FailureReason::RapidMovement(Control::NoiseSuppression).message(),
            "SIGNAL LOST - SUPPRESSION MOVED TOO FAST"
        );
        assert_eq!(
            FailureReason::SuppressionTooHigh.to_string(),
            "SIGNAL LOST - NOISE SUPPRESSION TOO HIGH"
        );
    }

    #[test]
    fn test_entry_serializes_severity_as_type() {
        let entry = LogEntry::new(3, "12:00:01".into(), "X".into(), Severity::Success);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["timestamp"], "12:00:01");
    }
}
