//! Signal status definitions

use serde::{Deserialize, Serialize};

/// The four possible states of a calibration session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStatus {
    /// Coherence below pattern threshold
    Searching,
    /// Coherence in [60, 80)
    PatternDetected,
    /// Coherence at or above 80
    SignalLock,
    /// Transient failure after rapid movement or bad control combination
    SignalLost,
}

impl SignalStatus {
    /// Name used on the coherence display (`SIGNAL LOCK`)
    pub fn label(&self) -> &'static str {
        match self {
            SignalStatus::Searching => "SEARCHING",
            SignalStatus::PatternDetected => "PATTERN DETECTED",
            SignalStatus::SignalLock => "SIGNAL LOCK",
            SignalStatus::SignalLost => "SIGNAL LOST",
        }
    }

    /// Glyph for terminal prompts
    pub fn glyph(&self) -> &'static str {
        match self {
            SignalStatus::Searching => "◌",
            SignalStatus::PatternDetected => "◍",
            SignalStatus::SignalLock => "●",
            SignalStatus::SignalLost => "✕",
        }
    }

    /// Terminal color name understood by `colored`
    pub fn color(&self) -> colored::Color {
        match self {
            SignalStatus::Searching => colored::Color::Yellow,
            SignalStatus::PatternDetected => colored::Color::Blue,
            SignalStatus::SignalLock => colored::Color::Green,
            SignalStatus::SignalLost => colored::Color::Red,
        }
    }
}

impl std::fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalStatus::Searching => "SEARCHING",
            SignalStatus::PatternDetected => "PATTERN_DETECTED",
            SignalStatus::SignalLock => "SIGNAL_LOCK",
            SignalStatus::SignalLost => "SIGNAL_LOST",
        };
        write!(f, "{}", name)
    }
}
