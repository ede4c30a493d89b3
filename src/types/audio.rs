//! Audio cue types

use serde::{Deserialize, Serialize};

/// Ambience tracks and one-shot radio effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    Static,
    Pulse,
    Warble,
    Beep,
    Distort,
    Squelch,
    Transmission,
}

/// What should be playing for a given state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuePlan {
    pub cue: AudioCue,
    pub looping: bool,
    /// 0.0-1.0
    pub volume: f64,
}
