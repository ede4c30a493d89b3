//! Audio cue planner
//!
//! Maps signal state to the ambience track and the one-shot radio effect
//! fired on status entry. Playback belongs to the front end.

use crate::types::{AudioCue, CuePlan, SignalState, SignalStatus};
use crate::{LOCK_THRESHOLD, PATTERN_THRESHOLD};

/// Below this coherence only static is heard
pub const STATIC_CEILING: f64 = 30.0;

/// Ambience for the current state
pub fn plan_ambience(state: &SignalState) -> CuePlan {
    if state.status == SignalStatus::SignalLost {
        return CuePlan { cue: AudioCue::Distort, looping: false, volume: 0.8 };
    }

    if state.coherence < STATIC_CEILING {
        CuePlan {
            cue: AudioCue::Static,
            looping: true,
            volume: (state.noise_level / 100.0).clamp(0.0, 1.0),
        }
    } else if state.coherence < PATTERN_THRESHOLD {
        CuePlan { cue: AudioCue::Pulse, looping: true, volume: 0.7 }
    } else if state.coherence < LOCK_THRESHOLD {
        CuePlan { cue: AudioCue::Warble, looping: true, volume: 0.5 }
    } else {
        CuePlan { cue: AudioCue::Beep, looping: false, volume: 0.5 }
    }
}

/// Effect for entering `next` from `prev`
pub fn status_effect(prev: SignalStatus, next: SignalStatus) -> Option<CuePlan> {
    if prev == next {
        return None;
    }
    match next {
        SignalStatus::PatternDetected => {
            Some(CuePlan { cue: AudioCue::Squelch, looping: false, volume: 0.6 })
        }
        SignalStatus::SignalLock => {
            Some(CuePlan { cue: AudioCue::Transmission, looping: false, volume: 0.6 })
        }
        _ => None,
    }
}

/// Tracks mute and what is currently playing so callers only react to changes
#[derive(Debug, Clone, Default)]
pub struct CuePlanner {
    muted: bool,
    current: Option<AudioCue>,
    last_status: Option<SignalStatus>,
}

/// Cues to start after a state change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueChange {
    pub ambience: Option<CuePlan>,
    pub effect: Option<CuePlan>,
}

impl CuePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flip mute, returns the new value
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if self.muted {
            self.current = None;
        }
        self.muted
    }

    /// Observe a new state; returns what should start playing
    pub fn observe(&mut self, state: &SignalState) -> CueChange {
        let prev = self.last_status.replace(state.status);
        if self.muted {
            return CueChange::default();
        }

        let plan = plan_ambience(state);
        // loops keep running and one-shots are not replayed
        let ambience = if self.current == Some(plan.cue) {
            None
        } else {
            self.current = Some(plan.cue);
            Some(plan)
        };

        let effect = prev.and_then(|p| status_effect(p, state.status));
        CueChange { ambience, effect }
    }
}
