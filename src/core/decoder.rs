//! Intercept decoder
//!
//! Picks one of the fixed transmissions from the coherence band and reveals
//! it left to right as coherence rises. Unresolved characters show as `█`.

use crate::types::{DecodedMessage, Intercept, SignalState};
use crate::LOCK_THRESHOLD;

pub const MASK_CHAR: char = '█';

pub const MESSAGES: [DecodedMessage; 3] = [
    DecodedMessage {
        location: "CAMP HERO",
        event_type: "TEMPORAL RIFT",
        time_offset: "-48 HRS",
    },
    DecodedMessage {
        location: "MONTAUK POINT",
        event_type: "DIMENSIONAL BREACH",
        time_offset: "+12 HRS",
    },
    DecodedMessage {
        location: "UNDERGROUND LAB",
        event_type: "PSYCHIC ANOMALY",
        time_offset: "REALTIME",
    },
];

/// Message table index for a coherence value
pub fn message_index(coherence: f64) -> usize {
    let band = ((coherence / 100.0) * MESSAGES.len() as f64).floor();
    if !band.is_finite() || band < 0.0 {
        return 0;
    }
    band as usize % MESSAGES.len()
}

/// Reveal character `i` of `n` once coherence exceeds `i / n * 100`
pub fn resolve_text(text: &str, coherence: f64) -> String {
    let len = text.chars().count();
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let threshold = (i as f64 / len as f64) * 100.0;
            if coherence > threshold { c } else { MASK_CHAR }
        })
        .collect()
}

pub fn decode(coherence: f64) -> Intercept {
    let index = message_index(coherence);
    let message = &MESSAGES[index];
    Intercept {
        index,
        location: resolve_text(message.location, coherence),
        event_type: resolve_text(message.event_type, coherence),
        time_offset: resolve_text(message.time_offset, coherence),
        decoded: coherence >= LOCK_THRESHOLD,
    }
}

pub fn decode_state(state: &SignalState) -> Intercept {
    decode(state.coherence)
}
