//! Decoded intercept panel data

use serde::{Deserialize, Serialize};

/// One of the fixed intercepted transmissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedMessage {
    pub location: &'static str,
    pub event_type: &'static str,
    pub time_offset: &'static str,
}

/// Intercept as rendered for the current coherence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intercept {
    /// Index into the message table
    pub index: usize,
    pub location: String,
    pub event_type: String,
    pub time_offset: String,
    /// Coherence at or above lock threshold
    pub decoded: bool,
}
