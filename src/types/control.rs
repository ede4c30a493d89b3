//! The three operator controls

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{IDEAL_FREQUENCY, IDEAL_PHASE, IDEAL_SUPPRESSION};

/// One of the three user-adjustable inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    #[serde(alias = "freq")]
    Frequency,
    Phase,
    #[serde(alias = "suppression")]
    NoiseSuppression,
}

impl Control {
    pub const ALL: [Control; 3] = [Control::Frequency, Control::Phase, Control::NoiseSuppression];

    /// Target value for this control
    pub fn ideal(&self) -> f64 {
        match self {
            Control::Frequency => IDEAL_FREQUENCY,
            Control::Phase => IDEAL_PHASE,
            Control::NoiseSuppression => IDEAL_SUPPRESSION,
        }
    }

    /// Name used in failure log lines
    pub fn log_name(&self) -> &'static str {
        match self {
            Control::Frequency => "FREQUENCY",
            Control::Phase => "PHASE",
            Control::NoiseSuppression => "SUPPRESSION",
        }
    }
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Control::Frequency => "frequency",
            Control::Phase => "phase",
            Control::NoiseSuppression => "noise_suppression",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown control '{0}' (expected frequency, phase or suppression)")]
pub struct ParseControlError(pub String);

impl std::str::FromStr for Control {
    type Err = ParseControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frequency" | "freq" | "f" => Ok(Control::Frequency),
            "phase" | "p" => Ok(Control::Phase),
            "noise_suppression" | "suppression" | "supp" | "noise" | "s" => {
                Ok(Control::NoiseSuppression)
            }
            other => Err(ParseControlError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("freq".parse::<Control>(), Ok(Control::Frequency));
        assert_eq!("P".parse::<Control>(), Ok(Control::Phase));
        assert_eq!("supp".parse::<Control>(), Ok(Control::NoiseSuppression));
        assert!("volume".parse::<Control>().is_err());
    }

    #[test]
    fn test_deserialize_alias() {
        let c: Control = serde_json::from_str("\"suppression\"").unwrap();
        assert_eq!(c, Control::NoiseSuppression);
    }
}
