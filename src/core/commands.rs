//! Operator commands and key bindings
//!
//! Arrow keys step frequency (up/down) and phase (right/left) by 5,
//! `m` toggles audio, Escape closes. The CLI accepts the same keys by name
//! plus explicit assignments such as `freq 50`, `phase +5` or `s=30`.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::core::clock::{Clock, ManualClock};
use crate::core::engine::SignalEngine;
use crate::types::{Control, SignalState};
use crate::{FAILURE_TIME_WINDOW_MS, KEY_STEP};

lazy_static! {
    // control, optional separator, optional sign, number
    static ref RE_ASSIGN: Regex = Regex::new(
        r"(?i)^\s*(frequency|freq|f|phase|p|noise_suppression|suppression|supp|noise|s)\s*(?:=|:|\s)\s*([+-]?)\s*(\d+(?:\.\d+)?)\s*$"
    ).unwrap();
}

/// Physical keys the calibrator listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Mute,
    Escape,
}

impl Key {
    pub fn from_name(name: &str) -> Option<Key> {
        match name.trim().to_ascii_lowercase().as_str() {
            "up" | "arrowup" | "k" => Some(Key::ArrowUp),
            "down" | "arrowdown" | "j" => Some(Key::ArrowDown),
            "left" | "arrowleft" | "h" => Some(Key::ArrowLeft),
            "right" | "arrowright" | "l" => Some(Key::ArrowRight),
            "m" | "mute" => Some(Key::Mute),
            "esc" | "escape" | "quit" | "exit" | "q" => Some(Key::Escape),
            _ => None,
        }
    }

    pub fn command(&self) -> Command {
        match self {
            Key::ArrowUp => Command::Adjust { control: Control::Frequency, delta: KEY_STEP },
            Key::ArrowDown => Command::Adjust { control: Control::Frequency, delta: -KEY_STEP },
            Key::ArrowLeft => Command::Adjust { control: Control::Phase, delta: -KEY_STEP },
            Key::ArrowRight => Command::Adjust { control: Control::Phase, delta: KEY_STEP },
            Key::Mute => Command::ToggleMute,
            Key::Escape => Command::Quit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Set { control: Control, value: f64 },
    Adjust { control: Control, delta: f64 },
    Reset,
    ToggleMute,
    Logs,
    Intercept,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unrecognized command '{0}' (type 'help')")]
    Unknown(String),
}

impl Command {
    /// Parse one line of operator input
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        if let Some(key) = Key::from_name(line) {
            return Ok(key.command());
        }

        match line.to_ascii_lowercase().as_str() {
            "reset" | "r" => return Ok(Command::Reset),
            "logs" | "log" => return Ok(Command::Logs),
            "intercept" | "decode" => return Ok(Command::Intercept),
            "help" | "?" => return Ok(Command::Help),
            _ => {}
        }

        let caps = RE_ASSIGN
            .captures(line)
            .ok_or_else(|| CommandError::Unknown(line.to_string()))?;
        let control: Control = caps[1]
            .parse()
            .map_err(|_| CommandError::Unknown(line.to_string()))?;
        let magnitude: f64 = caps[3]
            .parse()
            .map_err(|_| CommandError::Unknown(line.to_string()))?;

        Ok(match &caps[2] {
            "+" => Command::Adjust { control, delta: magnitude },
            "-" => Command::Adjust { control, delta: -magnitude },
            _ => Command::Set { control, value: magnitude },
        })
    }

    /// Parse a comma-separated list such as `f=50,p=75,s=30`
    pub fn parse_list(list: &str) -> Result<Vec<Command>, CommandError> {
        list.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Command::parse)
            .collect()
    }

    /// Run a control command against the engine. Other commands return None.
    pub fn apply<C: Clock>(&self, engine: &mut SignalEngine<C>) -> Option<SignalState> {
        match *self {
            Command::Set { control, value } => Some(engine.set(control, value)),
            Command::Adjust { control, delta } => Some(engine.nudge(control, delta)),
            Command::Reset => Some(engine.reset()),
            _ => None,
        }
    }
}

/// Apply a batch as if each command were entered by hand: the clock moves a
/// full rapid-movement window before every command, so only the values
/// themselves can trip a failure. Returns the state after the last control
/// command, or the current state if there was none.
pub fn apply_paced(
    commands: &[Command],
    engine: &mut SignalEngine<ManualClock>,
    clock: &ManualClock,
) -> SignalState {
    let mut state = engine.state().clone();
    for command in commands {
        clock.advance(FAILURE_TIME_WINDOW_MS);
        if let Some(next) = command.apply(engine) {
            state = next;
        }
    }
    state
}

pub const HELP: &str = "\
Commands:
  up / down          frequency +5 / -5
  right / left       phase +5 / -5
  freq 50            set a control (freq, phase, supp)
  phase +5           move a control relative to its value
  reset              restart the signal search
  logs               show the system log
  intercept          show the decoded intercept
  m                  toggle audio cues
  quit               leave";

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arrow_keys() {
        assert_eq!(
            Command::parse("up"),
            Ok(Command::Adjust { control: Control::Frequency, delta: 5.0 })
        );
        assert_eq!(
            Command::parse("LEFT"),
            Ok(Command::Adjust { control: Control::Phase, delta: -5.0 })
        );
        assert_eq!(Command::parse("m"), Ok(Command::ToggleMute));
        assert_eq!(Command::parse("esc"), Ok(Command::Quit));
    }

    #[test]
    fn test_assignments() {
        assert_eq!(
            Command::parse("freq 50"),
            Ok(Command::Set { control: Control::Frequency, value: 50.0 })
        );
        assert_eq!(
            Command::parse("s=30.5"),
            Ok(Command::Set { control: Control::NoiseSuppression, value: 30.5 })
        );
        assert_eq!(
            Command::parse("phase -12"),
            Ok(Command::Adjust { control: Control::Phase, delta: -12.0 })
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert!(matches!(Command::parse("volume 3"), Err(CommandError::Unknown(_))));
        assert!(matches!(Command::parse("freq"), Err(CommandError::Unknown(_))));
    }

    #[test]
    fn test_parse_list() {
        let cmds = Command::parse_list("f=50, p=75,s=30").unwrap();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[1], Command::Set { control: Control::Phase, value: 75.0 });
    }
}
