//! Core modules for the signal calibrator

pub mod clock;
pub mod log_recorder;
pub mod engine;
pub mod decoder;
pub mod audio;
pub mod commands;
pub mod api;

pub use clock::{Clock, SystemClock, ManualClock, format_timestamp};
pub use log_recorder::LogRecorder;
pub use engine::{SignalEngine, compute_signal, check_failure};
pub use decoder::{decode, decode_state, resolve_text, message_index};
pub use audio::{CuePlanner, CueChange, plan_ambience, status_effect};
pub use commands::{apply_paced, Command, CommandError, Key};
pub use api::{create_router, run_server, ApiError};
