//! Time sources for the engine
//!
//! The engine only needs two readings: a monotonic millisecond counter for
//! rapid-movement and SIGNAL_LOST windows, and a wall clock for log stamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Local, NaiveTime};

pub trait Clock {
    /// Monotonic milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u64;

    /// Local time of day, used for `HH:MM:SS` stamps
    fn wall_time(&self) -> NaiveTime;
}

/// Real clock: `Instant` for ordering, local time for stamps
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn wall_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Hand-driven clock. Clones share the same counter, so a test can keep
/// one handle and give the other to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ms: Arc<AtomicU64>,
    wall_origin: NaiveTime,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Starts at 0 ms, wall clock 12:00:00
    pub fn new() -> Self {
        Self::starting_at(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default())
    }

    pub fn starting_at(wall_origin: NaiveTime) -> Self {
        Self {
            ms: Arc::new(AtomicU64::new(0)),
            wall_origin,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.ms.load(Ordering::SeqCst)
    }

    fn wall_time(&self) -> NaiveTime {
        self.wall_origin + Duration::milliseconds(self.now_ms() as i64)
    }
}

/// 24h `HH:MM:SS`
pub fn format_timestamp(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(750);
        assert_eq!(clock.now_ms(), 750);
        handle.set(10);
        assert_eq!(clock.now_ms(), 10);
    }

    #[test]
    fn test_manual_wall_time_follows_counter() {
        let clock = ManualClock::new();
        clock.advance(61_000);
        assert_eq!(format_timestamp(clock.wall_time()), "12:01:01");
    }

    #[test]
    fn test_format_is_24h() {
        let t = NaiveTime::from_hms_opt(23, 5, 9).unwrap();
        assert_eq!(format_timestamp(t), "23:05:09");
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
