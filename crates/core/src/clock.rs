//! Time source for store-assigned timestamps.
//!
//! Stores are the only authority for "now". Production stores read the wall
//! clock; tests substitute a [`SteppingClock`] to make `date_added` and
//! `last_updated` reproducible.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

const MILLENNIUM_SECS: i64 = 946_684_800;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Wall-clock time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock: returns `start` first, then advances by `step` on every reading.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    /// Starts at 2000-01-01T00:00:00Z and advances one day per reading.
    pub fn millennium() -> Self {
        let start = DateTime::<Utc>::from_timestamp(MILLENNIUM_SECS, 0).unwrap_or_default();
        Self::new(start, Duration::days(1))
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::millennium()
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = *next;
        *next = now + self.step;
        now
    }
}
