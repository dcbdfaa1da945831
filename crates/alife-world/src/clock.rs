//! Decouples simulation ticks from the host's frame rate.

use serde::{Deserialize, Serialize};

/// Fires at most once per `interval` seconds of host time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickClock {
    interval: f64,
    last: Option<f64>,
}

impl TickClock {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Report whether a tick is due at host time `now` (seconds).
    ///
    /// The first call only records the start time.
    pub fn ready(&mut self, now: f64) -> bool {
        let last = *self.last.get_or_insert(now);
        if last + self.interval > now {
            return false;
        }
        self.last = Some(now);
        true
    }
}
