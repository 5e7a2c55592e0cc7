//! Day/night cycle.
//!
//! A day lasts `day_length_secs` of simulated time. Normalized time runs
//! from 0 to 1 and maps onto [`DayPhase`]s; a notification is produced each
//! time the phase changes.

use minipoll_core::{DayPhase, TimeOfDay};
use tracing::debug;

/// Drives [`TimeOfDay`] notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCycle {
    day_length_secs: f64,
    normalized: f64,
    day_number: u32,
    phase: DayPhase,
}

impl DayCycle {
    /// A cycle starting at normalized time `start` on day 1.
    #[must_use]
    pub fn new(day_length_secs: f64, start: f32) -> Self {
        let day_length_secs =
            if day_length_secs.is_finite() && day_length_secs > 0.0 { day_length_secs } else { 300.0 };
        let normalized = f64::from(start).rem_euclid(1.0);
        #[allow(clippy::cast_possible_truncation)]
        let phase = DayPhase::from_normalized(normalized as f32);
        Self { day_length_secs, normalized, day_number: 1, phase }
    }

    /// Advance by `dt` seconds. Returns a notification when the phase changed.
    pub fn advance(&mut self, dt: f64) -> Option<TimeOfDay> {
        if !(dt.is_finite() && dt > 0.0) {
            return None;
        }
        self.normalized += dt / self.day_length_secs;
        while self.normalized >= 1.0 {
            self.normalized -= 1.0;
            self.day_number = self.day_number.saturating_add(1);
        }

        let current = self.time_of_day();
        if current.phase == self.phase {
            return None;
        }
        debug!(phase = ?current.phase, day = current.day_number, "time of day changed");
        self.phase = current.phase;
        Some(current)
    }

    /// Current time of day.
    #[must_use]
    pub fn time_of_day(&self) -> TimeOfDay {
        #[allow(clippy::cast_possible_truncation)]
        let normalized_time = self.normalized as f32;
        TimeOfDay {
            phase: DayPhase::from_normalized(normalized_time),
            normalized_time,
            day_number: self.day_number,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DayPhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_noon_by_default_offset() {
        let cycle = DayCycle::new(300.0, 0.3);
        assert_eq!(cycle.phase(), DayPhase::Noon);
        assert_eq!(cycle.time_of_day().day_number, 1);
    }

    #[test]
    fn notifies_only_on_phase_change() {
        let mut cycle = DayCycle::new(100.0, 0.3);
        assert_eq!(cycle.advance(1.0), None);
        // 0.31 → 0.46 crosses into the afternoon.
        let tod = cycle.advance(15.0).expect("phase changed");
        assert_eq!(tod.phase, DayPhase::Afternoon);
        assert_eq!(cycle.advance(1.0), None);
    }

    #[test]
    fn wraps_into_next_day() {
        let mut cycle = DayCycle::new(100.0, 0.95);
        let tod = cycle.advance(10.0).expect("wrapped to dawn");
        assert_eq!(tod.phase, DayPhase::Dawn);
        assert_eq!(tod.day_number, 2);
    }
}
