//! Fixed-interval scheduling.
//!
//! Each agent subsystem (decisions, emotion decay, needs, memory, social
//! maintenance) runs on its own [`Cadence`]. The tick pump feeds elapsed
//! time in; a cadence fires once its accumulator reaches the interval and
//! reports how much time it covered, which becomes the `dt` of that
//! subsystem's update.

use minipoll_core::config::MinipollConfig;

/// One repeating timer.
#[derive(Debug, Clone, PartialEq)]
pub struct Cadence {
    interval: f64,
    elapsed: f64,
    paused: bool,
}

impl Cadence {
    /// A timer firing every `interval` seconds.
    #[must_use]
    pub fn new(interval: f64) -> Self {
        let interval = if interval.is_finite() && interval > 0.0 { interval } else { 1.0 };
        Self { interval, elapsed: 0.0, paused: false }
    }

    /// Accumulate `dt`. Returns the covered time when the timer fires.
    ///
    /// At most one firing per call: a long frame covers several intervals in
    /// one update rather than replaying them.
    pub fn advance(&mut self, dt: f64) -> Option<f64> {
        if self.paused || !(dt.is_finite() && dt > 0.0) {
            return None;
        }
        self.elapsed += dt;
        if self.elapsed + 1e-9 >= self.interval {
            let covered = self.elapsed;
            self.elapsed = 0.0;
            Some(covered)
        } else {
            None
        }
    }

    /// Stop accumulating. Time spent paused is never reported.
    pub fn pause(&mut self) {
        self.paused = true;
        self.elapsed = 0.0;
    }

    /// Resume accumulating from zero.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether the timer is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Firing interval.
    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }
}

/// The five timers every agent runs.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCadences {
    /// Decision ticks.
    pub decision: Cadence,
    /// Emotion decay.
    pub emotion: Cadence,
    /// Need decay.
    pub needs: Cadence,
    /// Memory forgetting and interest point pruning.
    pub memory: Cadence,
    /// Relationship maintenance.
    pub social: Cadence,
}

impl AgentCadences {
    /// Timers at the configured intervals.
    #[must_use]
    pub fn from_config(config: &MinipollConfig) -> Self {
        Self {
            decision: Cadence::new(config.decision.decision_interval_secs),
            emotion: Cadence::new(config.emotion.decay_interval_secs),
            needs: Cadence::new(config.needs.update_interval_secs),
            memory: Cadence::new(config.memory.update_interval_secs),
            social: Cadence::new(config.social.update_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_interval_and_reports_covered_time() {
        let mut c = Cadence::new(0.5);
        assert_eq!(c.advance(0.2), None);
        assert_eq!(c.advance(0.2), None);
        let covered = c.advance(0.2).expect("fires");
        assert!((covered - 0.6).abs() < 1e-9);
        assert_eq!(c.advance(0.2), None);
    }

    #[test]
    fn exact_multiples_fire_despite_rounding() {
        let mut c = Cadence::new(2.0);
        let fired = (0..20).filter(|_| c.advance(0.1).is_some()).count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn paused_cadence_never_fires() {
        let mut c = Cadence::new(1.0);
        c.advance(0.9);
        c.pause();
        assert_eq!(c.advance(5.0), None);
        c.resume();
        assert_eq!(c.advance(0.5), None);
        assert!(c.advance(0.5).is_some());
    }

    #[test]
    fn invalid_interval_falls_back_to_one_second() {
        assert!((Cadence::new(0.0).interval() - 1.0).abs() < f64::EPSILON);
        assert!((Cadence::new(f64::NAN).interval() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn default_intervals() {
        let cadences = AgentCadences::from_config(&MinipollConfig::default());
        assert!((cadences.decision.interval() - 2.0).abs() < f64::EPSILON);
        assert!((cadences.emotion.interval() - 0.5).abs() < f64::EPSILON);
        assert!((cadences.memory.interval() - 5.0).abs() < f64::EPSILON);
    }
}
