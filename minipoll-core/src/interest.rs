//! Interest points: remembered world positions worth walking to.
//!
//! Exploration scans nearby objects and drops a point at each one, weighted
//! by [`crate::interaction::interest_level`]. When nothing is in reach the
//! agent heads for the best remaining point instead. Points expire after a
//! while, vanish once the agent wanders too far away, and the map keeps only
//! the most interesting ones.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::config::InteractionConfig;
use crate::types::{GameSeconds, Position};

/// One remembered position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestPoint {
    /// Where it is.
    pub position: Position,
    /// How interesting it looked when found, in `[0.1, 2.0]`.
    pub interest: f32,
    /// Game time of discovery.
    pub discovered_at: GameSeconds,
}

/// Bounded set of interest points for one agent.
#[derive(Debug, Clone)]
pub struct InterestMap {
    points: Vec<InterestPoint>,
    expiry_secs: f64,
    max_points: usize,
    merge_radius: f32,
    max_distance: f32,
}

impl InterestMap {
    /// An empty map tuned by `config`.
    #[must_use]
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            points: Vec::new(),
            expiry_secs: config.interest_expiry_secs,
            max_points: config.max_interest_points.max(1),
            merge_radius: config.interest_merge_radius,
            max_distance: config.max_interest_distance,
        }
    }

    /// Remember a position unless one is already within the merge radius.
    ///
    /// Returns whether a new point was added.
    pub fn add(&mut self, position: Position, interest: f32, now: GameSeconds) -> bool {
        if self.points.iter().any(|p| p.position.distance(&position) < self.merge_radius) {
            return false;
        }
        self.points.push(InterestPoint { position, interest, discovered_at: now });
        true
    }

    /// Drop expired and distant points, then keep the most interesting ones.
    pub fn prune(&mut self, agent: Position, now: GameSeconds) {
        let (expiry, reach) = (self.expiry_secs, self.max_distance);
        self.points
            .retain(|p| now - p.discovered_at <= expiry && agent.distance(&p.position) <= reach);
        if self.points.len() > self.max_points {
            self.points.sort_by_key(|p| std::cmp::Reverse(OrderedFloat(p.interest)));
            self.points.truncate(self.max_points);
        }
    }

    /// The point with the best `interest / (1 + 0.1·distance)`.
    #[must_use]
    pub fn best(&self, agent: Position) -> Option<&InterestPoint> {
        self.points
            .iter()
            .max_by_key(|p| OrderedFloat(p.interest / (1.0 + agent.distance(&p.position) * 0.1)))
    }

    /// Number of remembered points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in discovery order.
    #[must_use]
    pub fn points(&self) -> &[InterestPoint] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> InterestMap {
        InterestMap::new(&InteractionConfig::default())
    }

    #[test]
    fn nearby_points_merge() {
        let mut m = map();
        assert!(m.add(Position::new(0.0, 0.0, 0.0), 1.0, 0.0));
        assert!(!m.add(Position::new(0.5, 0.0, 0.0), 2.0, 0.0));
        assert!(m.add(Position::new(3.0, 0.0, 0.0), 1.0, 0.0));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn prune_drops_expired_and_distant() {
        let mut m = map();
        m.add(Position::new(1.0, 0.0, 0.0), 1.0, 0.0);
        m.add(Position::new(20.0, 0.0, 0.0), 1.0, 0.0);
        m.add(Position::new(-2.0, 0.0, 0.0), 1.0, 10.0);
        m.prune(Position::default(), 35.0);
        assert_eq!(m.len(), 1);
        assert!((m.points()[0].position.x + 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn prune_keeps_most_interesting() {
        let mut m = map();
        for i in 0..15_u8 {
            let x = f32::from(i) * 1.1 - 7.7;
            assert!(m.add(Position::new(x, 0.0, 0.0), f32::from(i) * 0.1, 0.0));
        }
        m.prune(Position::default(), 0.0);
        assert_eq!(m.len(), 10);
        assert!(m.points().iter().all(|p| p.interest > 0.45));
    }

    #[test]
    fn best_discounts_distance() {
        let mut m = map();
        m.add(Position::new(1.0, 0.0, 0.0), 1.0, 0.0);
        m.add(Position::new(7.0, 0.0, 0.0), 1.5, 0.0);
        // 1.0 / 1.1 ≈ 0.909 vs 1.5 / 1.7 ≈ 0.882
        let best = m.best(Position::default()).expect("has points");
        assert!((best.position.x - 1.0).abs() < f32::EPSILON);
    }
}
