//! Learning curves: how raw outcome intensity maps to learned intensity.

use serde::{Deserialize, Serialize};

/// Shape of the intensity mapping applied before learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LearningCurve {
    /// Learn the raw intensity (negative values floor at 0).
    Linear,
    /// Smoothstep over `[0, 1]`: weak outcomes barely register, strong ones
    /// saturate.
    #[default]
    EaseInOut,
}

impl LearningCurve {
    /// Map a raw intensity to the learned intensity.
    #[must_use]
    pub fn apply(self, intensity: f32) -> f32 {
        match self {
            Self::Linear => intensity.max(0.0),
            Self::EaseInOut => ease_in_out(intensity),
        }
    }
}

/// Smoothstep `3t² − 2t³` on `t` clamped to `[0, 1]`.
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_in_out_endpoints_and_midpoint() {
        assert!(ease_in_out(0.0).abs() < f32::EPSILON);
        assert!((ease_in_out(1.0) - 1.0).abs() < f32::EPSILON);
        assert!((ease_in_out(0.5) - 0.5).abs() < f32::EPSILON);
        assert!((ease_in_out(7.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn ease_in_out_is_monotonic() {
        let mut previous = 0.0;
        for i in 0..=100 {
            #[allow(clippy::cast_precision_loss)]
            let v = ease_in_out(i as f32 / 100.0);
            assert!(v >= previous);
            previous = v;
        }
    }

    #[test]
    fn linear_floors_negative() {
        assert!(LearningCurve::Linear.apply(-0.5).abs() < f32::EPSILON);
        assert!((LearningCurve::Linear.apply(1.5) - 1.5).abs() < f32::EPSILON);
    }
}
