//! Composite concentration score.
//!
//! `composite = w_pos * position
//!            + w_face * (blink_share * blink + (1 - blink_share) * expression)
//!            + w_stab * stability`
//!
//! The composite is a continuous value in `[0, 1]`; levels are assigned by
//! the state machine in [`crate::level`].

use attentive_common::config::AggregatorWeights;
use serde::Serialize;

/// Per-frame component scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentScores {
    pub position: f64,
    pub blink: f64,
    pub expression: f64,
    pub stability: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    weights: AggregatorWeights,
}

impl Aggregator {
    pub fn new(weights: AggregatorWeights) -> Self {
        Self { weights }
    }

    /// Blink and expression blended into the face score.
    pub fn face_score(&self, scores: &ComponentScores) -> f64 {
        let share = self.weights.blink_share;
        share * scores.blink + (1.0 - share) * scores.expression
    }

    pub fn composite(&self, scores: &ComponentScores) -> f64 {
        let w = &self.weights;
        let composite = w.position * scores.position
            + w.face * self.face_score(scores)
            + w.stability * scores.stability;
        composite.clamp(0.0, 1.0)
    }

    pub fn weights(&self) -> &AggregatorWeights {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Aggregator {
        Aggregator::new(AggregatorWeights {
            position: 0.4,
            face: 0.4,
            stability: 0.2,
            blink_share: 0.4,
        })
    }

    #[test]
    fn test_perfect_scores() {
        let scores = ComponentScores {
            position: 1.0,
            blink: 1.0,
            expression: 1.0,
            stability: 1.0,
        };
        assert!((standard().composite(&scores) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_scores_give_neutral_composite() {
        let scores = ComponentScores {
            position: 0.5,
            blink: 0.5,
            expression: 0.5,
            stability: 0.5,
        };
        assert!((standard().composite(&scores) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_weighting() {
        let scores = ComponentScores {
            position: 1.0,
            blink: 0.0,
            expression: 1.0,
            stability: 0.0,
        };
        let aggregator = standard();
        assert!((aggregator.face_score(&scores) - 0.6).abs() < 1e-12);
        // 0.4 * 1.0 + 0.4 * 0.6 + 0.2 * 0.0
        assert!((aggregator.composite(&scores) - 0.64).abs() < 1e-12);
    }

    #[test]
    fn test_lightweight_profile() {
        let aggregator = Aggregator::new(AggregatorWeights {
            position: 0.35,
            face: 0.35,
            stability: 0.3,
            blink_share: 0.4,
        });
        let scores = ComponentScores {
            position: 0.0,
            blink: 0.0,
            expression: 0.0,
            stability: 1.0,
        };
        assert!((aggregator.composite(&scores) - 0.3).abs() < 1e-12);
    }
}
