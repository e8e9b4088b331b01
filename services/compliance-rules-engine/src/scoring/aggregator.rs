use crate::config::ScoringConfig;
use crate::models::{
    Decision, DecisionTier, ScoreBreakdown, REASON_APPROVED, REASON_HIGH_RISK, REASON_REVIEW,
};

/// Folds the per-signal contributions into one score and a decision tier.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    config: ScoringConfig,
}

impl ScoreAggregator {
    pub fn new(config: ScoringConfig) -> Self {
        ScoreAggregator { config }
    }

    /// Scores above the ceiling are divided once; the rest pass through.
    pub fn normalize(&self, raw: f64) -> f64 {
        if raw > self.config.normalization_ceiling {
            raw / self.config.normalization_divisor
        } else {
            raw
        }
    }

    pub fn classify(&self, score: f64) -> DecisionTier {
        if score >= self.config.reject_threshold {
            DecisionTier::Reject
        } else if score >= self.config.review_threshold {
            DecisionTier::Review
        } else {
            DecisionTier::Approve
        }
    }

    pub fn decide(&self, breakdown: &ScoreBreakdown) -> Decision {
        let score = self.normalize(breakdown.raw_total().max(0.0));
        let decision = self.classify(score);

        Decision {
            decision,
            reason: reason_for(decision).to_string(),
            score,
        }
    }

    /// Decision for a pipeline stage that fails the transaction outright.
    pub fn short_circuit(&self, reason: &str) -> Decision {
        Decision {
            decision: DecisionTier::Reject,
            reason: reason.to_string(),
            score: self.config.reject_threshold,
        }
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

fn reason_for(decision: DecisionTier) -> &'static str {
    match decision {
        DecisionTier::Approve => REASON_APPROVED,
        DecisionTier::Review => REASON_REVIEW,
        DecisionTier::Reject => REASON_HIGH_RISK,
    }
}
