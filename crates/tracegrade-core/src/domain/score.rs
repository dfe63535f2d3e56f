//! Per-item score records and quality tiers.

use serde::{Deserialize, Serialize};

/// Overall score at or above which an item passes.
pub const PASS_THRESHOLD: f64 = 0.7;

/// Round to three decimal places, half away from zero.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Result of scoring one reasoning trace against one rubric.
///
/// # Invariants
///
/// Every score lies in `[0, 1]` and `passes_threshold` equals
/// `overall_score >= PASS_THRESHOLD` on the reported (rounded) value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub overall_score: f64,
    pub length_score: f64,
    pub quality_indicator_score: f64,
    pub structure_score: f64,
    pub completeness_score: f64,
    pub coherence_score: f64,
    /// Trace length in characters.
    pub reasoning_length: usize,
    /// Rubric minimum length the trace was measured against.
    pub required_length: usize,
    pub passes_threshold: bool,
}

impl ScoredItem {
    /// All-zero result for an empty trace.
    pub fn empty(required_length: usize) -> Self {
        Self {
            overall_score: 0.0,
            length_score: 0.0,
            quality_indicator_score: 0.0,
            structure_score: 0.0,
            completeness_score: 0.0,
            coherence_score: 0.0,
            reasoning_length: 0,
            required_length,
            passes_threshold: false,
        }
    }

    /// Tier of this item's overall score.
    pub fn tier(&self) -> QualityTier {
        QualityTier::from_score(self.overall_score)
    }
}

/// Quality tier derived from an overall score via fixed cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::Excellent
        } else if score >= 0.8 {
            Self::Good
        } else if score >= PASS_THRESHOLD {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Four-bucket histogram of quality tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl QualityDistribution {
    pub fn from_scores(scores: impl IntoIterator<Item = f64>) -> Self {
        let mut dist = Self::default();
        for score in scores {
            match QualityTier::from_score(score) {
                QualityTier::Excellent => dist.excellent += 1,
                QualityTier::Good => dist.good += 1,
                QualityTier::Fair => dist.fair += 1,
                QualityTier::Poor => dist.poor += 1,
            }
        }
        dist
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.fair + self.poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_cutoffs() {
        assert_eq!(QualityTier::from_score(0.9), QualityTier::Excellent);
        assert_eq!(QualityTier::from_score(0.899), QualityTier::Good);
        assert_eq!(QualityTier::from_score(0.8), QualityTier::Good);
        assert_eq!(QualityTier::from_score(0.7), QualityTier::Fair);
        assert_eq!(QualityTier::from_score(0.699), QualityTier::Poor);
        assert_eq!(QualityTier::from_score(0.0), QualityTier::Poor);
    }

    #[test]
    fn test_distribution_one_per_bucket() {
        let dist = QualityDistribution::from_scores([0.95, 0.85, 0.72, 0.5]);
        assert_eq!(
            dist,
            QualityDistribution {
                excellent: 1,
                good: 1,
                fair: 1,
                poor: 1
            }
        );
        assert_eq!(dist.total(), 4);
    }

    #[test]
    fn test_distribution_empty_is_zero() {
        let dist = QualityDistribution::from_scores(Vec::new());
        assert_eq!(dist, QualityDistribution::default());
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.8514), 0.851);
        assert_eq!(round3(0.8515), 0.852);
        assert_eq!(round3(1.0), 1.0);
    }

    #[test]
    fn test_empty_item_fails() {
        let item = ScoredItem::empty(150);
        assert!(!item.passes_threshold);
        assert_eq!(item.tier(), QualityTier::Poor);
        assert_eq!(item.required_length, 150);
    }
}
