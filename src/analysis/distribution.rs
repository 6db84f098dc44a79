//! Weighted rating histogram statistics
//!
//! The analyzer treats its input as an opaque `rating -> weight` histogram;
//! the weight can be a number of players or a number of games at that rating.
//! Every moment is frequency weighted.

use crate::utils::rating_bucket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// |skewness| above this marks a long tail
pub const SKEWNESS_THRESHOLD: f64 = 0.5;

/// |excess kurtosis| above this marks unusual tail weight
pub const KURTOSIS_THRESHOLD: f64 = 1.0;

/// Descriptive statistics of a non-empty histogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionStatistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub skewness: f64,
    /// Excess kurtosis, 0 for a normal distribution
    pub kurtosis: f64,
    pub total_weight: u128,
}

/// Qualitative reading of the normality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FairnessVerdict {
    Fair,
    Moderate,
    Concerning,
}

impl FairnessVerdict {
    pub fn from_normality(score: f64) -> Self {
        if score > 0.8 {
            FairnessVerdict::Fair
        } else if score > 0.5 {
            FairnessVerdict::Moderate
        } else {
            FairnessVerdict::Concerning
        }
    }
}

impl std::fmt::Display for FairnessVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FairnessVerdict::Fair => write!(f, "fair"),
            FairnessVerdict::Moderate => write!(f, "moderate"),
            FairnessVerdict::Concerning => write!(f, "concerning"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionAnalyzer {
    histogram: BTreeMap<i64, u64>,
}

impl DistributionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero weights are dropped
    pub fn from_histogram(histogram: BTreeMap<i64, u64>) -> Self {
        Self {
            histogram: histogram.into_iter().filter(|(_, w)| *w > 0).collect(),
        }
    }

    /// Count ratings into buckets of `bucket_size` (1.0 rounds to the nearest point)
    pub fn from_ratings<I>(ratings: I, bucket_size: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut analyzer = Self::new();
        for rating in ratings {
            analyzer.add_sample(rating_bucket(rating, bucket_size));
        }
        analyzer
    }

    pub fn add_sample(&mut self, rating: i64) {
        let weight = self.histogram.entry(rating).or_insert(0);
        *weight = weight.saturating_add(1);
    }

    pub fn set_weight(&mut self, rating: i64, weight: u64) {
        if weight == 0 {
            self.histogram.remove(&rating);
        } else {
            self.histogram.insert(rating, weight);
        }
    }

    pub fn clear(&mut self) {
        self.histogram.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    pub fn histogram(&self) -> &BTreeMap<i64, u64> {
        &self.histogram
    }

    /// Sum of all weights, widened so that any number of `u64` weights fits
    pub fn total_weight(&self) -> u128 {
        self.histogram.values().map(|w| u128::from(*w)).sum()
    }

    /// Key at `position` of the sorted multiset the histogram stands for
    fn value_at(&self, position: u128) -> Option<f64> {
        let mut seen = 0u128;
        for (rating, weight) in &self.histogram {
            seen += u128::from(*weight);
            if position < seen {
                return Some(*rating as f64);
            }
        }
        None
    }

    fn median(&self, total: u128) -> Option<f64> {
        if total % 2 == 1 {
            self.value_at(total / 2)
        } else {
            let lower = self.value_at(total / 2 - 1)?;
            let upper = self.value_at(total / 2)?;
            Some((lower + upper) / 2.0)
        }
    }

    /// `None` when the histogram is empty. A zero spread reports zero
    /// skewness and kurtosis.
    pub fn statistics(&self) -> Option<DistributionStatistics> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }
        let weight_sum = total as f64;

        let mean = self
            .histogram
            .iter()
            .map(|(rating, weight)| *rating as f64 * *weight as f64)
            .sum::<f64>()
            / weight_sum;

        let variance = self
            .histogram
            .iter()
            .map(|(rating, weight)| *weight as f64 * (*rating as f64 - mean).powi(2))
            .sum::<f64>()
            / weight_sum;
        let std_dev = variance.sqrt();

        let (skewness, kurtosis) = if std_dev > 0.0 {
            let standardized_moment = |power: i32| {
                self.histogram
                    .iter()
                    .map(|(rating, weight)| {
                        *weight as f64 * ((*rating as f64 - mean) / std_dev).powi(power)
                    })
                    .sum::<f64>()
                    / weight_sum
            };
            (standardized_moment(3), standardized_moment(4) - 3.0)
        } else {
            (0.0, 0.0)
        };

        Some(DistributionStatistics {
            mean,
            median: self.median(total)?,
            std_dev,
            skewness,
            kurtosis,
            total_weight: total,
        })
    }

    /// Heuristic closeness to a normal shape in [0, 1]; not a statistical test
    pub fn normality_score(&self) -> Option<f64> {
        self.statistics().map(|stats| normality_from(&stats))
    }

    pub fn verdict(&self) -> Option<FairnessVerdict> {
        self.normality_score().map(FairnessVerdict::from_normality)
    }

    /// Narrative summary of the distribution shape
    pub fn fairness_report(&self) -> Option<String> {
        let stats = self.statistics()?;
        let normality = normality_from(&stats);
        let mut report = String::new();

        let _ = writeln!(report, "Rating distribution analysis:");
        let _ = writeln!(report);
        let _ = writeln!(report, "Mean rating: {:.2}", stats.mean);
        let _ = writeln!(report, "Median: {:.2}", stats.median);
        let _ = writeln!(report, "Standard deviation: {:.2}", stats.std_dev);
        let _ = writeln!(report, "Skewness: {:.4}", stats.skewness);
        let _ = writeln!(report, "Excess kurtosis: {:.4}", stats.kurtosis);
        let _ = writeln!(report, "Normality score: {:.2}%", normality * 100.0);
        let _ = writeln!(report);

        if stats.skewness.abs() > SKEWNESS_THRESHOLD {
            if stats.skewness > 0.0 {
                let _ = writeln!(report, "Positive skew: a long tail towards high ratings.");
            } else {
                let _ = writeln!(report, "Negative skew: a long tail towards low ratings.");
            }
        }

        if stats.kurtosis.abs() > KURTOSIS_THRESHOLD {
            if stats.kurtosis > 0.0 {
                let _ = writeln!(
                    report,
                    "High kurtosis: more extreme ratings than a normal distribution would produce."
                );
            } else {
                let _ = writeln!(
                    report,
                    "Low kurtosis: fewer extreme ratings than a normal distribution would produce."
                );
            }
        }

        let summary = match FairnessVerdict::from_normality(normality) {
            FairnessVerdict::Fair => {
                "The distribution is close to normal, which points to a fair rating system."
            }
            FairnessVerdict::Moderate => {
                "The distribution deviates moderately from normal but remains acceptable."
            }
            FairnessVerdict::Concerning => {
                "Large deviations from a normal distribution may indicate problems in the rating system."
            }
        };
        let _ = writeln!(report, "{}", summary);

        Some(report)
    }
}

fn normality_from(stats: &DistributionStatistics) -> f64 {
    (1.0 - stats.skewness.abs() / 3.0 - stats.kurtosis.abs() / 6.0).clamp(0.0, 1.0)
}
