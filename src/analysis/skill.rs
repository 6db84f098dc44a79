//! How well final ratings track hidden skill levels

use crate::types::{PlayerRecord, SkillLevel};
use crate::utils::{rating_bucket, rating_difference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Average intra-level rating spread above which the spread is called large
pub const LARGE_DISPERSION: f64 = 300.0;

/// Bucket width used for the central-mass check
pub const CENTRAL_BUCKET_SIZE: f64 = 50.0;

/// Half-width of the band around the mean counted as "central"
pub const CENTRAL_BAND: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillLevelRatings {
    pub skill_level: SkillLevel,
    pub players: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl SkillLevelRatings {
    pub fn dispersion(&self) -> f64 {
        rating_difference(self.max, self.min)
    }
}

/// Rating summary per skill level, ordered low to high
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRatingAnalysis {
    pub levels: Vec<SkillLevelRatings>,
}

impl SkillRatingAnalysis {
    pub fn from_players(players: &[PlayerRecord]) -> Self {
        let mut grouped: BTreeMap<SkillLevel, Vec<f64>> = BTreeMap::new();
        for player in players {
            grouped.entry(player.skill_level).or_default().push(player.rating);
        }

        let levels = grouped
            .into_iter()
            .map(|(skill_level, ratings)| {
                let sum: f64 = ratings.iter().sum();
                SkillLevelRatings {
                    skill_level,
                    players: ratings.len(),
                    average: sum / ratings.len() as f64,
                    min: ratings.iter().copied().fold(f64::INFINITY, f64::min),
                    max: ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                }
            })
            .collect();

        Self { levels }
    }

    /// Average rating strictly increases with skill level. `None` with fewer
    /// than two levels present.
    pub fn is_monotonic(&self) -> Option<bool> {
        if self.levels.len() < 2 {
            return None;
        }
        Some(self.levels.windows(2).all(|w| w[1].average > w[0].average))
    }

    /// Mean of the per-level max-min spread
    pub fn mean_dispersion(&self) -> Option<f64> {
        if self.levels.is_empty() {
            return None;
        }
        let total: f64 = self.levels.iter().map(SkillLevelRatings::dispersion).sum();
        Some(total / self.levels.len() as f64)
    }

    pub fn report(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "Skill level vs rating:");
        for level in &self.levels {
            let _ = writeln!(
                report,
                "  {} ({} players): avg {:.1}, min {:.1}, max {:.1}",
                level.skill_level, level.players, level.average, level.min, level.max
            );
        }

        let Some(monotonic) = self.is_monotonic() else {
            return report;
        };

        if monotonic {
            let _ = writeln!(
                report,
                "Average rating rises with every skill level: ratings reflect actual skill."
            );
        } else {
            let _ = writeln!(
                report,
                "Average rating does not rise strictly with skill level: factors beyond skill shape the ratings."
            );
        }

        if let Some(dispersion) = self.mean_dispersion() {
            let _ = write!(report, "Mean rating spread within a skill level: {:.1}. ", dispersion);
            if dispersion > LARGE_DISPERSION {
                let _ = writeln!(
                    report,
                    "The large spread means individual results and match counts weigh heavily on ratings."
                );
            } else {
                let _ = writeln!(report, "The moderate spread means ratings are stable within a skill level.");
            }
        }

        report
    }
}

/// Share of players rated close to the mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralMass {
    pub total_players: usize,
    pub near_average: usize,
    /// Percentage in 0..=100
    pub share: f64,
}

impl CentralMass {
    /// More than half of the players sit in the central band
    pub fn has_peak(&self) -> bool {
        self.share > 50.0
    }

    pub fn describe(&self) -> String {
        if self.has_peak() {
            format!(
                "Most players ({:.1}%) sit in the central rating band, a sign of a balanced system.",
                self.share
            )
        } else {
            format!(
                "Players spread evenly without a central peak ({:.1}% near the mean): \
                 the rating system separates skill levels effectively.",
                self.share
            )
        }
    }
}

/// Count players whose 50-point bucket lies within ±100 of `mean`.
/// `None` for an empty slice.
pub fn central_mass(players: &[PlayerRecord], mean: f64) -> Option<CentralMass> {
    if players.is_empty() {
        return None;
    }

    let near_average = players
        .iter()
        .map(|p| rating_bucket(p.rating, CENTRAL_BUCKET_SIZE) as f64)
        .filter(|bucket| *bucket >= mean - CENTRAL_BAND && *bucket <= mean + CENTRAL_BAND)
        .count();

    Some(CentralMass {
        total_players: players.len(),
        near_average,
        share: near_average as f64 / players.len() as f64 * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn player(level: SkillLevel, rating: f64) -> PlayerRecord {
        PlayerRecord::new(Uuid::new_v4(), format!("{}-{}", level, rating), level, rating)
    }

    #[test]
    fn test_levels_are_summarised_in_order() {
        let players = vec![
            player(SkillLevel::High, 1400.0),
            player(SkillLevel::Low, 800.0),
            player(SkillLevel::Low, 900.0),
            player(SkillLevel::High, 1300.0),
        ];

        let analysis = SkillRatingAnalysis::from_players(&players);
        assert_eq!(analysis.levels.len(), 2);
        assert_eq!(analysis.levels[0].skill_level, SkillLevel::Low);
        assert_eq!(analysis.levels[0].average, 850.0);
        assert_eq!(analysis.levels[1].min, 1300.0);
        assert_eq!(analysis.levels[1].max, 1400.0);
        assert_eq!(analysis.is_monotonic(), Some(true));
        assert_eq!(analysis.mean_dispersion(), Some(100.0));
        assert!(analysis.report().contains("rises with every skill level"));
    }

    #[test]
    fn test_non_monotonic_and_large_spread() {
        let players = vec![
            player(SkillLevel::Low, 600.0),
            player(SkillLevel::Low, 1400.0),
            player(SkillLevel::Medium, 900.0),
            player(SkillLevel::Medium, 950.0),
        ];

        let analysis = SkillRatingAnalysis::from_players(&players);
        assert_eq!(analysis.is_monotonic(), Some(false));
        assert_eq!(analysis.mean_dispersion(), Some(425.0));

        let report = analysis.report();
        assert!(report.contains("does not rise strictly"));
        assert!(report.contains("large spread"));
    }

    #[test]
    fn test_single_level_has_no_trend() {
        let analysis = SkillRatingAnalysis::from_players(&[player(SkillLevel::Medium, 1000.0)]);
        assert_eq!(analysis.is_monotonic(), None);
        assert!(!analysis.report().contains("spread"));
    }

    #[test]
    fn test_central_mass() {
        let players = vec![
            player(SkillLevel::Low, 990.0),
            player(SkillLevel::Low, 1090.0),
            player(SkillLevel::Medium, 1110.0),
            player(SkillLevel::High, 1500.0),
        ];

        // buckets 1000, 1100, 1100, 1500 against band [900, 1100]
        let mass = central_mass(&players, 1000.0).unwrap();
        assert_eq!(mass.near_average, 3);
        assert_eq!(mass.share, 75.0);
        assert!(mass.has_peak());
        assert!(mass.describe().contains("central rating band"));

        let spread = central_mass(&players, 1300.0).unwrap();
        assert!(!spread.has_peak());
        assert!(central_mass(&[], 1000.0).is_none());
    }
}
