//! Post-season rating report combining every analysis

use crate::analysis::distribution::{DistributionAnalyzer, DistributionStatistics, FairnessVerdict};
use crate::analysis::skill::{central_mass, CentralMass, SkillRatingAnalysis};
use crate::error::{Result, SimulationError};
use crate::types::PlayerRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingReport {
    pub statistics: DistributionStatistics,
    pub normality_score: f64,
    pub verdict: FairnessVerdict,
    pub histogram: BTreeMap<i64, u64>,
    pub central_mass: CentralMass,
    pub skill: SkillRatingAnalysis,
    pub narrative: String,
}

impl RatingReport {
    /// Analyse final player ratings bucketed by `bucket_size`.
    /// Fails with `NoData` when there are no players.
    pub fn from_players(players: &[PlayerRecord], bucket_size: f64) -> Result<Self> {
        let analyzer = DistributionAnalyzer::from_ratings(players.iter().map(|p| p.rating), bucket_size);

        let statistics = analyzer.statistics().ok_or(SimulationError::NoData)?;
        let normality_score = analyzer.normality_score().ok_or(SimulationError::NoData)?;
        let mut narrative = analyzer.fairness_report().ok_or(SimulationError::NoData)?;
        let central_mass = central_mass(players, statistics.mean).ok_or(SimulationError::NoData)?;
        let skill = SkillRatingAnalysis::from_players(players);

        narrative.push('\n');
        narrative.push_str(&central_mass.describe());
        narrative.push_str("\n\n");
        narrative.push_str(&skill.report());

        Ok(Self {
            statistics,
            normality_score,
            verdict: FairnessVerdict::from_normality(normality_score),
            histogram: analyzer.histogram().clone(),
            central_mass,
            skill,
            narrative,
        })
    }
}
