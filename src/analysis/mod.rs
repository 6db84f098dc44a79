//! Analysis of rating distributions after a simulated season

pub mod distribution;
pub mod report;
pub mod skill;

// Re-export commonly used types
pub use distribution::{DistributionAnalyzer, DistributionStatistics, FairnessVerdict};
pub use report::RatingReport;
pub use skill::{central_mass, CentralMass, SkillRatingAnalysis};
