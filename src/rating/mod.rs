//! Rating system built on a simplified, single-parameter Glicko model
//!
//! This module provides the pure rating-update math used by the simulator.

pub mod glicko;

// Re-export commonly used types
pub use glicko::{decay_deviation, expected_outcome, update_rating, MatchResult};
