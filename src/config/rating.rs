//! Rating and analysis configuration

use crate::types::INITIAL_RATING;
use serde::{Deserialize, Serialize};

/// Rating settings shared by player generation and distribution analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Rating every generated player starts from
    pub initial_rating: f64,
    /// Width of the histogram buckets used when analysing final ratings
    pub bucket_size: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            initial_rating: INITIAL_RATING,
            bucket_size: 50.0,
        }
    }
}
