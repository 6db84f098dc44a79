//! Rating Sim - Glicko rating simulation for skill-based matchmaking
//!
//! This crate generates synthetic players with hidden skill levels, plays
//! seasons of team games between them with a Glicko rating update after every
//! game, and analyses how the resulting rating distribution reflects skill.

pub mod analysis;
pub mod config;
pub mod error;
pub mod rating;
pub mod simulation;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, SimulationError};
pub use types::*;

// Re-export key components
pub use analysis::{DistributionAnalyzer, RatingReport};
pub use simulation::{MatchSimulator, PlayerGenerator, SimulationRequest};
pub use storage::{GameRepository, InMemoryStore, PlayerRepository, TransactionScope};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
