//! Error types for the rating simulator
//!
//! Collaborator code returns `anyhow` results; the failures callers need to
//! branch on are raised as [`SimulationError`] and recovered with
//! `downcast_ref`.

use chrono::{DateTime, Utc};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Failures that identify which precondition of a simulation was violated
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Insufficient players: need at least {required}, pool has {available}")]
    InsufficientPlayers { required: usize, available: usize },

    #[error("Invalid date range: end {end} is not after start {start}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Imbalanced team selection: needed {required} players, selected {selected}")]
    ImbalancedTeamSelection { required: usize, selected: usize },

    #[error("Persistence failure: {message}")]
    PersistenceFailure { message: String },

    #[error("No data available for distribution analysis")]
    NoData,

    #[error("Simulation cancelled after {completed_games} games; batch rolled back")]
    Cancelled { completed_games: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Invalid skill level {value}: must be between 1 and 4")]
    InvalidSkillLevel { value: u8 },

    #[error("Player not found: {player}")]
    PlayerNotFound { player: String },

    #[error("Transaction error: {message}")]
    TransactionState { message: String },
}

/// Classify a repository error: typed simulation errors pass through, anything
/// else becomes an opaque `PersistenceFailure`
pub fn persistence_failure(err: anyhow::Error) -> anyhow::Error {
    if err.is::<SimulationError>() {
        return err;
    }

    SimulationError::PersistenceFailure {
        message: format!("{:#}", err),
    }
    .into()
}
