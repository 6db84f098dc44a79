//! Persistence interfaces consumed by the simulator
//!
//! The simulator never owns storage: players, games and participations are
//! written through these traits, and a whole batch is wrapped in a single
//! [`TransactionScope`] so it commits or rolls back as a unit.

pub mod memory;

use crate::error::{Result, SimulationError};
use crate::types::{GameId, GameOutcome, ParticipationRecord, PlayerId, PlayerRating, PlayerRecord, SkillLevel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::InMemoryStore;

/// Storage of player rating records
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Create a player with the initial deviation and return its id
    async fn create_player(
        &self,
        nickname: &str,
        skill_level: SkillLevel,
        initial_rating: f64,
    ) -> Result<PlayerId>;

    /// Load every player eligible for matchmaking
    async fn load_all_for_matching(&self) -> Result<Vec<PlayerRecord>>;

    /// Load the given players; unknown ids are left out of the result
    async fn load_players(&self, ids: &[PlayerId]) -> Result<Vec<PlayerRecord>>;

    /// Persist a player's rating state and match statistics
    async fn apply_rating_update(
        &self,
        id: PlayerId,
        rating: PlayerRating,
        total_matches: u32,
        wins: u32,
    ) -> Result<()>;

    /// Look up a player id by nickname
    async fn find_id_by_nickname(&self, nickname: &str) -> Result<Option<PlayerId>>;

    /// Like [`PlayerRepository::find_id_by_nickname`], failing with
    /// `PlayerNotFound` when the nickname is unknown
    async fn get_id_by_nickname(&self, nickname: &str) -> Result<PlayerId> {
        self.find_id_by_nickname(nickname).await?.ok_or_else(|| {
            SimulationError::PlayerNotFound {
                player: nickname.to_string(),
            }
            .into()
        })
    }
}

/// Storage of simulated games and who played in them
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Record a finished game and return its id
    async fn create_game(&self, played_at: DateTime<Utc>, outcome: GameOutcome) -> Result<GameId>;

    /// Attach a player to a game with the rating change it caused
    async fn add_participation(&self, participation: ParticipationRecord) -> Result<()>;
}

/// All-or-nothing scope around a batch of repository writes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionScope: Send + Sync {
    async fn begin(&self) -> Result<()>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;
}
