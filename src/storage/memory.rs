//! In-memory implementation of the persistence interfaces
//!
//! Backs the CLI and the test suites. Transactions are snapshot based:
//! `begin` copies the whole state, `rollback` restores the copy.

use crate::error::{Result, SimulationError};
use crate::storage::{GameRepository, PlayerRepository, TransactionScope};
use crate::types::{
    GameId, GameOutcome, GameRecord, ParticipationRecord, PlayerId, PlayerRating, PlayerRecord,
    SkillLevel,
};
use crate::utils::{generate_game_id, generate_player_id, win_rate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct StoreState {
    players: Vec<PlayerRecord>,
    player_index: HashMap<PlayerId, usize>,
    nickname_index: HashMap<String, PlayerId>,
    games: Vec<GameRecord>,
    game_ids: HashSet<GameId>,
    participations: Vec<ParticipationRecord>,
}

impl StoreState {
    fn insert_player(&mut self, player: PlayerRecord) {
        self.player_index.insert(player.id, self.players.len());
        // first player with a nickname wins lookups
        self.nickname_index
            .entry(player.nickname.clone())
            .or_insert(player.id);
        self.players.push(player);
    }

    fn insert_game(&mut self, game: GameRecord) {
        self.game_ids.insert(game.id);
        self.games.push(game);
    }

    fn player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerRecord> {
        let idx = *self.player_index.get(id)?;
        self.players.get_mut(idx)
    }
}

/// In-memory player and game store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    snapshot: Mutex<Option<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with players
    pub fn with_players(players: Vec<PlayerRecord>) -> Self {
        let mut state = StoreState::default();
        for player in players {
            state.insert_player(player);
        }

        Self {
            state: RwLock::new(state),
            snapshot: Mutex::new(None),
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| {
            SimulationError::PersistenceFailure {
                message: "Failed to acquire store read lock".to_string(),
            }
            .into()
        })
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| {
            SimulationError::PersistenceFailure {
                message: "Failed to acquire store write lock".to_string(),
            }
            .into()
        })
    }

    fn take_snapshot(&self) -> Result<Option<StoreState>> {
        let mut snapshot = self.snapshot.lock().map_err(|_| SimulationError::TransactionState {
            message: "Failed to acquire transaction lock".to_string(),
        })?;
        Ok(snapshot.take())
    }

    /// All players in creation order
    pub fn players(&self) -> Result<Vec<PlayerRecord>> {
        Ok(self.read_state()?.players.clone())
    }

    pub fn player_count(&self) -> Result<usize> {
        Ok(self.read_state()?.players.len())
    }

    /// All games in the order they were recorded
    pub fn games(&self) -> Result<Vec<GameRecord>> {
        Ok(self.read_state()?.games.clone())
    }

    /// Games a player took part in, with the rating change of each
    pub fn participations_for_player(&self, player_id: &PlayerId) -> Result<Vec<ParticipationRecord>> {
        let state = self.read_state()?;
        Ok(state
            .participations
            .iter()
            .filter(|p| &p.player_id == player_id)
            .cloned()
            .collect())
    }

    /// Everyone who played in a game
    pub fn participants(&self, game_id: &GameId) -> Result<Vec<ParticipationRecord>> {
        let state = self.read_state()?;
        Ok(state
            .participations
            .iter()
            .filter(|p| &p.game_id == game_id)
            .cloned()
            .collect())
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot
            .lock()
            .map(|snapshot| snapshot.is_some())
            .unwrap_or(false)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryStore {
    async fn create_player(
        &self,
        nickname: &str,
        skill_level: SkillLevel,
        initial_rating: f64,
    ) -> Result<PlayerId> {
        let mut state = self.write_state()?;

        if state.nickname_index.contains_key(nickname) {
            return Err(SimulationError::PersistenceFailure {
                message: format!("Nickname already exists: {}", nickname),
            }
            .into());
        }

        let id = generate_player_id();
        state.insert_player(PlayerRecord::new(id, nickname, skill_level, initial_rating));
        debug!("Created player '{}' ({}) at skill {}", nickname, id, skill_level);

        Ok(id)
    }

    async fn load_all_for_matching(&self) -> Result<Vec<PlayerRecord>> {
        self.players()
    }

    async fn load_players(&self, ids: &[PlayerId]) -> Result<Vec<PlayerRecord>> {
        let state = self.read_state()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.player_index.get(id))
            .filter_map(|idx| state.players.get(*idx))
            .cloned()
            .collect())
    }

    async fn apply_rating_update(
        &self,
        id: PlayerId,
        rating: PlayerRating,
        total_matches: u32,
        wins: u32,
    ) -> Result<()> {
        let mut state = self.write_state()?;
        let player = state
            .player_mut(&id)
            .ok_or_else(|| SimulationError::PlayerNotFound {
                player: id.to_string(),
            })?;

        player.apply_rating(rating);
        player.total_matches = total_matches;
        player.wins = wins;
        player.win_rate = win_rate(wins, total_matches);

        Ok(())
    }

    async fn find_id_by_nickname(&self, nickname: &str) -> Result<Option<PlayerId>> {
        let state = self.read_state()?;
        Ok(state.nickname_index.get(nickname).copied())
    }
}

#[async_trait]
impl GameRepository for InMemoryStore {
    async fn create_game(&self, played_at: DateTime<Utc>, outcome: GameOutcome) -> Result<GameId> {
        let mut state = self.write_state()?;
        let id = generate_game_id();
        state.insert_game(GameRecord::new(id, played_at, outcome));
        Ok(id)
    }

    async fn add_participation(&self, participation: ParticipationRecord) -> Result<()> {
        let mut state = self.write_state()?;

        if !state.game_ids.contains(&participation.game_id) {
            return Err(SimulationError::PersistenceFailure {
                message: format!("Unknown game: {}", participation.game_id),
            }
            .into());
        }
        if !state.player_index.contains_key(&participation.player_id) {
            return Err(SimulationError::PlayerNotFound {
                player: participation.player_id.to_string(),
            }
            .into());
        }

        state.participations.push(participation);
        Ok(())
    }
}

#[async_trait]
impl TransactionScope for InMemoryStore {
    async fn begin(&self) -> Result<()> {
        let copy = self.read_state()?.clone();
        let mut snapshot = self.snapshot.lock().map_err(|_| SimulationError::TransactionState {
            message: "Failed to acquire transaction lock".to_string(),
        })?;

        if snapshot.is_some() {
            return Err(SimulationError::TransactionState {
                message: "A transaction is already in progress".to_string(),
            }
            .into());
        }

        *snapshot = Some(copy);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        match self.take_snapshot()? {
            Some(_) => Ok(()),
            None => Err(SimulationError::TransactionState {
                message: "Commit without an active transaction".to_string(),
            }
            .into()),
        }
    }

    async fn rollback(&self) -> Result<()> {
        let restored = self
            .take_snapshot()?
            .ok_or_else(|| SimulationError::TransactionState {
                message: "Rollback without an active transaction".to_string(),
            })?;

        *self.write_state()? = restored;
        debug!("Rolled back in-memory store to transaction snapshot");
        Ok(())
    }
}
