//! In-memory player pool used for the duration of one season
//!
//! Loaded once from the player repository when a batch starts, then kept in
//! sync by the simulator itself after every game instead of re-querying.

use crate::error::Result;
use crate::storage::PlayerRepository;
use crate::types::{PlayerId, PlayerRecord};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    players: Vec<PlayerRecord>,
    index: HashMap<PlayerId, usize>,
}

impl PlayerPool {
    pub fn new(players: Vec<PlayerRecord>) -> Self {
        let index = players
            .iter()
            .enumerate()
            .map(|(idx, player)| (player.id, idx))
            .collect();

        Self { players, index }
    }

    /// Snapshot every matchable player from the repository
    pub async fn load(repository: &dyn PlayerRepository) -> Result<Self> {
        let players = repository.load_all_for_matching().await?;
        debug!("Loaded {} players into the pool", players.len());
        Ok(Self::new(players))
    }

    /// Every player currently in the pool, in load order
    pub fn load_all(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn find_by_id(&self, id: &PlayerId) -> Option<&PlayerRecord> {
        self.index.get(id).and_then(|idx| self.players.get(*idx))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Replace a pooled record with a newer version of the same player.
    /// Returns false when the player is not pooled.
    pub fn update(&mut self, record: PlayerRecord) -> bool {
        match self.index.get(&record.id) {
            Some(idx) => {
                self.players[*idx] = record;
                true
            }
            None => false,
        }
    }

    /// Re-read specific players after they were changed outside the pool.
    /// Returns how many pooled records were refreshed.
    pub async fn refresh(
        &mut self,
        repository: &dyn PlayerRepository,
        ids: &[PlayerId],
    ) -> Result<usize> {
        let mut refreshed = 0;
        for record in repository.load_players(ids).await? {
            if self.update(record) {
                refreshed += 1;
            }
        }

        debug!("Refreshed {} of {} requested players", refreshed, ids.len());
        Ok(refreshed)
    }
}
