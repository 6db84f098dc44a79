//! Test fixtures and stub collaborators for integration testing

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rating_sim::error::Result;
use rating_sim::simulation::matching::SelectionPolicy;
use rating_sim::simulation::progress::{CancellationFlag, ProgressSink};
use rating_sim::simulation::SimulationRequest;
use rating_sim::storage::{GameRepository, InMemoryStore};
use rating_sim::types::{GameId, GameOutcome, ParticipationRecord, PlayerRecord, SkillLevel};
use rating_sim::utils::generate_player_id;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn season_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn season_request(game_count: usize, players_per_team: usize, policy: SelectionPolicy) -> SimulationRequest {
    SimulationRequest {
        game_count,
        start_time: season_start(),
        end_time: season_start() + Duration::days(30),
        players_per_team,
        policy,
    }
}

/// `per_level` fresh players at every skill level, all rated 1000
pub fn population(per_level: usize) -> Vec<PlayerRecord> {
    SkillLevel::ALL
        .iter()
        .flat_map(|level| {
            (0..per_level).map(move |i| {
                PlayerRecord::new(
                    generate_player_id(),
                    format!("Player{}_Skill{}", i + 1, level.value()),
                    *level,
                    1000.0,
                )
            })
        })
        .collect()
}

pub fn seeded_store(per_level: usize) -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_players(population(per_level)))
}

/// Progress sink that remembers every count it was given
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<usize>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<usize> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn on_progress(&self, completed_games: usize) {
        if let Ok(mut events) = self.events.lock() {
            events.push(completed_games);
        }
    }
}

/// Progress sink that raises the cancellation flag once `after` games are done
pub struct CancelAfter {
    pub after: usize,
    pub flag: CancellationFlag,
}

impl ProgressSink for CancelAfter {
    fn on_progress(&self, completed_games: usize) {
        if completed_games >= self.after {
            self.flag.cancel();
        }
    }
}

/// Game repository that writes through to a store until its budget of games
/// runs out, then fails every write
pub struct FailingGameRepository {
    inner: Arc<InMemoryStore>,
    remaining: AtomicUsize,
}

impl FailingGameRepository {
    pub fn new(inner: Arc<InMemoryStore>, successful_games: usize) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(successful_games),
        }
    }
}

#[async_trait]
impl GameRepository for FailingGameRepository {
    async fn create_game(&self, played_at: DateTime<Utc>, outcome: GameOutcome) -> Result<GameId> {
        let budget = self.remaining.load(Ordering::SeqCst);
        if budget == 0 {
            return Err(anyhow::anyhow!("connection reset by peer"));
        }
        self.remaining.store(budget - 1, Ordering::SeqCst);
        self.inner.create_game(played_at, outcome).await
    }

    async fn add_participation(&self, participation: ParticipationRecord) -> Result<()> {
        self.inner.add_participation(participation).await
    }
}
