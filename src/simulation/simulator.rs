//! Season simulator
//!
//! Runs a batch of simulated games against the player repository: picks
//! players, splits them into teams, rolls the result, updates every
//! participant's Glicko rating and persists the game. A batch is one
//! transaction; any failure or cancellation rolls all of it back.

use crate::config::SimulationSettings;
use crate::error::{persistence_failure, Result, SimulationError};
use crate::rating::glicko::{update_rating, MatchResult};
use crate::simulation::matching::{
    distribute_teams, random_score_outcome, select_balanced, select_random,
    skill_weighted_outcome, split_in_order, SelectionPolicy,
};
use crate::simulation::pool::PlayerPool;
use crate::simulation::progress::{CancellationFlag, ProgressSink};
use crate::simulation::timeline::GameTimeline;
use crate::storage::{GameRepository, PlayerRepository, TransactionScope};
use crate::types::{GameOutcome, GameRecord, ParticipationRecord, PlayerRecord, Team};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Parameters of one simulated season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub game_count: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub players_per_team: usize,
    pub policy: SelectionPolicy,
}

impl SimulationRequest {
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self {
            game_count: settings.game_count,
            start_time: settings.start_time,
            end_time: settings.end_time,
            players_per_team: settings.players_per_team,
            policy: SelectionPolicy::from_skill_awareness(settings.skill_aware),
        }
    }

    pub fn players_per_game(&self) -> usize {
        self.players_per_team * 2
    }
}

/// A persisted game together with its participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedGame {
    pub game: GameRecord,
    pub participations: Vec<ParticipationRecord>,
}

/// Everything a committed season produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub games: Vec<SimulatedGame>,
    pub team1_wins: usize,
    pub team2_wins: usize,
    pub elapsed_ms: u128,
}

impl SeasonSummary {
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// The game records in the order they were played
    pub fn game_records(&self) -> Vec<GameRecord> {
        self.games.iter().map(|g| g.game.clone()).collect()
    }
}

/// One participant after the rating update, before persistence
#[derive(Debug, Clone)]
struct PlayedSeat {
    team: Team,
    record: PlayerRecord,
    rating_change: f64,
}

#[derive(Debug, Clone)]
struct PlayedGame {
    outcome: GameOutcome,
    seats: Vec<PlayedSeat>,
}

pub struct MatchSimulator {
    players: Arc<dyn PlayerRepository>,
    games: Arc<dyn GameRepository>,
    transactions: Arc<dyn TransactionScope>,
    rng: StdRng,
}

impl MatchSimulator {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        games: Arc<dyn GameRepository>,
        transactions: Arc<dyn TransactionScope>,
    ) -> Self {
        Self {
            players,
            games,
            transactions,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed so that seasons are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Run the season on a dedicated tokio task
    pub fn spawn<P>(
        mut self,
        request: SimulationRequest,
        progress: P,
        cancel: CancellationFlag,
    ) -> JoinHandle<Result<SeasonSummary>>
    where
        P: ProgressSink + 'static,
    {
        tokio::spawn(async move { self.run(&request, &progress, &cancel).await })
    }

    /// Simulate `request.game_count` games and commit them as one batch
    pub async fn run(
        &mut self,
        request: &SimulationRequest,
        progress: &dyn ProgressSink,
        cancel: &CancellationFlag,
    ) -> Result<SeasonSummary> {
        if request.game_count == 0 {
            info!("No games requested, nothing to simulate");
            return Ok(SeasonSummary::default());
        }
        if request.players_per_team == 0 {
            return Err(SimulationError::InvalidConfiguration {
                message: "players_per_team must be greater than 0".to_string(),
            }
            .into());
        }

        let mut pool = PlayerPool::load(self.players.as_ref())
            .await
            .map_err(persistence_failure)?;

        let required = request.players_per_game();
        if pool.len() < required {
            return Err(SimulationError::InsufficientPlayers {
                required,
                available: pool.len(),
            }
            .into());
        }

        let mut timeline = GameTimeline::new(request.start_time, request.end_time, request.game_count)?;

        info!(
            "Starting season: {} games, {} players per team, {} selection, {} players pooled",
            request.game_count,
            request.players_per_team,
            request.policy,
            pool.len()
        );

        let started = Instant::now();
        self.transactions.begin().await.map_err(persistence_failure)?;

        let result = self
            .play_season(request, &mut pool, &mut timeline, progress, cancel)
            .await;

        match result {
            Ok(mut summary) => {
                if let Err(e) = self.transactions.commit().await {
                    error!("Failed to commit season: {}", e);
                    self.rollback().await;
                    return Err(persistence_failure(e));
                }

                summary.elapsed_ms = started.elapsed().as_millis();
                info!(
                    "Season committed: {} games in {} ms (team1 {} / team2 {})",
                    summary.games.len(),
                    summary.elapsed_ms,
                    summary.team1_wins,
                    summary.team2_wins
                );
                Ok(summary)
            }
            Err(e) => {
                warn!("Season aborted, rolling back: {}", e);
                self.rollback().await;
                Err(e)
            }
        }
    }

    async fn rollback(&self) {
        if let Err(e) = self.transactions.rollback().await {
            error!("Failed to roll back season: {}", e);
        }
    }

    async fn play_season(
        &mut self,
        request: &SimulationRequest,
        pool: &mut PlayerPool,
        timeline: &mut GameTimeline,
        progress: &dyn ProgressSink,
        cancel: &CancellationFlag,
    ) -> Result<SeasonSummary> {
        let mut summary = SeasonSummary::default();

        for index in 0..request.game_count {
            if cancel.is_cancelled() {
                return Err(SimulationError::Cancelled {
                    completed_games: index,
                }
                .into());
            }

            let played_at = timeline.next_time(&mut self.rng);
            let played = self.play_game(request, pool)?;
            let simulated = self.persist_game(played_at, &played).await?;

            for seat in played.seats {
                pool.update(seat.record);
            }

            match simulated.game.winner {
                Team::Team1 => summary.team1_wins += 1,
                Team::Team2 => summary.team2_wins += 1,
            }
            summary.games.push(simulated);

            progress.on_progress(index + 1);

            // Let other tasks on the same runtime run between games
            tokio::task::yield_now().await;
        }

        Ok(summary)
    }

    /// Select, balance, roll and rate one game against the current pool
    fn play_game(&mut self, request: &SimulationRequest, pool: &PlayerPool) -> Result<PlayedGame> {
        let required = request.players_per_game();
        let mut available: Vec<&PlayerRecord> = pool.load_all().iter().collect();

        let selected = match request.policy {
            SelectionPolicy::SkillAware => select_balanced(&mut self.rng, &mut available, required),
            SelectionPolicy::UniformRandom => select_random(&mut self.rng, &mut available, required),
        };

        if selected.len() < required {
            return Err(SimulationError::ImbalancedTeamSelection {
                required,
                selected: selected.len(),
            }
            .into());
        }

        let (team1, team2) = match request.policy {
            SelectionPolicy::SkillAware => distribute_teams(selected),
            SelectionPolicy::UniformRandom => split_in_order(selected, request.players_per_team),
        };

        let outcome = match request.policy {
            SelectionPolicy::SkillAware => skill_weighted_outcome(&mut self.rng, &team1, &team2),
            SelectionPolicy::UniformRandom => random_score_outcome(&mut self.rng),
        };

        let mut seats = Vec::with_capacity(required);
        seats.extend(rate_team(Team::Team1, &team1, &team2, outcome.winner));
        seats.extend(rate_team(Team::Team2, &team2, &team1, outcome.winner));

        Ok(PlayedGame { outcome, seats })
    }

    async fn persist_game(&self, played_at: DateTime<Utc>, played: &PlayedGame) -> Result<SimulatedGame> {
        let game_id = self
            .games
            .create_game(played_at, played.outcome)
            .await
            .map_err(persistence_failure)?;

        let mut participations = Vec::with_capacity(played.seats.len());
        for seat in &played.seats {
            let participation = ParticipationRecord {
                game_id,
                player_id: seat.record.id,
                team: seat.team,
                rating_change: seat.rating_change,
            };

            self.games
                .add_participation(participation.clone())
                .await
                .map_err(persistence_failure)?;
            self.players
                .apply_rating_update(
                    seat.record.id,
                    seat.record.rating_state(),
                    seat.record.total_matches,
                    seat.record.wins,
                )
                .await
                .map_err(persistence_failure)?;

            participations.push(participation);
        }

        debug!(
            "Game {} at {}: {}-{} won by {}",
            game_id, played_at, played.outcome.team1_score, played.outcome.team2_score, played.outcome.winner
        );

        Ok(SimulatedGame {
            game: GameRecord::new(game_id, played_at, played.outcome),
            participations,
        })
    }
}

/// Rate every member of `team` against all of `opponents`, using ratings from
/// before the game for both sides, and count the match once per player
fn rate_team(
    team: Team,
    members: &[&PlayerRecord],
    opponents: &[&PlayerRecord],
    winner: Team,
) -> Vec<PlayedSeat> {
    let won = team == winner;
    let results: Vec<MatchResult> = opponents
        .iter()
        .map(|opponent| MatchResult::new(opponent.rating_state(), won))
        .collect();

    members
        .iter()
        .map(|member| {
            let updated = update_rating(member.rating_state(), &results);
            let mut record = (*member).clone();
            let rating_change = updated.rating - record.rating;

            record.apply_rating(updated);
            record.record_match(won);

            debug!(
                "{} {}: {:.1} -> {:.1} (rd {:.1})",
                team, record.nickname, member.rating, updated.rating, updated.deviation
            );

            PlayedSeat {
                team,
                record,
                rating_change,
            }
        })
        .collect()
}
