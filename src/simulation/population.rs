//! Synthetic player generation
//!
//! Players are created per hidden skill tier with nicknames of the form
//! `Player{n}_Skill{level}`, all starting from the same rating so that any
//! later spread comes from simulated games alone.

use crate::error::{persistence_failure, Result};
use crate::storage::{PlayerRepository, TransactionScope};
use crate::types::{PlayerId, SkillLevel, INITIAL_RATING};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How many players to create in each skill tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLevelCounts {
    pub low: usize,
    pub medium: usize,
    pub above_average: usize,
    pub high: usize,
}

impl SkillLevelCounts {
    pub fn uniform(per_level: usize) -> Self {
        Self {
            low: per_level,
            medium: per_level,
            above_average: per_level,
            high: per_level,
        }
    }

    pub fn count_for(&self, level: SkillLevel) -> usize {
        match level {
            SkillLevel::Low => self.low,
            SkillLevel::Medium => self.medium,
            SkillLevel::AboveAverage => self.above_average,
            SkillLevel::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.above_average + self.high
    }
}

/// Nickname given to the `index`-th (0-based) generated player of a tier
pub fn generated_nickname(index: usize, level: SkillLevel) -> String {
    format!("Player{}_Skill{}", index + 1, level.value())
}

pub struct PlayerGenerator {
    players: Arc<dyn PlayerRepository>,
    transactions: Arc<dyn TransactionScope>,
    initial_rating: f64,
}

impl PlayerGenerator {
    pub fn new(players: Arc<dyn PlayerRepository>, transactions: Arc<dyn TransactionScope>) -> Self {
        Self {
            players,
            transactions,
            initial_rating: INITIAL_RATING,
        }
    }

    pub fn with_initial_rating(mut self, initial_rating: f64) -> Self {
        self.initial_rating = initial_rating;
        self
    }

    /// Create `count` players of one skill level (1-4) in a single transaction.
    /// Nicknames that already exist are skipped.
    pub async fn generate(&self, count: usize, skill_level: u8) -> Result<Vec<PlayerId>> {
        let level = SkillLevel::try_from(skill_level)?;
        self.in_transaction(&[(level, count)]).await
    }

    /// Create every tier of `counts`, low to high, in a single transaction
    pub async fn generate_by_skill(&self, counts: &SkillLevelCounts) -> Result<Vec<PlayerId>> {
        let tiers: Vec<(SkillLevel, usize)> = SkillLevel::ALL
            .iter()
            .map(|level| (*level, counts.count_for(*level)))
            .filter(|(_, count)| *count > 0)
            .collect();

        self.in_transaction(&tiers).await
    }

    async fn in_transaction(&self, tiers: &[(SkillLevel, usize)]) -> Result<Vec<PlayerId>> {
        self.transactions.begin().await.map_err(persistence_failure)?;

        let mut created = Vec::new();
        for (level, count) in tiers {
            match self.create_tier(*level, *count).await {
                Ok(ids) => created.extend(ids),
                Err(e) => {
                    if let Err(rollback_err) = self.transactions.rollback().await {
                        warn!("Rollback after failed player generation failed: {}", rollback_err);
                    }
                    return Err(e);
                }
            }
        }

        self.transactions.commit().await.map_err(persistence_failure)?;
        info!("Generated {} players", created.len());
        Ok(created)
    }

    async fn create_tier(&self, level: SkillLevel, count: usize) -> Result<Vec<PlayerId>> {
        let mut created = Vec::with_capacity(count);

        for index in 0..count {
            let nickname = generated_nickname(index, level);

            if self
                .players
                .find_id_by_nickname(&nickname)
                .await
                .map_err(persistence_failure)?
                .is_some()
            {
                debug!("Skipping existing player '{}'", nickname);
                continue;
            }

            let id = self
                .players
                .create_player(&nickname, level, self.initial_rating)
                .await
                .map_err(persistence_failure)?;
            created.push(id);
        }

        Ok(created)
    }
}
