//! Common types used throughout the rating simulator

use crate::error::SimulationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = Uuid;

/// Unique identifier for games
pub type GameId = Uuid;

/// Initial rating assigned to a freshly generated player
pub const INITIAL_RATING: f64 = 1000.0;

/// Initial rating deviation assigned to a freshly generated player
pub const INITIAL_DEVIATION: f64 = 350.0;

/// Hidden ground-truth skill tier, visible only to the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SkillLevel {
    Low = 1,
    Medium = 2,
    AboveAverage = 3,
    High = 4,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::Low,
        SkillLevel::Medium,
        SkillLevel::AboveAverage,
        SkillLevel::High,
    ];

    /// Ordinal value in 1..=4
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SkillLevel {
    type Error = SimulationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SkillLevel::Low),
            2 => Ok(SkillLevel::Medium),
            3 => Ok(SkillLevel::AboveAverage),
            4 => Ok(SkillLevel::High),
            _ => Err(SimulationError::InvalidSkillLevel { value }),
        }
    }
}

impl From<SkillLevel> for u8 {
    fn from(level: SkillLevel) -> Self {
        level.value()
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillLevel::Low => write!(f, "Low"),
            SkillLevel::Medium => write!(f, "Medium"),
            SkillLevel::AboveAverage => write!(f, "AboveAverage"),
            SkillLevel::High => write!(f, "High"),
        }
    }
}

/// Side of a two-team game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Team1,
    Team2,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Team1 => write!(f, "team1"),
            Team::Team2 => write!(f, "team2"),
        }
    }
}

/// Glicko rating state of a player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub rating: f64,
    pub deviation: f64,
}

impl Default for PlayerRating {
    fn default() -> Self {
        Self {
            rating: INITIAL_RATING,
            deviation: INITIAL_DEVIATION,
        }
    }
}

/// Player rating record as seen by the simulator
///
/// `rating` and `rating_deviation` are read-only outside this crate. Inside it
/// they only change through [`PlayerRecord::apply_rating`], which the simulator
/// feeds with values produced by [`crate::rating::glicko::update_rating`] and
/// the store uses to persist them. Match statistics only change through
/// [`PlayerRecord::record_match`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub nickname: String,
    pub skill_level: SkillLevel,
    pub(crate) rating: f64,
    pub(crate) rating_deviation: f64,
    pub total_matches: u32,
    pub wins: u32,
    pub win_rate: f64,
}

impl PlayerRecord {
    /// Create a player that has not played any matches yet
    pub fn new(id: PlayerId, nickname: impl Into<String>, skill_level: SkillLevel, rating: f64) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            skill_level,
            rating,
            rating_deviation: INITIAL_DEVIATION,
            total_matches: 0,
            wins: 0,
            win_rate: 0.0,
        }
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn rating_deviation(&self) -> f64 {
        self.rating_deviation
    }

    pub fn rating_state(&self) -> PlayerRating {
        PlayerRating {
            rating: self.rating,
            deviation: self.rating_deviation,
        }
    }

    pub(crate) fn apply_rating(&mut self, updated: PlayerRating) {
        self.rating = updated.rating;
        self.rating_deviation = updated.deviation;
    }

    /// Count one finished match, and a win when `won`
    pub fn record_match(&mut self, won: bool) {
        self.total_matches += 1;
        if won {
            self.wins += 1;
        }
        self.win_rate = crate::utils::win_rate(self.wins, self.total_matches);
    }
}

/// Final score of a game; scores never tie and the winner holds the higher one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub team1_score: u32,
    pub team2_score: u32,
    pub winner: Team,
}

impl GameOutcome {
    /// Build an outcome from two scores, `None` on a tie
    pub fn from_scores(team1_score: u32, team2_score: u32) -> Option<Self> {
        let winner = match team1_score.cmp(&team2_score) {
            std::cmp::Ordering::Greater => Team::Team1,
            std::cmp::Ordering::Less => Team::Team2,
            std::cmp::Ordering::Equal => return None,
        };

        Some(Self {
            team1_score,
            team2_score,
            winner,
        })
    }
}

/// A simulated game as persisted by the game repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub played_at: DateTime<Utc>,
    pub team1_score: u32,
    pub team2_score: u32,
    pub winner: Team,
}

impl GameRecord {
    pub fn new(id: GameId, played_at: DateTime<Utc>, outcome: GameOutcome) -> Self {
        Self {
            id,
            played_at,
            team1_score: outcome.team1_score,
            team2_score: outcome.team2_score,
            winner: outcome.winner,
        }
    }
}

/// Link between a player and a game, carrying the rating delta the game applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub team: Team,
    pub rating_change: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_level_conversion() {
        assert_eq!(SkillLevel::try_from(3).unwrap(), SkillLevel::AboveAverage);
        assert_eq!(u8::from(SkillLevel::High), 4);
        assert!(matches!(
            SkillLevel::try_from(0),
            Err(SimulationError::InvalidSkillLevel { value: 0 })
        ));
        assert!(SkillLevel::try_from(5).is_err());
    }

    #[test]
    fn test_skill_level_serde_uses_ordinal() {
        let json = serde_json::to_string(&SkillLevel::Medium).unwrap();
        assert_eq!(json, "2");
        let parsed: SkillLevel = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, SkillLevel::High);
        assert!(serde_json::from_str::<SkillLevel>("9").is_err());
    }

    #[test]
    fn test_team_display() {
        assert_eq!(Team::Team1.to_string(), "team1");
        assert_eq!(serde_json::to_string(&Team::Team2).unwrap(), "\"team2\"");
    }

    #[test]
    fn test_record_match_tracks_win_rate() {
        let mut player = PlayerRecord::new(Uuid::new_v4(), "p", SkillLevel::Low, INITIAL_RATING);
        assert_eq!(player.win_rate, 0.0);

        player.record_match(true);
        player.record_match(false);
        player.record_match(true);
        player.record_match(true);

        assert_eq!(player.total_matches, 4);
        assert_eq!(player.wins, 3);
        assert_eq!(player.win_rate, 75.0);
    }

    #[test]
    fn test_rating_accessors_follow_engine_updates() {
        use crate::rating::glicko::{update_rating, MatchResult};

        let mut player = PlayerRecord::new(Uuid::new_v4(), "p", SkillLevel::Medium, INITIAL_RATING);
        assert_eq!(player.rating(), INITIAL_RATING);
        assert_eq!(player.rating_deviation(), INITIAL_DEVIATION);

        let updated = update_rating(
            player.rating_state(),
            &[MatchResult::new(PlayerRating::default(), true)],
        );
        player.apply_rating(updated);

        assert_eq!(player.rating(), updated.rating);
        assert_eq!(player.rating_deviation(), updated.deviation);
        assert!(player.rating() > INITIAL_RATING);
        assert_eq!(player.rating_state(), updated);
    }

    #[test]
    fn test_game_outcome_rejects_ties() {
        assert!(GameOutcome::from_scores(3, 3).is_none());

        let outcome = GameOutcome::from_scores(2, 7).unwrap();
        assert_eq!(outcome.winner, Team::Team2);

        let outcome = GameOutcome::from_scores(10, 0).unwrap();
        assert_eq!(outcome.winner, Team::Team1);
    }
}
