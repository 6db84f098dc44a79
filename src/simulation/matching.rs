//! Player selection, team balancing and outcome rolls for simulated games
//!
//! Two policies are supported and must be chosen explicitly:
//! - [`SelectionPolicy::SkillAware`]: a random window of closely rated
//!   players, snake-drafted into teams, winner rolled from hidden skill
//! - [`SelectionPolicy::UniformRandom`]: players drawn uniformly, winner
//!   decided by independently rolled scores

use crate::types::{GameOutcome, PlayerRecord, Team};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Lowest score a winning team can post
pub const WINNING_SCORE_MIN: u32 = 5;

/// Highest score any team can post
pub const SCORE_MAX: u32 = 10;

/// How players are picked for each game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    SkillAware,
    UniformRandom,
}

impl SelectionPolicy {
    pub fn from_skill_awareness(skill_aware: bool) -> Self {
        if skill_aware {
            SelectionPolicy::SkillAware
        } else {
            SelectionPolicy::UniformRandom
        }
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionPolicy::SkillAware => write!(f, "skill-aware"),
            SelectionPolicy::UniformRandom => write!(f, "uniform-random"),
        }
    }
}

fn by_rating(a: &&PlayerRecord, b: &&PlayerRecord) -> Ordering {
    a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal)
}

/// Take `count` consecutive players from a random position in rating order.
///
/// The chosen players are removed from `available`. When `available` holds
/// `count` players or fewer, all of them are returned.
pub fn select_balanced<'a, R: Rng + ?Sized>(
    rng: &mut R,
    available: &mut Vec<&'a PlayerRecord>,
    count: usize,
) -> Vec<&'a PlayerRecord> {
    if available.len() <= count {
        return std::mem::take(available);
    }

    available.sort_by(by_rating);

    let start = rng.gen_range(0..=available.len() - count);
    available.drain(start..start + count).collect()
}

/// Take `count` players uniformly at random, removing them from `available`
pub fn select_random<'a, R: Rng + ?Sized>(
    rng: &mut R,
    available: &mut Vec<&'a PlayerRecord>,
    count: usize,
) -> Vec<&'a PlayerRecord> {
    let mut selected = Vec::with_capacity(count);

    while selected.len() < count && !available.is_empty() {
        let idx = rng.gen_range(0..available.len());
        selected.push(available.remove(idx));
    }

    selected
}

/// Snake draft by descending rating: positions 0 and 3 of every group of
/// four go to team 1, positions 1 and 2 to team 2
pub fn distribute_teams<'a>(
    mut selected: Vec<&'a PlayerRecord>,
) -> (Vec<&'a PlayerRecord>, Vec<&'a PlayerRecord>) {
    selected.sort_by(|a, b| by_rating(b, a));

    let mut team1 = Vec::with_capacity(selected.len() / 2 + 1);
    let mut team2 = Vec::with_capacity(selected.len() / 2 + 1);

    for (position, player) in selected.into_iter().enumerate() {
        match position % 4 {
            0 | 3 => team1.push(player),
            _ => team2.push(player),
        }
    }

    (team1, team2)
}

/// Split in selection order: the first `players_per_team` form team 1
pub fn split_in_order<'a>(
    mut selected: Vec<&'a PlayerRecord>,
    players_per_team: usize,
) -> (Vec<&'a PlayerRecord>, Vec<&'a PlayerRecord>) {
    let team2 = selected.split_off(players_per_team.min(selected.len()));
    (selected, team2)
}

/// Sum of hidden skill levels of a team
pub fn skill_sum(team: &[&PlayerRecord]) -> f64 {
    team.iter().map(|p| f64::from(p.skill_level.value())).sum()
}

/// Squared skill share of team 1; squaring widens the edge of the stronger side
pub fn team1_win_probability(team1_skill: f64, team2_skill: f64) -> f64 {
    let total = team1_skill + team2_skill;
    if total <= 0.0 {
        return 0.5;
    }
    (team1_skill / total).powi(2)
}

/// Roll the winner from hidden skill, then winner scores 5-10, loser 0-4
pub fn skill_weighted_outcome<R: Rng + ?Sized>(
    rng: &mut R,
    team1: &[&PlayerRecord],
    team2: &[&PlayerRecord],
) -> GameOutcome {
    let probability = team1_win_probability(skill_sum(team1), skill_sum(team2));
    let winning = rng.gen_range(WINNING_SCORE_MIN..=SCORE_MAX);
    let losing = rng.gen_range(0..WINNING_SCORE_MIN);

    let winner = if rng.gen::<f64>() < probability {
        Team::Team1
    } else {
        Team::Team2
    };

    match winner {
        Team::Team1 => GameOutcome {
            team1_score: winning,
            team2_score: losing,
            winner,
        },
        Team::Team2 => GameOutcome {
            team1_score: losing,
            team2_score: winning,
            winner,
        },
    }
}

/// Roll both scores independently in 0-10, re-rolling team 2 until they differ
pub fn random_score_outcome<R: Rng + ?Sized>(rng: &mut R) -> GameOutcome {
    let team1_score = rng.gen_range(0..=SCORE_MAX);
    loop {
        let team2_score = rng.gen_range(0..=SCORE_MAX);
        if let Some(outcome) = GameOutcome::from_scores(team1_score, team2_score) {
            return outcome;
        }
    }
}
