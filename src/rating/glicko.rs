//! Single-parameter Glicko rating engine
//!
//! Pure functions with no state and no I/O. The simulator calls
//! [`update_rating`] once per participant per game; nothing else is allowed to
//! produce a new rating or deviation.

use crate::types::PlayerRating;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Glicko scale constant, ln(10) / 400
pub const Q: f64 = std::f64::consts::LN_10 / 400.0;

/// Deviation growth per idle rating period
pub const RATING_PERIOD_VOLATILITY: f64 = 34.6;

/// Lower bound of a rating deviation
pub const MIN_DEVIATION: f64 = 30.0;

/// Upper bound of a rating deviation, also the deviation of an unknown player
pub const MAX_DEVIATION: f64 = 350.0;

/// Floor applied to the accumulated information term before inversion
const MIN_INFORMATION: f64 = 0.0001;

/// Result of one game against one opponent, from the rated player's side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub opponent: PlayerRating,
    pub won: bool,
}

impl MatchResult {
    pub fn new(opponent: PlayerRating, won: bool) -> Self {
        Self { opponent, won }
    }
}

/// Deviation discount: high-uncertainty opponents weigh less
pub fn g(deviation: f64) -> f64 {
    1.0 / (1.0 + 3.0 * Q * Q * deviation * deviation / (PI * PI)).sqrt()
}

/// Probability that A beats B
///
/// Both deviations discount the rating gap, so swapping the players flips
/// the probability: `expected_outcome(a, b) == 1 - expected_outcome(b, a)`.
pub fn expected_outcome(rating_a: f64, deviation_a: f64, rating_b: f64, deviation_b: f64) -> f64 {
    let combined = (deviation_a * deviation_a + deviation_b * deviation_b).sqrt();
    let discount = g(combined);
    1.0 / (1.0 + 10f64.powf(-discount * (rating_a - rating_b) / 400.0))
}

/// Grow a deviation over `elapsed_periods` idle rating periods, capped at 350
pub fn decay_deviation(deviation: f64, elapsed_periods: u32) -> f64 {
    if elapsed_periods == 0 {
        return deviation.min(MAX_DEVIATION);
    }

    let grown = (deviation * deviation
        + RATING_PERIOD_VOLATILITY * RATING_PERIOD_VOLATILITY * f64::from(elapsed_periods))
    .sqrt();
    grown.min(MAX_DEVIATION)
}

/// Largest rating movement a single update may apply at this deviation
pub fn max_rating_change(deviation: f64) -> f64 {
    (deviation / MAX_DEVIATION) * 50.0 + 15.0
}

/// Multi-opponent Glicko update
///
/// With no results the rating is kept and the deviation decays by one period.
/// Otherwise the delta is clamped by [`max_rating_change`] and the new
/// deviation is clamped to `[MIN_DEVIATION, MAX_DEVIATION]`.
pub fn update_rating(current: PlayerRating, results: &[MatchResult]) -> PlayerRating {
    let PlayerRating { rating, deviation } = current;

    if results.is_empty() {
        return PlayerRating {
            rating,
            deviation: decay_deviation(deviation, 1),
        };
    }

    let mut information = 0.0;
    let mut expected_sum = 0.0;
    let mut actual_sum = 0.0;

    for result in results {
        let discount = g(result.opponent.deviation);
        let expected = expected_outcome(
            rating,
            deviation,
            result.opponent.rating,
            result.opponent.deviation,
        );
        let actual = if result.won { 1.0 } else { 0.0 };

        expected_sum += discount * expected;
        actual_sum += discount * actual;
        information += discount * discount * expected * (1.0 - expected);
    }

    let d_squared = 1.0 / (Q * Q * information.max(MIN_INFORMATION));
    let precision = 1.0 / (deviation * deviation) + 1.0 / d_squared;

    let limit = max_rating_change(deviation);
    let delta = (Q / precision * (actual_sum - expected_sum)).clamp(-limit, limit);

    PlayerRating {
        rating: rating + delta,
        deviation: (1.0 / precision).sqrt().clamp(MIN_DEVIATION, MAX_DEVIATION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn rating(rating: f64, deviation: f64) -> PlayerRating {
        PlayerRating { rating, deviation }
    }

    #[test]
    fn test_q_matches_glicko_constant() {
        assert!((Q - 0.00575646273).abs() < 1e-10);
    }

    #[test]
    fn test_g_is_one_for_certain_opponent() {
        assert!((g(0.0) - 1.0).abs() < EPSILON);
        assert!(g(350.0) < g(30.0));
    }

    #[test]
    fn test_equal_players_expect_half() {
        assert!((expected_outcome(1000.0, 350.0, 1000.0, 350.0) - 0.5).abs() < EPSILON);
        assert!((expected_outcome(1734.0, 42.0, 1734.0, 42.0) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_higher_rating_is_favoured() {
        let favourite = expected_outcome(1200.0, 100.0, 1000.0, 100.0);
        assert!(favourite > 0.5);
        assert!(favourite < 1.0);
    }

    #[test]
    fn test_decay_grows_and_caps() {
        let grown = decay_deviation(100.0, 1);
        assert!((grown - (100.0f64 * 100.0 + 34.6 * 34.6).sqrt()).abs() < EPSILON);
        assert_eq!(decay_deviation(340.0, 10), MAX_DEVIATION);
    }

    #[test]
    fn test_decay_with_zero_periods_is_idempotent() {
        let mut deviation = 123.456;
        for _ in 0..10 {
            deviation = decay_deviation(deviation, 0);
        }
        assert_eq!(deviation, 123.456);
    }

    #[test]
    fn test_empty_results_only_decay() {
        let updated = update_rating(rating(1100.0, 80.0), &[]);
        assert_eq!(updated.rating, 1100.0);
        assert_eq!(updated.deviation, decay_deviation(80.0, 1));
    }

    #[test]
    fn test_single_duel_moves_ratings_symmetrically() {
        let a = rating(1000.0, 350.0);
        let b = rating(1000.0, 350.0);

        let a_after = update_rating(a, &[MatchResult::new(b, true)]);
        let b_after = update_rating(b, &[MatchResult::new(a, false)]);

        let a_delta = a_after.rating - a.rating;
        let b_delta = b_after.rating - b.rating;

        assert!(a_delta > 0.0);
        assert!(b_delta < 0.0);
        assert!((a_delta + b_delta).abs() < EPSILON);
        assert!((a_after.deviation - b_after.deviation).abs() < EPSILON);
        assert!(a_after.deviation < 350.0);
    }

    #[test]
    fn test_new_player_delta_is_capped() {
        let a = rating(1000.0, 350.0);
        let updated = update_rating(a, &[MatchResult::new(rating(1000.0, 350.0), true)]);
        // uncapped delta would be well above the 65 point ceiling
        assert!((updated.rating - 1065.0).abs() < EPSILON);
    }

    #[test]
    fn test_team_game_uses_every_opponent() {
        let player = rating(1000.0, 200.0);
        let opponents = [rating(1000.0, 200.0), rating(1050.0, 150.0)];

        let one = update_rating(player, &[MatchResult::new(opponents[0], true)]);
        let both = update_rating(
            player,
            &opponents
                .iter()
                .map(|o| MatchResult::new(*o, true))
                .collect::<Vec<_>>(),
        );

        assert!(both.deviation < one.deviation);
    }

    #[test]
    fn test_upset_win_moves_more_than_expected_win() {
        let underdog = rating(900.0, 100.0);
        let favourite = rating(1200.0, 100.0);

        let upset = update_rating(underdog, &[MatchResult::new(favourite, true)]);
        let expected = update_rating(favourite, &[MatchResult::new(underdog, true)]);

        assert!(upset.rating - underdog.rating > expected.rating - favourite.rating);
    }

    proptest! {
        #[test]
        fn prop_expected_outcome_is_complementary(
            ra in 0.0f64..3000.0,
            rda in 30.0f64..350.0,
            rb in 0.0f64..3000.0,
            rdb in 30.0f64..350.0,
        ) {
            let ab = expected_outcome(ra, rda, rb, rdb);
            let ba = expected_outcome(rb, rdb, ra, rda);
            prop_assert!(ab > 0.0 && ab < 1.0);
            prop_assert!((ab + ba - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_expected_outcome_is_monotonic(
            ra in 0.0f64..3000.0,
            gap in 1.0f64..500.0,
            rd in 30.0f64..350.0,
        ) {
            let low = expected_outcome(ra, rd, 1500.0, rd);
            let high = expected_outcome(ra + gap, rd, 1500.0, rd);
            prop_assert!(high > low);
        }

        #[test]
        fn prop_update_respects_bounds(
            r in 0.0f64..3000.0,
            rd in 30.0f64..350.0,
            opponents in prop::collection::vec((0.0f64..3000.0, 30.0f64..350.0, any::<bool>()), 1..8),
        ) {
            let results: Vec<MatchResult> = opponents
                .iter()
                .map(|(rating, deviation, won)| MatchResult::new(PlayerRating { rating: *rating, deviation: *deviation }, *won))
                .collect();

            let updated = update_rating(PlayerRating { rating: r, deviation: rd }, &results);

            prop_assert!(updated.deviation >= MIN_DEVIATION);
            prop_assert!(updated.deviation <= MAX_DEVIATION);
            prop_assert!((updated.rating - r).abs() <= max_rating_change(rd) + 1e-9);
        }

        #[test]
        fn prop_winning_never_lowers_rating(
            r in 0.0f64..3000.0,
            rd in 30.0f64..350.0,
            or in 0.0f64..3000.0,
            ord in 30.0f64..350.0,
        ) {
            let me = PlayerRating { rating: r, deviation: rd };
            let them = PlayerRating { rating: or, deviation: ord };
            prop_assert!(update_rating(me, &[MatchResult::new(them, true)]).rating >= r);
            prop_assert!(update_rating(me, &[MatchResult::new(them, false)]).rating <= r);
        }
    }
}
