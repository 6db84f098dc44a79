//! Utility functions for the rating simulator

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique player ID
pub fn generate_player_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique game ID
pub fn generate_game_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Win percentage in 0..=100, zero before the first match
pub fn win_rate(wins: u32, total_matches: u32) -> f64 {
    if total_matches == 0 {
        return 0.0;
    }
    f64::from(wins) / f64::from(total_matches) * 100.0
}

/// Round a rating to the nearest multiple of `bucket_size`
pub fn rating_bucket(rating: f64, bucket_size: f64) -> i64 {
    ((rating / bucket_size).round() * bucket_size) as i64
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_player_id();
        let id2 = generate_player_id();
        assert_ne!(id1, id2);

        let game_id1 = generate_game_id();
        let game_id2 = generate_game_id();
        assert_ne!(game_id1, game_id2);
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(1, 4), 25.0);
        assert_eq!(win_rate(3, 3), 100.0);
    }

    #[test]
    fn test_rating_bucket() {
        assert_eq!(rating_bucket(1012.4, 1.0), 1012);
        assert_eq!(rating_bucket(1024.0, 50.0), 1000);
        assert_eq!(rating_bucket(1026.0, 50.0), 1050);
        assert_eq!(rating_bucket(974.0, 50.0), 950);
    }

    #[test]
    fn test_rating_difference() {
        assert_eq!(rating_difference(1500.0, 1400.0), 100.0);
        assert_eq!(rating_difference(1400.0, 1500.0), 100.0);
        assert_eq!(rating_difference(1500.0, 1500.0), 0.0);
    }
}
