//! Spreads a season's games across a date range
//!
//! Games are a base interval apart (range length / game count) plus up to 30
//! minutes of jitter, never passing the end of the range.

use crate::error::{Result, SimulationError};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Upper bound (exclusive) of the random extra gap between two games
pub const MAX_JITTER_SECONDS: i64 = 1800;

#[derive(Debug, Clone)]
pub struct GameTimeline {
    next: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
    issued: usize,
}

impl GameTimeline {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, game_count: usize) -> Result<Self> {
        if end <= start {
            return Err(SimulationError::InvalidDateRange { start, end }.into());
        }

        let total_seconds = (end - start).num_seconds();
        let interval_seconds = total_seconds / game_count.max(1) as i64;

        Ok(Self {
            next: start,
            end,
            interval: Duration::seconds(interval_seconds),
            issued: 0,
        })
    }

    /// Gap between games before jitter
    pub fn base_interval(&self) -> Duration {
        self.interval
    }

    /// Timestamp of the next game; the first game starts at the range start
    pub fn next_time<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DateTime<Utc> {
        if self.issued > 0 {
            let jitter = Duration::seconds(rng.gen_range(0..MAX_JITTER_SECONDS));
            self.next = (self.next + self.interval + jitter).min(self.end);
        }

        self.issued += 1;
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_empty_range() {
        let err = GameTimeline::new(at(5), at(5), 10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::InvalidDateRange { .. })
        ));
        assert!(GameTimeline::new(at(6), at(5), 10).is_err());
    }

    #[test]
    fn test_timeline_is_monotonic_and_bounded() {
        let mut timeline = GameTimeline::new(at(1), at(11), 100).unwrap();
        assert_eq!(timeline.base_interval(), Duration::seconds(8640));

        let mut rng = StdRng::seed_from_u64(9);
        let mut previous = timeline.next_time(&mut rng);
        assert_eq!(previous, at(1));

        for _ in 1..100 {
            let current = timeline.next_time(&mut rng);
            let gap = current - previous;
            assert!(current >= previous);
            assert!(current <= at(11));
            assert!(gap < Duration::seconds(8640 + MAX_JITTER_SECONDS) || current == at(11));
            previous = current;
        }
    }

    #[test]
    fn test_overflowing_games_clamp_to_end() {
        let start = at(1);
        let end = start + Duration::seconds(60);
        let mut timeline = GameTimeline::new(start, end, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        let times: Vec<_> = (0..10).map(|_| timeline.next_time(&mut rng)).collect();
        assert_eq!(times[0], start);
        assert!(times.iter().all(|t| *t <= end));
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }
}
