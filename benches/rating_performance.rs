//! Performance benchmarks for rating updates and simulated seasons

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rating_sim::analysis::DistributionAnalyzer;
use rating_sim::rating::{update_rating, MatchResult};
use rating_sim::simulation::{
    CancellationFlag, MatchSimulator, NoopProgress, SelectionPolicy, SimulationRequest,
};
use rating_sim::storage::InMemoryStore;
use rating_sim::types::{PlayerRating, PlayerRecord, SkillLevel};
use std::sync::Arc;

fn bench_population() -> Vec<PlayerRecord> {
    SkillLevel::ALL
        .iter()
        .flat_map(|level| {
            (0..25).map(move |i| {
                PlayerRecord::new(
                    uuid::Uuid::new_v4(),
                    format!("Player{}_Skill{}", i + 1, level.value()),
                    *level,
                    1000.0,
                )
            })
        })
        .collect()
}

fn bench_rating_update(c: &mut Criterion) {
    let current = PlayerRating {
        rating: 1100.0,
        deviation: 180.0,
    };
    let opponents: Vec<MatchResult> = (0..5)
        .map(|i| {
            MatchResult::new(
                PlayerRating {
                    rating: 1000.0 + i as f64 * 50.0,
                    deviation: 120.0 + i as f64 * 20.0,
                },
                i % 2 == 0,
            )
        })
        .collect();

    c.bench_function("update_rating_5_opponents", |b| {
        b.iter(|| black_box(update_rating(black_box(current), black_box(&opponents))))
    });
}

fn bench_season(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let players = bench_population();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let request = SimulationRequest {
        game_count: 200,
        start_time: start,
        end_time: start + Duration::days(30),
        players_per_team: 2,
        policy: SelectionPolicy::SkillAware,
    };

    c.bench_function("season_200_games_2v2", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = Arc::new(InMemoryStore::with_players(players.clone()));
                let mut simulator =
                    MatchSimulator::new(store.clone(), store.clone(), store.clone()).with_seed(42);

                black_box(
                    simulator
                        .run(&request, &NoopProgress, &CancellationFlag::new())
                        .await,
                )
            })
        })
    });
}

fn bench_distribution_statistics(c: &mut Criterion) {
    let ratings: Vec<f64> = (0..10_000).map(|i| 700.0 + (i % 600) as f64).collect();

    c.bench_function("distribution_statistics_10k", |b| {
        b.iter(|| {
            let analyzer = DistributionAnalyzer::from_ratings(black_box(ratings.iter().copied()), 1.0);
            black_box(analyzer.statistics())
        })
    });
}

criterion_group!(
    benches,
    bench_rating_update,
    bench_season,
    bench_distribution_statistics
);
criterion_main!(benches);
