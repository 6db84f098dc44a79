//! Main entry point for the rating simulator
//!
//! Generates a synthetic player population, plays a season of games on a
//! background task and prints an analysis of the final rating distribution.

use anyhow::Result;
use clap::Parser;
use rating_sim::analysis::RatingReport;
use rating_sim::config::{validate_config, AppConfig};
use rating_sim::simulation::{
    CancellationFlag, MatchSimulator, PlayerGenerator, SeasonSummary, SimulationRequest,
};
use rating_sim::storage::InMemoryStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Glicko rating simulator
#[derive(Parser)]
#[command(
    name = "rating-sim",
    version,
    about = "Simulate a season of team games and analyse the resulting Glicko ratings",
    long_about = "rating-sim generates players with hidden skill levels, plays a season of \
                 team games between them, updates every participant with a Glicko rating \
                 update and reports how well the final rating distribution reflects skill."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Game count override
    #[arg(short, long, value_name = "COUNT", help = "Number of games to simulate")]
    games: Option<usize>,

    /// Team size override
    #[arg(long, value_name = "SIZE", help = "Players on each team")]
    players_per_team: Option<usize>,

    /// Disable skill-aware selection
    #[arg(long, help = "Pick players uniformly at random instead of by rating")]
    random_selection: bool,

    /// RNG seed override
    #[arg(long, value_name = "SEED", help = "Seed for a reproducible season")]
    seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long, help = "Print the season summary and rating report as JSON")]
    json: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without simulating")]
    dry_run: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    games: usize,
    team1_wins: usize,
    team2_wins: usize,
    elapsed_ms: u128,
    report: &'a RatingReport,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with season information
fn display_startup_banner(config: &AppConfig) {
    let simulation = &config.simulation;
    info!("🎲 Rating Simulator");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Games: {}", simulation.game_count);
    info!("   Players per team: {}", simulation.players_per_team);
    info!("   Skill-aware selection: {}", simulation.skill_aware);
    info!("   Season: {} to {}", simulation.start_time, simulation.end_time);
    info!(
        "   Population: {} low, {} medium, {} above average, {} high",
        simulation.population.low,
        simulation.population.medium,
        simulation.population.above_average,
        simulation.population.high
    );
    if let Some(seed) = simulation.seed {
        info!("   Seed: {}", seed);
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment or file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(games) = args.games {
        config.simulation.game_count = games;
    }

    if let Some(players_per_team) = args.players_per_team {
        config.simulation.players_per_team = players_per_team;
    }

    if args.random_selection {
        config.simulation.skill_aware = false;
    }

    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }

    validate_config(&config)?;
    Ok(config)
}

async fn run_season(config: &AppConfig) -> Result<(SeasonSummary, RatingReport)> {
    let store = Arc::new(InMemoryStore::new());

    let generated = PlayerGenerator::new(store.clone(), store.clone())
        .with_initial_rating(config.rating.initial_rating)
        .generate_by_skill(&config.simulation.population)
        .await?;
    info!("Population ready: {} players", generated.len());

    let mut simulator = MatchSimulator::new(store.clone(), store.clone(), store.clone());
    if let Some(seed) = config.simulation.seed {
        simulator = simulator.with_seed(seed);
    }

    let request = SimulationRequest::from_settings(&config.simulation);
    let game_count = request.game_count;
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<usize>();
    let cancel = CancellationFlag::new();

    let handle = simulator.spawn(request, progress_tx, cancel.clone());

    let progress_task = tokio::spawn(async move {
        let step = (game_count / 10).max(1);
        while let Some(completed) = progress_rx.recv().await {
            if completed % step == 0 || completed == game_count {
                info!("Progress: {}/{} games", completed, game_count);
            }
        }
    });

    let signal_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("Received Ctrl+C, cancelling season");
                cancel.cancel();
            }
        })
    };

    let outcome = handle.await?;
    signal_task.abort();
    let _ = progress_task.await;
    let summary = outcome?;

    let players = store.players()?;
    let report = RatingReport::from_players(&players, config.rating.bucket_size)?;

    Ok((summary, report))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without simulating");
        return Ok(());
    }

    display_startup_banner(&config);

    let (summary, report) = match run_season(&config).await {
        Ok(result) => result,
        Err(e) => {
            error!("Simulation failed: {:#}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        let output = JsonOutput {
            games: summary.games.len(),
            team1_wins: summary.team1_wins,
            team2_wins: summary.team2_wins,
            elapsed_ms: summary.elapsed_ms,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Simulated {} games in {} ms (team1 {} / team2 {})\n",
            summary.games.len(),
            summary.elapsed_ms,
            summary.team1_wins,
            summary.team2_wins
        );
        println!("{}", report.narrative);
    }

    info!("✅ Season complete");
    Ok(())
}
