//! Main application configuration
//!
//! This module defines the primary configuration structures for the rating
//! simulator, including environment variable and TOML loading and validation.

use crate::config::rating::RatingSettings;
use crate::error::SimulationError;
use crate::simulation::population::SkillLevelCounts;
use crate::utils::current_timestamp;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub simulation: SimulationSettings,
    pub rating: RatingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Season settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of games in the season
    pub game_count: usize,
    /// Players on each side of a game
    pub players_per_team: usize,
    /// Skill-aware selection; uniform random selection when false
    pub skill_aware: bool,
    /// First game timestamp
    pub start_time: DateTime<Utc>,
    /// Latest allowed game timestamp
    pub end_time: DateTime<Utc>,
    /// Fixed RNG seed for reproducible seasons
    pub seed: Option<u64>,
    /// Players generated per skill level before the season
    pub population: SkillLevelCounts,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "rating-sim".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let end_time = current_timestamp();
        Self {
            game_count: 1000,
            players_per_team: 2,
            skill_aware: true,
            start_time: end_time - Duration::days(30),
            end_time,
            seed: None,
            population: SkillLevelCounts::uniform(25),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

fn parse_time(name: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Simulation settings
        if let Ok(count) = env::var("SIM_GAME_COUNT") {
            config.simulation.game_count = parse_var("SIM_GAME_COUNT", &count)?;
        }
        if let Ok(size) = env::var("SIM_PLAYERS_PER_TEAM") {
            config.simulation.players_per_team = parse_var("SIM_PLAYERS_PER_TEAM", &size)?;
        }
        if let Ok(skill_aware) = env::var("SIM_SKILL_AWARE") {
            config.simulation.skill_aware = parse_var("SIM_SKILL_AWARE", &skill_aware)?;
        }
        if let Ok(start) = env::var("SIM_START_TIME") {
            config.simulation.start_time = parse_time("SIM_START_TIME", &start)?;
        }
        if let Ok(end) = env::var("SIM_END_TIME") {
            config.simulation.end_time = parse_time("SIM_END_TIME", &end)?;
        }
        if let Ok(seed) = env::var("SIM_SEED") {
            config.simulation.seed = Some(parse_var("SIM_SEED", &seed)?);
        }
        if let Ok(low) = env::var("SIM_PLAYERS_LOW") {
            config.simulation.population.low = parse_var("SIM_PLAYERS_LOW", &low)?;
        }
        if let Ok(medium) = env::var("SIM_PLAYERS_MEDIUM") {
            config.simulation.population.medium = parse_var("SIM_PLAYERS_MEDIUM", &medium)?;
        }
        if let Ok(above) = env::var("SIM_PLAYERS_ABOVE_AVERAGE") {
            config.simulation.population.above_average =
                parse_var("SIM_PLAYERS_ABOVE_AVERAGE", &above)?;
        }
        if let Ok(high) = env::var("SIM_PLAYERS_HIGH") {
            config.simulation.population.high = parse_var("SIM_PLAYERS_HIGH", &high)?;
        }

        // Rating settings
        if let Ok(initial) = env::var("RATING_INITIAL") {
            config.rating.initial_rating = parse_var("RATING_INITIAL", &initial)?;
        }
        if let Ok(bucket) = env::var("RATING_BUCKET_SIZE") {
            config.rating.bucket_size = parse_var("RATING_BUCKET_SIZE", &bucket)?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        validate_config(&config)?;
        Ok(config)
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    SimulationError::InvalidConfiguration {
        message: message.into(),
    }
    .into()
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(invalid(format!("Invalid log level: {}", config.service.log_level))),
    }

    // Validate season shape
    let simulation = &config.simulation;
    if simulation.game_count == 0 {
        return Err(invalid("Game count must be greater than 0"));
    }
    if simulation.players_per_team == 0 {
        return Err(invalid("Players per team must be greater than 0"));
    }
    if simulation.end_time <= simulation.start_time {
        return Err(SimulationError::InvalidDateRange {
            start: simulation.start_time,
            end: simulation.end_time,
        }
        .into());
    }

    // Validate rating settings
    if config.rating.initial_rating <= 0.0 {
        return Err(invalid("Initial rating must be positive"));
    }
    if config.rating.bucket_size < 1.0 {
        return Err(invalid("Rating bucket size must be at least 1"));
    }

    Ok(())
}
