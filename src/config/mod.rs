//! Configuration management for the rating simulator
//!
//! This module handles configuration loading from environment variables or a
//! TOML file, validation, and default values for a simulated season.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, SimulationSettings};
pub use rating::RatingSettings;
