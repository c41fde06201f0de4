use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Redis is optional; without it only the in-process tier is used
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub session_secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_cookie_name() -> String { "session_token".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: u16,
    #[serde(default = "default_availability_days")]
    pub availability_days: i64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            candidate_limit: default_candidate_limit(),
            availability_days: default_availability_days(),
        }
    }
}

fn default_candidate_limit() -> u16 { 50 }
fn default_availability_days() -> i64 { 7 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub points: PointsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointsConfig {
    #[serde(default = "default_skill_points")]
    pub skill: [u32; 4],
    #[serde(default = "default_goal_per_match")]
    pub goal_per_match: u32,
    #[serde(default = "default_goal_max")]
    pub goal_max: u32,
    #[serde(default = "default_style_points")]
    pub style: u32,
    #[serde(default = "default_day_per_match")]
    pub day_per_match: u32,
    #[serde(default = "default_day_max")]
    pub day_max: u32,
    #[serde(default = "default_location_exact")]
    pub location_exact: u32,
    #[serde(default = "default_location_partial")]
    pub location_partial: u32,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            skill: default_skill_points(),
            goal_per_match: default_goal_per_match(),
            goal_max: default_goal_max(),
            style: default_style_points(),
            day_per_match: default_day_per_match(),
            day_max: default_day_max(),
            location_exact: default_location_exact(),
            location_partial: default_location_partial(),
        }
    }
}

impl From<&PointsConfig> for ScoringWeights {
    fn from(points: &PointsConfig) -> Self {
        Self {
            skill: points.skill,
            goal_per_match: points.goal_per_match,
            goal_max: points.goal_max,
            style: points.style,
            day_per_match: points.day_per_match,
            day_max: points.day_max,
            location_exact: points.location_exact,
            location_partial: points.location_partial,
        }
    }
}

fn default_skill_points() -> [u32; 4] { [30, 20, 10, 0] }
fn default_goal_per_match() -> u32 { 8 }
fn default_goal_max() -> u32 { 25 }
fn default_style_points() -> u32 { 15 }
fn default_day_per_match() -> u32 { 3 }
fn default_day_max() -> u32 { 15 }
fn default_location_exact() -> u32 { 15 }
fn default_location_partial() -> u32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PARTNER__)
    /// 5. `DATABASE_URL` and `SESSION_SECRET`
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., PARTNER__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_well_known_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.points)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("PARTNER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional unprefixed variables on top of loaded settings
fn apply_well_known_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(secret) = env::var("SESSION_SECRET") {
        builder = builder.set_override("auth.session_secret", secret)?;
    }

    builder.build()
}
