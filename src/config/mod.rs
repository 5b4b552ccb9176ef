//! # Configuration
//!
//! TOML configuration for the cultivation engine and its command-line front end.
//!
//! - [`GameConfig`] - gameplay tunables (starting gold, accrual speed, rewards, day boundary)
//! - [`StorageConfig`] - where the sled database lives
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ```toml
//! [game]
//! name = "修仙界"
//! initial_gold = 100
//! exp_per_minute = 10.0
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every field of `[game]` has a default, so an empty section is valid.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Inclusive integer range used for random rewards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardRange {
    pub min: u64,
    pub max: u64,
}

impl RewardRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_initial_gold")]
    pub initial_gold: u64,
    /// Seclusion experience per minute before spirit root and technique multipliers.
    #[serde(default = "default_exp_per_minute")]
    pub exp_per_minute: f64,
    #[serde(default = "default_ranking_size")]
    pub ranking_size: usize,
    /// Gold the duel winner takes, bounded by what the loser holds.
    #[serde(default = "default_duel_reward")]
    pub duel_reward: RewardRange,
    #[serde(default = "default_checkin_gold")]
    pub checkin_gold: RewardRange,
    /// Extra check-in gold per major realm.
    #[serde(default = "default_checkin_gold_per_realm")]
    pub checkin_gold_per_realm: u64,
    #[serde(default = "default_checkin_exp")]
    pub checkin_exp: RewardRange,
    #[serde(default = "default_checkin_exp_per_realm")]
    pub checkin_exp_per_realm: u64,
    /// Seconds a pending reset stays confirmable.
    #[serde(default = "default_reset_window_secs")]
    pub reset_confirm_window_secs: i64,
    /// Offset from UTC at which the game day (check-in, reset) rolls over.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

fn default_name() -> String {
    "修仙界".to_string()
}

fn default_initial_gold() -> u64 {
    crate::xiuxian::types::INITIAL_GOLD
}

fn default_exp_per_minute() -> f64 {
    crate::xiuxian::seclusion::DEFAULT_EXP_PER_MINUTE
}

fn default_ranking_size() -> usize {
    10
}

fn default_duel_reward() -> RewardRange {
    RewardRange::new(10, 50)
}

fn default_checkin_gold() -> RewardRange {
    RewardRange::new(50, 150)
}

fn default_checkin_gold_per_realm() -> u64 {
    20
}

fn default_checkin_exp() -> RewardRange {
    RewardRange::new(100, 300)
}

fn default_checkin_exp_per_realm() -> u64 {
    50
}

fn default_reset_window_secs() -> i64 {
    60
}

fn default_utc_offset_hours() -> i32 {
    8
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            initial_gold: default_initial_gold(),
            exp_per_minute: default_exp_per_minute(),
            ranking_size: default_ranking_size(),
            duel_reward: default_duel_reward(),
            checkin_gold: default_checkin_gold(),
            checkin_gold_per_realm: default_checkin_gold_per_realm(),
            checkin_exp: default_checkin_exp(),
            checkin_exp_per_realm: default_checkin_exp_per_realm(),
            reset_confirm_window_secs: default_reset_window_secs(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Optional override for the sled database path; defaults to `<data_dir>/xiuxian`.
    #[serde(default)]
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.data_dir).join("xiuxian"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let game = &self.game;
        for (label, range) in [
            ("duel_reward", game.duel_reward),
            ("checkin_gold", game.checkin_gold),
            ("checkin_exp", game.checkin_exp),
        ] {
            if range.min > range.max {
                bail!("game.{}: min {} exceeds max {}", label, range.min, range.max);
            }
        }
        if !game.exp_per_minute.is_finite() || game.exp_per_minute < 0.0 {
            bail!("game.exp_per_minute must be a non-negative number");
        }
        if game.reset_confirm_window_secs <= 0 {
            bail!("game.reset_confirm_window_secs must be positive");
        }
        if !(-12..=14).contains(&game.utc_offset_hours) {
            bail!("game.utc_offset_hours out of range: {}", game.utc_offset_hours);
        }
        if game.ranking_size == 0 {
            bail!("game.ranking_size must be at least 1");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game: GameConfig::default(),
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                db_path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("xiuxian.log".to_string()),
            },
        }
    }
}
