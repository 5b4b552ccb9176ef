//! # simple-xiuxian - a text cultivation game engine
//!
//! Players climb a fixed realm ladder by banking experience, gamble on breakthroughs, learn
//! techniques, wear gear and duel each other. Every rule lives in the [`xiuxian`] engine;
//! the chat-facing command adapter and the CLI are thin layers on top.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use simple_xiuxian::config::Config;
//! use simple_xiuxian::xiuxian::{CommandProcessor, GameService, XiuxianStoreBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = XiuxianStoreBuilder::new(config.storage.db_path()).open()?;
//!     let processor = CommandProcessor::new(GameService::new(store, config.game.clone()));
//!     println!("{}", processor.process("10001", "韩立", "我要修仙", Utc::now()));
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`xiuxian`] - realm ladder, stats, effects, breakthroughs, combat, storage and service
//! - [`config`] - TOML configuration
//! - [`validation`] - player id and display name checks
//! - [`logutil`] - log-safe rendering of player-supplied text

pub mod config;
pub mod logutil;
pub mod validation;
pub mod xiuxian;
