//! # Globetrot - rule engine for a turn-based travel board game
//!
//! Players race around a world map on tickets bought in local currencies,
//! collecting souvenirs, while a circular track of squares drives luck and
//! risk cards, customs, debts and exchange. The first player home with enough
//! souvenirs wins.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use globetrot::engine::{Command, Game, World};
//!
//! fn main() -> anyhow::Result<()> {
//!     let world = Arc::new(World::load("data.json")?);
//!     let mut game = Game::new(world, None);
//!     game.add_player("fogg", "red")?;
//!     game.start()?;
//!     let result = game.play("fogg", &Command::new("dicemove"))?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - world data, commands, cards, routes, effects and the turn engine
//! - [`host`] - many games over one world, saved to an embedded database
//! - [`config`] - TOML configuration for the host and command line tool
//! - [`validation`] - player names, colours and game ids
//! - [`logutil`] - single-line escaping for logged client input
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   CLI / Host    │ ← one lock per game, save after every call
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Game          │ ← turn state machine, handlers, effects
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   World         │ ← validated, shared, read-only
//! └─────────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod host;
pub mod logutil;
pub mod validation;
