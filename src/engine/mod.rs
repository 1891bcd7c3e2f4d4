//! Rule engine for the travel board game.
//!
//! A [`Game`] is a sequential state machine over a shared, validated
//! [`World`]. Players join, the game starts, and from then on every move is a
//! [`Command`] played by whoever owns the current turn.

pub mod command;
pub mod data;
pub mod deck;
pub mod effects;
pub mod errors;
pub mod game;
mod handlers;
pub mod ledger;
pub mod player;
pub mod route;
pub mod snapshot;
pub mod state;
pub mod turn;

pub use command::{Command, CommandPattern};
pub use data::{GameData, Settings, World};
pub use errors::{DataError, PlayError, SnapshotError};
pub use game::{Game, PlayResult};
pub use handlers::CUSTOMS_DUTY;
pub use player::{Debt, Player, Ticket};
pub use snapshot::GameSave;
pub use state::{GameState, Status};
pub use turn::{Change, Turn, TurnState};
