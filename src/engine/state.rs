//! Read-only views of a game for display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::game::Game;
use super::ledger::Purse;
use super::player::Debt;
use super::turn::TurnState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unstarted,
    InProgress,
    Won,
}

/// Ticket details visible to everyone. The route stays private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSummary {
    pub by: String,
    pub from: String,
    pub to: String,
    pub fare: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub colour: String,
    pub square: usize,
    pub dot: String,
    pub money: Purse,
    pub souvenirs: Vec<String>,
    pub lucks: Vec<usize>,
    pub ticket: Option<TicketSummary>,
    pub debts: Vec<Debt>,
}

/// Per-player entry; only the player whose turn it is carries a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub turn: Option<TurnState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalState {
    pub players: BTreeMap<String, PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub status: Status,
    pub playing: Option<String>,
    pub winner: Option<String>,
    pub turn_number: Option<u64>,
    pub players: Vec<PlayerState>,
    pub global: GlobalState,
}

impl Game {
    pub fn state(&self) -> GameState {
        let current = self.turn.as_ref().map(|t| t.player);
        let playing = current.map(|i| self.players[i].name.clone());

        let status = if self.winner.is_some() {
            Status::Won
        } else if playing.is_none() {
            Status::Unstarted
        } else {
            Status::InProgress
        };

        let mut players = Vec::with_capacity(self.players.len());
        let mut global = GlobalState {
            players: BTreeMap::new(),
        };

        for (i, p) in self.players.iter().enumerate() {
            let turn = match &self.turn {
                Some(t) if t.player == i => Some(t.view()),
                _ => None,
            };
            players.push(PlayerState {
                name: p.name.clone(),
                turn,
            });

            let ticket = p.ticket.as_ref().map(|t| TicketSummary {
                by: t.mode.clone(),
                from: t.from.clone(),
                to: t.to.clone(),
                fare: t.fare,
                currency: t.currency.clone(),
            });
            global.players.insert(
                p.name.clone(),
                PlayerSummary {
                    colour: p.colour.clone(),
                    square: p.square,
                    dot: p.dot.clone(),
                    money: p.money.clone(),
                    souvenirs: p.souvenirs.clone(),
                    lucks: p.lucks.clone(),
                    ticket,
                    debts: p.debts.clone(),
                },
            );
        }

        GameState {
            status,
            playing,
            winner: self.winner.clone(),
            turn_number: self.turn.as_ref().map(|t| t.number),
            players,
            global,
        }
    }
}
