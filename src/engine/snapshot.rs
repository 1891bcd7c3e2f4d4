//! Saving and restoring the mutable half of a game as one JSON document.
//!
//! The static world is not saved; a document is restored against the same
//! world it was written from. Card piles are saved in draw order, and the
//! turn refers to its player by index, so a restored game continues exactly
//! where it stopped.

use std::io::{Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::data::{Settings, World};
use super::deck::CardPile;
use super::errors::SnapshotError;
use super::game::Game;
use super::ledger::Bank;
use super::player::Player;
use super::turn::Turn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSave {
    pub settings: Settings,
    pub players: Vec<Player>,
    #[serde(default)]
    pub winner: Option<String>,
    pub bank: Bank,
    pub lucks: Vec<usize>,
    pub risks: Vec<usize>,
    #[serde(default)]
    pub turn: Option<Turn>,
}

impl Game {
    pub fn save(&self) -> GameSave {
        GameSave {
            settings: self.settings.clone(),
            players: self.players.clone(),
            winner: self.winner.clone(),
            bank: self.bank.clone(),
            lucks: self.luck_pile.order(),
            risks: self.risk_pile.order(),
            turn: self.turn.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.save())?)
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), SnapshotError> {
        serde_json::to_writer_pretty(&mut w, &self.save())?;
        w.flush()?;
        Ok(())
    }

    pub fn from_json(world: Arc<World>, text: &str) -> Result<Game, SnapshotError> {
        let save: GameSave = serde_json::from_str(text)?;
        Self::restore(world, save)
    }

    pub fn read_from<R: Read>(world: Arc<World>, r: R) -> Result<Game, SnapshotError> {
        let save: GameSave = serde_json::from_reader(r)?;
        Self::restore(world, save)
    }

    /// Rebuild a game from a saved document, checking that it fits the world.
    pub fn restore(world: Arc<World>, save: GameSave) -> Result<Game, SnapshotError> {
        if !world.places.contains_key(&save.settings.home) {
            return Err(SnapshotError::Corrupt(format!(
                "unknown home place {}",
                save.settings.home
            )));
        }

        if let Some(turn) = &save.turn {
            if turn.player >= save.players.len() {
                return Err(SnapshotError::Corrupt(format!(
                    "turn belongs to player {} of {}",
                    turn.player,
                    save.players.len()
                )));
            }
        }

        for p in &save.players {
            if !world.dots.contains_key(&p.dot) {
                return Err(SnapshotError::Corrupt(format!("{} is on unknown dot {}", p.name, p.dot)));
            }
            if p.square >= world.squares.len() {
                return Err(SnapshotError::Corrupt(format!("{} is off the track", p.name)));
            }
        }

        let held = save.players.iter().flat_map(|p| p.lucks.iter().copied());
        check_cards("luck", save.lucks.iter().copied().chain(held), world.lucks.len())?;
        check_cards("risk", save.risks.iter().copied(), world.risks.len())?;

        Ok(Game::from_parts(
            world,
            save.settings,
            save.bank,
            save.players,
            CardPile::from_order(save.lucks),
            CardPile::from_order(save.risks),
            save.turn,
            save.winner,
        ))
    }
}

/// Every card of a table must be somewhere, exactly once.
fn check_cards(
    kind: &str,
    cards: impl Iterator<Item = usize>,
    size: usize,
) -> Result<(), SnapshotError> {
    let mut seen = vec![false; size];
    for card in cards {
        match seen.get_mut(card) {
            None => {
                return Err(SnapshotError::Corrupt(format!("{} card {} out of range", kind, card)));
            }
            Some(true) => {
                return Err(SnapshotError::Corrupt(format!("{} card {} appears twice", kind, card)));
            }
            Some(slot) => *slot = true,
        }
    }
    if let Some(missing) = seen.iter().position(|s| !s) {
        return Err(SnapshotError::Corrupt(format!("{} card {} is missing", kind, missing)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_must_be_a_permutation() {
        assert!(check_cards("luck", [2, 0, 1].into_iter(), 3).is_ok());
        assert!(check_cards("luck", [0, 1].into_iter(), 3).is_err());
        assert!(check_cards("luck", [0, 1, 1].into_iter(), 3).is_err());
        assert!(check_cards("risk", [0, 5].into_iter(), 2).is_err());
    }
}
