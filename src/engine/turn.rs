use serde::{Deserialize, Serialize};

use super::command::{list_with, list_without, CommandPattern};
use super::player::Ticket;

/// The single active turn. Replaced, not mutated, when play passes on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub number: u64,
    /// Index into the game's player list.
    pub player: usize,
    /// Travelling on the map rather than walking the track.
    pub on_map: bool,
    pub moved: bool,
    pub stopped: bool,
    /// Patterns the player may play now.
    pub can: Vec<String>,
    /// Patterns that must be played before the turn can end.
    pub must: Vec<String>,
    /// Ticket lost this turn in a way insurance will refund.
    #[serde(default)]
    pub lost_ticket: Option<Ticket>,
}

impl Turn {
    pub fn new(number: u64, player: usize, on_map: bool, can: Vec<String>) -> Self {
        Turn {
            number,
            player,
            on_map,
            moved: false,
            stopped: false,
            can,
            must: Vec::new(),
            lost_ticket: None,
        }
    }

    pub fn allow(&mut self, pattern: &str) -> bool {
        list_with(&mut self.can, pattern)
    }

    pub fn disallow(&mut self, pattern: &str) -> bool {
        list_without(&mut self.can, pattern)
    }

    /// Add an obligation. Duplicates are kept: two risks mean two obeys.
    pub fn require(&mut self, pattern: &CommandPattern) {
        self.must.push(pattern.to_string());
    }

    pub fn fulfil(&mut self, pattern: &str) -> bool {
        list_without(&mut self.must, pattern)
    }

    /// Turn-scoped state for display.
    pub fn view(&self) -> TurnState {
        TurnState {
            number: self.number,
            can: self.can.clone(),
            must: self.must.clone(),
            custom: TurnCustom {
                on_map: self.on_map,
                stopped: self.stopped,
            },
        }
    }
}

/// One line of news produced while handling a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub who: String,
    pub what: String,
    /// Dot the player stood on when it happened.
    #[serde(rename = "where")]
    pub place: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnCustom {
    pub on_map: bool,
    pub stopped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub number: u64,
    pub can: Vec<String>,
    pub must: Vec<String>,
    pub custom: TurnCustom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_is_a_set_must_is_not() {
        let mut t = Turn::new(1, 0, false, vec!["dicemove".into()]);
        assert!(!t.allow("dicemove"));
        assert!(t.allow("stop"));
        t.require(&"takerisk".into());
        t.require(&"takerisk".into());
        assert_eq!(t.must.len(), 2);
        assert!(t.fulfil("takerisk"));
        assert_eq!(t.must, vec!["takerisk"]);
    }

    #[test]
    fn view_mirrors_flags() {
        let mut t = Turn::new(4, 1, true, vec![]);
        t.stopped = true;
        let v = t.view();
        assert_eq!(v.number, 4);
        assert!(v.custom.on_map);
        assert!(v.custom.stopped);
    }
}
