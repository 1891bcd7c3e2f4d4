use serde::{Deserialize, Serialize};

use super::ledger::Purse;

/// Currency of a debt that may be paid in any currency.
pub const ANY_CURRENCY: &str = "*";

/// A paid reservation to travel a route by some modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub mode: String,
    /// Origin place id.
    pub from: String,
    /// Destination place id.
    pub to: String,
    /// Dots of the route, origin first.
    pub route: Vec<String>,
    pub fare: i64,
    pub currency: String,
}

impl Ticket {
    /// Dots still to travel when standing on `at`.
    pub fn remaining(&self, at: &str) -> &[String] {
        match self.route.iter().position(|d| d == at) {
            Some(i) => &self.route[i + 1..],
            None => &self.route[..],
        }
    }
}

/// An amount owed to the bank, in neutral units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub reason: String,
    pub amount: i64,
    /// Currency the debt must be paid in, or `*`.
    pub currency: String,
}

impl Debt {
    pub fn payable_in(&self, currency: &str) -> bool {
        self.currency == ANY_CURRENCY || self.currency == currency
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub colour: String,
    pub money: Purse,
    #[serde(default)]
    pub souvenirs: Vec<String>,
    #[serde(default)]
    pub ticket: Option<Ticket>,
    /// Retained luck card indices.
    #[serde(default)]
    pub lucks: Vec<usize>,
    #[serde(default)]
    pub insurance: bool,
    #[serde(default)]
    pub miss_turns: u32,
    /// Track square index; only meaningful when not on the map.
    #[serde(default)]
    pub square: usize,
    /// Map dot the player stands on.
    pub dot: String,
    #[serde(default)]
    pub has_bought: bool,
    #[serde(default)]
    pub debts: Vec<Debt>,
}

impl Player {
    pub fn new(name: &str, colour: &str, dot: &str) -> Self {
        Player {
            name: name.to_string(),
            colour: colour.to_string(),
            money: Purse::new(),
            souvenirs: Vec::new(),
            ticket: None,
            lucks: Vec::new(),
            insurance: false,
            miss_turns: 0,
            square: 0,
            dot: dot.to_string(),
            has_bought: false,
            debts: Vec::new(),
        }
    }

    pub fn has_souvenir(&self, place: &str) -> bool {
        self.souvenirs.iter().any(|s| s == place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_route_from_current_dot() {
        let t = Ticket {
            mode: "r".into(),
            from: "paris".into(),
            to: "rome".into(),
            route: vec!["d1".into(), "d2".into(), "d3".into()],
            fare: 0,
            currency: "fr".into(),
        };
        assert_eq!(t.remaining("d1").to_vec(), vec!["d2", "d3"]);
        assert_eq!(t.remaining("d3").len(), 0);
        assert_eq!(t.remaining("elsewhere").len(), 3);
    }

    #[test]
    fn wildcard_debt_takes_any_currency() {
        let d = Debt {
            reason: "customs".into(),
            amount: 100,
            currency: ANY_CURRENCY.into(),
        };
        assert!(d.payable_in("st"));
        let d = Debt {
            currency: "fr".into(),
            ..d
        };
        assert!(!d.payable_in("st"));
    }
}
