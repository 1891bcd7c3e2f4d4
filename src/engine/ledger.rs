//! Money and souvenir bookkeeping between the bank and the players.
//!
//! Every movement of money is a [`transfer`] between two purses, so the sum of
//! the bank and all players for any currency never changes. Balance checks
//! belong to the callers: the ledger itself happily goes negative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::data::{Currency, World};
use super::errors::PlayError;

/// Balances keyed by currency id.
pub type Purse = BTreeMap<String, i64>;

/// Souvenirs issued per place when a game is set up.
pub const SOUVENIR_STOCK: i64 = 2;

/// Neutral units of cash each currency's reserve starts with.
pub const BANK_RESERVE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub money: Purse,
    /// Souvenir stock keyed by place id.
    pub souvenirs: BTreeMap<String, i64>,
}

impl Bank {
    pub fn new(world: &World) -> Self {
        let money = world
            .currencies
            .iter()
            .map(|(id, c)| (id.clone(), BANK_RESERVE * c.rate))
            .collect();

        let souvenirs = world
            .places
            .iter()
            .filter(|(_, p)| p.souvenir.is_some())
            .map(|(id, _)| (id.clone(), SOUVENIR_STOCK))
            .collect();

        Bank { money, souvenirs }
    }

    pub fn stock(&self, place: &str) -> i64 {
        self.souvenirs.get(place).copied().unwrap_or(0)
    }

    pub fn take_souvenir(&mut self, place: &str) {
        *self.souvenirs.entry(place.to_string()).or_insert(0) -= 1;
    }

    pub fn return_souvenir(&mut self, place: &str) {
        *self.souvenirs.entry(place.to_string()).or_insert(0) += 1;
    }
}

/// Move `amount` of `currency` from one purse to another, unconditionally.
pub fn transfer(from: &mut Purse, to: &mut Purse, currency: &str, amount: i64) {
    *from.entry(currency.to_string()).or_insert(0) -= amount;
    *to.entry(currency.to_string()).or_insert(0) += amount;
}

pub fn balance(purse: &Purse, currency: &str) -> i64 {
    purse.get(currency).copied().unwrap_or(0)
}

/// Convert between two currencies by their rates.
pub fn convert(amount: i64, from: &Currency, to: &Currency) -> i64 {
    amount * to.rate / from.rate
}

/// Parse a positive integer amount from a command segment.
pub fn parse_amount(raw: &str) -> Result<i64, PlayError> {
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PlayError::bad_request(format!("bad amount: {}", raw))),
    }
}

/// Amounts handed over in cash must be whole multiples of the smallest note.
pub fn check_denomination(currency: &Currency, amount: i64) -> Result<(), PlayError> {
    let unit = currency.smallest_unit();
    if amount % unit != 0 {
        return Err(PlayError::bad_request(format!(
            "{} must be in unit of {}",
            currency.name, unit
        )));
    }
    Ok(())
}
