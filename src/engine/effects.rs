//! Effect codes carried by track squares, luck cards and risk cards.
//!
//! Codes are short colon-separated strings authored in the world data, e.g.
//! `can:buyticket:<lp>:*:r`, `go:-bank`, `freeticket:*:london:a`, or
//! `sa/miss:2`. Each family decodes into a closed enum with an explicit
//! `Unrecognized` variant so unknown keywords survive as raw text.
//!
//! Two parsing entry points exist per family:
//! - `parse_strict` rejects malformed arguments of a known keyword and is used
//!   while building the world, where bad data must abort construction;
//! - `parse` is total and used at runtime, falling back to `Unrecognized`.

use super::command::{CommandPattern, SEPARATOR, WILDCARD};
use super::errors::PlayError;

/// Splits `keyword:rest`, `rest` being everything after the first separator.
fn split_code(code: &str) -> (&str, Option<&str>) {
    match code.split_once(SEPARATOR) {
        Some((k, rest)) => (k, Some(rest)),
        None => (code, None),
    }
}

fn required<'a>(keyword: &str, rest: Option<&'a str>) -> Result<&'a str, String> {
    match rest {
        Some(r) if !r.is_empty() => Ok(r),
        _ => Err(format!("{} needs an argument", keyword)),
    }
}

fn count(keyword: &str, rest: Option<&str>) -> Result<u32, String> {
    let raw = required(keyword, rest)?;
    raw.parse::<u32>()
        .map_err(|_| format!("{} needs a count, got {:?}", keyword, raw))
}

// ============================================================================
// Track squares
// ============================================================================

/// One option on a track square, applied when a player stops there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareOption {
    /// Run a command straight away (tolls, fines).
    Auto(CommandPattern),
    /// Offer a command.
    Can(CommandPattern),
    /// Require a command before the turn can end.
    Must(CommandPattern),
    /// Jump to the next square of a type, forwards or backwards.
    Go { dest: String, forwards: bool },
    /// Miss this many turns.
    Miss(u32),
    Unrecognized(String),
}

impl SquareOption {
    pub fn parse_strict(code: &str) -> Result<Self, String> {
        let (keyword, rest) = split_code(code);
        let option = match keyword {
            "auto" => SquareOption::Auto(required(keyword, rest)?.into()),
            "can" => SquareOption::Can(required(keyword, rest)?.into()),
            "must" => SquareOption::Must(required(keyword, rest)?.into()),
            "go" => {
                let dest = required(keyword, rest)?;
                match dest.strip_prefix('-') {
                    Some("") => return Err("go needs a square type".to_string()),
                    Some(back) => SquareOption::Go {
                        dest: back.to_string(),
                        forwards: false,
                    },
                    None => SquareOption::Go {
                        dest: dest.to_string(),
                        forwards: true,
                    },
                }
            }
            "miss" => SquareOption::Miss(count(keyword, rest)?),
            _ => SquareOption::Unrecognized(code.to_string()),
        };
        Ok(option)
    }

    pub fn parse(code: &str) -> Self {
        Self::parse_strict(code).unwrap_or_else(|_| SquareOption::Unrecognized(code.to_string()))
    }
}

// ============================================================================
// Luck cards
// ============================================================================

/// Constraint on the ticket a free-ticket card may be claimed for.
/// Each field is a concrete value or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketGrant {
    pub from: String,
    pub to: String,
    pub modes: String,
}

impl TicketGrant {
    /// Check caller-supplied `from`, `to`, `modes` against the grant.
    pub fn claim(&self, args: &[String]) -> Result<(String, String, String), PlayError> {
        let [from, to, modes] = args else {
            return Err(PlayError::bad_request("free ticket needs from, to and modes"));
        };

        let fits = |want: &str, got: &str| want == WILDCARD || want == got;
        if !fits(&self.from, from) || !fits(&self.to, to) || !fits(&self.modes, modes) {
            return Err(PlayError::bad_request(format!(
                "card only allows {}:{}:{}",
                self.from, self.to, self.modes
            )));
        }

        Ok((from.clone(), to.clone(), modes.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LuckEffect {
    Advance(u32),
    Can(CommandPattern),
    Dest,
    FreeInsurance,
    FreeTicket(TicketGrant),
    GetMoney { currency: String, amount: i64 },
    Go(String),
    Immunity,
    Inoculation,
    Speculation,
    Unrecognized(String),
}

impl LuckEffect {
    pub fn parse_strict(code: &str) -> Result<Self, String> {
        let (keyword, rest) = split_code(code);
        let effect = match keyword {
            "advance" => LuckEffect::Advance(count(keyword, rest)?),
            "can" => LuckEffect::Can(required(keyword, rest)?.into()),
            "dest" => LuckEffect::Dest,
            "freeinsurance" => LuckEffect::FreeInsurance,
            "freeticket" => {
                let raw = required(keyword, rest)?;
                let parts: Vec<&str> = raw.split(SEPARATOR).collect();
                let [from, to, modes] = parts.as_slice() else {
                    return Err(format!("freeticket needs from:to:modes, got {:?}", raw));
                };
                LuckEffect::FreeTicket(TicketGrant {
                    from: from.to_string(),
                    to: to.to_string(),
                    modes: modes.to_string(),
                })
            }
            "getmoney" => {
                let raw = required(keyword, rest)?;
                let Some((currency, amount)) = raw.split_once(SEPARATOR) else {
                    return Err(format!("getmoney needs currency:amount, got {:?}", raw));
                };
                let amount = amount
                    .parse::<i64>()
                    .map_err(|_| format!("getmoney needs an amount, got {:?}", amount))?;
                LuckEffect::GetMoney {
                    currency: currency.to_string(),
                    amount,
                }
            }
            "go" => LuckEffect::Go(required(keyword, rest)?.to_string()),
            "immunity" => LuckEffect::Immunity,
            "inoculation" => LuckEffect::Inoculation,
            "speculation" => LuckEffect::Speculation,
            _ => LuckEffect::Unrecognized(code.to_string()),
        };
        Ok(effect)
    }

    pub fn parse(code: &str) -> Self {
        Self::parse_strict(code).unwrap_or_else(|_| LuckEffect::Unrecognized(code.to_string()))
    }
}

// ============================================================================
// Risk cards
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskEffect {
    Auto(CommandPattern),
    CustomsHalf,
    Dest,
    Fog,
    /// Relocate to a place, losing the ticket.
    Go(String),
    LoseTicket,
    Miss(u32),
    Must(CommandPattern),
    /// Back to the ticket's origin, optionally losing the ticket.
    GoStart { lose_ticket: bool },
    Unrecognized(String),
}

/// A decoded risk card: the transport modes it applies to plus its effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskCode {
    /// Mode characters, or `*` for every mode.
    pub modes: String,
    pub effect: RiskEffect,
}

impl RiskCode {
    pub fn parse_strict(code: &str) -> Result<Self, String> {
        let (modes, body) = match code.split_once('/') {
            Some((m, b)) => (m.to_string(), b),
            None => (WILDCARD.to_string(), code),
        };

        let (keyword, rest) = split_code(body);
        let effect = match keyword {
            "auto" => RiskEffect::Auto(required(keyword, rest)?.into()),
            "customshalf" => RiskEffect::CustomsHalf,
            "dest" => RiskEffect::Dest,
            "fog" => RiskEffect::Fog,
            "go" => RiskEffect::Go(required(keyword, rest)?.to_string()),
            "loseticket" => RiskEffect::LoseTicket,
            "miss" => RiskEffect::Miss(count(keyword, rest)?),
            "must" => RiskEffect::Must(required(keyword, rest)?.into()),
            "start" => RiskEffect::GoStart { lose_ticket: true },
            "startx" => RiskEffect::GoStart { lose_ticket: false },
            _ => RiskEffect::Unrecognized(body.to_string()),
        };

        Ok(RiskCode { modes, effect })
    }

    pub fn parse(code: &str) -> Self {
        Self::parse_strict(code).unwrap_or_else(|_| RiskCode {
            modes: WILDCARD.to_string(),
            effect: RiskEffect::Unrecognized(code.to_string()),
        })
    }

    /// Whether the card bites a player travelling with `ticket_modes`.
    /// A card restricted to some modes never bites a player without a ticket.
    pub fn applies_to(&self, ticket_modes: Option<&str>) -> bool {
        if self.modes == WILDCARD {
            return true;
        }
        match ticket_modes {
            Some(modes) => modes.chars().any(|m| self.modes.contains(m)),
            None => false,
        }
    }
}
