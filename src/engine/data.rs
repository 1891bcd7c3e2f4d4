//! Static world: the board, the map graph, currencies and card tables.
//!
//! The raw JSON document ([`GameData`]) is turned into a validated [`World`]
//! once at startup. A `World` is immutable afterwards and shared between game
//! instances behind an `Arc`.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use super::command::SEPARATOR;
use super::effects::{LuckEffect, RiskCode, RiskEffect, SquareOption};
use super::errors::DataError;

fn default_go_bonus() -> i64 {
    200
}

/// Things that control a game. Defaults come from the data file; some may
/// be overridden per game, and they are persisted with each game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub home: String,
    pub start_money: i64,
    pub souvenir_price: i64,
    pub goal: usize,
    #[serde(default = "default_go_bonus")]
    pub go_bonus: i64,
    /// Currency the pass-go bonus is paid in. Empty means the home currency.
    #[serde(default)]
    pub go_currency: String,
    /// Currency insurance refunds are paid in. Empty means the home currency.
    #[serde(default)]
    pub refund_currency: String,
    #[serde(default)]
    pub allow_cheats: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub help: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    /// Local units per 100 neutral units.
    pub rate: i64,
    /// Denominations, smallest first.
    pub units: Vec<i64>,
}

impl Currency {
    pub fn to_local(&self, neutral: i64) -> i64 {
        neutral * self.rate / 100
    }

    /// Local units needed to cover `neutral`, rounding up.
    pub fn to_local_ceil(&self, neutral: i64) -> i64 {
        (neutral * self.rate + 99) / 100
    }

    pub fn to_neutral(&self, amount: i64) -> i64 {
        amount * 100 / self.rate
    }

    pub fn smallest_unit(&self) -> i64 {
        self.units.first().copied().unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSquare {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl TrackSquare {
    pub fn options(&self) -> Vec<SquareOption> {
        self.options.iter().map(|o| SquareOption::parse(o)).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuckCard {
    pub name: String,
    pub code: String,
    /// Retained cards go into the player's hand instead of acting at once.
    #[serde(default)]
    pub retain: bool,
}

impl LuckCard {
    pub fn effect(&self) -> LuckEffect {
        LuckEffect::parse(&self.code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCard {
    pub name: String,
    pub code: String,
}

impl RiskCard {
    pub fn effect(&self) -> RiskCode {
        RiskCode::parse(&self.code)
    }
}

/// A place as written in the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldPlace {
    pub name: String,
    #[serde(default)]
    pub city: bool,
    pub currency: String,
    #[serde(default)]
    pub souvenir: String,
    /// Base fares keyed `"<dest>:<modes>"`, in neutral units.
    #[serde(default)]
    pub routes: BTreeMap<String, i64>,
}

/// A map dot as written in the data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldDot {
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub danger: bool,
    #[serde(default)]
    pub terminal: bool,
    /// Links of the form `"<modechar>:<dot>"`.
    #[serde(default)]
    pub links: Vec<String>,
}

/// The whole data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameData {
    pub settings: Settings,
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
    pub squares: Vec<TrackSquare>,
    pub currencies: BTreeMap<String, Currency>,
    pub places: BTreeMap<String, WorldPlace>,
    pub dots: BTreeMap<String, WorldDot>,
    #[serde(default)]
    pub lucks: Vec<LuckCard>,
    #[serde(default)]
    pub risks: Vec<RiskCard>,
}

impl GameData {
    pub fn from_json(text: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(text)?)
    }
}

// ============================================================================
// Validated world
// ============================================================================

/// A directed, mode-tagged edge of the map graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub mode: char,
    pub to: String,
}

impl Link {
    fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        let mode = chars.next()?;
        if chars.next()? != SEPARATOR {
            return None;
        }
        let to: String = chars.collect();
        if to.is_empty() {
            return None;
        }
        Some(Link { mode, to })
    }
}

#[derive(Debug, Clone)]
pub struct Dot {
    pub place: Option<String>,
    pub danger: bool,
    pub terminal: bool,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone)]
pub struct Place {
    pub name: String,
    pub city: bool,
    pub currency: String,
    pub souvenir: Option<String>,
    pub routes: BTreeMap<String, i64>,
    /// The dot this place sits on.
    pub dot: String,
}

#[derive(Debug, Clone)]
pub struct World {
    pub settings: Settings,
    pub actions: BTreeMap<String, Action>,
    pub squares: Vec<TrackSquare>,
    pub currencies: BTreeMap<String, Currency>,
    pub places: BTreeMap<String, Place>,
    pub dots: BTreeMap<String, Dot>,
    pub lucks: Vec<LuckCard>,
    pub risks: Vec<RiskCard>,
}

impl World {
    /// Read and validate a world from a JSON data file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_data(GameData::from_json(&text)?)
    }

    pub fn from_data(data: GameData) -> Result<Self, DataError> {
        let GameData {
            mut settings,
            actions,
            squares,
            currencies,
            places: raw_places,
            dots: raw_dots,
            lucks,
            risks,
        } = data;

        for (id, currency) in &currencies {
            if currency.rate <= 0 || currency.units.is_empty() || currency.smallest_unit() <= 0 {
                return Err(DataError::BadCurrency(id.clone()));
            }
        }

        for (id, place) in &raw_places {
            if !currencies.contains_key(&place.currency) {
                return Err(DataError::UnknownCurrency {
                    place: id.clone(),
                    currency: place.currency.clone(),
                });
            }
        }

        let mut dots = BTreeMap::new();
        for (id, raw) in &raw_dots {
            let mut links = Vec::with_capacity(raw.links.len());
            for l in &raw.links {
                let link = Link::parse(l).filter(|link| raw_dots.contains_key(&link.to));
                let Some(link) = link else {
                    return Err(DataError::DanglingLink {
                        dot: id.clone(),
                        link: l.clone(),
                    });
                };
                links.push(link);
            }

            let place = if raw.place.is_empty() {
                None
            } else if raw_places.contains_key(&raw.place) {
                Some(raw.place.clone())
            } else {
                return Err(DataError::UnknownPlace {
                    dot: id.clone(),
                    place: raw.place.clone(),
                });
            };

            dots.insert(
                id.clone(),
                Dot {
                    place,
                    danger: raw.danger,
                    terminal: raw.terminal,
                    links,
                },
            );
        }

        // every link goes both ways; reverse links are appended in dot order
        let mut reverse = Vec::new();
        for (id, dot) in &dots {
            for link in &dot.links {
                reverse.push((
                    link.to.clone(),
                    Link {
                        mode: link.mode,
                        to: id.clone(),
                    },
                ));
            }
        }
        for (target, link) in reverse {
            if let Some(dot) = dots.get_mut(&target) {
                if !dot.links.contains(&link) {
                    dot.links.push(link);
                }
            }
        }

        let mut places = BTreeMap::new();
        for (id, raw) in raw_places {
            let dot_id = dots
                .iter()
                .find(|(_, d)| d.place.as_deref() == Some(id.as_str()))
                .map(|(dot_id, _)| dot_id.clone())
                .ok_or_else(|| DataError::PlaceWithoutDot(id.clone()))?;

            if raw.city {
                // cities are terminal
                if let Some(dot) = dots.get_mut(&dot_id) {
                    dot.terminal = true;
                }
            }

            places.insert(
                id,
                Place {
                    name: raw.name,
                    city: raw.city,
                    currency: raw.currency,
                    souvenir: Some(raw.souvenir).filter(|s| !s.is_empty()),
                    routes: raw.routes,
                    dot: dot_id,
                },
            );
        }

        let home_currency = match places.get(&settings.home) {
            Some(home) => home.currency.clone(),
            None => return Err(DataError::UnknownHome(settings.home.clone())),
        };
        for slot in [&mut settings.go_currency, &mut settings.refund_currency] {
            if slot.is_empty() {
                *slot = home_currency.clone();
            } else if !currencies.contains_key(slot.as_str()) {
                return Err(DataError::UnknownCurrency {
                    place: settings.home.clone(),
                    currency: slot.clone(),
                });
            }
        }

        if squares.is_empty() {
            return Err(DataError::NoSquares);
        }

        let world = World {
            settings,
            actions,
            squares,
            currencies,
            places,
            dots,
            lucks,
            risks,
        };
        world.check_codes()?;

        Ok(world)
    }

    fn has_square_type(&self, kind: &str) -> bool {
        self.squares.iter().any(|s| s.kind == kind)
    }

    /// Strictly parse every effect code. Unknown keywords only warn.
    fn check_codes(&self) -> Result<(), DataError> {
        let malformed = |kind: &'static str, code: &str, reason: String| DataError::MalformedCode {
            kind,
            code: code.to_string(),
            reason,
        };

        for square in &self.squares {
            for code in &square.options {
                let option =
                    SquareOption::parse_strict(code).map_err(|r| malformed("square", code, r))?;
                match option {
                    SquareOption::Go { dest, .. } if !self.has_square_type(&dest) => {
                        return Err(DataError::UnknownSquareType(dest));
                    }
                    SquareOption::Unrecognized(c) => warn!("unparsed square option: {}", c),
                    _ => {}
                }
            }
        }

        for card in &self.lucks {
            let effect =
                LuckEffect::parse_strict(&card.code).map_err(|r| malformed("luck", &card.code, r))?;
            match effect {
                LuckEffect::Go(dest) if !self.has_square_type(&dest) => {
                    return Err(DataError::UnknownSquareType(dest));
                }
                LuckEffect::GetMoney { currency, .. } if !self.currencies.contains_key(&currency) => {
                    return Err(malformed("luck", &card.code, format!("unknown currency {}", currency)));
                }
                LuckEffect::Unrecognized(c) => warn!("unparsed luck card: {}", c),
                _ => {}
            }
        }

        for card in &self.risks {
            let risk =
                RiskCode::parse_strict(&card.code).map_err(|r| malformed("risk", &card.code, r))?;
            match risk.effect {
                RiskEffect::Go(place) if !self.places.contains_key(&place) => {
                    return Err(malformed("risk", &card.code, format!("unknown place {}", place)));
                }
                RiskEffect::Unrecognized(c) => warn!("unparsed risk card: {}", c),
                _ => {}
            }
        }

        Ok(())
    }

    pub fn currency(&self, id: &str) -> Option<&Currency> {
        self.currencies.get(id)
    }

    /// Place id at a dot, if the dot is a place.
    pub fn place_at(&self, dot: &str) -> Option<&str> {
        self.dots.get(dot).and_then(|d| d.place.as_deref())
    }

    /// Fare for a route, converted into the origin's currency.
    pub fn price(&self, from: &str, to: &str, modes: &str) -> Option<(String, i64)> {
        let place = self.places.get(from)?;
        let base = place
            .routes
            .get(&format!("{}{}{}", to, SEPARATOR, modes))?;
        let currency = self.currencies.get(&place.currency)?;
        Some((place.currency.clone(), currency.to_local(*base)))
    }
}
