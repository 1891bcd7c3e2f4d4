//! The turn engine: one mutable game instance over a shared static world.
//!
//! Every public call either completes, including all nested effect
//! resolution, or fails with a [`PlayError`] before touching any state.
//! Callers must serialize calls per instance; the engine does no locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::command::{find_match, Command, CommandPattern, LOCAL_CURRENCY, LOCAL_PLACE};
use super::data::{Settings, World};
use super::deck::CardPile;
use super::effects::SquareOption;
use super::errors::PlayError;
use super::handlers;
use super::ledger::{self, Bank};
use super::player::{Player, Ticket};
use super::turn::{Change, Turn, TurnState};
use crate::logutil::escape_log;
use crate::validation;

/// A command handler. Receives the matched pattern and the command's
/// arguments (segments after the first).
pub type Handler = fn(&mut Game, &CommandPattern, &[String]) -> Result<Value, PlayError>;

/// Highest face of the die.
pub const DIE_SIDES: u32 = 5;

/// Deepest chain of square-to-square jumps resolved in one stop.
pub const MAX_EFFECT_DEPTH: usize = 8;

/// What a successful `play` hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayResult {
    pub response: Value,
    pub news: Vec<Change>,
    /// The turn as it stands after the command, possibly someone else's.
    pub turn: Option<TurnState>,
}

pub struct Game {
    pub(crate) world: Arc<World>,
    handlers: BTreeMap<&'static str, Handler>,
    pub(crate) settings: Settings,
    pub(crate) bank: Bank,
    pub(crate) players: Vec<Player>,
    pub(crate) luck_pile: CardPile,
    pub(crate) risk_pile: CardPile,
    pub(crate) turn_no: u64,
    pub(crate) turn: Option<Turn>,
    pub(crate) winner: Option<String>,
    rng: StdRng,
    news: Vec<Change>,
}

impl Game {
    /// Set up a fresh game. `goal` overrides the data file's souvenir goal.
    pub fn new(world: Arc<World>, goal: Option<usize>) -> Self {
        let handlers = handlers::table();

        for action in world.actions.keys() {
            if !handlers.contains_key(action.as_str()) {
                warn!("unmatched action: {}", action);
            }
        }

        let mut settings = world.settings.clone();
        if let Some(goal) = goal {
            settings.goal = goal;
        }

        let mut rng = StdRng::from_entropy();
        let luck_pile = CardPile::shuffled(world.lucks.len(), &mut rng);
        let risk_pile = CardPile::shuffled(world.risks.len(), &mut rng);
        let bank = Bank::new(&world);

        Game {
            world,
            handlers,
            settings,
            bank,
            players: Vec::new(),
            luck_pile,
            risk_pile,
            turn_no: 0,
            turn: None,
            winner: None,
            rng,
            news: Vec::new(),
        }
    }

    pub fn with_cheats(mut self, allow: bool) -> Self {
        self.settings.allow_cheats = allow;
        self
    }

    /// Replace the random source, for repeatable runs.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn turn(&self) -> Option<&Turn> {
        self.turn.as_ref()
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn luck_pile(&self) -> &CardPile {
        &self.luck_pile
    }

    pub fn risk_pile(&self) -> &CardPile {
        &self.risk_pile
    }

    /// Bank plus all players, per currency.
    pub fn money_supply(&self) -> BTreeMap<String, i64> {
        let mut total = self.bank.money.clone();
        for p in &self.players {
            for (c, n) in &p.money {
                *total.entry(c.clone()).or_insert(0) += n;
            }
        }
        total
    }

    // ========================================================================
    // Setup
    // ========================================================================

    pub fn add_player(&mut self, name: &str, colour: &str) -> Result<(), PlayError> {
        if self.turn.is_some() {
            return Err(PlayError::AlreadyStarted("cannot join a running game".into()));
        }

        validation::check_player_name(name)?;
        validation::check_colour(colour)?;

        for p in &self.players {
            if p.name == name {
                return Err(PlayError::Conflict("name conflict".into()));
            }
            if p.colour == colour {
                return Err(PlayError::Conflict("colour conflict".into()));
            }
        }

        let world = Arc::clone(&self.world);
        let home = world
            .places
            .get(&self.settings.home)
            .ok_or_else(|| PlayError::bad_request("no home place"))?;
        let currency = world
            .currency(&home.currency)
            .ok_or_else(|| PlayError::bad_request("no home currency"))?;
        let start_money = currency.to_local(self.settings.start_money);

        let mut player = Player::new(name, colour, &home.dot);
        ledger::transfer(&mut self.bank.money, &mut player.money, &home.currency, start_money);
        self.players.push(player);

        debug!("{} joins as {}", escape_log(name), colour);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), PlayError> {
        if self.turn.is_some() {
            return Err(PlayError::AlreadyStarted("game already started".into()));
        }
        if self.players.is_empty() {
            return Err(PlayError::NoPlayers("nobody has joined".into()));
        }

        self.players.shuffle(&mut self.rng);
        self.to_next_player();

        info!("game started with {} players", self.players.len());
        Ok(())
    }

    // ========================================================================
    // Play
    // ========================================================================

    pub fn play(&mut self, player: &str, command: &Command) -> Result<PlayResult, PlayError> {
        let Some(turn) = &self.turn else {
            return Err(PlayError::not_started());
        };
        if self.players[turn.player].name != player {
            return Err(PlayError::not_your_turn());
        }

        debug!(
            "{} plays {} {}",
            escape_log(player),
            escape_log(&command.command),
            escape_log(&command.options)
        );

        self.news.clear();
        let response = match self.dispatch(command) {
            Ok(v) => v,
            Err(e) => {
                self.news.clear();
                return Err(e);
            }
        };

        if let Some(t) = self.turn.as_mut() {
            if t.stopped && t.must.is_empty() {
                t.allow("end");
            }
        }

        Ok(PlayResult {
            response,
            news: std::mem::take(&mut self.news),
            turn: self.turn.as_ref().map(Turn::view),
        })
    }

    fn dispatch(&mut self, command: &Command) -> Result<Value, PlayError> {
        let first = command.first();

        if first == "cheat" {
            if !self.settings.allow_cheats {
                return Err(PlayError::bad_request("cheating is not allowed"));
            }
            let cmd = CommandPattern::new(command.options.as_str());
            return self.auto_command(&cmd);
        }

        let Some(handler) = self.handlers.get(first).copied() else {
            return Err(PlayError::bad_request(format!("bad command: {}", command.command)));
        };

        let t = self.turn_ref();
        let found = find_match(&t.can, &command.command)
            .or_else(|| find_match(&t.must, &command.command));
        let Some((pattern, parts)) = found else {
            return Err(PlayError::not_now(format!("cannot {} now", first)));
        };

        handler(self, &pattern, &parts[1..])
    }

    /// Run a complete pattern as a command, bypassing Can/Must.
    pub(crate) fn auto_command(&mut self, cmd: &CommandPattern) -> Result<Value, PlayError> {
        let Some(handler) = self.handlers.get(cmd.first()).copied() else {
            return Err(PlayError::bad_request(format!("bad command: {}", cmd)));
        };
        let parts = cmd.parts();
        handler(self, cmd, &parts[1..])
    }

    /// Automatic commands are not user requests, so failures are only logged.
    pub(crate) fn run_auto(&mut self, cmd: &CommandPattern) {
        if let Err(e) = self.auto_command(cmd) {
            error!("auto command {} failed: {}", escape_log(cmd.as_str()), e);
        }
    }

    // ========================================================================
    // Turn helpers
    // ========================================================================

    pub(crate) fn turn_ref(&self) -> &Turn {
        self.turn.as_ref().expect("no active turn")
    }

    pub(crate) fn turn_mut(&mut self) -> &mut Turn {
        self.turn.as_mut().expect("no active turn")
    }

    pub(crate) fn current(&self) -> &Player {
        &self.players[self.turn_ref().player]
    }

    pub(crate) fn current_mut(&mut self) -> &mut Player {
        let idx = self.turn_ref().player;
        &mut self.players[idx]
    }

    pub(crate) fn event(&mut self, what: impl Into<String>) {
        let p = self.current();
        let change = Change {
            who: p.name.clone(),
            what: what.into(),
            place: p.dot.clone(),
        };
        self.news.push(change);
    }

    pub(crate) fn roll_dice(&mut self) -> u32 {
        self.rng.gen_range(1..=DIE_SIDES)
    }

    /// Bank pays the current player.
    pub(crate) fn credit(&mut self, currency: &str, amount: i64) {
        let idx = self.turn_ref().player;
        ledger::transfer(&mut self.bank.money, &mut self.players[idx].money, currency, amount);
    }

    /// Current player pays the bank.
    pub(crate) fn debit(&mut self, currency: &str, amount: i64) {
        let idx = self.turn_ref().player;
        ledger::transfer(&mut self.players[idx].money, &mut self.bank.money, currency, amount);
    }

    /// The place the current player is in, if standing on one.
    pub(crate) fn current_place(&self) -> Option<String> {
        self.world.place_at(&self.current().dot).map(str::to_string)
    }

    /// Resolve `<lp>` and `<lc>` for the current player. Travellers between
    /// places count as being in their ticket's origin.
    pub(crate) fn localize(&self, pattern: &CommandPattern) -> CommandPattern {
        let p = self.current();
        let place = self
            .world
            .place_at(&p.dot)
            .or_else(|| p.ticket.as_ref().map(|t| t.from.as_str()));

        let Some((id, place)) = place.and_then(|id| self.world.places.get_key_value(id)) else {
            return pattern.clone();
        };
        pattern.sub(&[(LOCAL_PLACE, id.as_str()), (LOCAL_CURRENCY, place.currency.as_str())])
    }

    pub(crate) fn pass_go(&mut self) {
        let currency = self.settings.go_currency.clone();
        let bonus = self.settings.go_bonus;
        self.credit(&currency, bonus);
        self.event("passes go");
    }

    // ========================================================================
    // Track movement
    // ========================================================================

    pub(crate) fn move_on_track(&mut self, n: usize) {
        self.turn_mut().moved = true;

        let len = self.world.squares.len();
        let from = self.current().square;
        for _ in 0..(from + n) / len {
            self.pass_go();
        }
        let to = (from + n) % len;
        self.current_mut().square = to;

        let name = self.world.squares[to].name.clone();
        self.event(format!("walks {} squares to {}", n, name));
    }

    /// Stop on the current square and apply its options.
    pub(crate) fn stop_on_track(&mut self, depth: usize) {
        self.turn_mut().stopped = true;

        let world = Arc::clone(&self.world);
        let square = &world.squares[self.current().square];
        self.event(format!("goes into {}", square.name));

        for option in square.options() {
            match option {
                SquareOption::Auto(cmd) => {
                    let cmd = self.localize(&cmd);
                    self.run_auto(&cmd);
                }
                SquareOption::Can(cmd) => {
                    let cmd = self.localize(&cmd);
                    self.turn_mut().allow(cmd.as_str());
                }
                SquareOption::Must(cmd) => {
                    let cmd = self.localize(&cmd);
                    self.turn_mut().require(&cmd);
                }
                SquareOption::Go { dest, forwards } => {
                    if depth >= MAX_EFFECT_DEPTH {
                        error!("square jumps nested too deep at {}", square.name);
                        continue;
                    }
                    self.jump_on_track(&dest, forwards);
                    self.event(format!("jumps to {}", dest));
                    self.stop_on_track(depth + 1);
                }
                SquareOption::Miss(n) => {
                    self.current_mut().miss_turns += n;
                    self.event(format!("will miss {} turns", n));
                }
                SquareOption::Unrecognized(code) => {
                    warn!("ignoring square option {}", code);
                }
            }
        }
    }

    /// Move to the next square of type `kind`. Passing the start going
    /// forwards pays the bonus.
    pub(crate) fn jump_on_track(&mut self, kind: &str, forwards: bool) {
        let len = self.world.squares.len();
        let mut at = self.current().square;

        for _ in 0..len {
            if forwards {
                at = (at + 1) % len;
                if at == 0 {
                    self.pass_go();
                }
            } else {
                at = (at + len - 1) % len;
            }
            if self.world.squares[at].kind == kind {
                self.current_mut().square = at;
                return;
            }
        }
    }

    // ========================================================================
    // Map movement
    // ========================================================================

    pub(crate) fn move_on_map(&mut self, n: usize) {
        if self.move_along_route(n) {
            self.stop_on_map();
        }
    }

    /// Advance along the ticket's route. Returns whether the player arrived.
    fn move_along_route(&mut self, n: usize) -> bool {
        if n == 0 {
            return false;
        }

        let p = self.current();
        let ticket = p.ticket.as_ref().expect("moving on the map without a ticket");
        let to_go = ticket.remaining(&p.dot).to_vec();
        let need = to_go.len();

        if n > need {
            self.event(format!("tries to move {}, but overshoots", n));
            return false;
        }

        let target = to_go[n - 1].clone();
        if n == need {
            let p = self.current_mut();
            p.dot = target;
            p.ticket = None;
            let t = self.turn_mut();
            t.moved = true;
            t.on_map = false;
            self.event(format!("moves {} and arrives", n));
            return true;
        }

        self.turn_mut().moved = true;
        if !self.dot_is_free(&target) {
            self.event(format!("tries to move {}, but someone else is there", n));
            return false;
        }

        self.current_mut().dot = target;
        self.event(format!("moves {}", n));
        false
    }

    fn dot_is_free(&self, dot: &str) -> bool {
        self.players.iter().all(|p| p.dot != dot)
    }

    pub(crate) fn jump_on_map(&mut self, place: &str) {
        let Some(dot) = self.world.places.get(place).map(|p| p.dot.clone()) else {
            warn!("jump to unknown place {}", place);
            return;
        };
        self.current_mut().dot = dot;
        self.turn_mut().moved = true;
    }

    pub(crate) fn stop_on_map(&mut self) {
        self.turn_mut().stopped = true;
        self.event("stops moving");

        if !self.turn_ref().moved {
            return;
        }

        let t = self.turn_mut();
        t.disallow("dicemove");
        t.disallow("stop");

        let world = Arc::clone(&self.world);
        let dot = self.current().dot.clone();

        // danger applies only when you land on it
        if world.dots.get(&dot).map(|d| d.danger).unwrap_or(false) {
            self.turn_mut().require(&CommandPattern::new("takerisk"));
        }

        if self.current().ticket.is_some() {
            return;
        }

        // arrived in a place: new city, new souvenir, no more insurance
        let p = self.current_mut();
        p.has_bought = false;
        p.insurance = false;

        let at_home = world.place_at(&dot) == Some(self.settings.home.as_str());
        if at_home && self.current().souvenirs.len() >= self.settings.goal && self.winner.is_none() {
            let name = self.current().name.clone();
            info!("{} wins the game", escape_log(&name));
            self.winner = Some(name);
            self.event("wins the game!");
        }
    }

    pub(crate) fn make_ticket(&self, from: &str, to: &str, modes: &str) -> Result<Ticket, PlayError> {
        let (currency, fare) = self
            .world
            .price(from, to, modes)
            .ok_or_else(|| PlayError::bad_request(format!("no price {} {} {}", from, to, modes)))?;
        let route = self
            .world
            .find_route(from, to, modes)
            .ok_or_else(|| PlayError::bad_request(format!("no route {} {} {}", from, to, modes)))?;

        Ok(Ticket {
            mode: modes.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            route,
            fare,
            currency,
        })
    }

    /// Drop the current ticket. A ticket lost `badly` can be refunded by
    /// insurance later this turn.
    pub(crate) fn lose_ticket(&mut self, badly: bool) {
        let p = self.current_mut();
        let ticket = p.ticket.take();
        p.has_bought = false;
        p.insurance = false;

        let t = self.turn_mut();
        t.on_map = false;
        if badly {
            t.lost_ticket = ticket;
        }
    }

    // ========================================================================
    // Turn order
    // ========================================================================

    /// Hand the turn to the next player who is not missing turns.
    pub(crate) fn to_next_player(&mut self) {
        let count = self.players.len();
        let mut next = self.turn.as_ref().map(|t| t.player);

        loop {
            self.turn_no += 1;

            let idx = next.map(|i| (i + 1) % count).unwrap_or(0);
            next = Some(idx);

            let p = &mut self.players[idx];
            if p.miss_turns > 0 {
                p.miss_turns -= 1;
                continue;
            }

            let has_debt = !p.debts.is_empty();
            let on_map = p.ticket.is_some() && !has_debt;

            let mut can: Vec<String> = [
                "dicemove",
                "useluck:*",
                "pawnsouvenir:*",
                "sellsouvenir:*",
                "redeemsouvenir:*",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect();
            if has_debt {
                can.push("pay:*:*".into());
            }

            if !on_map && !p.has_bought {
                // a lost ticket can leave a player between places
                if let Some(place_id) = self.world.place_at(&p.dot) {
                    let sells = self
                        .world
                        .places
                        .get(place_id)
                        .map(|pl| pl.souvenir.is_some())
                        .unwrap_or(false);
                    if sells {
                        can.push(format!("buysouvenir:{}", place_id));
                    }
                }
            }

            self.turn = Some(Turn::new(self.turn_no, idx, on_map, can));
            return;
        }
    }

    /// Rebuild a game around restored state.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        world: Arc<World>,
        settings: Settings,
        bank: Bank,
        players: Vec<Player>,
        luck_pile: CardPile,
        risk_pile: CardPile,
        turn: Option<Turn>,
        winner: Option<String>,
    ) -> Self {
        let turn_no = turn.as_ref().map(|t| t.number).unwrap_or(0);
        Game {
            world,
            handlers: handlers::table(),
            settings,
            bank,
            players,
            luck_pile,
            risk_pile,
            turn_no,
            turn,
            winner,
            rng: StdRng::from_entropy(),
            news: Vec::new(),
        }
    }
}
