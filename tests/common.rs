#![allow(dead_code)]
//! Shared fixture world and play helpers for integration tests.

use std::sync::Arc;

use globetrot::engine::{Command, Game, GameData, PlayResult, World};
use serde_json::{json, Value};

/// A small two-city world.
///
/// Track: start, bank, luck, risk, customs, travel agent, casino, speeding
/// fine (which also sends you back to the bank).
/// Map: `lon` (London) - air - `par` (Paris), and a rail line
/// `lon` - `dov` (dangerous) - `cal` - `par`.
pub fn data() -> Value {
    json!({
        "settings": {
            "home": "london",
            "startMoney": 400,
            "souvenirPrice": 100,
            "goal": 1
        },
        "actions": {
            "dicemove": { "help": "roll the die and move" },
            "end": { "help": "end your turn" }
        },
        "squares": [
            { "type": "start", "name": "Start" },
            { "type": "bank", "name": "Bank", "options": ["can:changemoney:*:*:*"] },
            { "type": "luck", "name": "Lucky Dip", "options": ["must:takeluck"] },
            { "type": "risk", "name": "Hazard", "options": ["must:takerisk"] },
            { "type": "customs", "name": "Customs", "options": ["must:declare:*"] },
            { "type": "agent", "name": "Travel Agent", "options": ["can:buyticket:<lp>:*:*"] },
            { "type": "casino", "name": "Casino", "options": ["can:gamble:<lc>:*"] },
            { "type": "fine", "name": "Speeding", "options": ["auto:debt:speeding:*:10", "go:-bank"] }
        ],
        "currencies": {
            "st": { "name": "sterling", "rate": 100, "units": [1, 5, 10, 50] },
            "fr": { "name": "franc", "rate": 1000, "units": [10, 50, 100] },
            "dm": { "name": "mark", "rate": 50, "units": [1] }
        },
        "places": {
            "london": {
                "name": "London",
                "city": true,
                "currency": "st",
                "souvenir": "tea",
                "routes": { "paris:a": 100, "paris:r": 50 }
            },
            "paris": {
                "name": "Paris",
                "city": true,
                "currency": "fr",
                "souvenir": "beret",
                "routes": { "london:a": 100, "london:r": 50 }
            }
        },
        "dots": {
            "lon": { "place": "london", "links": ["a:par", "r:dov"] },
            "dov": { "danger": true, "links": ["r:cal"] },
            "cal": { "links": ["r:par"] },
            "par": { "place": "paris" }
        },
        "lucks": [
            { "name": "Free flight", "code": "freeticket:*:paris:a", "retain": true },
            { "name": "Windfall", "code": "getmoney:st:50" },
            { "name": "Tailwind", "code": "advance:2", "retain": true },
            { "name": "Refund", "code": "freeinsurance", "retain": true },
            { "name": "Shortcut", "code": "go:casino" },
            { "name": "Diplomatic bag", "code": "immunity", "retain": true },
            { "name": "Vaccination", "code": "inoculation", "retain": true },
            { "name": "Express", "code": "dest", "retain": true },
            { "name": "Charter", "code": "can:airlift:*" }
        ],
        "risks": [
            { "name": "Fog", "code": "a/fog" },
            { "name": "Strike", "code": "r/miss:1" },
            { "name": "Pickpocket", "code": "auto:debt:theft:*:20" },
            { "name": "Hijack", "code": "go:paris" },
            { "name": "Customs raid", "code": "customshalf" },
            { "name": "Fast train", "code": "r/dest" },
            { "name": "Landslide", "code": "r/start" },
            { "name": "Signal failure", "code": "r/startx" },
            { "name": "Mislaid ticket", "code": "loseticket" },
            { "name": "Epidemic", "code": "must:quarantine" },
            { "name": "Inspection", "code": "must:paycustoms" }
        ]
    })
}

pub fn world_from(value: Value) -> Result<World, globetrot::engine::DataError> {
    let data: GameData = serde_json::from_value(value).expect("fixture is valid json");
    World::from_data(data)
}

pub fn world() -> Arc<World> {
    Arc::new(world_from(data()).expect("fixture world"))
}

/// A started one-player game ("fogg") with cheats on and both piles in
/// table order.
pub fn solo() -> Game {
    let mut game = Game::new(world(), None).with_cheats(true);
    game.add_player("fogg", "red").unwrap();
    game.start().unwrap();
    stack(&game, vec![], vec![])
}

/// Cards `top` first, then every other card not held by anyone, in table
/// order.
fn pile(top: Vec<usize>, cards: usize, held: &[usize]) -> Vec<usize> {
    let rest: Vec<usize> = (0..cards)
        .filter(|c| !top.contains(c) && !held.contains(c))
        .collect();
    top.into_iter().chain(rest).collect()
}

/// The same game with chosen cards on top of the draw piles.
pub fn stack(game: &Game, lucks: Vec<usize>, risks: Vec<usize>) -> Game {
    let mut save = game.save();
    let held: Vec<usize> = save.players.iter().flat_map(|p| p.lucks.clone()).collect();
    save.lucks = pile(lucks, game.world().lucks.len(), &held);
    save.risks = pile(risks, game.world().risks.len(), &[]);
    let mut game = Game::restore(Arc::new(game.world().clone()), save).unwrap();
    game.reseed(42);
    game
}

pub fn play(game: &mut Game, player: &str, command: &str) -> PlayResult {
    match game.play(player, &Command::new(command)) {
        Ok(r) => r,
        Err(e) => panic!("{} failed: {}", command, e),
    }
}

pub fn cheat(game: &mut Game, player: &str, command: &str) -> PlayResult {
    match game.play(player, &Command::with_options("cheat", command)) {
        Ok(r) => r,
        Err(e) => panic!("cheat {} failed: {}", command, e),
    }
}

/// Error code of a play that must fail.
pub fn refused(game: &mut Game, player: &str, command: &str) -> &'static str {
    match game.play(player, &Command::new(command)) {
        Ok(_) => panic!("{} unexpectedly succeeded", command),
        Err(e) => e.code(),
    }
}

pub fn can(game: &Game) -> Vec<String> {
    game.turn().map(|t| t.can.clone()).unwrap_or_default()
}

pub fn must(game: &Game) -> Vec<String> {
    game.turn().map(|t| t.must.clone()).unwrap_or_default()
}

pub fn money(game: &Game, player: &str, currency: &str) -> i64 {
    game.player(player)
        .and_then(|p| p.money.get(currency).copied())
        .unwrap_or(0)
}

pub fn whats(result: &PlayResult) -> Vec<String> {
    result.news.iter().map(|c| c.what.clone()).collect()
}
