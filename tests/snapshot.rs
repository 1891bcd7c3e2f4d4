mod common;

use std::sync::Arc;

use common::*;
use globetrot::engine::{Game, SnapshotError};

fn mid_game() -> Game {
    let base = solo();
    let mut game = stack(&base, vec![0, 1, 2, 3, 4], vec![2, 0, 1, 3, 4]);
    play(&mut game, "fogg", "buysouvenir:london");
    cheat(&mut game, "fogg", "moven:2");
    play(&mut game, "fogg", "stop");
    play(&mut game, "fogg", "takeluck");
    play(&mut game, "fogg", "end");
    cheat(&mut game, "fogg", "moven:1");
    play(&mut game, "fogg", "stop");
    play(&mut game, "fogg", "takerisk");
    game
}

#[test]
fn round_trip_keeps_everything() {
    let game = mid_game();
    let text = game.to_json().unwrap();
    let restored = Game::from_json(world(), &text).unwrap();

    assert_eq!(restored.save(), game.save());
    assert_eq!(restored.state(), game.state());
    assert_eq!(restored.luck_pile().order(), game.luck_pile().order());
    assert_eq!(must(&restored), vec!["obeyrisk:2"]);
}

/// The command that settles an outstanding obligation.
fn settle(game: &Game, obligation: &str) -> String {
    match obligation {
        "declare:*" => match game.player("fogg").unwrap().souvenirs.first() {
            Some(place) => format!("declare:{}", place),
            None => "declare:none".to_string(),
        },
        other => other.to_string(),
    }
}

fn both(a: &mut Game, b: &mut Game, command: &str) {
    let left = play(a, "fogg", command);
    let right = play(b, "fogg", command);
    assert_eq!(left.response, right.response, "{}", command);
    assert_eq!(whats(&left), whats(&right), "{}", command);
    assert_eq!(a.save(), b.save(), "{}", command);
    assert_eq!(can(a), can(b), "{}", command);
    assert_eq!(must(a), must(b), "{}", command);
}

#[test]
fn restored_game_matches_the_original() {
    let mut game = mid_game();
    let mut restored = Game::from_json(world(), &game.to_json().unwrap()).unwrap();
    game.reseed(7);
    restored.reseed(7);

    both(&mut game, &mut restored, "obeyrisk:2");
    both(&mut game, &mut restored, "end");

    for _ in 0..8 {
        both(&mut game, &mut restored, "dicemove");
        both(&mut game, &mut restored, "stop");
        while let Some(next) = must(&game).first().cloned() {
            let command = settle(&game, &next);
            both(&mut game, &mut restored, &command);
        }
        if can(&game).iter().any(|c| c == "end") {
            both(&mut game, &mut restored, "end");
        }
    }

    assert_eq!(game.state(), restored.state());
    assert_eq!(game.luck_pile().order(), restored.luck_pile().order());
    assert_eq!(game.risk_pile().order(), restored.risk_pile().order());
}

#[test]
fn restored_game_plays_on() {
    let game = mid_game();
    let mut buf = Vec::new();
    game.write_to(&mut buf).unwrap();
    let mut restored = Game::read_from(world(), buf.as_slice()).unwrap();

    play(&mut restored, "fogg", "obeyrisk:2");
    assert_eq!(restored.player("fogg").unwrap().debts.len(), 1);
    let ended = play(&mut restored, "fogg", "end");
    assert_eq!(ended.turn.unwrap().number, 3);
}

#[test]
fn unstarted_games_round_trip() {
    let mut game = Game::new(world(), Some(3));
    game.add_player("fogg", "red").unwrap();
    let restored = Game::from_json(world(), &game.to_json().unwrap()).unwrap();

    assert!(restored.turn().is_none());
    assert_eq!(restored.settings().goal, 3);
    assert_eq!(restored.players().len(), 1);
    assert_eq!(restored.save(), game.save());
}

#[test]
fn snapshot_uses_the_documented_shape() {
    let game = mid_game();
    let doc: serde_json::Value = serde_json::from_str(&game.to_json().unwrap()).unwrap();

    assert_eq!(doc["settings"]["home"], "london");
    assert_eq!(doc["settings"]["startMoney"], 400);
    assert_eq!(doc["players"][0]["name"], "fogg");
    assert_eq!(doc["players"][0]["missTurns"], 0);
    assert_eq!(doc["turn"]["player"], 0);
    assert_eq!(doc["turn"]["must"][0], "obeyrisk:2");
    assert!(doc["lucks"].is_array());
    assert!(doc["risks"].is_array());
    assert!(doc["bank"]["money"]["st"].is_i64());
}

#[test]
fn corrupt_documents_are_rejected() {
    let game = mid_game();
    let shared = world();

    let mut bad = game.save();
    bad.turn.as_mut().unwrap().player = 4;
    assert!(matches!(
        Game::restore(Arc::clone(&shared), bad),
        Err(SnapshotError::Corrupt(_))
    ));

    let mut bad = game.save();
    bad.risks.push(0);
    assert!(matches!(
        Game::restore(Arc::clone(&shared), bad),
        Err(SnapshotError::Corrupt(_))
    ));

    // the held luck card must not also be in the pile
    let mut bad = game.save();
    bad.lucks.push(0);
    assert!(matches!(
        Game::restore(Arc::clone(&shared), bad),
        Err(SnapshotError::Corrupt(_))
    ));

    let mut bad = game.save();
    bad.players[0].dot = "atlantis".to_string();
    assert!(matches!(
        Game::restore(Arc::clone(&shared), bad),
        Err(SnapshotError::Corrupt(_))
    ));

    assert!(matches!(
        Game::from_json(shared, "{\"settings\": 1}"),
        Err(SnapshotError::Json(_))
    ));
}
