mod common;

use common::*;
use globetrot::engine::{Command, Game, Status};

#[test]
fn setup_errors() {
    let mut game = Game::new(world(), None);

    assert_eq!(refused(&mut game, "fogg", "dicemove"), "NOTSTARTED");
    assert_eq!(game.start().unwrap_err().code(), "NOPLAYERS");

    game.add_player("fogg", "red").unwrap();
    assert_eq!(game.add_player("fogg", "blue").unwrap_err().code(), "CONFLICT");
    assert_eq!(game.add_player("passepartout", "red").unwrap_err().code(), "CONFLICT");
    assert_eq!(game.add_player("passepartout", "mauve").unwrap_err().code(), "BADREQUEST");
    assert_eq!(game.add_player("", "blue").unwrap_err().code(), "BADREQUEST");
    game.add_player("passepartout", "blue").unwrap();
    assert_eq!(game.players().len(), 2);

    game.start().unwrap();
    assert_eq!(game.start().unwrap_err().code(), "ALREADYSTARTED");
    assert_eq!(game.add_player("aouda", "green").unwrap_err().code(), "ALREADYSTARTED");
}

#[test]
fn only_the_turn_owner_plays() {
    let mut game = Game::new(world(), None);
    game.add_player("fogg", "red").unwrap();
    game.add_player("passepartout", "blue").unwrap();
    game.start().unwrap();

    let state = game.state();
    assert_eq!(state.status, Status::InProgress);
    assert_eq!(state.turn_number, Some(1));
    let playing = state.playing.unwrap();
    let other = if playing == "fogg" { "passepartout" } else { "fogg" };

    assert_eq!(refused(&mut game, other, "dicemove"), "NOTYOURTURN");
    assert_eq!(refused(&mut game, &playing, "fly"), "BADREQUEST");
    assert_eq!(refused(&mut game, &playing, "takeluck"), "NOTNOW");
    assert_eq!(refused(&mut game, &playing, "end"), "NOTNOW");
}

#[test]
fn start_money_comes_from_the_bank() {
    let mut game = Game::new(world(), None);
    let before = game.money_supply();
    game.add_player("fogg", "red").unwrap();
    game.add_player("passepartout", "blue").unwrap();

    assert_eq!(money(&game, "fogg", "st"), 400);
    assert_eq!(money(&game, "passepartout", "st"), 400);
    assert_eq!(game.bank().money["st"], 10_000 - 800);
    assert_eq!(game.money_supply(), before);
}

#[test]
fn opening_turn_permissions() {
    let game = solo();
    let can = can(&game);
    assert!(can.contains(&"dicemove".to_string()));
    assert!(can.contains(&"useluck:*".to_string()));
    assert!(can.contains(&"buysouvenir:london".to_string()));
    assert!(!can.contains(&"end".to_string()));
    assert!(must(&game).is_empty());
}

#[test]
fn dice_move_then_stop() {
    let mut game = solo();

    let rolled = play(&mut game, "fogg", "dicemove");
    let roll = rolled.response.as_u64().unwrap() as usize;
    assert!((1..=5).contains(&roll));
    assert_eq!(game.player("fogg").unwrap().square, roll);
    assert!(can(&game).contains(&"stop".to_string()));
    assert!(!can(&game).contains(&"dicemove".to_string()));
    assert_eq!(refused(&mut game, "fogg", "dicemove"), "NOTNOW");

    let stopped = play(&mut game, "fogg", "stop");
    let turn = stopped.turn.unwrap();
    assert!(turn.custom.stopped);
    assert!(!turn.can.contains(&"stop".to_string()));
    // end is offered exactly when nothing is owed
    assert_eq!(turn.can.contains(&"end".to_string()), turn.must.is_empty());
}

#[test]
fn end_is_gated_on_stopping_and_obligations() {
    let mut game = solo();

    let early = game.play("fogg", &Command::with_options("cheat", "end"));
    assert_eq!(early.unwrap_err().code(), "WRONGPHASE");

    cheat(&mut game, "fogg", "moven:2");
    play(&mut game, "fogg", "stop");
    assert_eq!(must(&game), vec!["takeluck"]);
    assert!(!can(&game).contains(&"end".to_string()));

    let blocked = game.play("fogg", &Command::with_options("cheat", "end"));
    assert_eq!(blocked.unwrap_err().code(), "MUSTDO");
    assert_eq!(refused(&mut game, "fogg", "end"), "NOTNOW");

    play(&mut game, "fogg", "takeluck");
    assert!(can(&game).contains(&"end".to_string()));
    let ended = play(&mut game, "fogg", "end");
    assert_eq!(ended.turn.as_ref().unwrap().number, 2);
    assert!(whats(&ended).contains(&"goes to sleep".to_string()));
}

#[test]
fn cheats_are_refused_unless_enabled() {
    let mut game = Game::new(world(), None);
    game.add_player("fogg", "red").unwrap();
    game.start().unwrap();

    let err = game
        .play("fogg", &Command::with_options("cheat", "moven:3"))
        .unwrap_err();
    assert_eq!(err.code(), "BADREQUEST");
    assert_eq!(game.player("fogg").unwrap().square, 0);

    // moven is never granted by a turn
    assert_eq!(refused(&mut game, "fogg", "moven:3"), "NOTNOW");
}

#[test]
fn missed_turns_are_skipped_and_still_counted() {
    let mut game = Game::new(world(), None).with_cheats(true);
    game.add_player("fogg", "red").unwrap();
    game.add_player("passepartout", "blue").unwrap();
    game.start().unwrap();

    let first = game.state().playing.unwrap();
    let second = if first == "fogg" { "passepartout" } else { "fogg" }.to_string();

    // the strike card makes its victim miss one turn
    cheat(&mut game, &first, "obeyrisk:1");
    assert_eq!(game.player(&first).unwrap().miss_turns, 1);
    cheat(&mut game, &first, "moven:1");
    play(&mut game, &first, "stop");
    play(&mut game, &first, "end");

    assert_eq!(game.state().playing.as_deref(), Some(second.as_str()));
    cheat(&mut game, &second, "moven:1");
    play(&mut game, &second, "stop");
    let ended = play(&mut game, &second, "end");

    // turn 3 belonged to the skipped player
    assert_eq!(ended.turn.unwrap().number, 4);
    assert_eq!(game.state().playing.as_deref(), Some(second.as_str()));
    assert_eq!(game.player(&first).unwrap().miss_turns, 0);
}

#[test]
fn failed_calls_change_nothing() {
    let mut game = solo();
    cheat(&mut game, "fogg", "moven:1");
    play(&mut game, "fogg", "stop");
    let before = game.save();

    for bad in [
        "changemoney:st:fr:1000",
        "changemoney:xx:fr:10",
        "changemoney:st:fr:0",
        "changemoney:fr:st:15",
        "buysouvenir:paris",
        "useluck:0",
        "obeyrisk:0",
    ] {
        assert!(game.play("fogg", &Command::new(bad)).is_err(), "{}", bad);
        assert_eq!(game.save(), before, "{} changed the game", bad);
    }
}

#[test]
fn a_full_trip_wins_the_game() {
    let mut game = solo();
    let supply = game.money_supply();

    // a souvenir from home counts
    let bought = play(&mut game, "fogg", "buysouvenir:london");
    assert_eq!(bought.response, "tea");
    assert_eq!(money(&game, "fogg", "st"), 300);
    assert_eq!(game.bank().stock("london"), 1);

    cheat(&mut game, "fogg", "moven:5");
    play(&mut game, "fogg", "stop");
    assert!(can(&game).contains(&"buyticket:london:*:*".to_string()));
    play(&mut game, "fogg", "buyticket:london:paris:a");
    assert_eq!(money(&game, "fogg", "st"), 200);
    assert_eq!(refused(&mut game, "fogg", "buyticket:london:paris:a"), "NOTNOW");
    play(&mut game, "fogg", "end");

    assert!(game.turn().unwrap().on_map);
    let arrived = cheat(&mut game, "fogg", "moven:1");
    assert_eq!(game.player("fogg").unwrap().dot, "par");
    assert!(game.player("fogg").unwrap().ticket.is_none());
    assert!(arrived.turn.unwrap().custom.stopped);
    play(&mut game, "fogg", "end");

    assert!(can(&game).contains(&"buysouvenir:paris".to_string()));
    cheat(&mut game, "fogg", "getmoney:fr:100");
    assert_eq!(money(&game, "fogg", "fr"), 1000);

    // once round the track, collecting the bonus
    let lap = cheat(&mut game, "fogg", "moven:8");
    assert!(whats(&lap).contains(&"passes go".to_string()));
    assert_eq!(money(&game, "fogg", "st"), 400);
    play(&mut game, "fogg", "stop");
    play(&mut game, "fogg", "buyticket:paris:london:a");
    assert_eq!(money(&game, "fogg", "fr"), 0);
    play(&mut game, "fogg", "end");

    let home = cheat(&mut game, "fogg", "moven:1");
    assert!(whats(&home).contains(&"wins the game!".to_string()));
    assert_eq!(game.winner(), Some("fogg"));

    let state = game.state();
    assert_eq!(state.status, Status::Won);
    assert_eq!(state.winner.as_deref(), Some("fogg"));
    assert_eq!(game.money_supply(), supply);
}

#[test]
fn news_is_per_call() {
    let mut game = solo();
    let walked = cheat(&mut game, "fogg", "moven:1");
    assert_eq!(whats(&walked), vec!["walks 1 squares to Bank"]);
    assert_eq!(walked.news[0].who, "fogg");
    assert_eq!(walked.news[0].place, "lon");

    let stopped = play(&mut game, "fogg", "stop");
    assert_eq!(whats(&stopped), vec!["goes into Bank"]);
}
