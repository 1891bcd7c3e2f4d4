mod common;

use common::*;
use globetrot::engine::DataError;
use serde_json::json;

#[test]
fn fixture_world_loads() {
    let world = world();
    assert_eq!(world.squares.len(), 8);
    assert_eq!(world.settings.go_currency, "st");
    assert_eq!(world.settings.refund_currency, "st");
    assert_eq!(world.settings.go_bonus, 200);
    assert!(world.dots["lon"].terminal);
    assert!(!world.dots["dov"].terminal);
    assert_eq!(world.places["paris"].dot, "par");
    assert_eq!(world.places["paris"].souvenir.as_deref(), Some("beret"));
}

#[test]
fn links_run_both_ways() {
    let world = world();
    let dov: Vec<String> = world.dots["dov"]
        .links
        .iter()
        .map(|l| format!("{}:{}", l.mode, l.to))
        .collect();
    assert_eq!(dov, vec!["r:cal", "r:lon"]);

    let par: Vec<String> = world.dots["par"]
        .links
        .iter()
        .map(|l| format!("{}:{}", l.mode, l.to))
        .collect();
    assert_eq!(par, vec!["r:cal", "a:lon"]);
}

#[test]
fn routes_between_places() {
    let world = world();
    assert_eq!(world.find_route("london", "paris", "a").unwrap(), vec!["lon", "par"]);
    assert_eq!(
        world.find_route("london", "paris", "r").unwrap(),
        vec!["lon", "dov", "cal", "par"]
    );
    assert_eq!(world.find_route("london", "paris", "ar").unwrap(), vec!["lon", "par"]);
    assert_eq!(
        world.find_route("paris", "london", "r").unwrap(),
        vec!["par", "cal", "dov", "lon"]
    );
    assert!(world.find_route("london", "paris", "s").is_none());
    assert!(world.find_route("london", "london", "a").is_none());
    assert!(world.find_route("london", "tokyo", "a").is_none());
}

#[test]
fn fares_are_in_the_origin_currency() {
    let world = world();
    assert_eq!(world.price("london", "paris", "r"), Some(("st".to_string(), 50)));
    assert_eq!(world.price("paris", "london", "a"), Some(("fr".to_string(), 1000)));
    assert_eq!(world.price("london", "paris", "s"), None);
}

#[test]
fn cities_block_through_routes() {
    let mut data = data();
    // calais becomes a city, so the rail line stops there
    data["places"]["calais"] = json!({ "name": "Calais", "city": true, "currency": "fr" });
    data["dots"]["cal"]["place"] = json!("calais");

    let world = world_from(data).unwrap();
    assert!(world.find_route("london", "paris", "r").is_none());
    assert_eq!(
        world.find_route("london", "calais", "r").unwrap(),
        vec!["lon", "dov", "cal"]
    );
}

#[test]
fn bad_data_is_fatal() {
    let mut d = data();
    d["dots"]["cal"]["links"] = json!(["r:nowhere"]);
    assert!(matches!(world_from(d), Err(DataError::DanglingLink { .. })));

    let mut d = data();
    d["dots"]["cal"]["links"] = json!(["rcal"]);
    assert!(matches!(world_from(d), Err(DataError::DanglingLink { .. })));

    let mut d = data();
    d["dots"]["cal"]["place"] = json!("calais");
    assert!(matches!(world_from(d), Err(DataError::UnknownPlace { .. })));

    let mut d = data();
    d["places"]["paris"]["currency"] = json!("mark");
    assert!(matches!(world_from(d), Err(DataError::UnknownCurrency { .. })));

    let mut d = data();
    d["currencies"]["fr"]["units"] = json!([]);
    assert!(matches!(world_from(d), Err(DataError::BadCurrency(_))));

    let mut d = data();
    d["places"]["rome"] = json!({ "name": "Rome", "currency": "st" });
    assert!(matches!(world_from(d), Err(DataError::PlaceWithoutDot(_))));

    let mut d = data();
    d["settings"]["home"] = json!("tokyo");
    assert!(matches!(world_from(d), Err(DataError::UnknownHome(_))));

    let mut d = data();
    d["squares"] = json!([]);
    assert!(matches!(world_from(d), Err(DataError::NoSquares)));
}

#[test]
fn bad_codes_are_fatal_but_unknown_ones_are_not() {
    let mut d = data();
    d["squares"][1]["options"] = json!(["miss:soon"]);
    assert!(matches!(world_from(d), Err(DataError::MalformedCode { .. })));

    let mut d = data();
    d["squares"][1]["options"] = json!(["go:-airport"]);
    assert!(matches!(world_from(d), Err(DataError::UnknownSquareType(_))));

    let mut d = data();
    d["lucks"][1]["code"] = json!("getmoney:yen:5");
    assert!(matches!(world_from(d), Err(DataError::MalformedCode { .. })));

    let mut d = data();
    d["risks"][3]["code"] = json!("go:tokyo");
    assert!(matches!(world_from(d), Err(DataError::MalformedCode { .. })));

    let mut d = data();
    d["lucks"][1]["code"] = json!("lottery:7");
    d["squares"][1]["options"] = json!(["dance"]);
    assert!(world_from(d).is_ok());
}
