//! Command handlers, one per primary command segment.
//!
//! A handler checks every precondition before its first mutation, so an
//! error return leaves the game exactly as it was. Effects triggered from a
//! handler (automatic commands, nested square options) run after that point
//! and never fail the call.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;
use serde_json::{json, Value};

use super::command::{list_without, CommandPattern};
use super::effects::{LuckEffect, RiskEffect};
use super::errors::PlayError;
use super::game::{Game, Handler};
use super::ledger;
use super::player::{Debt, ANY_CURRENCY};

/// Customs duty charged by `paycustoms`, in neutral units.
pub const CUSTOMS_DUTY: i64 = 100;

type Outcome = Result<Value, PlayError>;

/// The dispatch table for one game instance.
pub(crate) fn table() -> BTreeMap<&'static str, Handler> {
    let mut t: BTreeMap<&'static str, Handler> = BTreeMap::new();
    t.insert("airlift", airlift);
    t.insert("buysouvenir", buy_souvenir);
    t.insert("buyticket", buy_ticket);
    t.insert("changemoney", change_money);
    t.insert("debt", debt);
    t.insert("declare", declare);
    t.insert("dicemove", dice_move);
    t.insert("gamble", gamble);
    t.insert("getmoney", get_money);
    t.insert("ignorerisk", ignore_risk);
    t.insert("insurance", insurance);
    t.insert("obeyrisk", obey_risk);
    t.insert("pawnsouvenir", pawn_souvenir);
    t.insert("pay", pay);
    t.insert("paycustoms", pay_customs);
    t.insert("quarantine", quarantine);
    t.insert("redeemsouvenir", redeem_souvenir);
    t.insert("sellsouvenir", sell_souvenir);
    t.insert("stop", stop);
    t.insert("takeluck", take_luck);
    t.insert("takerisk", take_risk);
    t.insert("useluck", use_luck);
    t.insert("end", end);
    // never allowed without cheating
    t.insert("moven", move_n);
    t
}

fn arg<'a>(args: &'a [String], i: usize, what: &str) -> Result<&'a str, PlayError> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| PlayError::bad_request(format!("missing {}", what)))
}

fn card_number(raw: &str) -> Result<usize, PlayError> {
    raw.parse::<usize>()
        .map_err(|_| PlayError::bad_request(format!("bad card number: {}", raw)))
}

fn has_funds(g: &Game, currency: &str, amount: i64) -> Result<(), PlayError> {
    if ledger::balance(&g.current().money, currency) < amount {
        return Err(PlayError::not_now("not enough money"));
    }
    Ok(())
}

/// Walk or travel `n` steps, keeping `stop` on offer while still moving.
fn step(g: &mut Game, n: usize) {
    if g.turn_ref().on_map {
        g.move_on_map(n);
        let t = g.turn_mut();
        if t.stopped {
            t.disallow("stop");
        } else {
            t.allow("stop");
        }
    } else {
        g.move_on_track(n);
        g.turn_mut().allow("stop");
    }
}

/// Take a used luck card out of the hand and back under the pile.
fn spend_luck(g: &mut Game, card: usize) {
    let p = g.current_mut();
    if let Some(i) = p.lucks.iter().position(|c| *c == card) {
        p.lucks.remove(i);
    }
    g.luck_pile.put_back(card);
}

// ============================================================================
// Movement
// ============================================================================

fn dice_move(g: &mut Game, _c: &CommandPattern, _args: &[String]) -> Outcome {
    let roll = g.roll_dice();
    step(g, roll as usize);
    g.turn_mut().disallow("dicemove");
    Ok(json!(roll))
}

fn move_n(g: &mut Game, _c: &CommandPattern, args: &[String]) -> Outcome {
    let raw = arg(args, 0, "distance")?;
    let n = match raw.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => return Err(PlayError::bad_request(format!("bad distance: {}", raw))),
    };
    step(g, n);
    Ok(json!(n))
}

fn stop(g: &mut Game, c: &CommandPattern, _args: &[String]) -> Outcome {
    if g.turn_ref().on_map {
        g.stop_on_map();
    } else {
        g.stop_on_track(0);
    }

    let t = g.turn_mut();
    t.disallow(c.as_str());
    // cannot dicemove after stopping
    t.disallow("dicemove");
    Ok(Value::Null)
}

fn airlift(g: &mut Game, c: &CommandPattern, args: &[String]) -> Outcome {
    let place = arg(args, 0, "place")?;
    if !g.world.places.contains_key(place) {
        return Err(PlayError::bad_request(format!("unknown place {}", place)));
    }

    g.lose_ticket(false);
    g.jump_on_map(place);
    g.turn_mut().disallow(c.as_str());

    g.event("suddenly appears");
    Ok(Value::Null)
}

fn end(g: &mut Game, _c: &CommandPattern, _args: &[String]) -> Outcome {
    let t = g.turn_ref();
    if !t.stopped {
        return Err(PlayError::WrongPhase("not stopped".into()));
    }
    if !t.must.is_empty() {
        return Err(PlayError::MustDo(format!("still to do: {}", t.must.join(" "))));
    }

    g.event("goes to sleep");
    g.to_next_player();
    Ok(Value::Null)
}

// ============================================================================
// Money
// ============================================================================

fn buy_ticket(g: &mut Game, _c: &CommandPattern, args: &[String]) -> Outcome {
    let from = arg(args, 0, "origin")?;
    let to = arg(args, 1, "destination")?;
    let modes = arg(args, 2, "modes")?;

    if g.current_place().as_deref() != Some(from) {
        return Err(PlayError::not_now("must buy ticket from current place"));
    }
    if g.current().ticket.is_some() {
        return Err(PlayError::not_now("already have ticket"));
    }

    let ticket = g.make_ticket(from, to, modes)?;
    has_funds(g, &ticket.currency, ticket.fare)?;

    g.debit(&ticket.currency, ticket.fare);
    g.event(format!(
        "buys a ticket to {} by {} for {} {}",
        to, modes, ticket.fare, ticket.currency
    ));
    g.current_mut().ticket = Some(ticket);
    Ok(Value::Null)
}

fn change_money(g: &mut Game, _c: &CommandPattern, args: &[String]) -> Outcome {
    let from = arg(args, 0, "currency to sell")?;
    let to = arg(args, 1, "currency to buy")?;
    let amount = ledger::parse_amount(arg(args, 2, "amount")?)?;

    let world = Arc::clone(&g.world);
    let unknown = |c: &str| PlayError::bad_request(format!("unknown currency {}", c));
    let from_currency = world.currency(from).ok_or_else(|| unknown(from))?;
    let to_currency = world.currency(to).ok_or_else(|| unknown(to))?;

    ledger::check_denomination(from_currency, amount)?;
    has_funds(g, from, amount)?;

    let to_amount = ledger::convert(amount, from_currency, to_currency);

    g.debit(from, amount);
    g.credit(to, to_amount);

    g.event(format!(
        "changes {} {} into {} {}",
        amount, from_currency.name, to_amount, to_currency.name
    ));
    Ok(json!(to_amount))
}

fn gamble(g: &mut Game, c: &CommandPattern, args: &[String]) -> Outcome {
    let currency_id = arg(args, 0, "currency")?;
    let amount = ledger::parse_amount(arg(args, 1, "amount")?)?;

    let world = Arc::clone(&g.world);
    let currency = world
        .currency(currency_id)
        .ok_or_else(|| PlayError::bad_request(format!("unknown currency {}", currency_id)))?;
    ledger::check_denomination(currency, amount)?;
    has_funds(g, currency_id, amount)?;

    let roll = g.roll_dice();
    g.turn_mut().disallow(c.as_str());

    if roll >= 4 {
        g.credit(currency_id, amount);
        g.event(format!("gambles, rolls {}, and wins!", roll));
        Ok(json!("won"))
    } else {
        g.debit(currency_id, amount);
        g.event(format!("gambles, rolls {}, and loses!", roll));
        Ok(json!("lost"))
    }
}

fn get_money(g: &mut Game, c: &CommandPattern, args: &[String]) -> Outcome {
    let currency_id = arg(args, 0, "currency")?;
    let neutral = ledger::parse_amount(arg(args, 1, "amount")?)?;

    let world = Arc::clone(&g.world);
    let currency = world
        .currency(currency_id)
        .ok_or_else(|| PlayError::bad_request(format!("unknown currency {}", currency_id)))?;
    let amount = currency.to_local(neutral);

    g.credit(currency_id, amount);
    g.turn_mut().disallow(c.as_str());

    g.event(format!("just finds {} {}", amount, currency.name));
    Ok(json!(amount))
}

fn debt(g: &mut Game, _c: &CommandPattern, args: &[String]) -> Outcome {
    let reason = arg(args, 0, "reason")?;
    let currency = arg(args, 1, "currency")?;
    let amount = ledger::parse_amount(arg(args, 2, "amount")?)?;

    if currency != ANY_CURRENCY && g.world.currency(currency).is_none() {
        return Err(PlayError::bad_request(format!("unknown currency {}", currency)));
    }

    g.current_mut().debts.push(Debt {
        reason: reason.to_string(),
        amount,
        currency: currency.to_string(),
    });
    g.turn_mut().allow("pay:*:*");

    g.event(format!("now owes {} {} for {}", currency, amount, reason));
    Ok(Value::Null)
}

/// Pay debts in order, as far as the money goes. Amounts are settled in
/// neutral units and charged in the paying currency, rounded up for each debt
/// cleared.
fn pay(g: &mut Game, c: &CommandPattern, args: &[String]) -> Outcome {
    let currency_id = arg(args, 0, "currency")?;
    let amount = ledger::parse_amount(arg(args, 1, "amount")?)?;

    let world = Arc::clone(&g.world);
    let currency = world
        .currency(currency_id)
        .ok_or_else(|| PlayError::bad_request(format!("unknown currency {}", currency_id)))?;
    ledger::check_denomination(currency, amount)?;
    has_funds(g, currency_id, amount)?;

    if !g.current().debts.iter().any(|d| d.payable_in(currency_id)) {
        return Err(PlayError::not_now(format!("no debts payable in {}", currency.name)));
    }

    let mut neutral = currency.to_neutral(amount);
    if neutral == 0 {
        return Err(PlayError::bad_request("amount too small to pay anything"));
    }

    let mut charged = 0;
    let mut remaining = Vec::new();
    let mut notes = Vec::new();
    for debt in g.current().debts.iter().cloned() {
        if neutral == 0 || !debt.payable_in(currency_id) {
            remaining.push(debt);
        } else if neutral >= debt.amount {
            charged += currency.to_local_ceil(debt.amount);
            neutral -= debt.amount;
            notes.push(format!("pays their {} debt", debt.reason));
        } else {
            charged += currency.to_local(neutral);
            notes.push(format!("pays some of their {} debt", debt.reason));
            remaining.push(Debt {
                amount: debt.amount - neutral,
                ..debt
            });
            neutral = 0;
        }
    }

    // rounding up per debt can overshoot what was offered
    let charged = charged.min(amount);
    g.debit(currency_id, charged);
    let settled = remaining.is_empty();
    g.current_mut().debts = remaining;
    if settled {
        // nothing more to pay
        g.turn_mut().disallow(c.as_str());
    }

    for note in notes {
        g.event(note);
    }
    Ok(json!(charged))
}

fn pay_customs(g: &mut Game, c: &CommandPattern, _args: &[String]) -> Outcome {
    g.turn_mut().fulfil(c.as_str());

    let cmd = CommandPattern::new(format!("debt:customs:{}:{}", ANY_CURRENCY, CUSTOMS_DUTY));
    g.run_auto(&cmd);

    g.event("agrees to pay their customs duty");
    Ok(Value::Null)
}

fn insurance(g: &mut Game, c: &CommandPattern, _args: &[String]) -> Outcome {
    g.current_mut().insurance = true;
    g.turn_mut().disallow(c.as_str());

    g.event("acquires an insurance policy");
    Ok(Value::Null)
}

// ============================================================================
// Souvenirs
// ============================================================================

fn buy_souvenir(g: &mut Game, c: &CommandPattern, args: &[String]) -> Outcome {
    let place_id = arg(args, 0, "place")?;

    if g.current_place().as_deref() != Some(place_id) {
        return Err(PlayError::not_now("can only buy souvenir from current place"));
    }

    let world = Arc::clone(&g.world);
    let place = world
        .places
        .get(place_id)
        .ok_or_else(|| PlayError::bad_request(format!("unknown place {}", place_id)))?;
    let Some(souvenir) = &place.souvenir else {
        return Err(PlayError::not_now("nothing to buy here"));
    };
    let currency = world
        .currency(&place.currency)
        .ok_or_else(|| PlayError::bad_request("place has no currency"))?;

    let price = currency.to_local(g.settings.souvenir_price);
    has_funds(g, &place.currency, price)?;
    if g.bank.stock(place_id) < 1 {
        return Err(PlayError::not_now("out of stock"));
    }

    g.debit(&place.currency, price);
    g.bank.take_souvenir(place_id);
    let p = g.current_mut();
    p.souvenirs.push(place_id.to_string());
    p.has_bought = true;
    g.turn_mut().disallow(c.as_str());

    g.event(format!("buys a souvenir {}", souvenir));
    Ok(json!(souvenir))
}

fn declare(g: &mut Game, c: &CommandPattern, args: &[String]) -> Outcome {
    let place = arg(args, 0, "souvenir")?;

    if place == "none" {
        if !g.current().souvenirs.is_empty() {
            return Err(PlayError::not_now("you have a souvenir, you must declare it"));
        }
        g.turn_mut().fulfil(c.as_str());
        g.event("declares no souvenirs");
        return Ok(Value::Null);
    }

    if !g.current().has_souvenir(place) {
        return Err(PlayError::not_now("souvenir not found"));
    }

    list_without(&mut g.current_mut().souvenirs, place);
    g.bank.return_souvenir(place);
    g.turn_mut().fulfil(c.as_str());

    g.event(format!("loses a souvenir from {}", place));
    Ok(Value::Null)
}

fn pawn_souvenir(g: &mut Game, _c: &CommandPattern, args: &[String]) -> Outcome {
    let place = arg(args, 0, "souvenir")?;
    if !g.current().has_souvenir(place) {
        return Err(PlayError::not_now("souvenir not found"));
    }
    g.event(format!("tries to pawn a souvenir from {}", place));
    Ok(json!("not implemented"))
}

fn sell_souvenir(g: &mut Game, _c: &CommandPattern, args: &[String]) -> Outcome {
    let place = arg(args, 0, "souvenir")?;
    if !g.current().has_souvenir(place) {
        return Err(PlayError::not_now("souvenir not found"));
    }
    g.event(format!("tries to sell a souvenir from {}", place));
    Ok(json!("not implemented"))
}

fn redeem_souvenir(g: &mut Game, _c: &CommandPattern, args: &[String]) -> Outcome {
    let place = arg(args, 0, "souvenir")?;
    g.event(format!("tries to redeem a souvenir from {}", place));
    Ok(json!("not implemented"))
}

// ============================================================================
// Hazards
// ============================================================================

fn quarantine(g: &mut Game, c: &CommandPattern, _args: &[String]) -> Outcome {
    g.current_mut().miss_turns += 1;
    g.turn_mut().fulfil(c.as_str());

    g.event("enters quarantine");
    g.run_auto(&CommandPattern::new("end"));
    Ok(Value::Null)
}

fn take_risk(g: &mut Game, c: &CommandPattern, _args: &[String]) -> Outcome {
    let t = g.turn_mut();
    t.fulfil(c.as_str());
    t.disallow(c.as_str());

    let Some(card_id) = g.risk_pile.take() else {
        g.event("finds no risk cards");
        return Ok(Value::Null);
    };

    let world = Arc::clone(&g.world);
    let card = world.risks.get(card_id).expect("risk card index out of range");
    g.event(format!("takes a risk card: {}", card.name));

    let risk = card.effect();
    let modes = g.current().ticket.as_ref().map(|t| t.mode.clone());
    if risk.applies_to(modes.as_deref()) {
        g.turn_mut()
            .require(&CommandPattern::new(format!("obeyrisk:{}", card_id)));
        if g.current().insurance {
            g.turn_mut().allow(&format!("ignorerisk:{}", card_id));
        }
    }

    // risk cards always go straight back
    g.risk_pile.put_back(card_id);
    Ok(json!(card_id))
}

fn ignore_risk(g: &mut Game, c: &CommandPattern, args: &[String]) -> Outcome {
    let id = arg(args, 0, "card")?;
    let obey = format!("obeyrisk:{}", id);

    if !g.turn_ref().must.contains(&obey) {
        return Err(PlayError::not_now("no such risk to ignore"));
    }

    let t = g.turn_mut();
    t.fulfil(&obey);
    t.disallow(c.as_str());

    g.event("is insured, and ignores the risk");
    Ok(Value::Null)
}

fn obey_risk(g: &mut Game, c: &CommandPattern, args: &[String]) -> Outcome {
    let card_id = card_number(arg(args, 0, "card")?)?;

    let world = Arc::clone(&g.world);
    let Some(card) = world.risks.get(card_id) else {
        return Err(PlayError::bad_request("invalid risk card number"));
    };

    let ticket = g.current().ticket.clone();

    match card.effect().effect {
        RiskEffect::Auto(cmd) => {
            let cmd = g.localize(&cmd);
            g.run_auto(&cmd);
        }
        RiskEffect::CustomsHalf => {
            let amount = g.current().souvenirs.len() as i64 * g.settings.souvenir_price / 2;
            if amount > 0 {
                let cmd = format!("debt:customs:{}:{}", ANY_CURRENCY, amount);
                g.run_auto(&CommandPattern::new(cmd));
            }
        }
        RiskEffect::Dest => match ticket {
            Some(ticket) => {
                g.lose_ticket(false);
                g.jump_on_map(&ticket.to);
                g.stop_on_map();
                g.event("arrives early");
            }
            None => g.event("is not travelling, so nothing happens"),
        },
        RiskEffect::Fog => match ticket {
            // planes go back, ships and cars wait a turn, trains carry on
            Some(ticket) if ticket.mode.contains('a') => {
                g.jump_on_map(&ticket.from);
                g.stop_on_map();
                g.event("is back");
            }
            Some(ticket) if ticket.mode.contains('s') || ticket.mode.contains('l') => {
                g.current_mut().miss_turns += 1;
                g.event("is fogbound for a turn");
            }
            _ => g.event("is not bothered by the fog"),
        },
        RiskEffect::Go(place) => {
            g.lose_ticket(true);
            g.jump_on_map(&place);
            g.stop_on_map();
            g.event("suddenly appears");
        }
        RiskEffect::LoseTicket => {
            warn!("lost ticket risk card is not implemented");
            g.event("thought they'd lost their ticket");
        }
        RiskEffect::Miss(n) => {
            g.current_mut().miss_turns += n;
            g.event(format!("will miss {} turns", n));
        }
        RiskEffect::Must(cmd) => {
            let cmd = g.localize(&cmd);
            g.turn_mut().require(&cmd);
        }
        RiskEffect::GoStart { lose_ticket } => match ticket {
            Some(ticket) => {
                if lose_ticket {
                    g.lose_ticket(true);
                }
                g.jump_on_map(&ticket.from);
                g.stop_on_map();
                if lose_ticket {
                    g.event("is back, ticketless");
                } else {
                    g.event("is back");
                }
            }
            None => g.event("is not travelling, so nothing happens"),
        },
        RiskEffect::Unrecognized(code) => {
            warn!("risk card {} is not implemented", code);
            g.event("finds out that the risk card is unimplemented");
        }
    }

    let t = g.turn_mut();
    t.fulfil(c.as_str());
    t.disallow(&format!("ignorerisk:{}", card_id));
    Ok(Value::Null)
}

// ============================================================================
// Luck
// ============================================================================

fn take_luck(g: &mut Game, c: &CommandPattern, _args: &[String]) -> Outcome {
    let t = g.turn_mut();
    t.fulfil(c.as_str());
    t.disallow(c.as_str());

    let Some(card_id) = g.luck_pile.take() else {
        g.event("finds no luck cards");
        return Ok(Value::Null);
    };

    let world = Arc::clone(&g.world);
    let card = world.lucks.get(card_id).expect("luck card index out of range");
    g.event(format!("gets a luck card: {}", card.name));

    if card.retain {
        g.current_mut().lucks.push(card_id);
        return Ok(json!(card_id));
    }

    // everything else happens right away, and the card goes straight back
    match card.effect() {
        LuckEffect::Can(cmd) => {
            let cmd = g.localize(&cmd);
            g.turn_mut().allow(cmd.as_str());
        }
        LuckEffect::Go(dest) => {
            g.jump_on_track(&dest, true);
            g.event(format!("jumps to {}", dest));
            if !g.turn_ref().on_map {
                g.stop_on_track(1);
            }
        }
        LuckEffect::GetMoney { currency, amount } => {
            if let Some(cur) = world.currency(&currency) {
                let local = cur.to_local(amount);
                g.credit(&currency, local);
                g.event(format!("finds {} {}", local, cur.name));
            }
        }
        LuckEffect::Speculation => {
            warn!("speculation luck card is not implemented");
            g.event("has nothing to speculate with");
        }
        other => {
            warn!("luck card {:?} does nothing when drawn", other);
            g.event("finds out that the luck card is unimplemented");
        }
    }

    g.luck_pile.put_back(card_id);
    Ok(json!(card_id))
}

fn use_luck(g: &mut Game, _c: &CommandPattern, args: &[String]) -> Outcome {
    let card_id = card_number(arg(args, 0, "card")?)?;
    let rest = &args[1..];

    if !g.current().lucks.contains(&card_id) {
        return Err(PlayError::not_now("card not held"));
    }

    let world = Arc::clone(&g.world);
    let card = world.lucks.get(card_id).expect("held luck card index out of range");

    match card.effect() {
        LuckEffect::Advance(n) => {
            if g.turn_ref().stopped {
                return Err(PlayError::not_now("cannot move after stopping"));
            }
            spend_luck(g, card_id);
            step(g, n as usize);
        }
        LuckEffect::Dest => {
            if !g.turn_ref().on_map {
                return Err(PlayError::not_now("cannot go to destination while not on map"));
            }
            let dest = g
                .current()
                .ticket
                .as_ref()
                .map(|t| t.to.clone())
                .expect("on the map without a ticket");

            spend_luck(g, card_id);
            g.lose_ticket(false);
            g.jump_on_map(&dest);
            g.stop_on_map();
            g.event("luckily arrives early");
        }
        LuckEffect::FreeInsurance => {
            let Some(lost) = g.turn_ref().lost_ticket.clone() else {
                return Err(PlayError::not_now("cannot claim insurance when no ticket lost"));
            };
            let refund_id = g.settings.refund_currency.clone();
            let (Some(paid_in), Some(refund_in)) =
                (world.currency(&lost.currency), world.currency(&refund_id))
            else {
                return Err(PlayError::bad_request("no currency to refund in"));
            };
            let refund = ledger::convert(lost.fare, paid_in, refund_in) * 2;

            spend_luck(g, card_id);
            g.credit(&refund_id, refund);
            g.turn_mut().lost_ticket = None;
            g.event("luckily gets a big refund");
        }
        LuckEffect::FreeTicket(grant) => {
            if g.current().ticket.is_some() {
                return Err(PlayError::not_now("cannot claim free ticket when already have ticket"));
            }
            let (from, to, modes) = grant.claim(rest)?;
            if g.current_place().as_deref() != Some(from.as_str()) {
                return Err(PlayError::not_now("can only claim ticket from current place"));
            }
            let mut ticket = g.make_ticket(&from, &to, &modes)?;
            ticket.fare = 0;

            spend_luck(g, card_id);
            g.current_mut().ticket = Some(ticket);
            g.event(format!("luckily gets a ticket to {} by {}", to, modes));
        }
        LuckEffect::Immunity => {
            let must = &g.turn_ref().must;
            let dodged = ["declare:*", "paycustoms"]
                .into_iter()
                .find(|m| must.iter().any(|x| x == m))
                .ok_or_else(|| PlayError::not_now("not at customs"))?;

            spend_luck(g, card_id);
            g.turn_mut().fulfil(dodged);
            g.event("luckily dodges the customs checks");
        }
        LuckEffect::Inoculation => {
            if !g.turn_ref().must.iter().any(|m| m == "quarantine") {
                return Err(PlayError::not_now("not at quarantine"));
            }

            spend_luck(g, card_id);
            g.turn_mut().fulfil("quarantine");
            g.event("luckily avoids quarantine");
        }
        other => {
            warn!("luck card {:?} cannot be played from the hand", other);
            spend_luck(g, card_id);
            g.event("finds out that the luck card is unimplemented");
        }
    }

    Ok(Value::Null)
}
