//! Integration tests for duels between stored players

mod common;

use common::{create, edit_player, give, service, t0};
use simple_xiuxian::xiuxian::combat::{CombatEvent, DuelResult, VictoryKind};
use simple_xiuxian::xiuxian::effect::CombatEffectOutcome;
use simple_xiuxian::xiuxian::{Conflict, DuelOutcome, ScriptedDice, Side, Unusable, XiuxianError};
use tempfile::TempDir;

fn strikes(result: &DuelResult) -> Vec<(u32, Side)> {
    result
        .events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::Strike { round, attacker, .. } => Some((*round, *attacker)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_knockout_transfers_reward_and_heals_both() {
    let dir = TempDir::new().expect("tempdir");
    // Two spirit-root picks, one strike offset, then the reward roll.
    let svc = service(&dir, ScriptedDice::new().with_rolls([0, 0, 0, 30]));
    create(&svc, "a");
    create(&svc, "b");
    edit_player(&svc, "a", |p| {
        p.attack = 200;
        p.hp = 500;
        p.max_hp = 500;
    });

    let report = svc.duel("a", "b", t0()).expect("duel");
    assert_eq!(
        report.result.outcome,
        DuelOutcome::Victory {
            winner: Side::Challenger,
            by: VictoryKind::Knockout
        }
    );
    assert_eq!(report.result.rounds, 1);
    assert_eq!(report.reward, 30);
    assert_eq!(report.winner(), Some(("a", "a")));

    let a = svc.store().get_player("a").expect("a");
    let b = svc.store().get_player("b").expect("b");
    assert_eq!((a.gold, b.gold), (130, 70));
    assert_eq!(a.hp, a.max_hp);
    assert_eq!(b.hp, b.max_hp);
}

#[test]
fn test_reward_is_bounded_by_loser_gold() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new().with_rolls([0, 0, 0, 50]));
    create(&svc, "a");
    create(&svc, "b");
    edit_player(&svc, "a", |p| p.attack = 500);
    edit_player(&svc, "b", |p| p.gold = 5);

    let report = svc.duel("a", "b", t0()).expect("duel");
    assert_eq!(report.reward, 5);
    assert_eq!(svc.store().get_player("b").expect("b").gold, 0);
    assert_eq!(svc.store().get_player("a").expect("a").gold, 105);
}

#[test]
fn test_equal_hp_at_round_cap_is_a_draw() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "a");
    create(&svc, "b");
    for id in ["a", "b"] {
        edit_player(&svc, id, |p| {
            p.attack = 1;
            p.defense = 100;
        });
    }

    let report = svc.duel("b", "a", t0()).expect("duel");
    assert_eq!(report.result.outcome, DuelOutcome::Draw);
    assert_eq!(report.result.rounds, 20);
    assert_eq!(report.reward, 0);
    assert_eq!(report.result.challenger_hp, report.result.defender_hp);
    assert_eq!(svc.store().get_player("a").expect("a").gold, 100);
    assert_eq!(svc.store().get_player("b").expect("b").gold, 100);
}

#[test]
fn test_defender_can_win() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new().with_rolls([0, 0, 0, 0, 20]));
    create(&svc, "a");
    create(&svc, "b");
    edit_player(&svc, "b", |p| {
        p.attack = 300;
        p.defense = 100;
    });

    let report = svc.duel("a", "b", t0()).expect("duel");
    assert_eq!(report.result.outcome.winner(), Some(Side::Defender));
    assert_eq!(report.loser_name(), Some("a"));
    assert_eq!(report.reward, 20);
    assert_eq!(svc.store().get_player("b").expect("b").gold, 120);
}

#[test]
fn test_invalid_opponents() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "a");
    assert!(matches!(
        svc.duel("a", "a", t0()),
        Err(XiuxianError::InvalidState(Conflict::SelfDuel))
    ));
    assert!(matches!(
        svc.duel("a", "ghost", t0()),
        Err(XiuxianError::NotFound(_))
    ));
}

#[test]
fn test_challenger_strikes_first_in_every_round() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "a");
    create(&svc, "b");
    // 御风术 makes the defender faster; that buys evasion, not the first strike.
    give(&svc, "b", "御风术", 1);
    svc.learn_skill("b", "御风术", t0()).expect("learn");

    let report = svc.duel("a", "b", t0()).expect("duel");
    let strikes = strikes(&report.result);
    assert_eq!(strikes.first(), Some(&(1, Side::Challenger)));
    for pair in strikes.chunks(2) {
        assert_eq!(pair[0].1, Side::Challenger, "{:?}", strikes);
        if let Some(reply) = pair.get(1) {
            assert_eq!(reply, &(pair[0].0, Side::Defender), "{:?}", strikes);
        }
    }
}

#[test]
fn test_knocked_out_defender_never_strikes_back() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new().with_rolls([0, 0, 0, 30]));
    create(&svc, "a");
    create(&svc, "b");
    give(&svc, "b", "御风术", 1);
    svc.learn_skill("b", "御风术", t0()).expect("learn");
    edit_player(&svc, "a", |p| p.attack = 500);

    let report = svc.duel("a", "b", t0()).expect("duel");
    assert_eq!(strikes(&report.result), vec![(1, Side::Challenger)]);
    assert_eq!(
        report.result.outcome,
        DuelOutcome::Victory {
            winner: Side::Challenger,
            by: VictoryKind::Knockout
        }
    );
    assert_eq!(report.result.rounds, 1);
}

#[test]
fn test_duel_elixirs_are_taken_at_the_start() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    let a = create(&svc, "a");
    let b = create(&svc, "b");
    give(&svc, "a", "大力丸", 2);

    // Outside a duel the pill stays in the ring.
    assert!(matches!(
        svc.use_item("a", "大力丸", t0()),
        Err(XiuxianError::NotApplicable(Unusable::DuelOnly))
    ));
    assert_eq!(
        svc.store().inventory_entry("a", "大力丸").expect("read").map(|e| e.quantity),
        Some(2)
    );

    let report = svc.duel("a", "b", t0()).expect("duel");
    assert_eq!(
        report.result.events.first(),
        Some(&CombatEvent::Elixir {
            side: Side::Challenger,
            item: "大力丸".to_string(),
            outcome: CombatEffectOutcome::Buffed,
        })
    );
    let expected = (a.attack as i64 + 20 - b.defense as i64).max(1);
    assert!(report.result.events.iter().any(|e| matches!(
        e,
        CombatEvent::Strike { round: 1, attacker: Side::Challenger, damage, .. } if *damage == expected
    )));
    // One pill per duel.
    assert_eq!(
        svc.store().inventory_entry("a", "大力丸").expect("read").map(|e| e.quantity),
        Some(1)
    );
    assert!(svc.store().inventory_entry("b", "大力丸").expect("read").is_none());
}
