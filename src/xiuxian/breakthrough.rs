//! Breakthrough resolution: the probabilistic step up the realm ladder.

use log::debug;

use crate::xiuxian::dice::Dice;
use crate::xiuxian::effect::{Effect, ANY_REALM};
use crate::xiuxian::errors::{Conflict, XiuxianError};
use crate::xiuxian::realm;
use crate::xiuxian::stats;
use crate::xiuxian::types::{EquipmentBonus, PlayerRecord};

pub const BASE_CHANCE: f64 = 0.80;
pub const CHANCE_FLOOR: f64 = 0.05;
pub const CHANCE_CAP: f64 = 0.95;
/// Fraction of the requirement lost on top of the stake when an attempt fails.
pub const FAILURE_PENALTY: f64 = 0.2;

/// `0.80 - 0.05 * major - 0.01 * minor`, never below [`CHANCE_FLOOR`].
pub fn base_chance(major: u8, minor: u8) -> f64 {
    (BASE_CHANCE - 0.05 * f64::from(major) - 0.01 * f64::from(minor)).max(CHANCE_FLOOR)
}

/// An elixir that will be consumed to raise the odds.
#[derive(Debug, Clone, PartialEq)]
pub struct ElixirChoice {
    pub item_name: String,
    pub bonus: f64,
}

/// Pick the best applicable elixir from `(item name, effect)` candidates: the highest bonus,
/// preferring an elixir made for this realm over a wildcard one on ties.
pub fn choose_elixir<'a, I>(major: u8, candidates: I) -> Option<ElixirChoice>
where
    I: IntoIterator<Item = (&'a str, &'a Effect)>,
{
    let mut best: Option<(ElixirChoice, bool)> = None;
    for (name, effect) in candidates {
        let Some(bonus) = effect.breakthrough_bonus(major) else {
            continue;
        };
        let exact = !matches!(
            effect,
            Effect::BreakthroughRate {
                target_major_level: ANY_REALM,
                ..
            }
        );
        let better = match &best {
            None => true,
            Some((current, current_exact)) => {
                bonus > current.bonus || (bonus == current.bonus && exact && !current_exact)
            }
        };
        if better {
            best = Some((
                ElixirChoice {
                    item_name: name.to_string(),
                    bonus,
                },
                exact,
            ));
        }
    }
    best.map(|(choice, _)| choice)
}

/// Reject attempts that cannot start. Nothing is deducted on rejection.
pub fn check_eligible(player: &PlayerRecord) -> Result<u64, XiuxianError> {
    if player.is_in_seclusion() {
        return Err(XiuxianError::InvalidState(Conflict::InSeclusion));
    }
    if realm::is_terminal(player.major_level) {
        return Err(XiuxianError::InvalidState(Conflict::AtPeak));
    }
    let needed = realm::exp_needed(player.major_level, player.minor_level);
    if player.exp < needed {
        return Err(XiuxianError::insufficient("exp", needed, player.exp));
    }
    Ok(needed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakthroughReport {
    pub success: bool,
    pub chance: f64,
    pub elixir: Option<ElixirChoice>,
    pub exp_spent: u64,
    pub penalty: u64,
    pub from: (u8, u8),
    pub to: (u8, u8),
}

/// Resolve one attempt. `elixir` must already be consumed by the caller.
pub fn resolve(
    player: &mut PlayerRecord,
    elixir: Option<ElixirChoice>,
    equipped: &[EquipmentBonus],
    dice: &mut dyn Dice,
) -> Result<BreakthroughReport, XiuxianError> {
    let needed = check_eligible(player)?;
    let from = (player.major_level, player.minor_level);
    let bonus = elixir.as_ref().map_or(0.0, |e| e.bonus);
    let chance = (base_chance(from.0, from.1) + bonus).min(CHANCE_CAP);

    player.exp -= needed;
    let success = dice.chance() < chance;
    let mut penalty = 0;
    if success {
        let (major, minor) = realm::next_position(from.0, from.1);
        player.major_level = major;
        player.minor_level = minor;
        stats::apply_recomputed(player, equipped);
    } else {
        penalty = ((needed as f64) * FAILURE_PENALTY).floor() as u64;
        player.exp = player.exp.saturating_sub(penalty);
    }
    debug!(
        "breakthrough for {} at {:?}: chance {:.2}, success {}",
        player.id, from, chance, success
    );
    Ok(BreakthroughReport {
        success,
        chance,
        elixir,
        exp_spent: needed,
        penalty,
        from,
        to: (player.major_level, player.minor_level),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xiuxian::dice::ScriptedDice;
    use crate::xiuxian::types::SpiritRoot;

    fn rate(value: f64, target: i32) -> Effect {
        Effect::BreakthroughRate {
            value,
            target_major_level: target,
        }
    }

    fn ready_player(major: u8, minor: u8) -> PlayerRecord {
        let mut p = PlayerRecord::new("p", "P", SpiritRoot::Fire);
        p.major_level = major;
        p.minor_level = minor;
        p.exp = realm::exp_needed(major, minor);
        p
    }

    #[test]
    fn base_chance_drops_with_realm_and_floors() {
        assert!((base_chance(0, 1) - 0.79).abs() < 1e-9);
        assert!((base_chance(3, 2) - 0.63).abs() < 1e-9);
        assert!((base_chance(8, 1) - 0.39).abs() < 1e-9);
        for major in 0..9 {
            for minor in 1..=10 {
                let c = base_chance(major, minor);
                assert!((CHANCE_FLOOR..=CHANCE_CAP).contains(&c));
            }
        }
    }

    #[test]
    fn best_elixir_wins_and_exact_target_breaks_ties() {
        let a = rate(0.02, ANY_REALM);
        let b = rate(0.20, 0);
        let c = rate(0.15, 1);
        let choice = choose_elixir(0, [("清心丹", &a), ("筑基丹", &b), ("结金丹", &c)]).unwrap();
        assert_eq!(choice.item_name, "筑基丹");

        let wild = rate(0.1, ANY_REALM);
        let exact = rate(0.1, 2);
        let choice = choose_elixir(2, [("wild", &wild), ("exact", &exact)]).unwrap();
        assert_eq!(choice.item_name, "exact");

        let other = Effect::AddExp {
            value: 10,
            target_major_level: None,
        };
        assert!(choose_elixir(5, [("x", &other), ("c", &c)]).is_none());
    }

    #[test]
    fn ineligible_attempts_take_nothing() {
        let mut p = ready_player(0, 1);
        p.exp = 99;
        let err = check_eligible(&p).unwrap_err();
        assert!(matches!(
            err,
            XiuxianError::InsufficientResource {
                needed: 100,
                available: 99,
                ..
            }
        ));

        let mut top = ready_player(9, 1);
        top.exp = 1_000;
        let mut dice = ScriptedDice::new();
        assert!(matches!(
            resolve(&mut top, None, &[], &mut dice),
            Err(XiuxianError::InvalidState(_))
        ));
        assert_eq!(top.exp, 1_000);

        p.exp = 100;
        p.seclusion_started_at = Some(chrono::Utc::now());
        assert!(matches!(check_eligible(&p), Err(XiuxianError::InvalidState(_))));
    }

    #[test]
    fn success_advances_and_recomposes() {
        let mut p = ready_player(0, 10);
        p.exp += 7;
        let mut dice = ScriptedDice::new().with_chances([0.0]);
        let report = resolve(&mut p, None, &[], &mut dice).unwrap();
        assert!(report.success);
        assert_eq!(report.to, (1, 1));
        assert_eq!(p.exp, 7);
        assert_eq!(p.attack, 10 + 10 + 2);
    }

    #[test]
    fn failure_deducts_stake_and_penalty() {
        let mut p = ready_player(1, 2);
        let needed = p.exp;
        p.exp += 100;
        let mut dice = ScriptedDice::new().with_chances([0.99]);
        let report = resolve(&mut p, None, &[], &mut dice).unwrap();
        assert!(!report.success);
        assert_eq!(report.penalty, (needed as f64 * 0.2).floor() as u64);
        assert_eq!(p.exp, 100u64.saturating_sub(report.penalty));
        assert_eq!((p.major_level, p.minor_level), (1, 2));
    }

    #[test]
    fn penalty_saturates_at_zero() {
        let mut p = ready_player(0, 5);
        let mut dice = ScriptedDice::new().with_chances([0.99]);
        resolve(&mut p, None, &[], &mut dice).unwrap();
        assert_eq!(p.exp, 0);
    }

    #[test]
    fn elixir_bonus_is_capped() {
        let mut p = ready_player(0, 1);
        let elixir = ElixirChoice {
            item_name: "筑基丹".into(),
            bonus: 0.5,
        };
        let mut dice = ScriptedDice::new().with_chances([0.96]);
        let report = resolve(&mut p, Some(elixir), &[], &mut dice).unwrap();
        assert_eq!(report.chance, CHANCE_CAP);
        assert!(!report.success);
    }
}
