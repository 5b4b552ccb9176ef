//! Effect descriptors and their dispatcher.
//!
//! Items and skills carry an [`Effect`]: a closed, internally tagged enum whose JSON form
//! is `{"effect": "<kind>", ...params}`. Dispatch is split by context:
//!
//! - [`apply_to_player`] mutates a [`PlayerRecord`] (the generic "use" path)
//! - [`apply_to_combat`] mutates the combat state of a duel participant
//!
//! Both match exhaustively; a kind that makes no sense in the chosen context is rejected
//! with [`XiuxianError::NotApplicable`] instead of being silently dropped.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::xiuxian::combat::{Combatant, Modifier, ModifierAmount, Regen, SecondWind, StrikeTechnique};
use crate::xiuxian::dice::Dice;
use crate::xiuxian::errors::{Unusable, XiuxianError};
use crate::xiuxian::stats;
use crate::xiuxian::types::{EquipmentBonus, PlayerRecord, SpiritRoot, StatKind, StatMap};

/// `target_major_level` value that matches every realm.
pub const ANY_REALM: i32 = -1;

fn default_buff_rounds() -> u32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    AddExp {
        value: u64,
        /// Restricts the item to one realm when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_major_level: Option<i32>,
    },
    AddHp {
        value: u64,
    },
    PermanentStat {
        stat: StatKind,
        value: i64,
    },
    BreakthroughRate {
        value: f64,
        target_major_level: i32,
    },
    TempBuff {
        stat: StatKind,
        value: f64,
        duration: u32,
    },
    SelfBuff {
        stat: StatKind,
        value: f64,
        #[serde(default = "default_buff_rounds")]
        duration: u32,
    },
    SelfBuffPercent {
        value: f64,
        duration: u32,
    },
    SacrificeBuff {
        cost_hp_percent: f64,
        buff_multiplier: f64,
    },
    Damage {
        damage_type: String,
        multiplier: f64,
    },
    MultiHitDamage {
        hits: u32,
        multiplier: f64,
    },
    TrueDamage {
        multiplier: f64,
        #[serde(default)]
        armor_pen: f64,
    },
    HealOverTime {
        percent: f64,
        duration: u32,
    },
    ExpRate {
        value: f64,
    },
    AddFlatStat {
        value: StatMap,
    },
    AddPercentStat {
        value: StatMap,
    },
    Control {
        stun_rounds: u32,
    },
    Invincible {
        duration: u32,
    },
    SecondWind {
        trigger_hp: f64,
        heal_percent: f64,
    },
    InstantWin {
        chance: f64,
    },
    ControlResistance {
        value: f64,
    },
    Thorns {
        percent: f64,
    },
    RerollSpiritRoot,
    Cosmetic,
    /// Any kind this engine does not know. Kept so catalogs with newer kinds still load.
    #[serde(other)]
    Unrecognized,
}

impl Effect {
    /// Short kind name, matching the serialized tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Effect::AddExp { .. } => "add_exp",
            Effect::AddHp { .. } => "add_hp",
            Effect::PermanentStat { .. } => "permanent_stat",
            Effect::BreakthroughRate { .. } => "breakthrough_rate",
            Effect::TempBuff { .. } => "temp_buff",
            Effect::SelfBuff { .. } => "self_buff",
            Effect::SelfBuffPercent { .. } => "self_buff_percent",
            Effect::SacrificeBuff { .. } => "sacrifice_buff",
            Effect::Damage { .. } => "damage",
            Effect::MultiHitDamage { .. } => "multi_hit_damage",
            Effect::TrueDamage { .. } => "true_damage",
            Effect::HealOverTime { .. } => "heal_over_time",
            Effect::ExpRate { .. } => "exp_rate",
            Effect::AddFlatStat { .. } => "add_flat_stat",
            Effect::AddPercentStat { .. } => "add_percent_stat",
            Effect::Control { .. } => "control",
            Effect::Invincible { .. } => "invincible",
            Effect::SecondWind { .. } => "second_wind",
            Effect::InstantWin { .. } => "instant_win",
            Effect::ControlResistance { .. } => "control_resistance",
            Effect::Thorns { .. } => "thorns",
            Effect::RerollSpiritRoot => "reroll_spirit_root",
            Effect::Cosmetic => "cosmetic",
            Effect::Unrecognized => "unrecognized",
        }
    }

    /// Bonus to breakthrough probability if this effect applies at realm `major`.
    pub fn breakthrough_bonus(&self, major: u8) -> Option<f64> {
        match self {
            Effect::BreakthroughRate {
                value,
                target_major_level,
            } if *target_major_level == ANY_REALM || *target_major_level == i32::from(major) => {
                Some(*value)
            }
            _ => None,
        }
    }
}

/// What a successful player-context application did.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEffectOutcome {
    ExpGained { amount: u64, total: u64 },
    HpRestored { amount: u64, hp: u64 },
    StatRaised { stat: StatKind, value: i64 },
    SpiritRootChanged { from: SpiritRoot, to: SpiritRoot },
    NoEffect,
}

/// Reject effects that cannot be applied to `player` through the "use" path.
///
/// Run this before consuming the item so that a rejected use costs nothing.
pub fn check_player_applicable(effect: &Effect, player: &PlayerRecord) -> Result<(), XiuxianError> {
    match effect {
        Effect::AddExp {
            target_major_level: Some(target),
            ..
        } if *target != ANY_REALM && *target != i32::from(player.major_level) => {
            Err(XiuxianError::NotApplicable(Unusable::WrongRealm))
        }
        Effect::AddExp { .. } | Effect::AddHp { .. } | Effect::RerollSpiritRoot | Effect::Cosmetic => {
            Ok(())
        }
        Effect::PermanentStat { stat, .. } if stat.is_core() => Ok(()),
        Effect::PermanentStat { stat, .. } => Err(XiuxianError::NotApplicable(
            Unusable::NotPermanent(format!("{:?}", stat)),
        )),
        Effect::BreakthroughRate { .. } => Err(XiuxianError::NotApplicable(Unusable::BreakthroughOnly)),
        Effect::TempBuff { .. } => Err(XiuxianError::NotApplicable(Unusable::DuelOnly)),
        Effect::SelfBuff { .. }
        | Effect::SelfBuffPercent { .. }
        | Effect::SacrificeBuff { .. }
        | Effect::Damage { .. }
        | Effect::MultiHitDamage { .. }
        | Effect::TrueDamage { .. }
        | Effect::HealOverTime { .. }
        | Effect::Control { .. }
        | Effect::Invincible { .. }
        | Effect::InstantWin { .. } => Err(XiuxianError::NotApplicable(Unusable::CombatOnly(effect.kind()))),
        Effect::ExpRate { .. }
        | Effect::AddFlatStat { .. }
        | Effect::AddPercentStat { .. }
        | Effect::SecondWind { .. }
        | Effect::ControlResistance { .. }
        | Effect::Thorns { .. } => Err(XiuxianError::NotApplicable(Unusable::PassiveOnly(effect.kind()))),
        Effect::Unrecognized => Err(XiuxianError::NotApplicable(Unusable::Unrecognized)),
    }
}

/// Apply `effect` to `player`. `equipped` lists the bonuses of the player's worn gear and is
/// only consulted when the effect triggers stat recomposition.
pub fn apply_to_player(
    effect: &Effect,
    player: &mut PlayerRecord,
    equipped: &[EquipmentBonus],
    dice: &mut dyn Dice,
) -> Result<PlayerEffectOutcome, XiuxianError> {
    check_player_applicable(effect, player)?;
    let outcome = match effect {
        Effect::AddExp { value, .. } => {
            player.exp = player.exp.saturating_add(*value);
            PlayerEffectOutcome::ExpGained {
                amount: *value,
                total: player.exp,
            }
        }
        Effect::AddHp { value } => {
            let before = player.hp;
            player.hp = player.hp.saturating_add(*value).min(player.max_hp);
            PlayerEffectOutcome::HpRestored {
                amount: player.hp - before,
                hp: player.hp,
            }
        }
        Effect::PermanentStat { stat, value } => {
            player.bonus.add(*stat, *value);
            stats::apply_recomputed(player, equipped);
            PlayerEffectOutcome::StatRaised {
                stat: *stat,
                value: *value,
            }
        }
        Effect::RerollSpiritRoot => {
            let from = player.spirit_root;
            let to = SpiritRoot::ALL[dice.pick(SpiritRoot::ALL.len())];
            player.spirit_root = to;
            PlayerEffectOutcome::SpiritRootChanged { from, to }
        }
        Effect::Cosmetic => PlayerEffectOutcome::NoEffect,
        // Everything else was rejected by check_player_applicable.
        other => return Err(XiuxianError::NotApplicable(Unusable::CombatOnly(other.kind()))),
    };
    debug!(
        "effect {} applied to player {}: {:?}",
        effect.kind(),
        player.id,
        outcome
    );
    Ok(outcome)
}

/// What a combat-context application did.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEffectOutcome {
    Buffed,
    Sacrificed { hp_cost: i64 },
    TechniqueReady,
    Regenerating,
    Stunned { rounds: u32 },
    Resisted,
    Shielded { rounds: u32 },
    PassiveArmed,
    InstantVictory,
    Fizzled,
    NoEffect,
}

/// Apply a combat-scoped `effect` cast by `caster` against `target`.
pub fn apply_to_combat(
    effect: &Effect,
    caster: &mut Combatant,
    target: &mut Combatant,
    dice: &mut dyn Dice,
) -> Result<CombatEffectOutcome, XiuxianError> {
    let outcome = match effect {
        Effect::TempBuff {
            stat,
            value,
            duration,
        }
        | Effect::SelfBuff {
            stat,
            value,
            duration,
        } => {
            caster.state.modifiers.push(Modifier {
                stat: Some(*stat),
                amount: ModifierAmount::Flat(*value),
                rounds_left: *duration,
            });
            CombatEffectOutcome::Buffed
        }
        Effect::SelfBuffPercent { value, duration } => {
            caster.state.modifiers.push(Modifier {
                stat: None,
                amount: ModifierAmount::Percent(*value),
                rounds_left: *duration,
            });
            CombatEffectOutcome::Buffed
        }
        Effect::SacrificeBuff {
            cost_hp_percent,
            buff_multiplier,
        } => {
            let cost = (caster.max_hp as f64 * cost_hp_percent).floor() as i64;
            // A sacrifice never kills the caster outright.
            let hp_cost = cost.min(caster.hp - 1).max(0);
            caster.hp -= hp_cost;
            caster.state.next_strike_multiplier *= buff_multiplier;
            CombatEffectOutcome::Sacrificed { hp_cost }
        }
        Effect::Damage { multiplier, .. } => {
            caster.state.pending_technique = Some(StrikeTechnique {
                hits: 1,
                multiplier: *multiplier,
                armor_pen: 0.0,
            });
            CombatEffectOutcome::TechniqueReady
        }
        Effect::MultiHitDamage { hits, multiplier } => {
            caster.state.pending_technique = Some(StrikeTechnique {
                hits: (*hits).max(1),
                multiplier: *multiplier,
                armor_pen: 0.0,
            });
            CombatEffectOutcome::TechniqueReady
        }
        Effect::TrueDamage {
            multiplier,
            armor_pen,
        } => {
            caster.state.pending_technique = Some(StrikeTechnique {
                hits: 1,
                multiplier: *multiplier,
                armor_pen: armor_pen.clamp(0.0, 1.0),
            });
            CombatEffectOutcome::TechniqueReady
        }
        Effect::HealOverTime { percent, duration } => {
            caster.state.regen = Some(Regen {
                percent: *percent,
                rounds_left: *duration,
            });
            CombatEffectOutcome::Regenerating
        }
        Effect::Control { stun_rounds } => {
            if dice.chance() < target.state.control_resistance {
                CombatEffectOutcome::Resisted
            } else {
                target.state.stunned_rounds += stun_rounds;
                CombatEffectOutcome::Stunned {
                    rounds: *stun_rounds,
                }
            }
        }
        Effect::Invincible { duration } => {
            caster.state.invincible_rounds += duration;
            CombatEffectOutcome::Shielded { rounds: *duration }
        }
        Effect::SecondWind {
            trigger_hp,
            heal_percent,
        } => {
            caster.state.second_wind = Some(SecondWind {
                trigger_hp: *trigger_hp,
                heal_percent: *heal_percent,
                used: false,
            });
            CombatEffectOutcome::PassiveArmed
        }
        Effect::ControlResistance { value } => {
            caster.state.control_resistance = (caster.state.control_resistance + value).min(1.0);
            CombatEffectOutcome::PassiveArmed
        }
        Effect::Thorns { percent } => {
            caster.state.thorns += percent;
            CombatEffectOutcome::PassiveArmed
        }
        Effect::InstantWin { chance } => {
            if dice.chance() < *chance {
                target.hp = 0;
                CombatEffectOutcome::InstantVictory
            } else {
                CombatEffectOutcome::Fizzled
            }
        }
        Effect::Cosmetic => CombatEffectOutcome::NoEffect,
        Effect::AddExp { .. }
        | Effect::AddHp { .. }
        | Effect::PermanentStat { .. }
        | Effect::BreakthroughRate { .. }
        | Effect::ExpRate { .. }
        | Effect::AddFlatStat { .. }
        | Effect::AddPercentStat { .. }
        | Effect::RerollSpiritRoot => {
            return Err(XiuxianError::NotApplicable(Unusable::NotInCombat(effect.kind())))
        }
        Effect::Unrecognized => return Err(XiuxianError::NotApplicable(Unusable::Unrecognized)),
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xiuxian::dice::ScriptedDice;
    use crate::xiuxian::types::SkillDescriptor;

    fn player() -> PlayerRecord {
        let mut p = PlayerRecord::new("p1", "Tester", SpiritRoot::Wood);
        stats::apply_recomputed(&mut p, &[]);
        p
    }

    fn fighter(name: &str) -> Combatant {
        Combatant::new(name, 200, 200, 30, 10)
    }

    #[test]
    fn descriptors_parse_from_catalog_json() {
        let e: Effect =
            serde_json::from_str(r#"{"effect": "breakthrough_rate", "value": 0.2, "target_major_level": 0}"#)
                .unwrap();
        assert_eq!(e.breakthrough_bonus(0), Some(0.2));
        assert_eq!(e.breakthrough_bonus(1), None);

        let e: Effect = serde_json::from_str(r#"{"effect": "temp_buff", "stat": "attack", "value": 20, "duration": 10}"#).unwrap();
        assert_eq!(
            e,
            Effect::TempBuff {
                stat: StatKind::Attack,
                value: 20.0,
                duration: 10
            }
        );

        let e: Effect = serde_json::from_str(r#"{"effect": "summon", "count": 2}"#).unwrap();
        assert_eq!(e, Effect::Unrecognized);
    }

    #[test]
    fn skill_descriptor_keeps_flat_layout() {
        let json = r#"{"skill_name": "铁布衫", "type": "passive", "effect": "add_flat_stat", "value": {"defense": 10, "max_hp": 50}}"#;
        let skill: SkillDescriptor = serde_json::from_str(json).unwrap();
        assert!(skill.is_passive());
        match &skill.effect {
            Effect::AddFlatStat { value } => {
                assert_eq!(value.get(&StatKind::Defense), Some(&10.0));
                assert_eq!(value.get(&StatKind::MaxHp), Some(&50.0));
            }
            other => panic!("unexpected effect {:?}", other),
        }
        let back = serde_json::to_value(&skill).unwrap();
        assert_eq!(back["effect"], "add_flat_stat");
        assert_eq!(back["skill_name"], "铁布衫");
    }

    #[test]
    fn wildcard_breakthrough_matches_every_realm() {
        let e = Effect::BreakthroughRate {
            value: 0.02,
            target_major_level: ANY_REALM,
        };
        for major in 0..9 {
            assert_eq!(e.breakthrough_bonus(major), Some(0.02));
        }
    }

    #[test]
    fn add_hp_caps_at_max() {
        let mut p = player();
        p.hp = 50;
        let mut dice = ScriptedDice::new();
        let out = apply_to_player(&Effect::AddHp { value: 999_999 }, &mut p, &[], &mut dice).unwrap();
        assert_eq!(
            out,
            PlayerEffectOutcome::HpRestored {
                amount: p.max_hp - 50,
                hp: p.max_hp
            }
        );
    }

    #[test]
    fn permanent_stat_survives_recomposition() {
        let mut p = player();
        let before = p.attack;
        let mut dice = ScriptedDice::new();
        apply_to_player(
            &Effect::PermanentStat {
                stat: StatKind::Attack,
                value: 10,
            },
            &mut p,
            &[],
            &mut dice,
        )
        .unwrap();
        assert_eq!(p.attack, before + 10);
        stats::apply_recomputed(&mut p, &[]);
        assert_eq!(p.attack, before + 10);
    }

    #[test]
    fn realm_bound_exp_elixir_rejects_other_realms() {
        let mut p = player();
        let effect = Effect::AddExp {
            value: 100,
            target_major_level: Some(3),
        };
        let mut dice = ScriptedDice::new();
        let err = apply_to_player(&effect, &mut p, &[], &mut dice).unwrap_err();
        assert!(matches!(err, XiuxianError::NotApplicable(_)));
        assert_eq!(p.exp, 0);

        p.major_level = 3;
        apply_to_player(&effect, &mut p, &[], &mut dice).unwrap();
        assert_eq!(p.exp, 100);
    }

    #[test]
    fn combat_and_unknown_kinds_are_not_usable_on_player() {
        let p = player();
        for effect in [
            Effect::TempBuff {
                stat: StatKind::Dodge,
                value: 0.1,
                duration: 5,
            },
            Effect::BreakthroughRate {
                value: 0.2,
                target_major_level: 0,
            },
            Effect::ExpRate { value: 0.05 },
            Effect::Unrecognized,
        ] {
            assert!(matches!(
                check_player_applicable(&effect, &p),
                Err(XiuxianError::NotApplicable(_))
            ));
        }
    }

    #[test]
    fn reroll_picks_from_dice() {
        let mut p = player();
        let mut dice = ScriptedDice::new().with_rolls([5]);
        let out = apply_to_player(&Effect::RerollSpiritRoot, &mut p, &[], &mut dice).unwrap();
        assert_eq!(
            out,
            PlayerEffectOutcome::SpiritRootChanged {
                from: SpiritRoot::Wood,
                to: SpiritRoot::Heavenly
            }
        );
    }

    #[test]
    fn sacrifice_costs_hp_and_primes_next_strike() {
        let mut a = fighter("a");
        let mut b = fighter("b");
        let mut dice = ScriptedDice::new();
        let out = apply_to_combat(
            &Effect::SacrificeBuff {
                cost_hp_percent: 0.2,
                buff_multiplier: 2.5,
            },
            &mut a,
            &mut b,
            &mut dice,
        )
        .unwrap();
        assert_eq!(out, CombatEffectOutcome::Sacrificed { hp_cost: 40 });
        assert_eq!(a.hp, 160);
        assert_eq!(a.state.next_strike_multiplier, 2.5);
    }

    #[test]
    fn control_respects_resistance() {
        let mut a = fighter("a");
        let mut b = fighter("b");
        b.state.control_resistance = 0.5;
        let mut dice = ScriptedDice::new().with_chances([0.3, 0.7]);
        let stun = Effect::Control { stun_rounds: 1 };
        assert_eq!(
            apply_to_combat(&stun, &mut a, &mut b, &mut dice).unwrap(),
            CombatEffectOutcome::Resisted
        );
        assert_eq!(
            apply_to_combat(&stun, &mut a, &mut b, &mut dice).unwrap(),
            CombatEffectOutcome::Stunned { rounds: 1 }
        );
        assert_eq!(b.state.stunned_rounds, 1);
    }

    #[test]
    fn player_kinds_are_rejected_in_combat() {
        let mut a = fighter("a");
        let mut b = fighter("b");
        let mut dice = ScriptedDice::new();
        let err = apply_to_combat(&Effect::AddExp { value: 1, target_major_level: None }, &mut a, &mut b, &mut dice)
            .unwrap_err();
        assert!(matches!(err, XiuxianError::NotApplicable(_)));
    }
}
