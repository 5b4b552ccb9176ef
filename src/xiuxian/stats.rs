//! Stat composition: realm base stats, permanent bonuses, equipment and passive skills.

use crate::xiuxian::effect::Effect;
use crate::xiuxian::types::{DerivedStats, EquipmentBonus, PlayerRecord, StatKind};

#[derive(Debug, Clone, Copy)]
struct Block {
    attack: f64,
    defense: f64,
    max_hp: f64,
}

impl Block {
    fn add(&mut self, stat: StatKind, value: f64) {
        match stat {
            StatKind::Attack => self.attack += value,
            StatKind::Defense => self.defense += value,
            StatKind::MaxHp => self.max_hp += value,
            // Combat-only stats never reach the composed block.
            StatKind::Dodge | StatKind::Speed => {}
        }
    }
}

fn floor_to_u64(value: f64) -> u64 {
    if value <= 0.0 {
        0
    } else {
        value.floor() as u64
    }
}

/// Base attack, defense and max HP of a ladder position.
pub fn base_stats(major: u8, minor: u8) -> (i64, i64, i64) {
    let (major, minor) = (i64::from(major), i64::from(minor));
    (
        10 + 10 * major + 2 * minor,
        5 + 8 * major + minor,
        100 + 100 * major + 10 * minor,
    )
}

/// Compose the derived stat block of `player` wearing `equipped`.
///
/// Final value per stat is `floor((base + bonus + equipment + passive flat) * percent)`,
/// where the percent multiplier starts at 1.0 and passive `add_percent_stat` entries add
/// to it. Current HP is only ever capped downward. Calling this twice yields the same block.
pub fn recompute(player: &PlayerRecord, equipped: &[EquipmentBonus]) -> DerivedStats {
    let (attack, defense, max_hp) = base_stats(player.major_level, player.minor_level);
    let mut flat = Block {
        attack: (attack + player.bonus.attack) as f64,
        defense: (defense + player.bonus.defense) as f64,
        max_hp: (max_hp + player.bonus.max_hp) as f64,
    };
    for item in equipped {
        flat.attack += item.attack as f64;
        flat.defense += item.defense as f64;
        flat.max_hp += item.hp as f64;
    }

    let mut percent = Block {
        attack: 1.0,
        defense: 1.0,
        max_hp: 1.0,
    };
    for skill in player.passive_skills() {
        match &skill.effect {
            Effect::AddFlatStat { value } => {
                for (stat, v) in value {
                    flat.add(*stat, *v);
                }
            }
            Effect::AddPercentStat { value } => {
                for (stat, v) in value {
                    percent.add(*stat, *v);
                }
            }
            _ => {}
        }
    }

    let max_hp = floor_to_u64(flat.max_hp * percent.max_hp);
    DerivedStats {
        attack: floor_to_u64(flat.attack * percent.attack),
        defense: floor_to_u64(flat.defense * percent.defense),
        max_hp,
        hp: player.hp.min(max_hp),
    }
}

/// Recompose and write the result back into `player`.
pub fn apply_recomputed(player: &mut PlayerRecord, equipped: &[EquipmentBonus]) -> DerivedStats {
    let stats = recompute(player, equipped);
    player.attack = stats.attack;
    player.defense = stats.defense;
    player.max_hp = stats.max_hp;
    player.hp = stats.hp;
    stats
}

/// Sum of the passive `exp_rate` bonuses a player has learned.
pub fn exp_rate_bonus(player: &PlayerRecord) -> f64 {
    player
        .passive_skills()
        .filter_map(|skill| match skill.effect {
            Effect::ExpRate { value } => Some(value),
            _ => None,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xiuxian::types::{SkillDescriptor, SpiritRoot, StatMap};

    fn player_at(major: u8, minor: u8) -> PlayerRecord {
        let mut p = PlayerRecord::new("p", "P", SpiritRoot::Metal);
        p.major_level = major;
        p.minor_level = minor;
        p.hp = 10_000;
        p
    }

    fn map(entries: &[(StatKind, f64)]) -> StatMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn base_stats_follow_realm() {
        let p = player_at(0, 1);
        let s = recompute(&p, &[]);
        assert_eq!((s.attack, s.defense, s.max_hp), (12, 6, 110));
        assert_eq!(s.hp, 110);

        let p = player_at(2, 3);
        let s = recompute(&p, &[]);
        assert_eq!((s.attack, s.defense, s.max_hp), (36, 24, 330));
    }

    #[test]
    fn equipment_and_skills_stack() {
        let mut p = player_at(0, 1);
        p.skills.insert(
            "铁布衫".into(),
            SkillDescriptor::passive(
                "铁布衫",
                Effect::AddFlatStat {
                    value: map(&[(StatKind::Defense, 10.0), (StatKind::MaxHp, 50.0)]),
                },
            ),
        );
        p.skills.insert(
            "金刚诀".into(),
            SkillDescriptor::passive(
                "金刚诀",
                Effect::AddPercentStat {
                    value: map(&[(StatKind::Defense, 0.10)]),
                },
            ),
        );
        p.skills.insert(
            "青元剑诀".into(),
            SkillDescriptor::passive(
                "青元剑诀",
                Effect::AddPercentStat {
                    value: map(&[(StatKind::Defense, 0.10), (StatKind::Attack, 0.10)]),
                },
            ),
        );
        let sword = EquipmentBonus {
            attack: 12,
            defense: 0,
            hp: 0,
        };
        let armor = EquipmentBonus {
            attack: 0,
            defense: 10,
            hp: 50,
        };
        let s = recompute(&p, &[sword, armor]);
        // (12 + 12) * 1.1, (6 + 10 + 10) * 1.2, 110 + 50 + 50
        assert_eq!(s.attack, 26);
        assert_eq!(s.defense, 31);
        assert_eq!(s.max_hp, 210);
    }

    #[test]
    fn active_skills_and_combat_stats_are_ignored() {
        let mut p = player_at(0, 1);
        p.skills.insert(
            "神行百变".into(),
            SkillDescriptor::passive(
                "神行百变",
                Effect::AddFlatStat {
                    value: map(&[(StatKind::Dodge, 0.05)]),
                },
            ),
        );
        p.skills.insert(
            "火球术".into(),
            SkillDescriptor::active(
                "火球术",
                Effect::Damage {
                    damage_type: "fire".into(),
                    multiplier: 1.2,
                },
            ),
        );
        assert_eq!(recompute(&p, &[]), recompute(&player_at(0, 1), &[]));
    }

    #[test]
    fn recomposition_is_idempotent_and_caps_hp() {
        let mut p = player_at(1, 2);
        let first = apply_recomputed(&mut p, &[]);
        let second = apply_recomputed(&mut p, &[]);
        assert_eq!(first, second);
        assert_eq!(p.hp, p.max_hp);

        p.hp = 5;
        let s = apply_recomputed(&mut p, &[]);
        assert_eq!(s.hp, 5);
    }

    #[test]
    fn permanent_bonus_is_part_of_base() {
        let mut p = player_at(0, 1);
        p.bonus.attack = 10;
        p.bonus.max_hp = 100;
        let s = recompute(&p, &[]);
        assert_eq!(s.attack, 22);
        assert_eq!(s.max_hp, 210);
    }

    #[test]
    fn exp_rate_bonus_sums_passives() {
        let mut p = player_at(0, 1);
        p.skills.insert(
            "长春功".into(),
            SkillDescriptor::passive("长春功", Effect::ExpRate { value: 0.05 }),
        );
        p.skills.insert(
            "混元功".into(),
            SkillDescriptor::passive("混元功", Effect::ExpRate { value: 0.12 }),
        );
        assert!((exp_rate_bonus(&p) - 0.17).abs() < 1e-9);
    }
}
