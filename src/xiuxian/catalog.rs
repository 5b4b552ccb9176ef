use crate::xiuxian::effect::{Effect, ANY_REALM};
use crate::xiuxian::types::{
    EquipmentBonus, EquipmentSlot, ItemRecord, SkillDescriptor, StatKind, StatMap,
};

/// Number of records in the canonical catalog. Used to detect a seeded store.
pub fn canonical_item_count() -> usize {
    canonical_item_catalog().len()
}

fn stats(entries: &[(StatKind, f64)]) -> StatMap {
    entries.iter().copied().collect()
}

fn add_exp(value: u64) -> Effect {
    Effect::AddExp {
        value,
        target_major_level: None,
    }
}

fn add_hp(value: u64) -> Effect {
    Effect::AddHp { value }
}

fn breakthrough(value: f64, target_major_level: i32) -> Effect {
    Effect::BreakthroughRate {
        value,
        target_major_level,
    }
}

fn temp_buff(stat: StatKind, value: f64, duration: u32) -> Effect {
    Effect::TempBuff {
        stat,
        value,
        duration,
    }
}

fn permanent(stat: StatKind, value: i64) -> Effect {
    Effect::PermanentStat { stat, value }
}

fn elixirs() -> Vec<ItemRecord> {
    vec![
        ItemRecord::elixir("引气丹", "炼气期基础丹药，恢复100点修为。", 50, add_exp(100)),
        ItemRecord::elixir("凝血草", "凡人草药，恢复20点气血。", 20, add_hp(20)),
        ItemRecord::elixir("小还丹", "江湖灵药，恢复100点气血。", 100, add_hp(100)),
        ItemRecord::elixir("大还丹", "强力疗伤药，恢复500点气血。", 450, add_hp(500)),
        ItemRecord::elixir("生生造化丹", "仙家神药，瞬间恢复全部气血。", 5000, add_hp(999_999)),
        ItemRecord::elixir("聚气散", "使用后立即获得500点修为。", 200, add_exp(500)),
        ItemRecord::elixir("黄龙丹", "筑基期丹药，使用后立即获得2500点修为。", 800, add_exp(2500)),
        ItemRecord::elixir("玄天丹", "结丹期丹药，使用后立即获得12000点修为。", 3000, add_exp(12_000)),
        ItemRecord::elixir("紫金丹", "元婴期丹药，使用后立即获得60000点修为。", 10_000, add_exp(60_000)),
        ItemRecord::elixir("筑基丹", "突破至筑基境时自动使用，成功率+20%。", 800, breakthrough(0.20, 0)),
        ItemRecord::elixir("结金丹", "突破至结丹境时自动使用，成功率+15%。", 4000, breakthrough(0.15, 1)),
        ItemRecord::elixir("破婴丹", "突破至元婴境时自动使用，成功率+10%。", 15_000, breakthrough(0.10, 2)),
        ItemRecord::elixir("化神丹", "突破至化神境时自动使用，成功率+5%。", 50_000, breakthrough(0.05, 3)),
        ItemRecord::elixir(
            "清心丹",
            "突破时服用可静心凝神，略微增加成功率。",
            1000,
            breakthrough(0.02, ANY_REALM),
        ),
        ItemRecord::elixir(
            "大力丸",
            "战斗中使用，10回合内攻击力提升20点。",
            300,
            temp_buff(StatKind::Attack, 20.0, 10),
        ),
        ItemRecord::elixir(
            "铁皮散",
            "战斗中使用，10回合内防御力提升15点。",
            300,
            temp_buff(StatKind::Defense, 15.0, 10),
        ),
        ItemRecord::elixir(
            "神行符",
            "战斗中使用，提升闪避率。",
            500,
            temp_buff(StatKind::Dodge, 0.1, 5),
        ),
        ItemRecord::elixir("龙力丹", "极其稀有，永久增加10点攻击力。", 20_000, permanent(StatKind::Attack, 10)),
        ItemRecord::elixir("玄武丹", "极其稀有，永久增加8点防御力。", 20_000, permanent(StatKind::Defense, 8)),
        ItemRecord::elixir("朱果", "天地灵果，永久增加100点最大气血。", 15_000, permanent(StatKind::MaxHp, 100)),
        ItemRecord::elixir(
            "洗髓丹",
            "重塑灵根，或许天选，或许更差。",
            100_000,
            Effect::RerollSpiritRoot,
        ),
        ItemRecord::elixir(
            "养魂丹",
            "元婴期修士专用，缓慢恢复元神之力。",
            2000,
            Effect::AddExp {
                value: 100,
                target_major_level: Some(3),
            },
        ),
        ItemRecord::elixir("驻颜丹", "永葆青春，容颜不老。", 9999, Effect::Cosmetic),
    ]
}

fn skill_book(name: &str, description: &str, price: u64, skill: SkillDescriptor) -> ItemRecord {
    ItemRecord::skill_book(name, description, price, skill)
}

fn passive(name: &str, description: &str, price: u64, effect: Effect) -> ItemRecord {
    skill_book(name, description, price, SkillDescriptor::passive(name, effect))
}

fn active(name: &str, description: &str, price: u64, effect: Effect) -> ItemRecord {
    skill_book(name, description, price, SkillDescriptor::active(name, effect))
}

fn skill_books() -> Vec<ItemRecord> {
    vec![
        passive("长春功", "【被动】基础吐纳法门，修炼速度提升5%。", 500, Effect::ExpRate { value: 0.05 }),
        passive(
            "铁布衫",
            "【被动】凡人武学，永久增加10点防御和50点气血。",
            600,
            Effect::AddFlatStat {
                value: stats(&[(StatKind::Defense, 10.0), (StatKind::MaxHp, 50.0)]),
            },
        ),
        passive(
            "基础剑诀",
            "【被动】增加15点攻击力。",
            600,
            Effect::AddFlatStat {
                value: stats(&[(StatKind::Attack, 15.0)]),
            },
        ),
        active(
            "御风术",
            "【主动】战斗中提升自身速度，抢占先机。",
            800,
            Effect::SelfBuff {
                stat: StatKind::Speed,
                value: 20.0,
                duration: 3,
            },
        ),
        active(
            "火球术",
            "【主动】发出一个火球，造成少量火属性伤害。",
            800,
            Effect::Damage {
                damage_type: "fire".to_string(),
                multiplier: 1.2,
            },
        ),
        passive("混元功", "【被动】筑基期心法，修炼速度提升12%。", 2500, Effect::ExpRate { value: 0.12 }),
        passive(
            "金刚诀",
            "【被动】防御力永久提升10%。",
            3000,
            Effect::AddPercentStat {
                value: stats(&[(StatKind::Defense, 0.10)]),
            },
        ),
        passive(
            "青元剑诀",
            "【被动】攻击力永久提升10%。",
            3000,
            Effect::AddPercentStat {
                value: stats(&[(StatKind::Attack, 0.10)]),
            },
        ),
        active(
            "血燃术",
            "【主动】燃烧气血，下一次攻击造成巨额伤害。",
            5000,
            Effect::SacrificeBuff {
                cost_hp_percent: 0.2,
                buff_multiplier: 2.5,
            },
        ),
        active(
            "土牢术",
            "【主动】困住敌人，使其一回合无法行动。",
            4000,
            Effect::Control { stun_rounds: 1 },
        ),
        passive("大衍诀", "【被动】神识功法，修炼速度提升20%。", 8000, Effect::ExpRate { value: 0.20 }),
        active(
            "万剑归宗",
            "【主动】对敌方造成毁灭性的多段金属型伤害。",
            15_000,
            Effect::MultiHitDamage {
                hits: 5,
                multiplier: 0.5,
            },
        ),
        active(
            "春风化雨",
            "【主动】持续恢复自身气血，持续3回合。",
            12_000,
            Effect::HealOverTime {
                percent: 0.1,
                duration: 3,
            },
        ),
        active(
            "不动明王身",
            "【主动】进入绝对防御状态，免疫所有伤害，持续1回合。",
            20_000,
            Effect::Invincible { duration: 1 },
        ),
        passive(
            "神行百变",
            "【被动】身法秘籍，永久提升闪避率5%。",
            9000,
            Effect::AddFlatStat {
                value: stats(&[(StatKind::Dodge, 0.05)]),
            },
        ),
        passive("忘情天书", "【被动】元婴期顶级心法，修炼速度提升30%。", 25_000, Effect::ExpRate { value: 0.30 }),
        active(
            "元磁神光",
            "【主动】强大的神识攻击，无视部分防御。",
            30_000,
            Effect::TrueDamage {
                multiplier: 1.5,
                armor_pen: 0.3,
            },
        ),
        active(
            "法天象地",
            "【主动】变身为巨人，全属性提升50%，持续3回合。",
            50_000,
            Effect::SelfBuffPercent {
                value: 0.5,
                duration: 3,
            },
        ),
        passive(
            "涅槃真经",
            "【被动】气血低于10%时瞬间恢复50%气血，每场战斗限一次。",
            40_000,
            Effect::SecondWind {
                trigger_hp: 0.1,
                heal_percent: 0.5,
            },
        ),
        passive("太上感应篇", "【被动】化神期心法，修炼速度提升50%。", 100_000, Effect::ExpRate { value: 0.50 }),
        active(
            "言出法随",
            "【主动】口含天宪，有小几率直接判定敌人败北。",
            999_999,
            Effect::InstantWin { chance: 0.001 },
        ),
        active(
            "掌中佛国",
            "【主动】将敌人收入掌中世界，造成巨大空间伤害。",
            250_000,
            Effect::Damage {
                damage_type: "space".to_string(),
                multiplier: 5.0,
            },
        ),
        passive(
            "因果之道",
            "【被动】受到的部分伤害将返还给攻击者。",
            150_000,
            Effect::Thorns { percent: 0.15 },
        ),
        passive(
            "轮回之眼",
            "【被动】看破一切虚妄，大幅降低被控制的几率。",
            120_000,
            Effect::ControlResistance { value: 0.5 },
        ),
        passive(
            "斩三尸证道诀",
            "【被动】大乘境无上法门，全属性永久提升20%。",
            800_000,
            Effect::AddPercentStat {
                value: stats(&[
                    (StatKind::Attack, 0.2),
                    (StatKind::Defense, 0.2),
                    (StatKind::MaxHp, 0.2),
                ]),
            },
        ),
    ]
}

fn gear(attack: i64, defense: i64, hp: i64) -> EquipmentBonus {
    EquipmentBonus {
        attack,
        defense,
        hp,
    }
}

fn equipment() -> Vec<ItemRecord> {
    vec![
        ItemRecord::equipment("青钢剑", "百炼青钢所铸，攻击+12。", 600, EquipmentSlot::Weapon, gear(12, 0, 0)),
        ItemRecord::equipment(
            "玄铁甲",
            "玄铁锻造的护甲，防御+10，气血+50。",
            800,
            EquipmentSlot::Armor,
            gear(0, 10, 50),
        ),
        ItemRecord::equipment(
            "紫金冠",
            "紫金打造的头冠，防御+4，气血+30。",
            500,
            EquipmentSlot::Helmet,
            gear(0, 4, 30),
        ),
        ItemRecord::equipment(
            "踏云靴",
            "足踏祥云，防御+3，气血+20。",
            400,
            EquipmentSlot::Boots,
            gear(0, 3, 20),
        ),
        ItemRecord::equipment(
            "护心玉佩",
            "温养心脉的玉佩，攻击+5，防御+5，气血+40。",
            1200,
            EquipmentSlot::Accessory,
            gear(5, 5, 40),
        ),
    ]
}

/// The item catalog a fresh store is seeded with.
pub fn canonical_item_catalog() -> Vec<ItemRecord> {
    let mut items = elixirs();
    items.extend(skill_books());
    items.extend(equipment());
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xiuxian::types::{ItemCategory, ItemKind};
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique() {
        let items = canonical_item_catalog();
        let names: HashSet<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names.len(), items.len());
    }

    #[test]
    fn every_slot_has_gear() {
        let items = canonical_item_catalog();
        for slot in EquipmentSlot::ALL {
            assert!(
                items.iter().any(|i| i.category() == ItemCategory::Equipment(slot)),
                "no gear for {}",
                slot.as_str()
            );
        }
    }

    #[test]
    fn skill_books_name_their_skill() {
        for item in canonical_item_catalog() {
            if let ItemKind::SkillBook { skill } = &item.kind {
                assert_eq!(skill.skill_name, item.name);
            }
        }
    }

    #[test]
    fn catalog_survives_json() {
        for item in canonical_item_catalog() {
            let json = serde_json::to_vec(&item).unwrap();
            let back: ItemRecord = serde_json::from_slice(&json).unwrap();
            assert_eq!(back, item);
            let effect = match &back.kind {
                ItemKind::Elixir { effect } => Some(effect),
                ItemKind::SkillBook { skill } => Some(&skill.effect),
                ItemKind::Equipment { .. } => None,
            };
            assert_ne!(effect, Some(&Effect::Unrecognized), "{}", item.name);
        }
    }
}
