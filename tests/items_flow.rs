//! Integration tests for using, learning, equipping and buying items

mod common;

use common::{create, edit_player, give, service, t0};
use simple_xiuxian::xiuxian::effect::PlayerEffectOutcome;
use simple_xiuxian::xiuxian::types::EquipmentBonus;
use simple_xiuxian::xiuxian::{EquipmentSlot, ItemRecord, ScriptedDice, XiuxianError};
use tempfile::TempDir;

#[test]
fn test_using_missing_item_changes_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    let before = create(&svc, "u1");
    assert!(matches!(
        svc.use_item("u1", "九转金丹", t0()),
        Err(XiuxianError::NotFound(_))
    ));
    // Known item, but not owned.
    assert!(matches!(
        svc.use_item("u1", "聚气散", t0()),
        Err(XiuxianError::NotFound(_))
    ));
    let after = svc.store().get_player("u1").expect("player");
    assert_eq!(after.exp, before.exp);
    assert_eq!(after.gold, before.gold);
}

#[test]
fn test_exp_elixir_is_consumed_once() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    give(&svc, "u1", "聚气散", 2);

    let report = svc.use_item("u1", "聚气散", t0()).expect("use");
    assert_eq!(
        report.outcome,
        PlayerEffectOutcome::ExpGained {
            amount: 500,
            total: 500
        }
    );
    assert_eq!(report.remaining, 1);
    svc.use_item("u1", "聚气散", t0()).expect("use");
    assert!(svc.store().inventory_entry("u1", "聚气散").expect("read").is_none());
    assert_eq!(svc.store().get_player("u1").expect("player").exp, 1000);
}

#[test]
fn test_healing_is_capped_at_max_hp() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    edit_player(&svc, "u1", |p| p.hp = 50);
    give(&svc, "u1", "小还丹", 1);

    let report = svc.use_item("u1", "小还丹", t0()).expect("use");
    assert_eq!(
        report.outcome,
        PlayerEffectOutcome::HpRestored { amount: 60, hp: 110 }
    );
}

#[test]
fn test_permanent_stat_elixir_recomposes() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    give(&svc, "u1", "朱果", 1);
    svc.use_item("u1", "朱果", t0()).expect("use");

    let player = svc.store().get_player("u1").expect("player");
    assert_eq!(player.bonus.max_hp, 100);
    assert_eq!(player.max_hp, 210);
    assert_eq!(player.hp, 100);
}

#[test]
fn test_wrong_paths_do_not_consume() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    for item in ["长春功", "青钢剑", "筑基丹", "养魂丹", "大力丸"] {
        give(&svc, "u1", item, 1);
        assert!(
            matches!(
                svc.use_item("u1", item, t0()),
                Err(XiuxianError::NotApplicable(_))
            ),
            "{} should not be usable",
            item
        );
        assert_eq!(
            svc.store().inventory_entry("u1", item).expect("read").map(|e| e.quantity),
            Some(1),
            "{} should still be owned",
            item
        );
    }
}

#[test]
fn test_learning_a_passive_skill() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    give(&svc, "u1", "铁布衫", 2);

    let report = svc.learn_skill("u1", "铁布衫", t0()).expect("learn");
    assert_eq!(report.stats.defense, 16);
    assert_eq!(report.stats.max_hp, 160);
    assert!(matches!(
        svc.learn_skill("u1", "铁布衫", t0()),
        Err(XiuxianError::InvalidState(_))
    ));
    assert_eq!(
        svc.store().inventory_entry("u1", "铁布衫").expect("read").map(|e| e.quantity),
        Some(1)
    );
}

#[test]
fn test_learning_from_a_non_book_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    give(&svc, "u1", "小还丹", 1);
    assert!(matches!(
        svc.learn_skill("u1", "小还丹", t0()),
        Err(XiuxianError::NotFound(_))
    ));
    assert!(matches!(
        svc.learn_skill("u1", "聚气散", t0()),
        Err(XiuxianError::NotFound(_))
    ));
    assert_eq!(
        svc.store().inventory_entry("u1", "小还丹").expect("read").map(|e| e.quantity),
        Some(1)
    );
}

#[test]
fn test_equip_replace_and_unequip() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    svc.store()
        .put_item(ItemRecord::equipment(
            "桃木剑",
            "驱邪之剑。",
            0,
            EquipmentSlot::Weapon,
            EquipmentBonus {
                attack: 3,
                defense: 0,
                hp: 0,
            },
        ))
        .expect("put item");
    create(&svc, "u1");
    give(&svc, "u1", "青钢剑", 1);
    give(&svc, "u1", "桃木剑", 1);

    let report = svc.equip_item("u1", "青钢剑", t0()).expect("equip");
    assert_eq!(report.slot, EquipmentSlot::Weapon);
    assert_eq!(report.replaced, None);
    assert_eq!(report.stats.attack, 24);
    assert!(matches!(
        svc.equip_item("u1", "青钢剑", t0()),
        Err(XiuxianError::InvalidState(_))
    ));

    let report = svc.equip_item("u1", "桃木剑", t0()).expect("swap");
    assert_eq!(report.replaced.as_deref(), Some("青钢剑"));
    assert_eq!(report.stats.attack, 15);
    let old = svc
        .store()
        .inventory_entry("u1", "青钢剑")
        .expect("read")
        .expect("still owned");
    assert!(!old.equipped);

    let report = svc.unequip_item("u1", "桃木剑", t0()).expect("unequip");
    assert_eq!(report.stats.attack, 12);
    let player = svc.store().get_player("u1").expect("player");
    assert!(player.equipment.is_empty());
    assert!(matches!(
        svc.unequip_item("u1", "桃木剑", t0()),
        Err(XiuxianError::InvalidState(_))
    ));
}

#[test]
fn test_equip_requires_owned_equipment() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    assert!(matches!(
        svc.equip_item("u1", "玄铁甲", t0()),
        Err(XiuxianError::NotFound(_))
    ));
    give(&svc, "u1", "聚气散", 1);
    assert!(matches!(
        svc.equip_item("u1", "聚气散", t0()),
        Err(XiuxianError::NotApplicable(_))
    ));
}

#[test]
fn test_armor_hp_bonus_raises_max_but_not_current_hp() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    give(&svc, "u1", "玄铁甲", 1);
    let report = svc.equip_item("u1", "玄铁甲", t0()).expect("equip");
    assert_eq!(report.stats.defense, 16);
    assert_eq!(report.stats.max_hp, 160);
    assert_eq!(report.stats.hp, 100);
}

#[test]
fn test_shop_and_purchases() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    svc.store()
        .put_item(ItemRecord::elixir(
            "仙缘果",
            "机缘所得，不可购买。",
            0,
            simple_xiuxian::xiuxian::Effect::Cosmetic,
        ))
        .expect("put item");

    let shop = svc.show_shop().expect("shop");
    assert!(shop.iter().all(|item| item.price > 0));
    assert!(shop.windows(2).all(|w| w[0].price <= w[1].price));
    assert!(!shop.iter().any(|item| item.name == "仙缘果"));

    let report = svc.buy_item("u1", "凝血草", 3, t0()).expect("buy");
    assert_eq!(report.cost, 60);
    assert_eq!(report.gold_left, 40);
    svc.buy_item("u1", "凝血草", 1, t0()).expect("buy again");
    assert_eq!(
        svc.store().inventory_entry("u1", "凝血草").expect("read").map(|e| e.quantity),
        Some(4)
    );

    match svc.buy_item("u1", "小还丹", 1, t0()) {
        Err(XiuxianError::InsufficientResource { needed, available, .. }) => {
            assert_eq!((needed, available), (100, 20));
        }
        other => panic!("expected insufficient gold, got {:?}", other),
    }
    assert!(matches!(
        svc.buy_item("u1", "仙缘果", 1, t0()),
        Err(XiuxianError::NotFound(_))
    ));
    assert_eq!(svc.store().get_player("u1").expect("player").gold, 20);
}

#[test]
fn test_inventory_view_joins_catalog() {
    let dir = TempDir::new().expect("tempdir");
    let svc = service(&dir, ScriptedDice::new());
    create(&svc, "u1");
    give(&svc, "u1", "凝血草", 2);
    give(&svc, "u1", "失传古卷", 1);

    let lines = svc.show_inventory("u1").expect("inventory");
    assert_eq!(lines.len(), 2);
    let herb = lines
        .iter()
        .find(|l| l.entry.item_name == "凝血草")
        .expect("herb line");
    assert_eq!(herb.entry.quantity, 2);
    assert!(herb.item.is_some());
    let scroll = lines
        .iter()
        .find(|l| l.entry.item_name == "失传古卷")
        .expect("scroll line");
    assert!(scroll.item.is_none());
    assert!(matches!(
        svc.show_inventory("ghost"),
        Err(XiuxianError::NotFound(_))
    ));
}
