use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::xiuxian::effect::Effect;

pub const PLAYER_SCHEMA_VERSION: u8 = 1;
pub const ITEM_SCHEMA_VERSION: u8 = 1;

/// Gold granted to every newly created character.
pub const INITIAL_GOLD: u64 = 100;

/// Innate affinity fixed at character creation; scales seclusion accrual.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SpiritRoot {
    #[serde(rename = "金")]
    Metal,
    #[serde(rename = "木")]
    Wood,
    #[serde(rename = "水")]
    Water,
    #[serde(rename = "火")]
    Fire,
    #[serde(rename = "土")]
    Earth,
    #[serde(rename = "天")]
    Heavenly,
    #[serde(rename = "废")]
    Mundane,
}

impl SpiritRoot {
    pub const ALL: [SpiritRoot; 7] = [
        SpiritRoot::Metal,
        SpiritRoot::Wood,
        SpiritRoot::Water,
        SpiritRoot::Fire,
        SpiritRoot::Earth,
        SpiritRoot::Heavenly,
        SpiritRoot::Mundane,
    ];

    /// Multiplier applied to experience gained in seclusion.
    pub fn rate(self) -> f64 {
        match self {
            SpiritRoot::Metal => 1.5,
            SpiritRoot::Wood => 1.4,
            SpiritRoot::Water => 1.6,
            SpiritRoot::Fire => 1.8,
            SpiritRoot::Earth => 1.2,
            SpiritRoot::Heavenly => 2.5,
            SpiritRoot::Mundane => 0.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpiritRoot::Metal => "金",
            SpiritRoot::Wood => "木",
            SpiritRoot::Water => "水",
            SpiritRoot::Fire => "火",
            SpiritRoot::Earth => "土",
            SpiritRoot::Heavenly => "天",
            SpiritRoot::Mundane => "废",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SpiritRoot::Metal => "庚金之体，攻击犀利",
            SpiritRoot::Wood => "草木之灵，生机勃勃",
            SpiritRoot::Water => "壬水之躯，防御见长",
            SpiritRoot::Fire => "烈火之魂，爆发力强",
            SpiritRoot::Earth => "厚土之身，根基稳固",
            SpiritRoot::Heavenly => "天选之人，万古奇才",
            SpiritRoot::Mundane => "凡夫俗子，仙路漫漫",
        }
    }
}

/// Equipment slots. Each slot holds at most one item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Helmet,
    Boots,
    Accessory,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 5] = [
        EquipmentSlot::Weapon,
        EquipmentSlot::Armor,
        EquipmentSlot::Helmet,
        EquipmentSlot::Boots,
        EquipmentSlot::Accessory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentSlot::Weapon => "weapon",
            EquipmentSlot::Armor => "armor",
            EquipmentSlot::Helmet => "helmet",
            EquipmentSlot::Boots => "boots",
            EquipmentSlot::Accessory => "accessory",
        }
    }
}

/// Attributes an effect descriptor can name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Attack,
    Defense,
    MaxHp,
    Dodge,
    Speed,
}

impl StatKind {
    /// Stats that feed the composed stat block (the rest only matter in combat).
    pub fn is_core(self) -> bool {
        matches!(self, StatKind::Attack | StatKind::Defense | StatKind::MaxHp)
    }
}

/// Per-stat values keyed by stat, as carried in `add_flat_stat` / `add_percent_stat`.
pub type StatMap = BTreeMap<StatKind, f64>;

/// Permanent attribute bonuses granted by consumables.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatBonus {
    #[serde(default)]
    pub attack: i64,
    #[serde(default)]
    pub defense: i64,
    #[serde(default)]
    pub max_hp: i64,
}

impl StatBonus {
    /// Add `value` to the named stat. Returns false for stats with no permanent slot.
    pub fn add(&mut self, stat: StatKind, value: i64) -> bool {
        match stat {
            StatKind::Attack => self.attack += value,
            StatKind::Defense => self.defense += value,
            StatKind::MaxHp => self.max_hp += value,
            StatKind::Dodge | StatKind::Speed => return false,
        }
        true
    }
}

/// Output of stat composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStats {
    pub attack: u64,
    pub defense: u64,
    pub max_hp: u64,
    pub hp: u64,
}

/// Flat bonuses granted by a piece of equipment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquipmentBonus {
    #[serde(default)]
    pub attack: i64,
    #[serde(default)]
    pub defense: i64,
    #[serde(default)]
    pub hp: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Passive,
    Active,
}

/// A learned (or learnable) technique: its name, whether it is always on, and what it does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillDescriptor {
    pub skill_name: String,
    #[serde(rename = "type")]
    pub kind: SkillKind,
    #[serde(flatten)]
    pub effect: Effect,
}

impl SkillDescriptor {
    pub fn passive(name: &str, effect: Effect) -> Self {
        Self {
            skill_name: name.to_string(),
            kind: SkillKind::Passive,
            effect,
        }
    }

    pub fn active(name: &str, effect: Effect) -> Self {
        Self {
            skill_name: name.to_string(),
            kind: SkillKind::Active,
            effect,
        }
    }

    pub fn is_passive(&self) -> bool {
        self.kind == SkillKind::Passive
    }
}

/// Category-specific payload of a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ItemKind {
    Elixir { effect: Effect },
    SkillBook { skill: SkillDescriptor },
    Equipment { slot: EquipmentSlot, bonus: EquipmentBonus },
}

/// Coarse item category, as shown in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCategory {
    Elixir,
    SkillBook,
    Equipment(EquipmentSlot),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub name: String,
    pub description: String,
    /// Shop price in gold; zero means the item cannot be bought.
    pub price: u64,
    pub kind: ItemKind,
    pub schema_version: u8,
}

impl ItemRecord {
    pub fn elixir(name: &str, description: &str, price: u64, effect: Effect) -> Self {
        Self::new(name, description, price, ItemKind::Elixir { effect })
    }

    pub fn skill_book(name: &str, description: &str, price: u64, skill: SkillDescriptor) -> Self {
        Self::new(name, description, price, ItemKind::SkillBook { skill })
    }

    pub fn equipment(
        name: &str,
        description: &str,
        price: u64,
        slot: EquipmentSlot,
        bonus: EquipmentBonus,
    ) -> Self {
        Self::new(name, description, price, ItemKind::Equipment { slot, bonus })
    }

    fn new(name: &str, description: &str, price: u64, kind: ItemKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            price,
            kind,
            schema_version: ITEM_SCHEMA_VERSION,
        }
    }

    pub fn category(&self) -> ItemCategory {
        match &self.kind {
            ItemKind::Elixir { .. } => ItemCategory::Elixir,
            ItemKind::SkillBook { .. } => ItemCategory::SkillBook,
            ItemKind::Equipment { slot, .. } => ItemCategory::Equipment(*slot),
        }
    }

    pub fn is_purchasable(&self) -> bool {
        self.price > 0
    }

    /// Equipment bonus, if this item can be worn.
    pub fn equipment_bonus(&self) -> Option<EquipmentBonus> {
        match &self.kind {
            ItemKind::Equipment { bonus, .. } => Some(*bonus),
            _ => None,
        }
    }
}

/// One stack of an item owned by a player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryEntry {
    pub item_name: String,
    pub quantity: u32,
    pub equipped: bool,
    pub acquired_at: DateTime<Utc>,
}

impl InventoryEntry {
    pub fn new(item_name: &str, quantity: u32) -> Self {
        Self {
            item_name: item_name.to_string(),
            quantity,
            equipped: false,
            acquired_at: Utc::now(),
        }
    }
}

/// Outcome of an inventory mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryResult {
    /// Item added; `stacked` is true when an existing entry grew.
    Added { quantity: u32, stacked: bool },
    /// Units removed; the entry is deleted once `remaining` reaches zero.
    Removed { quantity: u32, remaining: u32 },
    /// Not enough units; nothing changed.
    Insufficient { available: u32 },
}

impl InventoryResult {
    pub fn is_removed(&self) -> bool {
        matches!(self, InventoryResult::Removed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    pub id: String,
    pub display_name: String,
    pub major_level: u8,
    pub minor_level: u8,
    pub exp: u64,
    pub gold: u64,
    pub spirit_root: SpiritRoot,
    /// Start of the current (or last checkpointed) seclusion interval; `None` when active.
    #[serde(default)]
    pub seclusion_started_at: Option<DateTime<Utc>>,
    /// When the current seclusion session began; untouched by checkpoints.
    #[serde(default)]
    pub seclusion_entered_at: Option<DateTime<Utc>>,
    /// Experience banked by checkpoints during the current session.
    #[serde(default)]
    pub seclusion_exp_banked: u64,
    pub hp: u64,
    pub max_hp: u64,
    pub attack: u64,
    pub defense: u64,
    /// Bonuses from permanently consumed elixirs; folded into the base stats on recomposition.
    #[serde(default)]
    pub bonus: StatBonus,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, String>,
    #[serde(default)]
    pub skills: BTreeMap<String, SkillDescriptor>,
    #[serde(default)]
    pub last_checkin_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl PlayerRecord {
    /// A fresh character at the bottom of the ladder. Stats are placeholders until recomposed.
    pub fn new(id: &str, display_name: &str, spirit_root: SpiritRoot) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            major_level: 0,
            minor_level: 1,
            exp: 0,
            gold: INITIAL_GOLD,
            spirit_root,
            seclusion_started_at: None,
            seclusion_entered_at: None,
            seclusion_exp_banked: 0,
            hp: 100,
            max_hp: 100,
            attack: 10,
            defense: 5,
            bonus: StatBonus::default(),
            faction: None,
            equipment: BTreeMap::new(),
            skills: BTreeMap::new(),
            last_checkin_date: None,
            created_at: now,
            updated_at: now,
            schema_version: PLAYER_SCHEMA_VERSION,
        }
    }

    pub fn is_in_seclusion(&self) -> bool {
        self.seclusion_started_at.is_some()
    }

    /// Passive skills currently known by the player.
    pub fn passive_skills(&self) -> impl Iterator<Item = &SkillDescriptor> {
        self.skills.values().filter(|skill| skill.is_passive())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spirit_root_serializes_as_glyph() {
        let json = serde_json::to_string(&SpiritRoot::Wood).unwrap();
        assert_eq!(json, "\"木\"");
        let back: SpiritRoot = serde_json::from_str("\"天\"").unwrap();
        assert_eq!(back, SpiritRoot::Heavenly);
        assert_eq!(back.rate(), 2.5);
    }

    #[test]
    fn new_player_starts_at_bottom_rung() {
        let player = PlayerRecord::new("u1", "Alice", SpiritRoot::Earth);
        assert_eq!((player.major_level, player.minor_level), (0, 1));
        assert_eq!(player.gold, INITIAL_GOLD);
        assert!(!player.is_in_seclusion());
        assert!(player.equipment.is_empty());
    }

    #[test]
    fn stat_bonus_rejects_combat_only_stats() {
        let mut bonus = StatBonus::default();
        assert!(bonus.add(StatKind::Attack, 10));
        assert!(bonus.add(StatKind::MaxHp, 100));
        assert!(!bonus.add(StatKind::Dodge, 1));
        assert_eq!(bonus.attack, 10);
        assert_eq!(bonus.max_hp, 100);
    }
}
