//! Game service: one method per player-facing operation.
//!
//! Each operation loads the records it needs from the [`XiuxianStore`], runs the engine
//! rules, and writes the results back. Operations on the same identity are serialized
//! through a per-player lock; a duel takes both players' locks in id order.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{GameConfig, RewardRange};
use crate::logutil::{actor, escape_log};
use crate::validation::{sanitize_display_name, validate_player_id};
use crate::xiuxian::breakthrough::{self, BreakthroughReport};
use crate::xiuxian::combat::{Combatant, Duel, DuelOutcome, DuelResult, Side};
use crate::xiuxian::confirm::{Confirmation, ConfirmationStore};
use crate::xiuxian::dice::{Dice, GameRng};
use crate::xiuxian::effect::{self, Effect, PlayerEffectOutcome};
use crate::xiuxian::errors::{Conflict, Missing, Unusable, XiuxianError};
use crate::xiuxian::ranking::{self, RankingEntry, RankingKind};
use crate::xiuxian::realm::{self, RealmInfo};
use crate::xiuxian::seclusion::{self, SeclusionSummary};
use crate::xiuxian::stats;
use crate::xiuxian::storage::XiuxianStore;
use crate::xiuxian::types::{
    DerivedStats, EquipmentBonus, EquipmentSlot, InventoryEntry, InventoryResult, ItemKind,
    ItemRecord, PlayerRecord, SkillDescriptor, SpiritRoot,
};

/// Name given to characters created without one.
pub const DEFAULT_DISPLAY_NAME: &str = "无名道友";

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub player: PlayerRecord,
    pub realm: RealmInfo,
    /// Experience banked by the seclusion checkpoint taken for this read.
    pub seclusion_gain: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinReport {
    pub date: NaiveDate,
    pub gold: u64,
    pub exp: u64,
    pub total_gold: u64,
    pub total_exp: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseReport {
    pub item_name: String,
    pub outcome: PlayerEffectOutcome,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LearnReport {
    pub skill: SkillDescriptor,
    pub stats: DerivedStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuelReport {
    pub challenger_id: String,
    pub challenger_name: String,
    pub defender_id: String,
    pub defender_name: String,
    pub result: DuelResult,
    /// Gold moved from loser to winner; zero on a draw.
    pub reward: u64,
}

impl DuelReport {
    /// `(id, name)` of the winner, if the duel was not drawn.
    pub fn winner(&self) -> Option<(&str, &str)> {
        self.result.outcome.winner().map(|side| match side {
            Side::Challenger => (self.challenger_id.as_str(), self.challenger_name.as_str()),
            Side::Defender => (self.defender_id.as_str(), self.defender_name.as_str()),
        })
    }

    pub fn loser_name(&self) -> Option<&str> {
        self.result.outcome.winner().map(|side| match side {
            Side::Challenger => self.defender_name.as_str(),
            Side::Defender => self.challenger_name.as_str(),
        })
    }
}

/// One inventory line joined with its catalog record. The record is `None` when the item
/// has since been removed from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryLine {
    pub entry: InventoryEntry,
    pub item: Option<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipReport {
    pub item_name: String,
    pub slot: EquipmentSlot,
    pub replaced: Option<String>,
    pub stats: DerivedStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReport {
    pub item_name: String,
    pub quantity: u32,
    pub cost: u64,
    pub gold_left: u64,
}

/// Lazily created lock per player id.
#[derive(Default)]
struct PlayerLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PlayerLocks {
    fn handle(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn hold(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(|e| e.into_inner())
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub struct GameService {
    store: XiuxianStore,
    config: GameConfig,
    dice: Mutex<Box<dyn Dice>>,
    locks: PlayerLocks,
}

impl GameService {
    pub fn new(store: XiuxianStore, config: GameConfig) -> Self {
        Self::with_dice(store, config, Box::new(GameRng::from_entropy()))
    }

    /// Build a service drawing from the given dice. Tests pass seeded or scripted dice.
    pub fn with_dice(store: XiuxianStore, config: GameConfig, dice: Box<dyn Dice>) -> Self {
        Self {
            store,
            config,
            dice: Mutex::new(dice),
            locks: PlayerLocks::default(),
        }
    }

    pub fn store(&self) -> &XiuxianStore {
        &self.store
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// A confirmation store sized to this service's reset window.
    pub fn reset_confirmations(&self) -> ConfirmationStore {
        ConfirmationStore::with_window_secs(self.config.reset_confirm_window_secs)
    }

    fn dice(&self) -> MutexGuard<'_, Box<dyn Dice>> {
        self.dice.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn roll_reward(&self, range: RewardRange) -> u64 {
        let value = self.dice().roll(to_i64(range.min), to_i64(range.max));
        u64::try_from(value).unwrap_or(0)
    }

    /// Calendar day at `now` in the configured game timezone.
    pub fn game_day(&self, now: DateTime<Utc>) -> NaiveDate {
        (now + Duration::hours(i64::from(self.config.utc_offset_hours))).date_naive()
    }

    /// Load a player, banking any seclusion experience accrued up to `now`.
    fn load_checkpointed(&self, id: &str, now: DateTime<Utc>) -> Result<(PlayerRecord, u64), XiuxianError> {
        let mut player = self.store.get_player(id)?;
        let mut gain = 0;
        if player.is_in_seclusion() {
            gain = seclusion::checkpoint(&mut player, now, self.config.exp_per_minute);
            self.store.put_player(player.clone())?;
        }
        Ok((player, gain))
    }

    /// Bonuses of everything the player currently wears.
    pub fn equipped_bonuses(&self, player: &PlayerRecord) -> Result<Vec<EquipmentBonus>, XiuxianError> {
        let mut bonuses = Vec::with_capacity(player.equipment.len());
        for name in player.equipment.values() {
            match self.store.find_item_by_name(name)? {
                Some(item) => bonuses.extend(item.equipment_bonus()),
                None => warn!(
                    "player {} wears {} which is not in the catalog",
                    escape_log(&player.id),
                    escape_log(name)
                ),
            }
        }
        Ok(bonuses)
    }

    fn owned_quantity(&self, id: &str, item_name: &str) -> Result<u32, XiuxianError> {
        Ok(self
            .store
            .inventory_entry(id, item_name)?
            .map_or(0, |entry| entry.quantity))
    }

    fn consume_one(&self, id: &str, item_name: &str) -> Result<u32, XiuxianError> {
        match self.store.remove_from_inventory(id, item_name, 1)? {
            InventoryResult::Removed { remaining, .. } => Ok(remaining),
            InventoryResult::Insufficient { available } => Err(XiuxianError::insufficient(
                "item quantity",
                1,
                u64::from(available),
            )),
            InventoryResult::Added { .. } => Err(XiuxianError::InvalidState(Conflict::Inconsistent(
                "inventory removal reported an addition".to_string(),
            ))),
        }
    }

    /// Take one unit of every duel elixir `id` holds and return what was taken.
    fn take_duel_elixirs(&self, id: &str) -> Result<Vec<(String, Effect)>, XiuxianError> {
        let mut taken = Vec::new();
        for entry in self.store.inventory_of(id)? {
            let Some(ItemRecord {
                kind: ItemKind::Elixir { effect },
                ..
            }) = self.store.find_item_by_name(&entry.item_name)?
            else {
                continue;
            };
            if !matches!(effect, Effect::TempBuff { .. }) {
                continue;
            }
            if self.store.remove_from_inventory(id, &entry.item_name, 1)?.is_removed() {
                taken.push((entry.item_name, effect));
            }
        }
        Ok(taken)
    }

    /// Create a character with a random spirit root and composed starting stats.
    pub fn create_character(&self, id: &str, name: &str, now: DateTime<Utc>) -> Result<PlayerRecord, XiuxianError> {
        let id = validate_player_id(id)
            .map_err(|e| XiuxianError::InvalidState(Conflict::InvalidIdentity(e.to_string())))?;
        let name = sanitize_display_name(name, DEFAULT_DISPLAY_NAME)
            .map_err(|e| XiuxianError::InvalidState(Conflict::InvalidIdentity(e.to_string())))?;
        let lock = self.locks.handle(&id);
        let _guard = hold(&lock);

        if self.store.find_player(&id)?.is_some() {
            return Err(XiuxianError::InvalidState(Conflict::AlreadyCultivating));
        }
        let root = SpiritRoot::ALL[self.dice().pick(SpiritRoot::ALL.len())];
        let mut player = PlayerRecord::new(&id, &name, root);
        player.gold = self.config.initial_gold;
        player.created_at = now;
        // HP keeps the record default; recomposition only ever lowers it.
        stats::apply_recomputed(&mut player, &[]);
        self.store.create_player(player.clone())?;
        info!(
            "new cultivator {} with {} spirit root",
            actor(&id, &name),
            root.name()
        );
        Ok(player)
    }

    pub fn show_status(&self, id: &str, now: DateTime<Utc>) -> Result<StatusReport, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let (player, seclusion_gain) = self.load_checkpointed(id, now)?;
        let realm = realm::realm_info(player.major_level, player.minor_level);
        Ok(StatusReport {
            player,
            realm,
            seclusion_gain,
        })
    }

    pub fn start_seclusion(&self, id: &str, now: DateTime<Utc>) -> Result<PlayerRecord, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let mut player = self.store.get_player(id)?;
        seclusion::enter(&mut player, now)?;
        self.store.put_player(player.clone())?;
        debug!("{} entered seclusion", actor(id, &player.display_name));
        Ok(player)
    }

    pub fn end_seclusion(&self, id: &str, now: DateTime<Utc>) -> Result<SeclusionSummary, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let mut player = self.store.get_player(id)?;
        let summary = seclusion::exit(&mut player, now, self.config.exp_per_minute)?;
        self.store.put_player(player.clone())?;
        debug!(
            "{} left seclusion after {}s with {} exp",
            actor(id, &player.display_name),
            summary.elapsed.num_seconds(),
            summary.exp_gained
        );
        Ok(summary)
    }

    /// Attempt the next breakthrough, consuming the best applicable elixir held.
    pub fn attempt_breakthrough(&self, id: &str, now: DateTime<Utc>) -> Result<BreakthroughReport, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let (mut player, _) = self.load_checkpointed(id, now)?;
        breakthrough::check_eligible(&player)?;

        let mut held: Vec<(String, Effect)> = Vec::new();
        for entry in self.store.inventory_of(id)? {
            if entry.quantity == 0 {
                continue;
            }
            if let Some(ItemRecord {
                kind: ItemKind::Elixir { effect },
                ..
            }) = self.store.find_item_by_name(&entry.item_name)?
            {
                held.push((entry.item_name, effect));
            }
        }
        let mut elixir = breakthrough::choose_elixir(
            player.major_level,
            held.iter().map(|(name, effect)| (name.as_str(), effect)),
        );
        if let Some(choice) = &elixir {
            if !self.store.remove_from_inventory(id, &choice.item_name, 1)?.is_removed() {
                elixir = None;
            }
        }

        let equipped = self.equipped_bonuses(&player)?;
        let report = {
            let mut dice = self.dice();
            breakthrough::resolve(&mut player, elixir, &equipped, &mut **dice)?
        };
        self.store.put_player(player.clone())?;
        info!(
            "{} breakthrough {:?} -> {:?}: {}",
            actor(id, &player.display_name),
            report.from,
            report.to,
            if report.success { "success" } else { "failure" }
        );
        Ok(report)
    }

    /// Once-per-game-day gold and experience, scaled by major realm.
    pub fn daily_checkin(&self, id: &str, now: DateTime<Utc>) -> Result<CheckinReport, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let (mut player, _) = self.load_checkpointed(id, now)?;
        let today = self.game_day(now);
        if player.last_checkin_date == Some(today) {
            return Err(XiuxianError::RateLimited("already checked in today".to_string()));
        }
        let major = u64::from(player.major_level);
        let gold = self.roll_reward(self.config.checkin_gold) + self.config.checkin_gold_per_realm * major;
        let exp = self.roll_reward(self.config.checkin_exp) + self.config.checkin_exp_per_realm * major;
        player.gold = player.gold.saturating_add(gold);
        player.exp = player.exp.saturating_add(exp);
        player.last_checkin_date = Some(today);
        self.store.put_player(player.clone())?;
        Ok(CheckinReport {
            date: today,
            gold,
            exp,
            total_gold: player.gold,
            total_exp: player.exp,
        })
    }

    /// Use one unit of an owned elixir. Skill books and equipment are redirected.
    pub fn use_item(&self, id: &str, item_name: &str, now: DateTime<Utc>) -> Result<UseReport, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let (mut player, _) = self.load_checkpointed(id, now)?;
        let item = self.store.get_item(item_name)?;
        if self.owned_quantity(id, &item.name)? == 0 {
            return Err(XiuxianError::NotFound(Missing::NotOwned(item.name.clone())));
        }
        let effect = match &item.kind {
            ItemKind::Elixir { effect } => effect,
            ItemKind::SkillBook { .. } => {
                return Err(XiuxianError::NotApplicable(Unusable::SkillBook(item.name.clone())))
            }
            ItemKind::Equipment { .. } => {
                return Err(XiuxianError::NotApplicable(Unusable::Equipment(item.name.clone())))
            }
        };
        effect::check_player_applicable(effect, &player)?;
        let remaining = self.consume_one(id, &item.name)?;

        let equipped = self.equipped_bonuses(&player)?;
        let outcome = {
            let mut dice = self.dice();
            effect::apply_to_player(effect, &mut player, &equipped, &mut **dice)?
        };
        self.store.put_player(player.clone())?;
        debug!(
            "{} used {}: {:?}",
            actor(id, &player.display_name),
            escape_log(&item.name),
            outcome
        );
        Ok(UseReport {
            item_name: item.name,
            outcome,
            remaining,
        })
    }

    /// Study an owned skill book, consuming it.
    pub fn learn_skill(&self, id: &str, item_name: &str, now: DateTime<Utc>) -> Result<LearnReport, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let (mut player, _) = self.load_checkpointed(id, now)?;
        let item = self.store.get_item(item_name)?;
        let ItemKind::SkillBook { skill } = item.kind else {
            return Err(XiuxianError::NotFound(Missing::SkillBook(item.name.clone())));
        };
        if player.skills.contains_key(&skill.skill_name) {
            return Err(XiuxianError::InvalidState(Conflict::AlreadyLearned(skill.skill_name)));
        }
        if self.owned_quantity(id, &item.name)? == 0 {
            return Err(XiuxianError::NotFound(Missing::NotOwned(item.name.clone())));
        }
        self.consume_one(id, &item.name)?;

        player.skills.insert(skill.skill_name.clone(), skill.clone());
        let equipped = self.equipped_bonuses(&player)?;
        let stats = stats::apply_recomputed(&mut player, &equipped);
        self.store.put_player(player.clone())?;
        debug!(
            "{} learned {}",
            actor(id, &player.display_name),
            escape_log(&skill.skill_name)
        );
        Ok(LearnReport { skill, stats })
    }

    pub fn show_ranking(&self, kind: RankingKind) -> Result<Vec<RankingEntry>, XiuxianError> {
        let players = self.store.list_players()?;
        Ok(ranking::rank(players, kind, self.config.ranking_size))
    }

    /// Fight `defender_id`. Each side first takes one of every duel elixir it holds. Both
    /// sides end at full HP; the winner takes a bounded reward.
    pub fn duel(&self, challenger_id: &str, defender_id: &str, now: DateTime<Utc>) -> Result<DuelReport, XiuxianError> {
        if challenger_id == defender_id {
            return Err(XiuxianError::InvalidState(Conflict::SelfDuel));
        }
        let (first, second) = if challenger_id < defender_id {
            (challenger_id, defender_id)
        } else {
            (defender_id, challenger_id)
        };
        let first_lock = self.locks.handle(first);
        let second_lock = self.locks.handle(second);
        let _first = hold(&first_lock);
        let _second = hold(&second_lock);

        let (mut challenger, _) = self.load_checkpointed(challenger_id, now)?;
        let (mut defender, _) = self.load_checkpointed(defender_id, now)?;

        let elixirs = [
            (Side::Challenger, self.take_duel_elixirs(challenger_id)?),
            (Side::Defender, self.take_duel_elixirs(defender_id)?),
        ];

        let mut duel = Duel::new(Combatant::from_player(&challenger), Combatant::from_player(&defender));
        let result = {
            let mut dice = self.dice();
            for (side, taken) in &elixirs {
                for (item_name, effect) in taken {
                    duel.take_elixir(*side, item_name, effect, &mut **dice);
                }
            }
            for (side, player) in [(Side::Challenger, &challenger), (Side::Defender, &defender)] {
                for skill in player.passive_skills() {
                    duel.prepare(side, skill, &mut **dice);
                }
                for skill in player.skills.values().filter(|s| !s.is_passive()) {
                    duel.prepare(side, skill, &mut **dice);
                }
            }
            duel.run(&mut **dice)
        };

        challenger.hp = challenger.max_hp;
        defender.hp = defender.max_hp;
        let reward = match result.outcome {
            DuelOutcome::Victory { winner, .. } => {
                let (winner, loser) = match winner {
                    Side::Challenger => (&mut challenger, &mut defender),
                    Side::Defender => (&mut defender, &mut challenger),
                };
                let reward = self.roll_reward(self.config.duel_reward).min(loser.gold);
                loser.gold -= reward;
                winner.gold = winner.gold.saturating_add(reward);
                reward
            }
            DuelOutcome::Draw => 0,
        };
        self.store.put_player(challenger.clone())?;
        self.store.put_player(defender.clone())?;

        let report = DuelReport {
            challenger_id: challenger.id,
            challenger_name: challenger.display_name,
            defender_id: defender.id,
            defender_name: defender.display_name,
            result,
            reward,
        };
        info!(
            "duel {} vs {} after {} rounds: {:?}, reward {}",
            escape_log(&report.challenger_id),
            escape_log(&report.defender_id),
            report.result.rounds,
            report.result.outcome,
            reward
        );
        Ok(report)
    }

    pub fn show_inventory(&self, id: &str) -> Result<Vec<InventoryLine>, XiuxianError> {
        // Existence check so an unknown id is NotFound rather than an empty bag.
        self.store.get_player(id)?;
        let mut lines = Vec::new();
        for entry in self.store.inventory_of(id)? {
            let item = self.store.find_item_by_name(&entry.item_name)?;
            lines.push(InventoryLine { entry, item });
        }
        Ok(lines)
    }

    /// Wear an owned piece of equipment, replacing whatever occupies its slot.
    pub fn equip_item(&self, id: &str, item_name: &str, now: DateTime<Utc>) -> Result<EquipReport, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let (mut player, _) = self.load_checkpointed(id, now)?;
        let item = self.store.get_item(item_name)?;
        let ItemKind::Equipment { slot, .. } = item.kind else {
            return Err(XiuxianError::NotApplicable(Unusable::NotEquipment(item.name)));
        };
        if self.owned_quantity(id, &item.name)? == 0 {
            return Err(XiuxianError::NotFound(Missing::NotOwned(item.name.clone())));
        }
        if player.equipment.get(&slot) == Some(&item.name) {
            return Err(XiuxianError::InvalidState(Conflict::AlreadyEquipped(item.name)));
        }

        let replaced = player.equipment.insert(slot, item.name.clone());
        if let Some(old) = &replaced {
            match self.store.set_equipped(id, old, false) {
                Ok(()) | Err(XiuxianError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        self.store.set_equipped(id, &item.name, true)?;
        let equipped = self.equipped_bonuses(&player)?;
        let stats = stats::apply_recomputed(&mut player, &equipped);
        self.store.put_player(player.clone())?;
        debug!(
            "{} equipped {} in {}",
            actor(id, &player.display_name),
            escape_log(&item.name),
            slot.as_str()
        );
        Ok(EquipReport {
            item_name: item.name,
            slot,
            replaced,
            stats,
        })
    }

    /// Take off a worn item. The item stays in the inventory.
    pub fn unequip_item(&self, id: &str, item_name: &str, now: DateTime<Utc>) -> Result<EquipReport, XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let (mut player, _) = self.load_checkpointed(id, now)?;
        let Some(slot) = player
            .equipment
            .iter()
            .find(|(_, worn)| worn.as_str() == item_name.trim())
            .map(|(slot, _)| *slot)
        else {
            return Err(XiuxianError::InvalidState(Conflict::NotEquipped(item_name.trim().to_string())));
        };
        let removed = player.equipment.remove(&slot).unwrap_or_default();
        match self.store.set_equipped(id, &removed, false) {
            Ok(()) | Err(XiuxianError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        let equipped = self.equipped_bonuses(&player)?;
        let stats = stats::apply_recomputed(&mut player, &equipped);
        self.store.put_player(player.clone())?;
        Ok(EquipReport {
            item_name: removed,
            slot,
            replaced: None,
            stats,
        })
    }

    pub fn show_shop(&self) -> Result<Vec<ItemRecord>, XiuxianError> {
        self.store.list_purchasable_items()
    }

    pub fn buy_item(
        &self,
        id: &str,
        item_name: &str,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<PurchaseReport, XiuxianError> {
        if quantity == 0 {
            return Err(XiuxianError::InvalidState(Conflict::ZeroQuantity));
        }
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let (mut player, _) = self.load_checkpointed(id, now)?;
        let item = match self.store.find_item_by_name(item_name.trim())? {
            Some(item) if item.is_purchasable() => item,
            _ => {
                return Err(XiuxianError::NotFound(Missing::NotForSale(item_name.trim().to_string())))
            }
        };
        let cost = item.price.saturating_mul(u64::from(quantity));
        if player.gold < cost {
            return Err(XiuxianError::insufficient("gold", cost, player.gold));
        }
        player.gold -= cost;
        self.store.commit_purchase(player.clone(), &item.name, quantity)?;
        debug!(
            "{} bought {} x{} for {}",
            actor(id, &player.display_name),
            escape_log(&item.name),
            quantity,
            cost
        );
        Ok(PurchaseReport {
            item_name: item.name,
            quantity,
            cost,
            gold_left: player.gold,
        })
    }

    /// Delete all of a player's data. The first call issues a confirmation and returns
    /// `Unconfirmed`; a second call inside the window performs the reset.
    pub fn reset_data(
        &self,
        id: &str,
        confirmations: &ConfirmationStore,
        now: DateTime<Utc>,
    ) -> Result<(), XiuxianError> {
        let lock = self.locks.handle(id);
        let _guard = hold(&lock);
        let player = self.store.get_player(id)?;
        let today = self.game_day(now);
        if self.store.has_reset_on(id, today)? {
            confirmations.cancel(id);
            return Err(XiuxianError::RateLimited("data was already reset today".to_string()));
        }
        match confirmations.confirm(id, now) {
            Confirmation::Issued { .. } => Err(XiuxianError::Unconfirmed {
                window_secs: confirmations.window().num_seconds(),
            }),
            Confirmation::Confirmed => {
                self.store.delete_player(id)?;
                self.store.record_reset(id, today)?;
                info!("reset all data of {}", actor(id, &player.display_name));
                Ok(())
            }
        }
    }
}
