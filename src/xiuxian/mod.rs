//! Cultivation engine: realm ladder, stat composition, effects, breakthroughs, duels and
//! seclusion, backed by a sled store and driven through [`GameService`].

pub mod breakthrough;
pub mod catalog;
pub mod combat;
pub mod commands;
pub mod confirm;
pub mod dice;
pub mod effect;
pub mod errors;
pub mod inventory;
pub mod ranking;
pub mod realm;
pub mod seclusion;
pub mod service;
pub mod stats;
pub mod storage;
pub mod types;

pub use breakthrough::BreakthroughReport;
pub use catalog::canonical_item_catalog;
pub use combat::{Combatant, Duel, DuelOutcome, DuelResult, Side};
pub use commands::{parse_command, CommandProcessor, XiuxianCommand};
pub use confirm::{Confirmation, ConfirmationStore};
pub use dice::{Dice, GameRng, ScriptedDice};
pub use effect::Effect;
pub use errors::{Conflict, Missing, Unusable, XiuxianError};
pub use ranking::RankingKind;
pub use realm::{realm_info, RealmInfo};
pub use service::GameService;
pub use storage::{XiuxianStore, XiuxianStoreBuilder};
pub use types::{
    EquipmentSlot, InventoryEntry, ItemKind, ItemRecord, PlayerRecord, SkillDescriptor, SpiritRoot,
};
