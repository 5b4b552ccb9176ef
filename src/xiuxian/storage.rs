use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{IVec, Transactional};

use crate::logutil::escape_log;
use crate::xiuxian::catalog::canonical_item_catalog;
use crate::xiuxian::errors::{Conflict, Missing, XiuxianError};
use crate::xiuxian::inventory::{add_to_stack, remove_from_stack};
use crate::xiuxian::types::{
    InventoryEntry, InventoryResult, ItemRecord, PlayerRecord, ITEM_SCHEMA_VERSION,
    PLAYER_SCHEMA_VERSION,
};

const TREE_PLAYERS: &str = "xiuxian_players";
const TREE_ITEMS: &str = "xiuxian_items";
const TREE_INVENTORY: &str = "xiuxian_inventory";
const TREE_RESETS: &str = "xiuxian_resets";

/// Marker stored when a player resets their character.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResetMarker {
    reset_on: NaiveDate,
}

fn abort(err: XiuxianError) -> ConflictableTransactionError<XiuxianError> {
    ConflictableTransactionError::Abort(err)
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct XiuxianStoreBuilder {
    path: PathBuf,
    ensure_catalog_seed: bool,
}

impl XiuxianStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ensure_catalog_seed: true,
        }
    }

    /// Skip seeding the canonical item catalog (useful for targeted tests).
    pub fn without_catalog_seed(mut self) -> Self {
        self.ensure_catalog_seed = false;
        self
    }

    pub fn open(self) -> Result<XiuxianStore, XiuxianError> {
        XiuxianStore::open_with_options(self.path, self.ensure_catalog_seed)
    }
}

/// Sled-backed persistence for players, the item catalog and inventories.
///
/// Player and item records are JSON because effect descriptors are self-describing tagged
/// data. Inventory stacks and reset markers are plain structs and use bincode.
pub struct XiuxianStore {
    _db: sled::Db,
    players: sled::Tree,
    items: sled::Tree,
    inventory: sled::Tree,
    resets: sled::Tree,
}

impl XiuxianStore {
    /// Open (or create) the store rooted at `path`, seeding the catalog when it is empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, XiuxianError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, seed_catalog: bool) -> Result<Self, XiuxianError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let players = db.open_tree(TREE_PLAYERS)?;
        let items = db.open_tree(TREE_ITEMS)?;
        let inventory = db.open_tree(TREE_INVENTORY)?;
        let resets = db.open_tree(TREE_RESETS)?;
        let store = Self {
            _db: db,
            players,
            items,
            inventory,
            resets,
        };

        if seed_catalog {
            let inserted = store.seed_catalog_if_needed()?;
            if inserted > 0 {
                info!("seeded item catalog with {} items", inserted);
            }
        }

        Ok(store)
    }

    fn player_key(id: &str) -> Vec<u8> {
        format!("players:{}", id).into_bytes()
    }

    fn item_key(name: &str) -> Vec<u8> {
        format!("items:{}", name).into_bytes()
    }

    fn inventory_prefix(id: &str) -> Vec<u8> {
        format!("inventory:{}:", id).into_bytes()
    }

    fn inventory_key(id: &str, item_name: &str) -> Vec<u8> {
        format!("inventory:{}:{}", id, item_name).into_bytes()
    }

    fn reset_key(id: &str, date: NaiveDate) -> Vec<u8> {
        format!("resets:{}:{}", id, date.format("%Y-%m-%d")).into_bytes()
    }

    fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, XiuxianError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn from_json<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, XiuxianError> {
        Ok(serde_json::from_slice::<T>(&bytes)?)
    }

    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, XiuxianError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, XiuxianError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn decode_player(bytes: IVec) -> Result<PlayerRecord, XiuxianError> {
        let record: PlayerRecord = Self::from_json(bytes)?;
        if record.schema_version != PLAYER_SCHEMA_VERSION {
            return Err(XiuxianError::SchemaMismatch {
                entity: "player",
                expected: PLAYER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    fn decode_item(bytes: IVec) -> Result<ItemRecord, XiuxianError> {
        let record: ItemRecord = Self::from_json(bytes)?;
        if record.schema_version != ITEM_SCHEMA_VERSION {
            return Err(XiuxianError::SchemaMismatch {
                entity: "item",
                expected: ITEM_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Insert or update a player record.
    pub fn put_player(&self, mut player: PlayerRecord) -> Result<(), XiuxianError> {
        player.schema_version = PLAYER_SCHEMA_VERSION;
        player.touch();
        let key = Self::player_key(&player.id);
        let bytes = Self::to_json(&player)?;
        self.players.insert(key, bytes)?;
        self.players.flush()?;
        Ok(())
    }

    /// Insert a new player. Fails with `InvalidState` if the id is already taken.
    pub fn create_player(&self, mut player: PlayerRecord) -> Result<(), XiuxianError> {
        player.schema_version = PLAYER_SCHEMA_VERSION;
        let key = Self::player_key(&player.id);
        let bytes = Self::to_json(&player)?;
        if self
            .players
            .compare_and_swap(key, None as Option<&[u8]>, Some(bytes))?
            .is_err()
        {
            return Err(XiuxianError::InvalidState(Conflict::AlreadyCultivating));
        }
        self.players.flush()?;
        debug!("created player {}", escape_log(&player.id));
        Ok(())
    }

    /// Fetch a player record by id.
    pub fn get_player(&self, id: &str) -> Result<PlayerRecord, XiuxianError> {
        self.find_player(id)?
            .ok_or_else(|| XiuxianError::NotFound(Missing::Player(id.to_string())))
    }

    pub fn find_player(&self, id: &str) -> Result<Option<PlayerRecord>, XiuxianError> {
        match self.players.get(Self::player_key(id))? {
            Some(bytes) => Ok(Some(Self::decode_player(bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove a player and every inventory entry they own. Returns false if absent.
    pub fn delete_player(&self, id: &str) -> Result<bool, XiuxianError> {
        let existed = self.players.remove(Self::player_key(id))?.is_some();
        let mut keys = Vec::new();
        for entry in self.inventory.scan_prefix(Self::inventory_prefix(id)) {
            let (key, _) = entry?;
            keys.push(key);
        }
        for key in keys {
            self.inventory.remove(key)?;
        }
        self.players.flush()?;
        self.inventory.flush()?;
        Ok(existed)
    }

    pub fn list_players(&self) -> Result<Vec<PlayerRecord>, XiuxianError> {
        let mut players = Vec::new();
        for entry in self.players.scan_prefix(b"players:") {
            let (_, bytes) = entry?;
            players.push(Self::decode_player(bytes)?);
        }
        Ok(players)
    }

    /// Insert or update a catalog item.
    pub fn put_item(&self, mut item: ItemRecord) -> Result<(), XiuxianError> {
        item.schema_version = ITEM_SCHEMA_VERSION;
        let key = Self::item_key(&item.name);
        let bytes = Self::to_json(&item)?;
        self.items.insert(key, bytes)?;
        self.items.flush()?;
        Ok(())
    }

    pub fn find_item_by_name(&self, name: &str) -> Result<Option<ItemRecord>, XiuxianError> {
        match self.items.get(Self::item_key(name))? {
            Some(bytes) => Ok(Some(Self::decode_item(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_item(&self, name: &str) -> Result<ItemRecord, XiuxianError> {
        self.find_item_by_name(name)?
            .ok_or_else(|| XiuxianError::NotFound(Missing::Item(name.to_string())))
    }

    pub fn list_items(&self) -> Result<Vec<ItemRecord>, XiuxianError> {
        let mut items = Vec::new();
        for entry in self.items.scan_prefix(b"items:") {
            let (_, bytes) = entry?;
            items.push(Self::decode_item(bytes)?);
        }
        Ok(items)
    }

    /// Items with a non-zero price, cheapest first.
    pub fn list_purchasable_items(&self) -> Result<Vec<ItemRecord>, XiuxianError> {
        let mut items: Vec<_> = self
            .list_items()?
            .into_iter()
            .filter(ItemRecord::is_purchasable)
            .collect();
        items.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    /// Seed the canonical catalog unless at least one item already exists.
    pub fn seed_catalog_if_needed(&self) -> Result<usize, XiuxianError> {
        if self.items.scan_prefix(b"items:").next().is_some() {
            return Ok(0);
        }
        let mut inserted = 0usize;
        for item in canonical_item_catalog() {
            self.put_item(item)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// All inventory entries of a player, ordered by item name.
    pub fn inventory_of(&self, id: &str) -> Result<Vec<InventoryEntry>, XiuxianError> {
        let mut entries = Vec::new();
        for entry in self.inventory.scan_prefix(Self::inventory_prefix(id)) {
            let (_, bytes) = entry?;
            entries.push(Self::deserialize::<InventoryEntry>(bytes)?);
        }
        Ok(entries)
    }

    pub fn inventory_entry(&self, id: &str, item_name: &str) -> Result<Option<InventoryEntry>, XiuxianError> {
        match self.inventory.get(Self::inventory_key(id, item_name))? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn write_entry(&self, id: &str, item_name: &str, entry: Option<&InventoryEntry>) -> Result<(), XiuxianError> {
        let key = Self::inventory_key(id, item_name);
        match entry {
            Some(entry) => {
                self.inventory.insert(key, Self::serialize(entry)?)?;
            }
            None => {
                self.inventory.remove(key)?;
            }
        }
        self.inventory.flush()?;
        Ok(())
    }

    pub fn add_to_inventory(&self, id: &str, item_name: &str, quantity: u32) -> Result<InventoryResult, XiuxianError> {
        let existing = self.inventory_entry(id, item_name)?;
        let (entry, result) = add_to_stack(existing, item_name, quantity);
        self.write_entry(id, item_name, Some(&entry))?;
        Ok(result)
    }

    /// Save `player` and grow their `item_name` stack in one transaction across the player
    /// and inventory trees. Either both writes land or neither does.
    pub fn commit_purchase(
        &self,
        mut player: PlayerRecord,
        item_name: &str,
        quantity: u32,
    ) -> Result<InventoryResult, XiuxianError> {
        player.schema_version = PLAYER_SCHEMA_VERSION;
        player.touch();
        let player_key = Self::player_key(&player.id);
        let player_bytes = Self::to_json(&player)?;
        let entry_key = Self::inventory_key(&player.id, item_name);

        let result = (&self.players, &self.inventory)
            .transaction(|(players, inventory)| {
                let existing = match inventory.get(entry_key.as_slice())? {
                    Some(bytes) => Some(Self::deserialize::<InventoryEntry>(bytes).map_err(abort)?),
                    None => None,
                };
                let (entry, result) = add_to_stack(existing, item_name, quantity);
                let entry_bytes = Self::serialize(&entry).map_err(abort)?;
                inventory.insert(entry_key.as_slice(), entry_bytes)?;
                players.insert(player_key.as_slice(), player_bytes.as_slice())?;
                Ok::<_, ConflictableTransactionError<XiuxianError>>(result)
            })
            .map_err(|e| match e {
                TransactionError::Abort(err) => err,
                TransactionError::Storage(err) => XiuxianError::Sled(err),
            })?;
        self.players.flush()?;
        self.inventory.flush()?;
        Ok(result)
    }

    /// Take units out of a stack. `Insufficient` leaves the stack untouched.
    pub fn remove_from_inventory(
        &self,
        id: &str,
        item_name: &str,
        quantity: u32,
    ) -> Result<InventoryResult, XiuxianError> {
        let existing = self.inventory_entry(id, item_name)?;
        let (entry, result) = remove_from_stack(existing, quantity);
        if result.is_removed() {
            self.write_entry(id, item_name, entry.as_ref())?;
        }
        Ok(result)
    }

    /// Flip the equipped flag of an owned stack.
    pub fn set_equipped(&self, id: &str, item_name: &str, equipped: bool) -> Result<(), XiuxianError> {
        let Some(mut entry) = self.inventory_entry(id, item_name)? else {
            return Err(XiuxianError::NotFound(Missing::NotOwned(item_name.to_string())));
        };
        entry.equipped = equipped;
        self.write_entry(id, item_name, Some(&entry))
    }

    pub fn record_reset(&self, id: &str, date: NaiveDate) -> Result<(), XiuxianError> {
        let marker = ResetMarker { reset_on: date };
        self.resets.insert(Self::reset_key(id, date), Self::serialize(&marker)?)?;
        self.resets.flush()?;
        Ok(())
    }

    pub fn has_reset_on(&self, id: &str, date: NaiveDate) -> Result<bool, XiuxianError> {
        match self.resets.get(Self::reset_key(id, date))? {
            Some(bytes) => {
                let marker: ResetMarker = Self::deserialize(bytes)?;
                Ok(marker.reset_on == date)
            }
            None => Ok(false),
        }
    }
}
