//! Test utilities & fixtures.
//! Every test gets its own throwaway sled store under a temp dir.

use chrono::{DateTime, TimeZone, Utc};
use simple_xiuxian::config::GameConfig;
use simple_xiuxian::xiuxian::{GameService, PlayerRecord, ScriptedDice, XiuxianStoreBuilder};
use tempfile::TempDir;

/// 2024-05-01 04:00 UTC, i.e. noon of the same game day at UTC+8.
#[allow(dead_code)]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap()
}

/// Open a seeded store in `dir` and wrap it in a service driven by `dice`.
#[allow(dead_code)]
pub fn service(dir: &TempDir, dice: ScriptedDice) -> GameService {
    let store = XiuxianStoreBuilder::new(dir.path().join("xiuxian"))
        .open()
        .expect("open store");
    GameService::with_dice(store, GameConfig::default(), Box::new(dice))
}

/// Create a character and return its stored record. Consumes one roll for the spirit root.
#[allow(dead_code)]
pub fn create(svc: &GameService, id: &str) -> PlayerRecord {
    svc.create_character(id, id, t0()).expect("create character")
}

/// Apply `edit` to the stored record of `id`.
#[allow(dead_code)]
pub fn edit_player(svc: &GameService, id: &str, edit: impl FnOnce(&mut PlayerRecord)) {
    let mut player = svc.store().get_player(id).expect("player exists");
    edit(&mut player);
    svc.store().put_player(player).expect("save player");
}

#[allow(dead_code)]
pub fn give(svc: &GameService, id: &str, item: &str, quantity: u32) {
    svc.store()
        .add_to_inventory(id, item, quantity)
        .expect("add to inventory");
}
