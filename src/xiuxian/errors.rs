use thiserror::Error;

/// Errors surfaced by the cultivation engine and its storage layer.
///
/// The first group is the gameplay taxonomy: every variant there is a local,
/// recoverable outcome that the command layer renders as text. The second group
/// wraps infrastructure failures.
#[derive(Debug, Error)]
pub enum XiuxianError {
    /// No player, item, or skill book matches.
    #[error("not found: {0}")]
    NotFound(Missing),

    /// The operation is illegal in the player's current state.
    #[error("invalid state: {0}")]
    InvalidState(Conflict),

    /// Not enough currency, experience, or inventory quantity.
    #[error("insufficient {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        needed: u64,
        available: u64,
    },

    /// The effect does not apply through the chosen action.
    #[error("not applicable: {0}")]
    NotApplicable(Unusable),

    /// A once-per-day allowance has already been consumed.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// A destructive action is waiting for a second confirmation.
    #[error("confirmation required within {window_secs} seconds")]
    Unconfirmed { window_secs: i64 },

    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// JSON encoding of player and catalog records.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bincode encoding of inventory entries and reset markers.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

/// What a lookup failed to find.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Missing {
    #[error("player {0}")]
    Player(String),

    #[error("item {0}")]
    Item(String),

    #[error("{0} is not sold here")]
    NotForSale(String),

    #[error("skill book {0}")]
    SkillBook(String),

    #[error("{0} is not in the inventory")]
    NotOwned(String),
}

/// Why an operation clashes with the player's current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("already on the path of cultivation")]
    AlreadyCultivating,

    #[error("{0}")]
    InvalidIdentity(String),

    #[error("already in seclusion")]
    InSeclusion,

    #[error("not in seclusion")]
    NotInSeclusion,

    #[error("already at the peak of the ladder")]
    AtPeak,

    #[error("{0} is already learned")]
    AlreadyLearned(String),

    #[error("{0} is already equipped")]
    AlreadyEquipped(String),

    #[error("{0} is not equipped")]
    NotEquipped(String),

    #[error("cannot duel yourself")]
    SelfDuel,

    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Storage disagreed with itself; not caused by the player.
    #[error("{0}")]
    Inconsistent(String),
}

/// Why an item or effect cannot be used the way it was asked to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unusable {
    #[error("{0} is a skill book; learn it instead")]
    SkillBook(String),

    #[error("{0} is equipment; equip it instead")]
    Equipment(String),

    #[error("{0} cannot be equipped")]
    NotEquipment(String),

    #[error("taken automatically when attempting a breakthrough")]
    BreakthroughOnly,

    #[error("taken automatically at the start of a duel")]
    DuelOnly,

    #[error("this elixir is meant for another realm")]
    WrongRealm,

    #[error("{0} cannot be raised permanently")]
    NotPermanent(String),

    #[error("{0} only works in combat")]
    CombatOnly(&'static str),

    #[error("{0} is a passive technique and must be learned")]
    PassiveOnly(&'static str),

    #[error("{0} has no use in combat")]
    NotInCombat(&'static str),

    #[error("cannot be used this way")]
    Unrecognized,
}

impl XiuxianError {
    pub fn insufficient(resource: &'static str, needed: u64, available: u64) -> Self {
        Self::InsufficientResource {
            resource,
            needed,
            available,
        }
    }

    /// True for the gameplay outcomes that are answered to the player rather than logged as faults.
    pub fn is_gameplay(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::InvalidState(_)
                | Self::InsufficientResource { .. }
                | Self::NotApplicable(_)
                | Self::RateLimited(_)
                | Self::Unconfirmed { .. }
        )
    }
}
