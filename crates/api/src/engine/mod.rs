//! Achievement unlock orchestration.
//!
//! Owns the sequence behind every unlock: load catalog and ledger state,
//! evaluate criteria against tracking stats, write the guarded upsert and
//! enqueue a notification only when a record actually transitions to
//! completed.

pub mod achievements;

pub use achievements::{
    AchievementEngine, CheckOutcome, LevelUnlock, LedgerWrite, UnlockedAchievement,
};
