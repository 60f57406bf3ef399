//! Personal XP tracker for six life-skill categories.
//!
//! `registry` holds the fixed categories, `progress` loads and mutates the
//! per-category XP through a `storage::KvStore`, `leveling` and `report`
//! derive levels, milestones and the overall ACE level, and `present` /
//! `server` turn a report into a radar chart page.

pub mod leveling;
pub mod logging;
pub mod present;
pub mod progress;
pub mod registry;
pub mod report;
pub mod server;
pub mod session;
pub mod state;
pub mod storage;
