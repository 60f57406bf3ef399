//! Level, milestone and validation rules.
//!
//! All functions are pure; "now" is always passed in.

use chrono::{DateTime, Duration, Utc};

use crate::registry::{Category, MAX_LEVEL_TEXT};
use crate::state::ProgressState;

pub const XP_PER_LEVEL: u64 = 100;
pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 99;
/// Levels per milestone tier.
pub const TIER_SIZE: u32 = 10;

/// `min(99, floor(xp / 100) + 1)`. 9900 XP and above all map to 99.
pub fn level_for_xp(xp: u64) -> u32 {
    let raw = xp / XP_PER_LEVEL + 1;
    raw.min(MAX_LEVEL as u64) as u32
}

pub fn level(state: &ProgressState, category: Category) -> u32 {
    level_for_xp(state.xp(category))
}

/// `floor(level / 10) - 1`, clamped at 0 so levels below 10 share the
/// first tier with levels 10..19. Level 99 lands on index 8.
pub fn milestone_index(level: u32) -> usize {
    (level / TIER_SIZE).saturating_sub(1) as usize
}

/// Table entry at `index`, or the max-level sentinel when out of range.
pub fn milestone_at(category: Category, index: usize) -> &'static str {
    category
        .milestones()
        .get(index)
        .copied()
        .unwrap_or(MAX_LEVEL_TEXT)
}

pub fn milestone_text(category: Category, level: u32) -> &'static str {
    milestone_at(category, milestone_index(level))
}

/// XP collected towards the next level, 0..100.
pub fn progress_within_level(xp: u64) -> u64 {
    xp % XP_PER_LEVEL
}

/// True while the last award is younger than the category's window.
/// Falling out of the window is a warning state; XP is kept.
pub fn is_validated(state: &ProgressState, category: Category, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(state.last_check(category));
    age < Duration::days(category.validation_window_days())
}
