use chrono::{DateTime, Utc};

use crate::leveling::level_for_xp;
use crate::logging::{log_audit, log_load_fallback, log_persist_failure, log_reset, log_xp_awarded, log_xp_ignored};
use crate::registry::Category;
use crate::state::{ProgressState, RecordStatus, LAST_CHECK_KEY, XP_KEY};
use crate::storage::KvStore;

/// Load/save/mutate `ProgressState` against a kv store.
///
/// Nothing here fails: unreadable data degrades to defaults and write
/// errors are logged, leaving the in-memory state authoritative.
pub struct ProgressStore<K: KvStore> {
    kv: K,
}

impl<K: KvStore> ProgressStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn into_inner(self) -> K {
        self.kv
    }

    pub fn load(&self, now: DateTime<Utc>) -> ProgressState {
        let xp = self.read(XP_KEY);
        let last_check = self.read(LAST_CHECK_KEY);
        let decoded = ProgressState::from_records(xp.as_deref(), last_check.as_deref(), now);

        // A missing record on first run is normal; only report damage.
        for (key, status) in [(XP_KEY, decoded.xp), (LAST_CHECK_KEY, decoded.last_check)] {
            match status {
                RecordStatus::Malformed => log_load_fallback(key, status.as_str(), Category::ALL.len()),
                RecordStatus::Partial(n) => log_load_fallback(key, status.as_str(), n),
                RecordStatus::Absent | RecordStatus::Complete => {}
            }
        }
        decoded.state
    }

    pub fn save(&mut self, state: &ProgressState) {
        self.write(XP_KEY, &state.xp_record());
        self.write(LAST_CHECK_KEY, &state.last_check_record());
        log_audit("saved", &state.fingerprint());
    }

    /// Returns `state` with `amount` added to `category` and its last check
    /// moved to `now`, then persists it. An unknown category or a zero
    /// amount leaves everything untouched.
    pub fn add_xp(
        &mut self,
        state: &ProgressState,
        category: &str,
        amount: u64,
        now: DateTime<Utc>,
    ) -> ProgressState {
        let Some(cat) = Category::from_name(category) else {
            log_xp_ignored(category, amount, "unknown category");
            return state.clone();
        };
        if amount == 0 {
            log_xp_ignored(cat.name(), amount, "zero amount");
            return state.clone();
        }

        let mut next = state.clone();
        let entry = next.get_mut(cat);
        entry.xp = entry.xp.saturating_add(amount);
        entry.last_check = now;
        log_xp_awarded(cat.name(), amount, entry.xp, level_for_xp(entry.xp));

        self.save(&next);
        next
    }

    /// Zero every category and drop the persisted records, so the next
    /// `load` starts from defaults.
    pub fn reset(&mut self, now: DateTime<Utc>) -> ProgressState {
        for key in [XP_KEY, LAST_CHECK_KEY] {
            if let Err(err) = self.kv.remove(key) {
                log_persist_failure("remove", key, &err);
            }
        }
        log_reset();
        ProgressState::fresh(now)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(value) => value,
            Err(err) => {
                log_persist_failure("get", key, &err);
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(err) = self.kv.set(key, value) {
            log_persist_failure("set", key, &err);
        }
    }
}
