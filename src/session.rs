use chrono::{DateTime, Utc};

use crate::progress::ProgressStore;
use crate::registry::Category;
use crate::report::Report;
use crate::state::ProgressState;
use crate::storage::KvStore;

/// What the UI can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    AddXp(Category),
    Reset,
}

/// The running UI session: owns the live state and its store.
pub struct Session<K: KvStore> {
    store: ProgressStore<K>,
    state: ProgressState,
    xp_step: u64,
}

impl<K: KvStore> Session<K> {
    pub fn open(kv: K, xp_step: u64, now: DateTime<Utc>) -> Self {
        let store = ProgressStore::new(kv);
        let state = store.load(now);
        Self { store, state, xp_step }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn xp_step(&self) -> u64 {
        self.xp_step
    }

    pub fn apply(&mut self, intent: Intent, now: DateTime<Utc>) {
        self.state = match intent {
            Intent::AddXp(category) => {
                self.store.add_xp(&self.state, category.name(), self.xp_step, now)
            }
            Intent::Reset => self.store.reset(now),
        };
    }

    /// Award an arbitrary amount by category name (CLI path).
    pub fn add_xp(&mut self, category: &str, amount: u64, now: DateTime<Utc>) {
        self.state = self.store.add_xp(&self.state, category, amount, now);
    }

    pub fn report(&self, now: DateTime<Utc>) -> Report {
        Report::build(&self.state, now)
    }

    pub fn into_store(self) -> ProgressStore<K> {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leveling::level;
    use crate::storage::MemoryKv;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 6, 0, 0).unwrap()
    }

    #[test]
    fn test_add_intent_uses_step() {
        let mut s = Session::open(MemoryKv::new(), 10, t0());
        s.apply(Intent::AddXp(Category::Kracht), t0());
        s.apply(Intent::AddXp(Category::Kracht), t0());
        assert_eq!(s.state().xp(Category::Kracht), 20);
    }

    #[test]
    fn test_reset_intent_then_reopen() {
        let mut s = Session::open(MemoryKv::new(), 10, t0());
        s.add_xp("Focus", 500, t0());
        let later = t0() + Duration::days(1);
        s.apply(Intent::Reset, later);
        assert_eq!(s.state(), &ProgressState::fresh(later));

        let kv = s.into_store().into_inner();
        let reopened = Session::open(kv, 10, later);
        assert_eq!(level(reopened.state(), Category::Focus), 1);
    }

    #[test]
    fn test_validated_right_after_award_and_expires() {
        let start = t0() - Duration::days(60);
        let mut s = Session::open(MemoryKv::new(), 10, start);
        assert!(!s.report(t0()).stat(Category::Stamina).unwrap().validated);

        s.apply(Intent::AddXp(Category::Stamina), t0());
        assert!(s.report(t0()).stat(Category::Stamina).unwrap().validated);
        let week = t0() + Duration::days(7);
        assert!(!s.report(week).stat(Category::Stamina).unwrap().validated);
    }
}
