use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::leveling::{is_validated, level, milestone_index, milestone_text, progress_within_level, MAX_LEVEL};
use crate::registry::Category;
use crate::state::{encode_ts, ProgressState};

/// Rounded mean of all category levels, capped at 99. Halves round up.
pub fn average_level(state: &ProgressState) -> u32 {
    let n = Category::ALL.len() as u32;
    let sum: u32 = Category::ALL.iter().map(|c| level(state, *c)).sum();
    let rounded = (2 * sum + n) / (2 * n);
    rounded.min(MAX_LEVEL)
}

/// Derived view of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatView {
    pub category: Category,
    pub slug: &'static str,
    pub xp: u64,
    pub level: u32,
    pub progress: u64,
    pub milestone_index: usize,
    pub milestone: &'static str,
    pub validated: bool,
    pub window_days: i64,
    pub last_check: String,
}

/// Everything the presentation layer needs. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub average_level: u32,
    pub max_level: u32,
    pub stats: Vec<StatView>,
    pub generated_at: String,
}

impl Report {
    pub fn build(state: &ProgressState, now: DateTime<Utc>) -> Self {
        let stats = Category::ALL
            .iter()
            .map(|c| {
                let lvl = level(state, *c);
                StatView {
                    category: *c,
                    slug: c.slug(),
                    xp: state.xp(*c),
                    level: lvl,
                    progress: progress_within_level(state.xp(*c)),
                    milestone_index: milestone_index(lvl),
                    milestone: milestone_text(*c, lvl),
                    validated: is_validated(state, *c, now),
                    window_days: c.validation_window_days(),
                    last_check: encode_ts(state.last_check(*c)),
                }
            })
            .collect();

        Self {
            average_level: average_level(state),
            max_level: MAX_LEVEL,
            stats,
            generated_at: encode_ts(now),
        }
    }

    pub fn stat(&self, category: Category) -> Option<&StatView> {
        self.stats.iter().find(|s| s.category == category)
    }

    pub fn unvalidated(&self) -> impl Iterator<Item = &StatView> {
        self.stats.iter().filter(|s| !s.validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 20, 0, 0).unwrap()
    }

    fn with_xp(xps: [u64; 6]) -> ProgressState {
        let mut s = ProgressState::fresh(t0());
        for (c, xp) in Category::ALL.iter().zip(xps) {
            s.get_mut(*c).xp = xp;
        }
        s
    }

    #[test]
    fn test_average_of_fresh_state() {
        assert_eq!(average_level(&ProgressState::fresh(t0())), 1);
    }

    #[test]
    fn test_average_rounds_half_up() {
        // levels 2,1,1,1,1,3 -> 9/6 = 1.5 -> 2
        assert_eq!(average_level(&with_xp([100, 0, 0, 0, 0, 200])), 2);
        // levels 2,1,1,1,1,2 -> 8/6 = 1.33 -> 1
        assert_eq!(average_level(&with_xp([100, 0, 0, 0, 0, 100])), 1);
        // levels 2,2,2,2,1,1 -> 10/6 = 1.67 -> 2
        assert_eq!(average_level(&with_xp([100, 100, 100, 100, 0, 0])), 2);
    }

    #[test]
    fn test_average_matches_mean_of_levels() {
        let s = with_xp([0, 950, 2_020, 4_410, 7_777, 12_000]);
        let levels: Vec<u32> = Category::ALL.iter().map(|c| level(&s, *c)).collect();
        let mean = levels.iter().sum::<u32>() as f64 / 6.0;
        assert_eq!(average_level(&s), mean.round() as u32);
    }

    #[test]
    fn test_average_capped() {
        assert_eq!(average_level(&with_xp([u64::MAX; 6])), 99);
    }

    #[test]
    fn test_report_stat_view() {
        let mut s = with_xp([0, 3_450, 0, 0, 0, 0]);
        s.get_mut(Category::Focus).last_check = t0() - Duration::days(4);
        let r = Report::build(&s, t0());

        assert_eq!(r.stats.len(), 6);
        let stamina = r.stat(Category::Stamina).unwrap();
        assert_eq!(stamina.level, 35);
        assert_eq!(stamina.progress, 50);
        assert_eq!(stamina.milestone_index, 2);
        assert_eq!(stamina.milestone, "15k stappen + 30m jog");
        assert!(stamina.validated);

        let unvalidated: Vec<Category> = r.unvalidated().map(|s| s.category).collect();
        assert_eq!(unvalidated, vec![Category::Focus]);
        assert_eq!(r.generated_at, "2026-10-18T20:00:00.000Z");
    }

    #[test]
    fn test_report_serializes_category_names() {
        let r = Report::build(&ProgressState::fresh(t0()), t0());
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["stats"][2]["category"], "VO2 Max");
        assert_eq!(v["stats"][2]["slug"], "vo2-max");
        assert_eq!(v["average_level"], 1);
    }
}
