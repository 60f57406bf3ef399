//! Category registry: the six tracked stats, their validation windows and
//! milestone tables.
//!
//! Everything here is compiled in. Display order follows `Category::ALL`.

use serde::{Deserialize, Serialize};

/// Shown when a milestone lookup falls outside the table.
pub const MAX_LEVEL_TEXT: &str = "Max level bereikt";

pub const MILESTONES_PER_CATEGORY: usize = 10;
pub const CATEGORY_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Kracht,
    Stamina,
    #[serde(rename = "VO2 Max")]
    Vo2Max,
    Flexibiliteit,
    Focus,
    Intelligentie,
}

impl Category {
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::Kracht,
        Category::Stamina,
        Category::Vo2Max,
        Category::Flexibiliteit,
        Category::Focus,
        Category::Intelligentie,
    ];

    /// Position in `ALL`; also the slot in `ProgressState`.
    pub fn index(&self) -> usize {
        match self {
            Category::Kracht => 0,
            Category::Stamina => 1,
            Category::Vo2Max => 2,
            Category::Flexibiliteit => 3,
            Category::Focus => 4,
            Category::Intelligentie => 5,
        }
    }

    /// Display name, also the key used in persisted records.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Kracht => "Kracht",
            Category::Stamina => "Stamina",
            Category::Vo2Max => "VO2 Max",
            Category::Flexibiliteit => "Flexibiliteit",
            Category::Focus => "Focus",
            Category::Intelligentie => "Intelligentie",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Category::Kracht => "kracht",
            Category::Stamina => "stamina",
            Category::Vo2Max => "vo2-max",
            Category::Flexibiliteit => "flexibiliteit",
            Category::Focus => "focus",
            Category::Intelligentie => "intelligentie",
        }
    }

    /// Case-insensitive lookup by display name or slug.
    pub fn from_name(raw: &str) -> Option<Category> {
        let wanted = raw.trim();
        Self::ALL.iter().copied().find(|c| {
            c.name().eq_ignore_ascii_case(wanted) || c.slug().eq_ignore_ascii_case(wanted)
        })
    }

    pub fn validation_window_days(&self) -> i64 {
        match self {
            Category::Kracht => 14,
            Category::Stamina => 7,
            Category::Vo2Max => 10,
            Category::Flexibiliteit => 14,
            Category::Focus => 3,
            Category::Intelligentie => 30,
        }
    }

    pub fn milestones(&self) -> &'static [&'static str; MILESTONES_PER_CATEGORY] {
        match self {
            Category::Kracht => &KRACHT,
            Category::Stamina => &STAMINA,
            Category::Vo2Max => &VO2_MAX,
            Category::Flexibiliteit => &FLEXIBILITEIT,
            Category::Focus => &FOCUS,
            Category::Intelligentie => &INTELLIGENTIE,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Milestone tables (one entry per 10 levels)
// =============================================================================

const KRACHT: [&str; MILESTONES_PER_CATEGORY] = [
    "10 pull-ups + 10 push-ups + 40kg bench",
    "15 pull-ups + 20 push-ups + 60kg bench",
    "20 pull-ups + 30 push-ups + 80kg bench",
    "25 pull-ups + 40 push-ups + 100kg bench",
    "Weighted pull-ups + 120kg bench",
    "1-arm push-up + 150kg deadlift",
    "1-arm pull-up + planche",
    "2x BW bench + 15 dips",
    "Muscle-up + 200kg DL",
    "Elite level (220kg bench + gymnast hold)",
];

const STAMINA: [&str; MILESTONES_PER_CATEGORY] = [
    "5k stappen + 20m wandelen",
    "10k stappen",
    "15k stappen + 30m jog",
    "20k stappen + 1u hike",
    "10km run",
    "15km loop + trappen",
    "25km hike",
    "Half-marathon",
    "30km loop / 50k stappen",
    "Ultramarathon",
];

const VO2_MAX: [&str; MILESTONES_PER_CATEGORY] = [
    "1km run zonder hijgen",
    "Traplopen 5m",
    "5k in <35m",
    "5k in <28m",
    "10k in <60m",
    "10k + fietsen 30m",
    "1u circuit",
    "5k <22m + 100 burpees",
    "VO2 Max >60",
    "Sub 3u marathon",
];

const FLEXIBILITEIT: [&str; MILESTONES_PER_CATEGORY] = [
    "Tenen raken + shoulder flex",
    "Palmen vloer",
    "2m deep squat + shoulder flow",
    "Volledige squat (heels down)",
    "L-sit + pigeon",
    "Bridge + lunges",
    "Lotus 30s",
    "Pancake stretch",
    "Split + bridge pulses",
    "Full split + scorpion",
];

const FOCUS: [&str; MILESTONES_PER_CATEGORY] = [
    "2u onafgeleid",
    "3 dagen geen social",
    "3u/day focus",
    "7 dagen schema",
    "10 dagen Pomodoro",
    "7 dagen monk mode",
    "3 dagen zonder telefoon",
    "5u deep work",
    "12u extreme focusdag",
    "CEO mentaliteit",
];

const INTELLIGENTIE: [&str; MILESTONES_PER_CATEGORY] = [
    "5 dagen lezen",
    "1 boek uit",
    "3 boeken + notities",
    "Zettelkasten of Obsidian",
    "30 dagen 45m/dag leren",
    "Skill masteren",
    "Samenvat & teach",
    "Nieuwe skill toepassen",
    "Snel lezen + onthouden",
    "Polyglot level 🧠",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_from_name_accepts_name_and_slug() {
        assert_eq!(Category::from_name("VO2 Max"), Some(Category::Vo2Max));
        assert_eq!(Category::from_name("vo2-max"), Some(Category::Vo2Max));
        assert_eq!(Category::from_name(" kracht "), Some(Category::Kracht));
        assert_eq!(Category::from_name("FOCUS"), Some(Category::Focus));
        assert_eq!(Category::from_name("Charisma"), None);
        assert_eq!(Category::from_name(""), None);
    }

    #[test]
    fn test_windows() {
        let windows: Vec<i64> = Category::ALL.iter().map(|c| c.validation_window_days()).collect();
        assert_eq!(windows, vec![14, 7, 10, 14, 3, 30]);
    }

    #[test]
    fn test_milestone_tables_are_distinct_and_non_empty() {
        for c in Category::ALL {
            let table = c.milestones();
            assert!(table.iter().all(|m| !m.is_empty()), "{} has empty milestone", c);
            let mut dedup: Vec<&str> = table.to_vec();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), MILESTONES_PER_CATEGORY, "{} has duplicates", c);
        }
    }

    #[test]
    fn test_serde_uses_display_name() {
        let s = serde_json::to_string(&Category::Vo2Max).unwrap();
        assert_eq!(s, "\"VO2 Max\"");
    }
}
