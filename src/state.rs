use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::registry::{Category, CATEGORY_COUNT};

/// Storage key of the XP record.
pub const XP_KEY: &str = "xp";
/// Storage key of the last-check record.
pub const LAST_CHECK_KEY: &str = "lastCheck";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub bind: String,
    pub port: u16,
    /// XP granted by one "+XP" intent from the UI.
    pub xp_step: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("ACE_DB_PATH").unwrap_or_else(|_| "./ace.sqlite".to_string()),
            bind: std::env::var("ACE_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("ACE_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8765),
            xp_step: std::env::var("ACE_XP_STEP")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0)
                .unwrap_or(10),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./ace.sqlite".to_string(),
            bind: "127.0.0.1".to_string(),
            port: 8765,
            xp_step: 10,
        }
    }
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Timestamp encoding used in the persisted last-check record.
pub fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_ts(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatProgress {
    pub xp: u64,
    /// Time of the last XP award for this category.
    pub last_check: DateTime<Utc>,
}

impl StatProgress {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self { xp: 0, last_check: now }
    }
}

/// How one persisted record was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Absent,
    Malformed,
    /// Parsed, but this many categories fell back to defaults.
    Partial(usize),
    Complete,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Absent => "absent",
            RecordStatus::Malformed => "malformed",
            RecordStatus::Partial(_) => "partial",
            RecordStatus::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Decoded {
    pub state: ProgressState,
    pub xp: RecordStatus,
    pub last_check: RecordStatus,
}

/// Per-category XP and last award time. Holds exactly one entry per
/// registered category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    entries: [StatProgress; CATEGORY_COUNT],
}

impl ProgressState {
    /// Zero XP everywhere, all last checks at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            entries: [StatProgress::fresh(now); CATEGORY_COUNT],
        }
    }

    pub fn get(&self, category: Category) -> &StatProgress {
        &self.entries[category.index()]
    }

    pub(crate) fn get_mut(&mut self, category: Category) -> &mut StatProgress {
        &mut self.entries[category.index()]
    }

    pub fn xp(&self, category: Category) -> u64 {
        self.get(category).xp
    }

    pub fn last_check(&self, category: Category) -> DateTime<Utc> {
        self.get(category).last_check
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &StatProgress)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// `{"Kracht": 90, ...}`
    pub fn xp_record(&self) -> String {
        let map: Map<String, Value> = self
            .iter()
            .map(|(c, p)| (c.name().to_string(), Value::from(p.xp)))
            .collect();
        Value::Object(map).to_string()
    }

    /// `{"Kracht": "2026-10-18T09:30:00.000Z", ...}`
    pub fn last_check_record(&self) -> String {
        let map: Map<String, Value> = self
            .iter()
            .map(|(c, p)| (c.name().to_string(), Value::String(encode_ts(p.last_check))))
            .collect();
        Value::Object(map).to_string()
    }

    /// Rebuild state from the two persisted records. Anything missing or
    /// unreadable falls back to 0 XP / `now` for the affected categories.
    pub fn from_records(xp: Option<&str>, last_check: Option<&str>, now: DateTime<Utc>) -> Decoded {
        let mut state = Self::fresh(now);

        let xp_status = decode_record(xp, |c, v| {
            let xp = v.as_u64()?;
            state.get_mut(c).xp = xp;
            Some(())
        });
        let last_check_status = decode_record(last_check, |c, v| {
            let ts = decode_ts(v.as_str()?)?;
            state.get_mut(c).last_check = ts;
            Some(())
        });

        Decoded {
            state,
            xp: xp_status,
            last_check: last_check_status,
        }
    }

    /// SHA-256 over both persisted records.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.xp_record().as_bytes());
        hasher.update(b"\n");
        hasher.update(self.last_check_record().as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn decode_record<F>(raw: Option<&str>, mut apply: F) -> RecordStatus
where
    F: FnMut(Category, &Value) -> Option<()>,
{
    let Some(raw) = raw else {
        return RecordStatus::Absent;
    };
    let map = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => return RecordStatus::Malformed,
    };
    let defaulted = Category::ALL
        .iter()
        .filter(|c| map.get(c.name()).and_then(|v| apply(**c, v)).is_none())
        .count();
    if defaulted == 0 {
        RecordStatus::Complete
    } else {
        RecordStatus::Partial(defaulted)
    }
}
