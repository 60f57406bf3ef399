//! Structured JSON-lines logging.
//!
//! Every record carries a run id, a sequence number, a level and a domain.
//! Records go to stderr so stdout stays free for command output. When
//! `LOG_DIR` is set, records are also written under `<LOG_DIR>/<run_id>/`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Progress, // XP awards, resets
    Storage,  // Load/save against the kv store
    Http,     // Request handling
    System,   // Startup, shutdown
    Audit,    // State fingerprints after writes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Progress => "progress",
            Domain::Storage => "storage",
            Domain::Http => "http",
            Domain::System => "system",
            Domain::Audit => "audit",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunSinks {
    events: Mutex<BufWriter<File>>,
    trace: Mutex<BufWriter<File>>,
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    sinks: Option<RunSinks>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let sinks = std::env::var("LOG_DIR")
            .ok()
            .and_then(|base| open_sinks(PathBuf::from(base).join(&run_id), &run_id));
        RunContext { run_id, sinks }
    })
}

fn open_sinks(run_dir: PathBuf, run_id: &str) -> Option<RunSinks> {
    if let Err(err) = create_dir_all(&run_dir) {
        eprintln!("[log] failed to create run dir {}: {}", run_dir.display(), err);
        return None;
    }
    let _ = std::fs::write(
        run_dir.join("manifest.json"),
        json!({
            "run_id": run_id,
            "ts": ts_now(),
            "pid": process::id(),
            "log_dir": run_dir.to_string_lossy(),
        })
        .to_string(),
    );
    let open = |name: &str| match File::create(run_dir.join(name)) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", name, err);
            None
        }
    };
    Some(RunSinks {
        events: open("events.jsonl")?,
        trace: open("trace.jsonl")?,
    })
}

fn write_line(writer: &Mutex<BufWriter<File>>, line: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    let line = format_record(ensure_run_context(), next_seq(), level, domain, event, fields);
    emit(level, &line);
}

fn format_record(
    ctx: &RunContext,
    seq: u64,
    level: Level,
    domain: Domain,
    event: &str,
    mut fields: Map<String, Value>,
) -> String {
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(seq));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    if let Some(category) = fields.remove("category") {
        entry.insert("category".to_string(), category);
    }
    entry.insert("data".to_string(), Value::Object(fields));
    Value::Object(entry).to_string()
}

fn emit(level: Level, line: &str) {
    if let Some(sinks) = &ensure_run_context().sinks {
        match level {
            Level::Trace | Level::Debug => write_line(&sinks.trace, line),
            _ => write_line(&sinks.events, line),
        }
    }
    eprintln!("{}", line);
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_startup(command: &str, db_path: &str) {
    log(
        Level::Debug,
        Domain::System,
        "startup",
        obj(&[("command", v_str(command)), ("db_path", v_str(db_path))]),
    );
}

pub fn log_xp_awarded(category: &str, amount: u64, xp: u64, level: u32) {
    log(
        Level::Info,
        Domain::Progress,
        "xp_awarded",
        obj(&[
            ("category", v_str(category)),
            ("amount", json!(amount)),
            ("xp", json!(xp)),
            ("level", json!(level)),
        ]),
    );
}

pub fn log_xp_ignored(category: &str, amount: u64, reason: &str) {
    log(
        Level::Warn,
        Domain::Progress,
        "xp_ignored",
        obj(&[
            ("category", v_str(category)),
            ("amount", json!(amount)),
            ("reason", v_str(reason)),
        ]),
    );
}

pub fn log_reset() {
    log(Level::Info, Domain::Progress, "reset", obj(&[("msg", v_str("all categories reset"))]));
}

/// A persisted record was missing or unreadable and defaults were used.
pub fn log_load_fallback(key: &str, status: &str, defaulted: usize) {
    log(
        Level::Warn,
        Domain::Storage,
        "load_fallback",
        obj(&[
            ("key", v_str(key)),
            ("status", v_str(status)),
            ("defaulted", json!(defaulted)),
        ]),
    );
}

pub fn log_persist_failure(op: &str, key: &str, err: &anyhow::Error) {
    log(
        Level::Warn,
        Domain::Storage,
        "persist_failure",
        obj(&[
            ("op", v_str(op)),
            ("key", v_str(key)),
            ("error", v_str(&format!("{:#}", err))),
        ]),
    );
}

pub fn log_request(method: &str, path: &str, status: u16) {
    log(
        Level::Debug,
        Domain::Http,
        "request",
        obj(&[
            ("method", v_str(method)),
            ("path", v_str(path)),
            ("status", json!(status)),
        ]),
    );
}

/// Fingerprint of what was just written, for comparing against a reload.
pub fn log_audit(event_type: &str, state_hash: &str) {
    log(
        Level::Debug,
        Domain::Audit,
        event_type,
        obj(&[("state_hash", v_str(state_hash))]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}


// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", json!(42))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }

    #[test]
    fn test_record_lifts_msg_and_category() {
        let ctx = RunContext { run_id: "r-test".to_string(), sinks: None };
        let line = format_record(
            &ctx,
            7,
            Level::Warn,
            Domain::Progress,
            "xp_ignored",
            obj(&[("category", v_str("Charisma")), ("msg", v_str("unknown")), ("amount", json!(10))]),
        );
        let v: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["run_id"], "r-test");
        assert_eq!(v["seq"], 7);
        assert_eq!(v["lvl"], "WARN");
        assert_eq!(v["component"], "progress");
        assert_eq!(v["category"], "Charisma");
        assert_eq!(v["msg"], "unknown");
        assert_eq!(v["data"]["amount"], 10);
        assert!(v["data"].get("category").is_none());
    }
}
