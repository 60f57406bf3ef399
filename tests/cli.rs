//! Runs the built binary against a throwaway database path.

use std::path::Path;
use std::process::Command;

fn run(db: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_acetracker"))
        .args(args)
        .env("ACE_DB_PATH", db)
        .env("LOG_LEVEL", "error")
        .env_remove("LOG_DIR")
        .output()
        .expect("run acetracker")
}

// ---------------------------------------------------------------------------
// Rejected invocations never create the database file
// ---------------------------------------------------------------------------
#[test]
fn unknown_command_leaves_no_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("ace.sqlite");

    let out = run(&db, &["foo"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown command: foo"));
    assert!(!db.exists());

    let out = run(&db, &["add", "charisma"]);
    assert!(!out.status.success());
    assert!(!db.exists());
}

// ---------------------------------------------------------------------------
// A valid command creates the database and persists the award
// ---------------------------------------------------------------------------
#[test]
fn add_then_status_persists() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("ace.sqlite");

    let out = run(&db, &["add", "kracht", "250"]);
    assert!(out.status.success());
    assert!(db.exists());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Kracht: 250 XP, level 3 / 99"));

    let out = run(&db, &["status", "--json"]);
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["stats"][0]["xp"], 250);
}
