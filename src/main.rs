//! acetracker: XP/level tracker for six life-skill stats.
//!
//! Usage:
//!   acetracker <command> [args]
//!
//! Commands:
//!   status [--json]            Show levels, milestones and validation
//!   add <category> [amount]    Award XP (default: ACE_XP_STEP)
//!   reset                      Zero every category
//!   chart                      Print the radar chart payload
//!   html                       Print the tracker page
//!   serve                      Serve the tracker page over HTTP
//!
//! State lives in the SQLite file named by ACE_DB_PATH.

use anyhow::{bail, Context, Result};

use acetracker::logging::log_startup;
use acetracker::present::{radar_payload, render_html, render_text};
use acetracker::registry::Category;
use acetracker::server;
use acetracker::session::{Intent, Session};
use acetracker::state::{now, Config};
use acetracker::storage::SqliteKv;

fn print_usage() {
    eprintln!("Usage: acetracker <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status [--json]            Show levels, milestones and validation");
    eprintln!("  add <category> [amount]    Award XP (default: ACE_XP_STEP)");
    eprintln!("  reset                      Zero every category");
    eprintln!("  chart                      Print the radar chart payload");
    eprintln!("  html                       Print the tracker page");
    eprintln!("  serve                      Serve the tracker page over HTTP");
    eprintln!();
    eprintln!("Categories:");
    for c in Category::ALL {
        eprintln!("  {:<14} ({}, {}-day window)", c.name(), c.slug(), c.validation_window_days());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status { json: bool },
    Add { category: Category, amount: Option<u64> },
    Reset,
    Chart,
    Html,
    Serve,
}

/// Parse everything after the program name. `Ok(None)` means an unknown
/// command; argument errors for a known command are `Err`.
fn parse_command(args: &[String]) -> Result<Option<Command>> {
    let Some(cmd) = args.first() else {
        return Ok(None);
    };
    let command = match cmd.as_str() {
        "status" => Command::Status { json: args[1..].iter().any(|a| a == "--json") },
        "add" => {
            let Some(name) = args.get(1) else {
                bail!("add needs a category, e.g. `acetracker add kracht`");
            };
            let Some(category) = Category::from_name(name) else {
                bail!("unknown category: {}", name);
            };
            let amount = match args.get(2) {
                Some(raw) => Some(
                    raw.parse::<u64>()
                        .ok()
                        .filter(|v| *v > 0)
                        .with_context(|| format!("amount must be a positive integer, got {}", raw))?,
                ),
                None => None,
            };
            Command::Add { category, amount }
        }
        "reset" => Command::Reset,
        "chart" => Command::Chart,
        "html" => Command::Html,
        "serve" => Command::Serve,
        _ => return Ok(None),
    };
    Ok(Some(command))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_command(&args)? else {
        if let Some(cmd) = args.first() {
            eprintln!("Unknown command: {}", cmd);
        }
        print_usage();
        std::process::exit(1);
    };

    // Only touch the database once the command is known to be valid.
    let cfg = Config::from_env();
    log_startup(&args[0], &cfg.db_path);
    let kv = SqliteKv::open(&cfg.db_path)
        .with_context(|| format!("failed to open {}", cfg.db_path))?;
    let mut session = Session::open(kv, cfg.xp_step, now());

    match command {
        Command::Status { json } => {
            let report = session.report(now());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_text(&report));
            }
        }
        Command::Add { category, amount } => {
            session.add_xp(category.name(), amount.unwrap_or(cfg.xp_step), now());
            let report = session.report(now());
            if let Some(stat) = report.stat(category) {
                println!(
                    "{}: {} XP, level {} / {} ({})",
                    category, stat.xp, stat.level, report.max_level, stat.milestone
                );
            }
            println!("ACE LEVEL {}", report.average_level);
        }
        Command::Reset => {
            session.apply(Intent::Reset, now());
            println!("Tracker reset.");
        }
        Command::Chart => {
            println!("{}", serde_json::to_string_pretty(&radar_payload(&session.report(now())))?);
        }
        Command::Html => {
            print!("{}", render_html(&session.report(now()), session.xp_step()));
        }
        Command::Serve => {
            server::serve(&mut session, &cfg.listen_addr())?;
        }
    }
    Ok(())
}
