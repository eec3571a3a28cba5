//! `skald`: inspect and maintain the persisted commit cache and usage ledger.
//!
//! Output is JSON on stdout. Destructive commands ask for confirmation
//! unless `--yes` is given.
//!
//! Build: `cargo build --bin skald --features cli`

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use serde_json::json;

use skald::{CommitCache, Config, StatsLedger};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "skald", version, about = "inspect skald's commit cache and usage stats")]
struct Args {
    /// path to config.toml (default: standard locations, then built-in defaults)
    #[arg(long, env = "SKALD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// show usage statistics
    Stats {
        /// zero the usage ledger instead of showing it
        #[arg(long)]
        reset: bool,
        /// skip the confirmation prompt
        #[arg(long, requires = "reset")]
        yes: bool,
    },
    /// commit cache management
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand)]
enum CacheCommand {
    /// show cache statistics
    Stats,
    /// remove every cached message
    Clear {
        /// skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

// ── helpers ─────────────────────────────────────────────────────────

/// confirm a prompt with the user; returns false if declined.
fn confirm(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── commands ────────────────────────────────────────────────────────

fn stats_show(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = StatsLedger::open(&config.stats.path)?;
    let stats = ledger.snapshot();
    let most_used = stats
        .most_used_provider()
        .map(|(provider, uses)| json!({ "provider": provider, "uses": uses }));

    print_json(&json!({
        "path": ledger.path(),
        "success_rate": stats.success_rate(),
        "failure_rate": stats.failure_rate(),
        "cache_hit_rate": stats.cache_hit_rate(),
        "most_used_provider": most_used,
        "provider_ranking": stats.provider_ranking(),
        "stats": stats,
    }))
}

fn stats_reset(config: &Config, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = StatsLedger::open(&config.stats.path)?;
    if !yes && !confirm(&format!("reset usage stats at {}?", ledger.path().display())) {
        eprintln!("aborted");
        return Ok(());
    }
    ledger.reset()?;
    print_json(&json!({ "reset": true, "path": ledger.path() }))
}

fn cache_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // read the file as-is, even when caching is disabled
    let cache = CommitCache::inspect(config.cache.clone())?;
    print_json(&json!({
        "path": cache.config().path,
        "enabled": cache.is_enabled(),
        "stats": cache.stats(),
    }))
}

fn cache_clear(config: &Config, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cache = CommitCache::open(config.cache.clone())?;
    let removed = cache.len();
    if !yes
        && !confirm(&format!(
            "remove {removed} cached message(s) from {}?",
            cache.config().path.display()
        ))
    {
        eprintln!("aborted");
        return Ok(());
    }
    cache.clear()?;
    print_json(&json!({ "cleared": removed, "path": cache.config().path }))
}

// ── main ────────────────────────────────────────────────────────────

fn main() {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let result = match args.command {
        Command::Stats { reset: false, .. } => stats_show(&config),
        Command::Stats { reset: true, yes } => stats_reset(&config, yes),
        Command::Cache(CacheCommand::Stats) => cache_stats(&config),
        Command::Cache(CacheCommand::Clear { yes }) => cache_clear(&config, yes),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
