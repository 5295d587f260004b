//! Rankboard CLI - message-backed game leaderboards.
//!
//! Single binary that provides:
//! - `rankboard sync` - run a sync cycle for every enabled game
//! - `rankboard parse` - check how a command message parses
//! - `rankboard show` - print a stored board in leaderboard order
//! - `rankboard status` - recent sync events
//! - `rankboard init` - scaffold a project

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use rankboard_core::{
    adapters::{FileSnapshotStore, SnapshotStore},
    codec,
    observability::EventEmitter,
    sync::GameCycle,
    BoardConfig, GameType, RawMessage, Standing, SyncRunner,
};

#[derive(Parser)]
#[command(name = "rankboard")]
#[command(about = "Message-backed game leaderboards", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sync cycle
    Sync {
        /// Only sync this game (mr, ow, dl or the full name)
        #[arg(long)]
        game: Option<GameType>,
    },

    /// Parse a single command message
    Parse {
        /// Message text, e.g. "LB_UPDATE_DL: <@1> Haze Archon 4 1200 2026-02-14"
        text: String,
    },

    /// Print a stored board
    Show {
        #[arg(long)]
        game: GameType,
    },

    /// Show recent sync events
    Status {
        /// Number of events to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Initialize a new project
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if cli.json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    // Find project root
    let project_root = match cli.project {
        Some(p) => p,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Sync { game } => run_sync(&project_root, game).await,
        Commands::Parse { text } => parse_text(text),
        Commands::Show { game } => show_board(&project_root, game).await,
        Commands::Status { limit } => show_status(&project_root, limit),
        Commands::Init => init_project(&project_root),
    }
}

fn load_config(project_root: &Path) -> Result<BoardConfig> {
    let mut config = BoardConfig::load_from_project(project_root)?;
    config.resolve_paths(project_root);
    Ok(config)
}

async fn run_sync(project_root: &Path, only: Option<GameType>) -> Result<()> {
    tracing::info!(project = %project_root.display(), "Starting sync");

    let config = load_config(project_root)?;
    let runner = SyncRunner::from_config(&config, only);
    let events = EventEmitter::new(&config.events_path);

    if runner.games().is_empty() {
        tracing::warn!("No enabled games to sync");
        return Ok(());
    }

    events.emit_simple("sync_start", "Sync started")?;

    let cycles = runner.run_all().await;
    for cycle in &cycles {
        match cycle {
            GameCycle::Completed(report) => {
                println!("{}: {}", report.game, report.summary());
                for failure in &report.failures {
                    println!("  skipped message {}: {}", failure.message_id, failure.reason);
                }
                events.emit_for(
                    "cycle_complete",
                    Some(report.game),
                    &report.summary(),
                    serde_json::to_value(report)?,
                )?;
            }
            GameCycle::Failed { game, error } => {
                println!("{}: FAILED - {}", game, error);
                events.emit_for(
                    "cycle_failed",
                    Some(*game),
                    error,
                    serde_json::Value::Null,
                )?;
            }
        }
    }

    let failed = cycles.iter().filter(|c| c.is_failed()).count();
    events.emit_simple(
        "sync_stop",
        &format!("Sync finished, {} of {} games failed", failed, cycles.len()),
    )?;

    if failed == cycles.len() {
        anyhow::bail!("All {} game syncs failed", failed);
    }
    Ok(())
}

fn parse_text(text: String) -> Result<()> {
    let message = RawMessage {
        id: "cli".to_string(),
        content: text,
        timestamp: Utc::now(),
    };

    match rankboard_core::parse_message(&message) {
        Ok(Some(update)) => {
            let record = &update.record;
            println!("Game:    {}", update.game);
            println!("User:    {}", record.user_id);
            match &record.standing {
                Standing::TwoRank {
                    role,
                    current,
                    peak,
                } => {
                    println!("Role:    {}", role);
                    println!("Current: {} ({})", current.rank, current.value);
                    println!("Peak:    {} ({})", peak.rank, peak.value);
                }
                Standing::SingleRank { hero_name, current } => {
                    println!("Hero:    {}", hero_name);
                    println!("Current: {} ({})", current.rank, current.value);
                }
            }
            println!("Updated: {}", codec::format_timestamp(&record.last_updated));
            Ok(())
        }
        Ok(None) => {
            println!("Not a leaderboard command");
            Ok(())
        }
        Err(e) => anyhow::bail!("Invalid command: {}", e),
    }
}

async fn show_board(project_root: &Path, game: GameType) -> Result<()> {
    let config = load_config(project_root)?;
    let store = FileSnapshotStore::new(config.snapshot_path(game));

    let Some(text) = store.load().await? else {
        println!("No {} board published yet", game);
        return Ok(());
    };

    let state = codec::decode(&text);
    if state.game != Some(game) {
        println!("No {} board found in {}", game, store.path().display());
        return Ok(());
    }

    println!("{} leaderboard ({} players)", game, state.len());
    println!("Cursor: {}", state.cursor.as_deref().unwrap_or("none"));
    println!();
    for (place, player) in state.ranked().iter().enumerate() {
        let current = player.current();
        let peak = player
            .peak()
            .map(|p| format!("  peak {} ({})", p.rank, p.value))
            .unwrap_or_default();
        println!(
            "{:>3}. <@{}> {} - {} ({}){}",
            place + 1,
            player.user_id,
            player.standing.label(),
            current.rank,
            current.value,
            peak
        );
    }

    Ok(())
}

fn show_status(project_root: &Path, limit: usize) -> Result<()> {
    let config = load_config(project_root)?;
    let events = EventEmitter::new(&config.events_path);
    let recent_events = events.read_recent(limit);

    println!("Rankboard Status");
    println!("================");
    println!();
    println!("Project: {}", project_root.display());
    println!("Games:   {}", config.enabled_games().iter().map(|g| g.name()).collect::<Vec<_>>().join(", "));
    println!();
    println!("Recent events:");
    for event in &recent_events {
        let game = event.game.map(|g| g.name()).unwrap_or("-");
        println!(
            "  {} [{}] {} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.event_type,
            game,
            event.message
        );
    }

    Ok(())
}

fn init_project(project_root: &Path) -> Result<()> {
    let rankboard_dir = project_root.join(".rankboard");
    let data_dir = rankboard_dir.join("data");

    std::fs::create_dir_all(&data_dir)?;

    // Create default config
    let config_path = rankboard_dir.join("config.yaml");
    if !config_path.exists() {
        let default_config = r#"# Rankboard configuration

data_dir: .rankboard/data
events_path: .rankboard/events.jsonl

# Games listed here are the only ones synced.
games:
  marvel_rivals:
    enabled: true
  overwatch:
    enabled: true
  deadlock:
    enabled: true
    # messages: .rankboard/data/deadlock.messages.jsonl
    # snapshot: .rankboard/data/deadlock.board.txt
"#;
        std::fs::write(&config_path, default_config)?;
    }

    // Create empty message logs
    for game in GameType::ALL {
        let log = data_dir.join(format!("{}.messages.jsonl", game.name()));
        if !log.exists() {
            std::fs::write(&log, "")?;
        }
    }

    println!("Initialized Rankboard project at {}", project_root.display());
    println!();
    println!("Created:");
    println!("  .rankboard/config.yaml - configuration");
    println!("  .rankboard/data/*.messages.jsonl - message logs");
    println!();
    println!("Next steps:");
    println!("  1. Append messages as JSON lines: {{\"id\", \"content\", \"timestamp\"}}");
    println!("  2. Run: rankboard sync");

    Ok(())
}
