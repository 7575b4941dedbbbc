//! vb_cli
//!
//! Scorebook tool over a JSON key/value store file: manage players and
//! matches, record rallies, print timelines and reports, import/export
//! snapshots.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use vb_core::snapshot::{load_scorebook, save_scorebook};
#[cfg(feature = "cli")]
use vb_core::{RecordOutcome, Scorebook, SnapshotConfig, SystemClock, TeamSide};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "vb_cli")]
#[command(about = "Volleyball rally scorebook", long_about = None)]
struct Cli {
    /// Key/value store file (created on first write)
    #[arg(long, global = true, default_value = "scorebook.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// List players
    Players,

    /// Add a player (names are trimmed and must be unique)
    AddPlayer { name: String },

    /// List matches, newest first
    Matches,

    /// Create a match; date defaults to today
    AddMatch {
        #[arg(long)]
        date: Option<String>,
    },

    /// Put a player on a side of a match
    Assign {
        match_id: String,
        /// Player id or name
        player: String,
        /// home / away (our / opp accepted)
        side: TeamSide,
    },

    /// Append an action to the open rally
    Record {
        match_id: String,
        /// Player id or name
        player: String,
        /// attack, serve, block, receive, dig or set
        kind: String,
        /// Result word, e.g. kill, ace, point, ok, error
        result: String,
        /// Receive/dig quality (A, B, C)
        #[arg(long)]
        quality: Option<String>,
        /// Set call, e.g. left, aQuick, backAttack
        #[arg(long)]
        tag: Option<String>,
    },

    /// Award the open rally to a side by hand
    Point { match_id: String, side: TeamSide },

    /// Delete a rally
    DeleteRally { match_id: String, rally_id: String },

    /// Print the score timeline of a match
    Timeline { match_id: String },

    /// Print a player's report
    Report {
        /// Player id or name
        player: String,
    },

    /// Write a localStorage-snapshot-v1 export
    Export {
        /// Output path; defaults to <prefix>-YYYYMMDD-HHMMSS.json
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import an export document into the store
    Import {
        #[arg(long)]
        r#in: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = vb_cli::load_config()?;
    let mut store = vb_cli::FileStore::open(&cli.store)?;

    // Export and import work on raw keys and never parse the scorebook.
    match cli.command {
        Commands::Export { out } => {
            let (path, keys) = vb_cli::export_store(&store, &config, out.as_deref(), chrono::Local::now())?;
            println!("📦 Exported {} keys to {}", keys, path.display());
        }

        Commands::Import { r#in } => {
            let summary = vb_cli::import_file(&mut store, &config, &r#in, chrono::Utc::now())?;
            print_import_summary(&summary);
        }

        command => run_scorebook_command(command, &mut store, &config)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn run_scorebook_command(
    command: Commands,
    store: &mut vb_cli::FileStore,
    config: &SnapshotConfig,
) -> Result<()> {
    let mut book = load_scorebook(&*store, config, SystemClock)
        .with_context(|| format!("Failed to load scorebook from {}", store.path().display()))?;

    match command {
        Commands::Players => {
            for player in book.players() {
                println!("{}  {}", player.id, player.name);
            }
        }

        Commands::AddPlayer { name } => {
            let Some(player) = book.add_player(&name) else {
                anyhow::bail!("❌ Player name is blank or already taken: {:?}", name);
            };
            println!("✅ Added {} ({})", player.name, player.id);
            persist(store, config, &book)?;
        }

        Commands::Matches => {
            for line in vb_cli::match_lines(&book) {
                println!("{}", line);
            }
        }

        Commands::AddMatch { date } => {
            let match_id = book.add_match(date.as_deref());
            println!("✅ Created match {}", match_id);
            persist(store, config, &book)?;
        }

        Commands::Assign { match_id, player, side } => {
            let player_id = require_player(&book, &player)?;
            if !book.assign(&match_id, &player_id, side) {
                anyhow::bail!("❌ No such match: {}", match_id);
            }
            println!("✅ {} plays {}", player, side);
            persist(store, config, &book)?;
        }

        Commands::Record { match_id, player, kind, result, quality, tag } => {
            let player_id = require_player(&book, &player)?;
            let action = vb_cli::parse_action(&kind, &result, quality.as_deref(), tag.as_deref())?;
            let outcome = book
                .record(&match_id, &player_id, action)
                .with_context(|| format!("No such match: {}", match_id))?;

            match outcome {
                RecordOutcome::Recorded { outcome: Some(side), .. } => {
                    let score = book.match_log(&match_id).map(|log| log.score()).unwrap_or_default();
                    println!("🏐 Point {} ({})", side, score);
                }
                RecordOutcome::Recorded { action_id, .. } => println!("📝 Recorded {}", action_id),
                RecordOutcome::Ignored(reason) => {
                    println!("⚠️  Ignored: {:?} ({} is not on a side)", reason, player);
                    return Ok(());
                }
            }
            persist(store, config, &book)?;
        }

        Commands::Point { match_id, side } => {
            let rally_id = book
                .finalize_manually(&match_id, side)
                .with_context(|| format!("No such match: {}", match_id))?;
            println!("🏐 Point {} (rally {})", side, rally_id);
            persist(store, config, &book)?;
        }

        Commands::DeleteRally { match_id, rally_id } => {
            if !book.delete_rally(&match_id, &rally_id) {
                anyhow::bail!("❌ No rally {} in match {}", rally_id, match_id);
            }
            println!("🗑️  Deleted rally {}", rally_id);
            persist(store, config, &book)?;
        }

        Commands::Timeline { match_id } => {
            let log = book
                .match_log(&match_id)
                .with_context(|| format!("No such match: {}", match_id))?;
            println!("{}  {}", log.info().date, log.id());
            for line in vb_cli::timeline_lines(&book, log) {
                println!("{}", line);
            }
            println!("Final: {}", log.score());
        }

        Commands::Report { player } => {
            let player_id = require_player(&book, &player)?;
            let report = vb_core::analysis::player_report(&book, &player_id);
            let name = book.player(&player_id).map(|p| p.name.as_str()).unwrap_or(&player);
            for line in vb_cli::report_lines(name, &report) {
                println!("{}", line);
            }
        }

        Commands::Export { .. } | Commands::Import { .. } => {
            anyhow::bail!("export and import run without loading the scorebook")
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_import_summary(summary: &vb_core::snapshot::ImportSummary) {
    println!("✅ Imported {} keys", summary.imported_keys.len());
    println!("   Backup:  {}", summary.backup_key);
    println!("   Weights: {}", if summary.saved_weights { "saved" } else { "none" });
    for stats in &summary.stats {
        println!(
            "   {}: {} players, {} matches, {} rallies",
            stats.key,
            stats.players.unwrap_or(0),
            stats.matches.unwrap_or(0),
            stats.rallies.unwrap_or(0)
        );
    }
}

#[cfg(feature = "cli")]
fn require_player(book: &Scorebook<SystemClock>, id_or_name: &str) -> Result<String> {
    vb_cli::find_player_id(book, id_or_name).with_context(|| format!("No such player: {}", id_or_name))
}

#[cfg(feature = "cli")]
fn persist(store: &mut vb_cli::FileStore, config: &SnapshotConfig, book: &Scorebook<SystemClock>) -> Result<()> {
    save_scorebook(store, config, book)?;
    store.save()?;
    tracing::debug!(path = %store.path().display(), "scorebook persisted");
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("vb_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
