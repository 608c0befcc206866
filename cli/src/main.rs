//! plsindex CLI — replay registrar events and inspect projected state.
//!
//! Usage:
//! ```bash
//! plsindex info
//! plsindex hash alice
//! plsindex replay --events events.jsonl --names names.txt --db pls.db
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod replay;

#[derive(Parser)]
#[command(
    name = "plsindex",
    about = "Projects .pls registrar events into domains, registrations and referrals",
    version
)]
struct Cli {
    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit JSON structured logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the registrar configuration
    Info,

    /// Compute the label hash, token id and domain key of a label
    Hash {
        /// Plaintext label without the suffix (e.g. "alice")
        label: String,
    },

    /// Replay a JSON-lines event dump into an entity store
    Replay {
        /// Path to the event dump (one decoded event per line)
        #[arg(short, long)]
        events: PathBuf,
        /// Newline-separated plaintext labels used for reverse lookup
        #[arg(short, long)]
        names: Option<PathBuf>,
        /// SQLite database to project into (default: in-memory)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Print projected domains as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    match cli.command {
        Commands::Info => cmd_info(),
        Commands::Hash { label } => cmd_hash(&label),
        Commands::Replay {
            events,
            names,
            db,
            json,
        } => replay::run(&events, names.as_deref(), db.as_deref(), json).await,
    }
}

fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn cmd_info() -> Result<()> {
    let config = plsindex_core::RegistrarConfig::default();
    println!("plsindex v{}", env!("CARGO_PKG_VERSION"));
    println!("  Suffix:       .{}", config.tld);
    println!("  Root node:    {}", plsindex_core::identity::hex_id(config.root_node));
    println!(
        "  Grace period: {} seconds ({} days)",
        config.grace_period,
        config.grace_period / 86_400
    );
    println!("  Schemas:      {}", plsindex_core::events::schema::ALL.join(", "));
    println!("  Storage:      memory, SQLite");
    Ok(())
}

fn cmd_hash(label: &str) -> Result<()> {
    use plsindex_core::identity::{domain_key, hex_id, id_from_label, label_hash};

    if !plsindex_core::is_valid_label(Some(label)) {
        anyhow::bail!("label contains a null byte");
    }
    let config = plsindex_core::RegistrarConfig::default();
    let hash = label_hash(label);
    println!("name:       {}", config.full_name(label));
    println!("label hash: {}", hex_id(hash));
    println!("token id:   {}", id_from_label(&hash));
    println!("domain key: {}", hex_id(domain_key(&config.root_node, &hash)));
    Ok(())
}
