//! strm-helper - Main entry point

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use strm_helper::index::{IndexRefresher, SqliteIndex};
use strm_helper::{generate_from_index, generate_single, utils, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk the remote index and generate pointer files for every media file
    Sync(SyncArgs),

    /// Generate the pointer for one remote file with a known content handle
    Single(SingleArgs),
}

/// Overrides shared by both subcommands
#[derive(ClapArgs, Debug)]
struct OutputArgs {
    /// Local directory to mirror pointer files into
    #[arg(long, value_name = "DIR")]
    target_dir: Option<String>,

    /// Base URL of the streaming server
    #[arg(long, value_name = "URL")]
    server_url: Option<String>,

    /// Pointer ledger database
    #[arg(long, value_name = "FILE")]
    ledger: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct SyncArgs {
    /// Folder id to start from (0 = index root)
    #[arg(long)]
    root_id: Option<i64>,

    /// Remote index database
    #[arg(long, value_name = "FILE")]
    index: Option<PathBuf>,

    /// Skip the index refresh command
    #[arg(long)]
    no_refresh: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(ClapArgs, Debug)]
struct SingleArgs {
    /// Remote path of the file, e.g. /Movies/Inception.mkv
    #[arg(long)]
    path: String,

    /// Content handle (pick code) of the file
    #[arg(long)]
    handle: String,

    #[command(flatten)]
    output: OutputArgs,
}

fn apply_output_args(config: &mut Config, output: &OutputArgs) {
    if let Some(target_dir) = &output.target_dir {
        config.generate.target_dir = target_dir.clone();
    }
    if let Some(server_url) = &output.server_url {
        config.generate.server_url = server_url.clone();
    }
    if let Some(ledger) = &output.ledger {
        config.ledger.path = ledger.clone();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }

    // Initialize logging
    utils::logger::init(&config.log)?;

    match args.command {
        Command::Sync(sync) => run_sync(config, sync),
        Command::Single(single) => run_single(config, single),
    }
}

fn run_sync(mut config: Config, args: SyncArgs) -> Result<()> {
    apply_output_args(&mut config, &args.output);
    if let Some(root_id) = args.root_id {
        config.generate.root_id = root_id;
    }
    if let Some(index) = args.index {
        config.index.path = index;
    }
    if args.no_refresh {
        config.index.refresh = false;
    }
    config.validate()?;

    tracing::info!(
        "Starting strm-helper v{} (root: {}, target: {})",
        env!("CARGO_PKG_VERSION"),
        config.generate.root_id,
        config.generate.target_dir
    );

    if let Some(refresher) = config.refresher()? {
        refresher
            .refresh(&config.index.path)
            .context("Failed to refresh remote index")?;
    }

    let index = SqliteIndex::open(&config.index.path)
        .with_context(|| format!("Failed to open remote index {}", config.index.path.display()))?;
    let summary = generate_from_index(
        &index,
        config.root_id(),
        &config.generate_options(),
        &config.ledger.path,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} written, {} already generated, {} skipped ({} ms)",
            summary.written, summary.already_generated, summary.filtered_out, summary.duration_ms
        );
    }

    Ok(())
}

fn run_single(mut config: Config, args: SingleArgs) -> Result<()> {
    apply_output_args(&mut config, &args.output);
    config.validate()?;

    let written = generate_single(
        &args.path,
        &args.handle,
        &config.generate_options(),
        &config.ledger.path,
    )?;

    if written {
        println!("Generated pointer for {}", args.path);
    } else {
        println!("Skipped {}", args.path);
    }

    Ok(())
}
