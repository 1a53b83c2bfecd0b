use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use timo::config::AppConfig;
use timo::ingest::{self, FetchStamp};
use timo::models::CalendarDate;
use timo::render::RenderContext;
use timo::report::{self, LATEST_MONTH};
use timo::storage::{FsSnapshotStore, StorageConfig};

#[derive(Parser)]
#[command(name = "timo")]
#[command(about = "Reconcile official attendance records against a personal timesheet")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./timo.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Write debug-level logs to a file in the data directory instead of stderr
    #[arg(long)]
    debug: bool,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,

    /// Use ASCII markers instead of emoji
    #[arg(long)]
    ascii: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the reconciliation report for a month
    Report {
        /// Month index within the latest official snapshot (default: most recent)
        #[arg(long, allow_negative_numbers = true)]
        month: Option<i64>,
    },

    /// List months available in the latest official snapshot
    Months,

    /// Show the last available summary for both sources
    Overview,

    /// Import raw exports produced by the extractors
    Import {
        /// Official system export (JSON)
        #[arg(long)]
        official: Option<PathBuf>,

        /// Secondary system export (JSON)
        #[arg(long)]
        secondary: Option<PathBuf>,
    },
}

/// `RUST_LOG` directives win over the configured level; `--debug` then raises
/// the default level to debug on top of either.
fn log_filter(env_directives: Option<String>, level: &str, debug: bool) -> EnvFilter {
    let filter = env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    if debug {
        filter.add_directive(LevelFilter::DEBUG.into())
    } else {
        filter
    }
}

fn init_tracing(cli: &Cli, config: &AppConfig, storage: &StorageConfig) -> Result<()> {
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = log_filter(
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        &level,
        cli.debug,
    );

    let debug_file = if cli.debug {
        std::fs::create_dir_all(&storage.data_dir)
            .with_context(|| format!("Failed to create {:?}", storage.data_dir))?;
        let path = storage.debug_log_path();
        let file =
            File::create(&path).with_context(|| format!("Failed to create debug log {:?}", path))?;
        Some(file)
    } else {
        None
    };

    let to_stderr = debug_file.is_none();
    let json_layer = (to_stderr && cli.json_logs)
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer =
        (to_stderr && !cli.json_logs).then(|| fmt::layer().with_writer(std::io::stderr));
    let file_layer = debug_file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if cli.no_color {
        config.render.color = false;
    }
    if cli.ascii {
        config.render.emoji = false;
    }

    let storage = StorageConfig::new(config.data_dir.clone());
    init_tracing(&cli, &config, &storage)?;

    tracing::info!("Starting timo v{}", env!("CARGO_PKG_VERSION"));

    let store = FsSnapshotStore::from_config(&storage);
    let now = Local::now();
    let ctx = RenderContext::from_config(
        &config.render,
        Some(CalendarDate::from_naive(now.date_naive())),
    );

    match cli.command {
        Commands::Report { month } => {
            let text = report::reconcile_and_render(&store, month.unwrap_or(LATEST_MONTH), &ctx);
            if text.is_empty() {
                println!(
                    "No data available in {:?}. Run `timo import` first.",
                    store.dir()
                );
            } else {
                print!("{}", text);
            }
        }

        Commands::Months => {
            let months = report::available_months(&store);
            if months.is_empty() {
                println!("No official snapshot in {:?}", store.dir());
            }
            for (index, label) in months {
                println!("{:>3}  {}", index, label);
            }
        }

        Commands::Overview => {
            let text = report::overview(&store, &ctx);
            if text.is_empty() {
                println!("No data available in {:?}", store.dir());
            } else {
                println!("{}", text);
            }
        }

        Commands::Import {
            official,
            secondary,
        } => {
            let stamp = FetchStamp::from_datetime(now.naive_local());
            let result = ingest::import_files(&store, official, secondary, stamp).await?;

            println!("\n=== Import Results ===");
            if let Some(days) = result.official_days {
                println!("Official days:     {}", days);
            }
            if let Some(entries) = result.secondary_entries {
                println!("Secondary entries: {}", entries);
            }
            println!("Stored in:         {:?}", store.dir());
        }
    }

    Ok(())
}
