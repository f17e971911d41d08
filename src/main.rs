//! Music Analysis - Main entry point
//!
//! Runs the analysis pipeline over a listening log and song catalog.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use music_analysis::{display, pipeline, Config, Result};

#[derive(Parser)]
#[command(name = "music-analysis")]
#[command(author, version, about = "Listening analytics over streaming logs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MUSIC_ANALYSIS_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute all result sets and write them to the output directory
    Run {
        /// Listening log CSV
        #[arg(long)]
        logs: Option<PathBuf>,

        /// Song catalog CSV
        #[arg(long)]
        songs: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the first N rows of every result set
        #[arg(short, long)]
        preview: Option<usize>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration
    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    config.validate()?;

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.to_lowercase()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if config.general.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.general.workers)
            .build_global()
            .map_err(|e| music_analysis::Error::config(e.to_string()))?;
    }

    match cli.command {
        Some(Commands::Run {
            logs,
            songs,
            output,
            preview,
            json,
        }) => {
            let mut config = config;
            if let Some(logs) = logs {
                config.input.listening_logs = logs;
            }
            if let Some(songs) = songs {
                config.input.songs_metadata = songs;
            }
            if let Some(output) = output {
                config.output.dir = output;
            }
            run_pipeline(&config, preview, json).await
        }

        Some(Commands::Config { show, init }) => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config)?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
            }
            Ok(())
        }

        None => run_pipeline(&config, None, false).await,
    }
}

async fn run_pipeline(config: &Config, preview: Option<usize>, json: bool) -> Result<()> {
    let report = pipeline::run_with_preview(config, |results| {
        if let Some(limit) = preview {
            display::display_results(results, limit);
        }
    })
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::display_report(&report);
    }
    Ok(())
}
