//! tnwatch CLI
//!
//! Command-line interface for fetching a stream, summarising it and alerting.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use tnwatch::config::{Config, LoggingConfig};
use tnwatch::credential::ProcessEnv;
use tnwatch::output::{write_index, write_report, OutputFormat};
use tnwatch::pipeline;

/// tnwatch - stream summaries and threshold alerts for the TRUF network
#[derive(Parser)]
#[command(name = "tnwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "TNWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a primitive stream, compute its mean and check the alert threshold
    Risk {
        #[command(flatten)]
        stream: StreamArgs,

        /// Alert when the mean strictly exceeds this value
        #[arg(long)]
        threshold: Option<f64>,

        /// Multiply every fetched value by this factor
        #[arg(long, conflicts_with = "no_scale")]
        scale_factor: Option<f64>,

        /// Use fetched values as-is
        #[arg(long)]
        no_scale: bool,
    },

    /// Fetch raw records and index levels of a composed stream
    Index {
        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Args)]
struct StreamArgs {
    /// Stream id, or a stream name to derive the id from
    #[arg(long)]
    stream_id: Option<String>,

    /// Data provider address
    #[arg(long)]
    provider: Option<String>,

    /// First date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl StreamArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(stream_id) = &self.stream_id {
            config.stream.stream_id = stream_id.clone();
        }
        if let Some(provider) = &self.provider {
            config.stream.provider = provider.clone();
        }
        if let Some(from) = self.from {
            config.stream.date_from = from;
        }
        if let Some(to) = self.to {
            config.stream.date_to = to;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let (dotenv, cli) = parse_args(None, std::env::args_os());
    let cli = cli.unwrap_or_else(|e| e.exit());

    // Load configuration
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    apply_overrides(&mut config, &cli.command);

    init_logging(&config.logging, cli.verbose);
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env file");
    }

    // Execute command
    let result = match cli.command {
        Commands::Risk { .. } => run_risk(config, cli.format).await,
        Commands::Index { .. } => run_index(config, cli.format).await,
        Commands::Config => run_config(&config),
    };

    exit_code(result)
}

/// Load `.env` (from `dotenv_path`, or the usual lookup) before parsing `args`,
/// so values from the file reach clap's `env` fallbacks
fn parse_args<I, T>(dotenv_path: Option<&Path>, args: I) -> (Option<PathBuf>, Result<Cli, clap::Error>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let loaded = match dotenv_path {
        Some(path) => dotenvy::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    };
    (loaded, Cli::try_parse_from(args))
}

/// Command-line flags take precedence over file and environment settings
fn apply_overrides(config: &mut Config, command: &Commands) {
    match command {
        Commands::Risk {
            stream,
            threshold,
            scale_factor,
            no_scale,
        } => {
            stream.apply(config);
            if let Some(threshold) = threshold {
                config.alerting.threshold = *threshold;
            }
            if *no_scale {
                config.fetch.scale_factor = None;
            } else if scale_factor.is_some() {
                config.fetch.scale_factor = *scale_factor;
            }
        }
        Commands::Index { stream } => stream.apply(config),
        Commands::Config => {}
    }
}

fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &LoggingConfig, verbose: bool) {
    let log_level = if verbose { "debug" } else { config.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if config.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_risk(config: Config, format: OutputFormat) -> anyhow::Result<()> {
    let report = pipeline::run_risk(&config, &ProcessEnv).await?;
    write_report(&mut io::stdout().lock(), &report, format)?;
    Ok(())
}

async fn run_index(config: Config, format: OutputFormat) -> anyhow::Result<()> {
    let data = pipeline::run_index(&config, &ProcessEnv).await?;
    write_index(&mut io::stdout().lock(), &data, format)?;
    Ok(())
}

fn run_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
