//! `tf` CLI — parse timeframes, align timestamps and plan range batches from
//! the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Literal → {literal: milliseconds}
//! tf parse 15m
//!
//! # Start of the 4h period containing an instant (defaults to now)
//! tf align 4h --at 1724553312842
//!
//! # Complete periods between two instants
//! tf elapsed 1m --start 1724553192842 --end 1724553312842
//!
//! # Split a range into batches of at most 500 periods
//! tf batches 1m --start 1724457600000 --end 1724544000000 --batch-size 500
//!
//! # Human-readable rendering with ISO suffix
//! tf legible 1724553312842 --iso --tz America/New_York
//!
//! # Settings file and logging
//! TF_LOG=debug tf --config settings.json batches 1h --start 0 --end 86400000
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use timeframe_engine::dates::{self, parse_timezone};
use timeframe_engine::{clock, DateInput, Settings, Timeframe, TimeframeRegistry};

#[derive(Parser)]
#[command(name = "tf", version, about = "Timeframe literal and period alignment CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON settings file (batch size, preload list, timezone, ISO output)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log filter when TF_LOG is unset (e.g. "info", "timeframe_engine=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a timeframe as {literal: milliseconds}
    Parse {
        literal: String,
    },
    /// Print the start of the period containing an instant
    Align {
        literal: String,
        /// Epoch milliseconds (defaults to now)
        #[arg(long, allow_hyphen_values = true)]
        at: Option<i64>,
    },
    /// Print the number of complete periods between two instants
    Elapsed {
        literal: String,
        /// Range start, epoch milliseconds
        #[arg(long, allow_hyphen_values = true)]
        start: i64,
        /// Range end, epoch milliseconds (defaults to now)
        #[arg(long, allow_hyphen_values = true)]
        end: Option<i64>,
    },
    /// Print milliseconds left until the next period boundary
    Next {
        literal: String,
    },
    /// Split a range into contiguous batches (JSON array)
    Batches {
        literal: String,
        /// Range start, epoch milliseconds
        #[arg(long, allow_hyphen_values = true)]
        start: i64,
        /// Range end, epoch milliseconds
        #[arg(long, allow_hyphen_values = true)]
        end: i64,
        /// Maximum periods per batch (overrides the settings file)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Print UTC midnight of a date as RFC 3339 and epoch milliseconds
    Midnight {
        /// Epoch milliseconds, RFC 3339 or YYYY-MM-DD (defaults to now)
        value: Option<String>,
    },
    /// List days 2..=today of the current UTC month (JSON array)
    MonthDays,
    /// Render an instant as epoch, local wall-clock and optionally ISO
    Legible {
        /// Epoch milliseconds, RFC 3339 or YYYY-MM-DD (defaults to now)
        value: Option<String>,
        /// Append the ISO 8601 rendering
        #[arg(long)]
        iso: bool,
        /// IANA timezone for the wall-clock part (defaults to local)
        #[arg(long)]
        tz: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    let settings = match cli.config.as_deref() {
        Some(path) => {
            Settings::load(path).with_context(|| format!("Failed to load settings: {}", path))?
        }
        None => Settings::default(),
    };
    let registry = settings
        .build_registry()
        .context("Failed to preload timeframes")?;

    run(cli.command, &settings, &registry)
}

fn run(command: Commands, settings: &Settings, registry: &TimeframeRegistry) -> Result<()> {
    match command {
        Commands::Parse { literal } => {
            let tf = resolve(registry, &literal)?;
            println!("{}", serde_json::to_string(&*tf)?);
        }
        Commands::Align { literal, at } => {
            let tf = resolve(registry, &literal)?;
            let at = at.unwrap_or_else(clock::now_ms);
            println!("{}", tf.congruent_start_key(at));
        }
        Commands::Elapsed {
            literal,
            start,
            end,
        } => {
            let tf = resolve(registry, &literal)?;
            let end = end.unwrap_or_else(clock::now_ms);
            println!("{}", tf.elapsed_count(start, end));
        }
        Commands::Next { literal } => {
            let tf = resolve(registry, &literal)?;
            println!("{}", tf.millis_until_next());
        }
        Commands::Batches {
            literal,
            start,
            end,
            batch_size,
        } => {
            let tf = resolve(registry, &literal)?;
            let batch_size = batch_size.unwrap_or(settings.batch_size);
            if batch_size == 0 {
                anyhow::bail!("--batch-size must be at least 1");
            }
            let batches = tf.plan_batches(start, end, batch_size);
            tracing::info!(
                timeframe = %tf,
                batches = batches.len(),
                batch_size,
                "planned range"
            );
            println!("{}", serde_json::to_string_pretty(&batches)?);
        }
        Commands::Midnight { value } => {
            let midnight = dates::truncate_to_utc_midnight(date_input(value))
                .context("Failed to truncate to UTC midnight")?;
            println!("{} {}", midnight.timestamp_millis(), midnight.to_rfc3339());
        }
        Commands::MonthDays => {
            let days = dates::days_of_current_month();
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
        Commands::Legible { value, iso, tz } => {
            let include_iso = iso || settings.include_iso;
            let input = date_input(value);
            let legible = match tz.as_deref().or(settings.timezone.as_deref()) {
                Some(name) => {
                    let zone = parse_timezone(name)?;
                    dates::format_legible_in(input, &zone, include_iso)
                }
                None => dates::format_legible(input, include_iso),
            }
            .context("Failed to format date")?;
            println!("{}", legible);
        }
    }

    Ok(())
}

fn resolve(registry: &TimeframeRegistry, literal: &str) -> Result<Arc<Timeframe>> {
    registry
        .resolve_literal(literal)
        .with_context(|| format!("Invalid timeframe: {}", literal))
}

/// Missing values mean "now"; digit strings are taken as epoch milliseconds.
fn date_input(value: Option<String>) -> DateInput {
    match value {
        Some(text) => DateInput::Text(text),
        None => DateInput::DateTime(clock::now()),
    }
}

fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = std::env::var("TF_LOG").unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
    Ok(())
}
