use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use ftp_listing::{FileRecord, SessionConfig, StyleKind};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "ftp_listing=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Parse remote directory listings into structured records
#[derive(Debug, Parser)]
#[command(name = "ftp-listing", version)]
struct Cli {
    /// Listing to read, one entry per line (stdin when omitted)
    input: Option<PathBuf>,

    /// JSON session config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Style to try, in priority order (repeatable)
    #[arg(long = "style", value_enum)]
    styles: Vec<StyleKind>,

    /// Fail on the first line no style accepts
    #[arg(long)]
    strict: bool,

    /// Skip lines no style accepts, even if the config asks for strict mode
    #[arg(long, conflicts_with = "strict")]
    lenient: bool,

    /// Reference time for year resolution, e.g. 2024-06-01T00:00:00
    #[arg(long, value_parser = parse_reference_time)]
    now: Option<NaiveDateTime>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn parse_reference_time(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
}

/// Use `RUST_LOG` as given; fall back to our own info level when it is unset or unusable
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn load_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    apply_overrides(cli, &mut config);
    Ok(config)
}

/// Command-line flags win over the config file
fn apply_overrides(cli: &Cli, config: &mut SessionConfig) {
    if cli.strict {
        config.strict = true;
    }
    if cli.lenient {
        config.strict = false;
    }
    if !cli.styles.is_empty() {
        config.styles = cli.styles.clone();
    }
    if let Some(now) = cli.now {
        config.reference_time = Some(now);
    }
}

fn write_text(out: &mut impl Write, record: &FileRecord) -> io::Result<()> {
    let size = record
        .size
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    let timestamp = record
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let owner = record.owner.as_deref().unwrap_or("-");

    write!(
        out,
        "{:<9} {:>12} {:<19} {:<10} {}",
        record.kind, size, timestamp, owner, record.name
    )?;
    if let Some(target) = &record.link_target {
        write!(out, " -> {}", target)?;
    }
    writeln!(out)
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let session = config
        .build_session()
        .context("Failed to set up listing styles")?;

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut count = 0usize;

    for entry in session.parse_reader(reader) {
        let record = entry.context("Listing could not be parsed")?;
        match cli.format {
            OutputFormat::Text => write_text(&mut out, &record)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
            }
        }
        count += 1;
    }

    tracing::info!(records = count, styles = ?session.parser().styles(), "listing parsed");
    Ok(())
}
