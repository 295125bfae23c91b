use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages, including the compiled query
    Debug,
    /// Trace-level messages (patterns, prefixes, bindings)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "tessera - compile JSON entity queries to SPARQL")]
#[command(version)]
pub struct Cli {
    /// Entity query JSON file (reads stdin when omitted or `-`)
    pub query: Option<PathBuf>,

    /// Config file path (TOML with scheme / identity_type / identity_name)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// URN scheme (overrides config file)
    #[arg(long)]
    pub scheme: Option<String>,

    /// Bind a query variable to a string value, as NAME=VALUE
    #[arg(short, long = "bind", value_name = "NAME=VALUE", value_parser = parse_binding)]
    pub bindings: Vec<(String, String)>,

    /// Skip this many results (overrides the query's first_result)
    #[arg(long)]
    pub offset: Option<u64>,

    /// Return at most this many results (overrides the query's max_results)
    #[arg(long)]
    pub limit: Option<u64>,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Effective log level; an explicit `--log-level` wins over `--verbose`
    pub fn level(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::WARN,
        }
    }
}

fn parse_binding(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}
