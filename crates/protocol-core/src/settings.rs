use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigFile, EngineConfig, MAX_LAPS_PER_SESSION, MAX_SESSION_COUNT};
use crate::error::Result;
use crate::models::EventMode;

// ── OutputFormat ───────────────────────────────────────────────────────────────

/// How the finished protocol is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One CSV sheet per class, written to the output directory.
    Csv,
    /// One workbook per export with a worksheet per class.
    Xlsx,
    /// The full analysis result as JSON on stdout.
    Json,
    /// Aligned plain-text tables on stdout.
    Text,
    /// Interactive terminal viewer.
    Tui,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Build time-attack and trackday protocols from lap-timing CSV exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lap-protocol",
    about = "Build time-attack and trackday protocols from lap-timing CSV exports",
    version
)]
pub struct Settings {
    /// Timing exports, or directories that contain them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Event type
    #[arg(long, value_enum, default_value_t = EventMode::TimeAttack)]
    pub mode: EventMode,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Directory for CSV sheets and workbooks
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Sessions per driver in time-attack protocols
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_SESSION_COUNT as i64))]
    pub sessions: Option<u32>,

    /// Lap columns per session in protocol sheets
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_LAPS_PER_SESSION as i64))]
    pub laps_per_session: Option<u32>,

    /// Lap time in seconds above which a lap marks a break between sessions
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Config file (defaults to ~/.lap-protocol/config.json)
    #[arg(long, env = "LAP_PROTOCOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Display theme for the terminal viewer
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse CLI arguments and apply the `--debug` flag.
    pub fn load() -> Self {
        Self::from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Engine values given on the command line, as a partial config.
    pub fn cli_overrides(&self) -> ConfigFile {
        ConfigFile {
            session_count: self.sessions.map(|v| v as usize),
            laps_per_session: self.laps_per_session.map(|v| v as usize),
            lap_time_threshold_secs: self.threshold,
        }
    }

    /// Config file to read: `--config` when given, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(ConfigFile::default_path)
    }

    /// Resolve the engine configuration: CLI, then config file, then defaults.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let file = ConfigFile::load_from(&self.config_path())?;
        EngineConfig::resolve(&file, &self.cli_overrides())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
