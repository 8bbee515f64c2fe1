//! Engine configuration and the optional JSON config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProtocolError, Result};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Sessions shown per driver in a time-attack protocol.
pub const DEFAULT_SESSION_COUNT: usize = 3;

/// Lap columns reserved per session in a protocol sheet.
pub const DEFAULT_LAPS_PER_SESSION: usize = 3;

/// Upper bound for `session_count`, shared with the CLI.
pub const MAX_SESSION_COUNT: usize = 20;

/// Upper bound for `laps_per_session`, shared with the CLI.
pub const MAX_LAPS_PER_SESSION: usize = 50;

/// Lap times above this mark a break between sessions.
pub const DEFAULT_LAP_TIME_THRESHOLD: Duration = Duration::from_secs(3 * 60);

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Parameters of the aggregation engine, fixed for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum number of sessions every time-attack driver is reported with.
    pub session_count: usize,
    /// Lap columns per session in rendered sheets. Display only.
    pub laps_per_session: usize,
    /// A lap strictly longer than this ends the current session.
    pub lap_time_threshold: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_count: DEFAULT_SESSION_COUNT,
            laps_per_session: DEFAULT_LAPS_PER_SESSION,
            lap_time_threshold: DEFAULT_LAP_TIME_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SESSION_COUNT).contains(&self.session_count) {
            return Err(ProtocolError::Config(format!(
                "session_count must be between 1 and {}, got {}",
                MAX_SESSION_COUNT, self.session_count
            )));
        }
        if !(1..=MAX_LAPS_PER_SESSION).contains(&self.laps_per_session) {
            return Err(ProtocolError::Config(format!(
                "laps_per_session must be between 1 and {}, got {}",
                MAX_LAPS_PER_SESSION, self.laps_per_session
            )));
        }
        if self.lap_time_threshold.is_zero() {
            return Err(ProtocolError::Config(
                "lap_time_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Layer `overrides` over `file` over the defaults and validate the result.
    pub fn resolve(file: &ConfigFile, overrides: &ConfigFile) -> Result<Self> {
        let defaults = Self::default();

        let session_count = overrides
            .session_count
            .or(file.session_count)
            .unwrap_or(defaults.session_count);
        let laps_per_session = overrides
            .laps_per_session
            .or(file.laps_per_session)
            .unwrap_or(defaults.laps_per_session);
        let lap_time_threshold = match overrides
            .lap_time_threshold_secs
            .or(file.lap_time_threshold_secs)
        {
            Some(secs) => threshold_from_secs(secs)?,
            None => defaults.lap_time_threshold,
        };

        let config = Self {
            session_count,
            laps_per_session,
            lap_time_threshold,
        };
        config.validate()?;
        Ok(config)
    }
}

fn threshold_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        ProtocolError::Config(format!(
            "lap_time_threshold_secs must be a non-negative number, got {}",
            secs
        ))
    })
}

// ── ConfigFile ────────────────────────────────────────────────────────────────

/// Partial engine settings as stored in `~/.lap-protocol/config.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laps_per_session: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lap_time_threshold_secs: Option<f64>,
}

impl ConfigFile {
    /// Default location of the config file, `~/.lap-protocol/config.json`.
    pub fn default_path() -> PathBuf {
        Self::default_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn default_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".lap-protocol").join("config.json")
    }

    /// Load the config file at `path`.
    ///
    /// A missing file yields an empty config. A file that exists but cannot
    /// be read or parsed is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ProtocolError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
