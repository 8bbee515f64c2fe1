use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Class assigned to laps whose class cell is blank or a single character.
pub const UNDEFINED_CLASS: &str = "UNDEFINED";

/// Which kind of event a timing export belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EventMode {
    /// Multi-session competition ranked by the sum of session best laps.
    TimeAttack,
    /// Open track session ranked by each driver's single fastest lap.
    Trackday,
}

impl std::fmt::Display for EventMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventMode::TimeAttack => write!(f, "time-attack"),
            EventMode::Trackday => write!(f, "trackday"),
        }
    }
}

/// One timed lap, parsed from a single row of the timing export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapRecord {
    /// Lap number as reported by the timing system.
    pub number: i64,
    /// Start number of the driver.
    pub driver_id: String,
    /// Driver name, optionally followed by the vehicle in parentheses.
    pub driver_name: String,
    /// Measured lap time.
    #[serde(rename = "lap_time_ms", with = "duration_ms")]
    pub lap_time: Duration,
    /// Transponder that registered the lap.
    pub transponder_id: String,
    /// Competition class, never empty.
    pub class: String,
}

/// Normalise a raw class cell.
///
/// Blank cells and single-character placeholders count as missing and map to
/// [`UNDEFINED_CLASS`].
///
/// # Examples
///
/// ```
/// use protocol_core::models::normalize_class;
///
/// assert_eq!(normalize_class("  Street "), "Street");
/// assert_eq!(normalize_class("-"), "UNDEFINED");
/// assert_eq!(normalize_class(""), "UNDEFINED");
/// ```
pub fn normalize_class(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() > 1 {
        trimmed.to_string()
    } else {
        UNDEFINED_CLASS.to_string()
    }
}

/// One uninterrupted block of a driver's laps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Lap times in the order they were driven.
    #[serde(rename = "lap_times_ms", with = "duration_ms::vec")]
    pub lap_times: Vec<Duration>,
    /// Fastest lap of the session, `None` for sessions added as padding.
    #[serde(rename = "best_lap_ms", with = "duration_ms::option")]
    pub best_lap: Option<Duration>,
}

impl Session {
    /// An empty session appended so every driver shows the configured count.
    pub fn padding() -> Self {
        Self {
            lap_times: Vec::new(),
            best_lap: None,
        }
    }

    /// `true` for sessions that were never driven.
    pub fn is_padding(&self) -> bool {
        self.best_lap.is_none()
    }

    /// Contribution of this session to the driver's total time.
    pub fn best_lap_or_zero(&self) -> Duration {
        self.best_lap.unwrap_or(Duration::ZERO)
    }
}

/// Time-attack standing of one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverResult {
    pub driver_name: String,
    pub driver_id: String,
    pub class: String,
    /// Real sessions first, then padding sessions.
    pub sessions: Vec<Session>,
    /// Sum of every session's best lap.
    #[serde(rename = "total_time_ms", with = "duration_ms")]
    pub total_time: Duration,
}

impl DriverResult {
    /// Recompute the total from the stored sessions.
    pub fn sum_best_laps(&self) -> Duration {
        self.sessions.iter().map(Session::best_lap_or_zero).sum()
    }

    /// Number of sessions that were actually driven.
    pub fn driven_sessions(&self) -> usize {
        self.sessions.iter().filter(|s| !s.is_padding()).count()
    }
}

/// All ranked members of one competition class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGroup<T> {
    pub class_name: String,
    /// Ordered from first place to last.
    pub members: Vec<T>,
}

impl<T> ClassGroup<T> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Serde adapters that store durations as integer milliseconds.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Option::<u64>::deserialize(deserializer).map(|v| v.map(Duration::from_millis))
        }
    }

    pub mod vec {
        use super::*;
        use serde::ser::SerializeSeq;

        pub fn serialize<S: Serializer>(
            value: &[Duration],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(value.len()))?;
            for d in value {
                seq.serialize_element(&(d.as_millis() as u64))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Duration>, D::Error> {
            Vec::<u64>::deserialize(deserializer)
                .map(|v| v.into_iter().map(Duration::from_millis).collect())
        }
    }
}
