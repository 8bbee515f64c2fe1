//! Main analysis pipeline for the lap protocol tools.
//!
//! Loads one timing export, aggregates or reduces its laps according to the
//! event mode and ranks the results per class, returning an
//! [`AnalysisResult`] ready for the report layer.

use std::path::Path;

use chrono::Utc;
use protocol_core::config::EngineConfig;
use protocol_core::models::{ClassGroup, DriverResult, EventMode, LapRecord};
use protocol_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzer::SessionAggregator;
use crate::ranker::ClassRanker;
use crate::reader::{load_laps, ParseReport};
use crate::reducer::BestLapReducer;

// ── Public types ──────────────────────────────────────────────────────────────

/// Ranked classes of one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "classes", rename_all = "kebab-case")]
pub enum Standings {
    TimeAttack(Vec<ClassGroup<DriverResult>>),
    Trackday(Vec<ClassGroup<LapRecord>>),
}

impl Standings {
    pub fn mode(&self) -> EventMode {
        match self {
            Standings::TimeAttack(_) => EventMode::TimeAttack,
            Standings::Trackday(_) => EventMode::Trackday,
        }
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        match self {
            Standings::TimeAttack(classes) => classes.len(),
            Standings::Trackday(classes) => classes.len(),
        }
    }

    /// Number of ranked drivers across all classes.
    pub fn driver_count(&self) -> usize {
        match self {
            Standings::TimeAttack(classes) => classes.iter().map(ClassGroup::len).sum(),
            Standings::Trackday(classes) => classes.iter().map(ClassGroup::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.class_count() == 0
    }
}

/// Metadata produced alongside the standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Export the laps were read from.
    pub source: String,
    /// Row counters from the reader.
    pub parse_report: ParseReport,
    /// Number of ranked drivers.
    pub drivers: usize,
    /// Number of classes.
    pub classes: usize,
    /// Wall-clock seconds spent reading the export.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating and ranking.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_file`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub standings: Standings,
    pub metadata: AnalysisMetadata,
}

// ── Pure pipeline stages ──────────────────────────────────────────────────────

/// Aggregate sessions per driver and rank drivers by total time.
pub fn analyze_time_attack(
    laps: &[LapRecord],
    config: &EngineConfig,
) -> Vec<ClassGroup<DriverResult>> {
    let results = SessionAggregator::new(*config).aggregate(laps);
    ClassRanker::rank_time_attack(results)
}

/// Keep each driver's best lap and rank drivers by it.
pub fn analyze_trackday(laps: &[LapRecord]) -> Vec<ClassGroup<LapRecord>> {
    ClassRanker::rank_trackday(BestLapReducer::reduce(laps))
}

/// Run the stage matching `mode`.
pub fn analyze_laps(laps: &[LapRecord], mode: EventMode, config: &EngineConfig) -> Standings {
    match mode {
        EventMode::TimeAttack => Standings::TimeAttack(analyze_time_attack(laps, config)),
        EventMode::Trackday => Standings::Trackday(analyze_trackday(laps)),
    }
}

// ── File pipeline ─────────────────────────────────────────────────────────────

/// Run the full pipeline on one export.
///
/// 1. Read the laps from `path`, skipping unparseable rows.
/// 2. Aggregate (time-attack) or reduce (trackday) per driver.
/// 3. Rank each class.
///
/// An export without usable laps yields empty standings, not an error.
pub fn analyze_file(path: &Path, mode: EventMode, config: &EngineConfig) -> Result<AnalysisResult> {
    let load_start = std::time::Instant::now();
    let (laps, parse_report) = load_laps(path, mode)?;
    let load_time = load_start.elapsed().as_secs_f64();

    if laps.is_empty() {
        warn!("No valid laps in {}", path.display());
    }

    let transform_start = std::time::Instant::now();
    let standings = analyze_laps(&laps, mode, config);
    let transform_time = transform_start.elapsed().as_secs_f64();

    info!(
        "{}: {} laps → {} drivers in {} classes ({} rows rejected)",
        path.display(),
        laps.len(),
        standings.driver_count(),
        standings.class_count(),
        parse_report.rows_rejected,
    );

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source: path.display().to_string(),
        parse_report,
        drivers: standings.driver_count(),
        classes: standings.class_count(),
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    Ok(AnalysisResult {
        standings,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    const HEADER: &str = "Lap,No,Name,Start,Split,LapTime,S1,S2,S3,Speed,Pit,Flag,Status,Transponder,Team,Car,Class";

    fn row(id: &str, name: &str, time: &str, class: &str) -> String {
        format!("1,{id},{name},,,{time},,,,,,,,TX{id},,,{class}")
    }

    fn write_export(dir: &Path, rows: &[String]) -> std::path::PathBuf {
        let path = dir.join("export.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for r in rows {
            writeln!(file, "{}", r).unwrap();
        }
        path
    }

    fn lap(name: &str, millis: u64, class: &str) -> LapRecord {
        LapRecord {
            number: 0,
            driver_id: String::new(),
            driver_name: name.to_string(),
            lap_time: Duration::from_millis(millis),
            transponder_id: String::new(),
            class: class.to_string(),
        }
    }

    #[test]
    fn test_analyze_laps_empty_input() {
        let config = EngineConfig::default();
        assert!(analyze_laps(&[], EventMode::TimeAttack, &config).is_empty());
        assert!(analyze_laps(&[], EventMode::Trackday, &config).is_empty());
    }

    #[test]
    fn test_analyze_time_attack_ranks_by_total() {
        let laps = vec![
            lap("Alice", 50_000, "Pro"),
            lap("Bob", 45_000, "Pro"),
            lap("Alice", 200_000, "Pro"),
            lap("Alice", 47_000, "Pro"),
            lap("Carol", 40_000, "Street"),
        ];
        let classes = analyze_time_attack(&laps, &EngineConfig::default());

        assert_eq!(classes.len(), 2);
        let pro = &classes[0];
        assert_eq!(pro.class_name, "Pro");
        // Bob: one session of 45 s. Alice: 50 s + 47 s.
        assert_eq!(pro.members[0].driver_name, "Bob");
        assert_eq!(pro.members[1].driver_name, "Alice");
        assert_eq!(pro.members[1].total_time, Duration::from_millis(97_000));
        assert!(pro
            .members
            .windows(2)
            .all(|w| w[0].total_time <= w[1].total_time));
    }

    #[test]
    fn test_analyze_trackday_one_lap_per_driver() {
        let laps = vec![
            lap("Alice (Civic)", 62_000, "Open"),
            lap("Bob (Golf)", 61_000, "Open"),
            lap("Alice (Civic)", 60_000, "Open"),
        ];
        let classes = analyze_trackday(&laps);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].members.len(), 2);
        assert_eq!(classes[0].members[0].driver_name, "Alice (Civic)");
        assert_eq!(classes[0].members[0].lap_time, Duration::from_millis(60_000));
    }

    #[test]
    fn test_standings_counts_and_mode() {
        let laps = vec![lap("A1", 1_000, "X1"), lap("B1", 2_000, "Y1")];
        let standings = analyze_laps(&laps, EventMode::Trackday, &EngineConfig::default());
        assert_eq!(standings.mode(), EventMode::Trackday);
        assert_eq!(standings.class_count(), 2);
        assert_eq!(standings.driver_count(), 2);
    }

    #[test]
    fn test_analyze_file_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = write_export(
            dir.path(),
            &[
                row("1", "Alice", "0:50.000", "Pro"),
                row("1", "Alice", "0:55.000", "Pro"),
                row("1", "Alice", "3:20.000", "Pro"),
                row("1", "Alice", "0:48.000", "Pro"),
                row("1", "Alice", "0:47.000", "Pro"),
                row("2", "Bob", "bad", "Pro"),
                row("2", "Bob", "0:51.000", ""),
            ],
        );

        let result = analyze_file(&path, EventMode::TimeAttack, &EngineConfig::default()).unwrap();

        assert_eq!(result.metadata.parse_report.rows_rejected, 1);
        assert_eq!(result.metadata.drivers, 2);
        assert_eq!(result.metadata.classes, 2);
        match &result.standings {
            Standings::TimeAttack(classes) => {
                assert_eq!(classes[0].class_name, "Pro");
                let alice = &classes[0].members[0];
                assert_eq!(alice.sessions[0].best_lap, Some(Duration::from_secs(50)));
                assert_eq!(alice.sessions[1].best_lap, Some(Duration::from_secs(47)));
                assert!(alice.sessions[2].is_padding());
                assert_eq!(classes[1].class_name, "UNDEFINED");
            }
            other => panic!("unexpected standings: {other:?}"),
        }
    }

    #[test]
    fn test_analyze_file_without_laps_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let path = write_export(dir.path(), &[]);
        let result = analyze_file(&path, EventMode::Trackday, &EngineConfig::default()).unwrap();
        assert!(result.standings.is_empty());
        assert_eq!(result.metadata.drivers, 0);
    }

    #[test]
    fn test_result_serializes_with_mode_tag() {
        let laps = vec![lap("Alice", 60_000, "Open")];
        let standings = analyze_laps(&laps, EventMode::Trackday, &EngineConfig::default());
        let json = serde_json::to_value(&standings).unwrap();
        assert_eq!(json["mode"], "trackday");
        assert_eq!(json["classes"][0]["class_name"], "Open");
        assert_eq!(json["classes"][0]["members"][0]["lap_time_ms"], 60_000);
    }
}
