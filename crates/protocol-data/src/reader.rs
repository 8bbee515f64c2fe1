//! CSV discovery and loading for timing exports.
//!
//! Reads the lap rows of a transponder timing export and converts them into
//! [`LapRecord`]s. Rows that cannot be converted are skipped and counted in a
//! [`ParseReport`] instead of failing the whole file.

use std::io::Read;
use std::path::{Path, PathBuf};

use protocol_core::lap_time::parse_lap_time;
use protocol_core::models::{normalize_class, EventMode, LapRecord};
use protocol_core::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ── Column layout ─────────────────────────────────────────────────────────────

const COL_NUMBER: usize = 0;
const COL_DRIVER_ID: usize = 1;
const COL_DRIVER_NAME: usize = 2;
const COL_LAP_TIME: usize = 5;
const COL_TRANSPONDER: usize = 13;
const COL_CLASS: usize = 16;

/// Fields a row must have to carry every column above.
pub const MIN_FIELDS: usize = COL_CLASS + 1;

// ── ParseReport ───────────────────────────────────────────────────────────────

/// Row counters collected while reading one export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Data rows seen, header excluded.
    pub rows_read: u64,
    /// Rows that became lap records.
    pub laps_accepted: u64,
    /// Rows skipped because they could not be parsed.
    pub rows_rejected: u64,
    /// Parsed rows dropped by the event-mode filter.
    pub rows_filtered: u64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Input path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Expand command-line inputs into the list of exports to process.
///
/// Files are taken as given; directories are searched with
/// [`find_csv_files`]. A missing path or a directory without exports is an
/// error.
pub fn resolve_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = find_csv_files(path);
            if found.is_empty() {
                return Err(ProtocolError::NoInputFiles(path.clone()));
            }
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(ProtocolError::InputNotFound(path.clone()));
        }
    }
    Ok(files)
}

/// Load every lap of the export at `path`.
pub fn load_laps(path: &Path, mode: EventMode) -> Result<(Vec<LapRecord>, ParseReport)> {
    let file = std::fs::File::open(path).map_err(|source| ProtocolError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let (laps, report) = read_laps(std::io::BufReader::new(file), mode)?;

    debug!(
        "File {}: {} read, {} rejected, {} filtered, {} accepted",
        path.display(),
        report.rows_read,
        report.rows_rejected,
        report.rows_filtered,
        report.laps_accepted,
    );

    Ok((laps, report))
}

/// Read laps from any CSV source. The first line is treated as a header.
///
/// Only I/O failures abort; every other bad row is skipped and counted.
pub fn read_laps<R: Read>(source: R, mode: EventMode) -> Result<(Vec<LapRecord>, ParseReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let mut laps = Vec::new();
    let mut report = ParseReport::default();

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                report.rows_read += 1;
                report.rows_rejected += 1;
                debug!("Skipping unreadable row: {}", e);
                continue;
            }
        };
        report.rows_read += 1;

        let lap = match parse_row(&record) {
            Ok(lap) => lap,
            Err(e) => {
                report.rows_rejected += 1;
                debug!("Skipping row: {}", e);
                continue;
            }
        };

        if !should_keep(&lap, mode) {
            report.rows_filtered += 1;
            continue;
        }

        report.laps_accepted += 1;
        laps.push(lap);
    }

    Ok((laps, report))
}

/// Convert one CSV record into a [`LapRecord`].
pub fn parse_row(record: &csv::StringRecord) -> Result<LapRecord> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    if record.len() < MIN_FIELDS {
        return Err(ProtocolError::MalformedRow {
            line,
            reason: format!(
                "expected at least {} fields, found {}",
                MIN_FIELDS,
                record.len()
            ),
        });
    }

    let field = |i: usize| record.get(i).unwrap_or("").trim();

    let lap_time = parse_lap_time(field(COL_LAP_TIME))?;
    // Timing exports leave the lap number blank on some rows.
    let number = field(COL_NUMBER).parse::<i64>().unwrap_or(0);

    Ok(LapRecord {
        number,
        driver_id: field(COL_DRIVER_ID).to_string(),
        driver_name: field(COL_DRIVER_NAME).to_string(),
        lap_time,
        transponder_id: field(COL_TRANSPONDER).to_string(),
        class: normalize_class(field(COL_CLASS)),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Trackday protocols only list laps with a usable driver name.
fn should_keep(lap: &LapRecord, mode: EventMode) -> bool {
    match mode {
        EventMode::TimeAttack => true,
        EventMode::Trackday => lap.driver_name.chars().count() > 1,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
