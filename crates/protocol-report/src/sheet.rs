//! Protocol sheet layout.
//!
//! A protocol is a list of [`ProtocolSheet`]s, one per class group. Each sheet
//! is a header row plus fully formatted string rows, so every output format
//! (CSV files, workbook, plain text, terminal viewer) renders the same cells.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use protocol_core::config::EngineConfig;
use protocol_core::formatting::{format_lap_time, format_optional_lap_time, NO_TIME};
use protocol_core::models::{ClassGroup, DriverResult, LapRecord};
use protocol_data::analysis::Standings;

pub const POSITION_HEADER: &str = "#";
pub const DRIVER_HEADER: &str = "Пилот";
pub const NUMBER_HEADER: &str = "No";
pub const LAP_HEADER: &str = "Круг";
pub const SESSION_HEADER: &str = "Сессия";
pub const TOTAL_HEADER: &str = "Итог";
pub const VEHICLE_HEADER: &str = "Автомобиль";
pub const BEST_TIME_HEADER: &str = "Лучшее время";

/// One class of a protocol, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolSheet {
    /// Class name; also the sheet title.
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ProtocolSheet {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Lay out every class of `standings` as a sheet, in class order.
pub fn build_sheets(standings: &Standings, config: &EngineConfig) -> Vec<ProtocolSheet> {
    match standings {
        Standings::TimeAttack(classes) => classes
            .iter()
            .map(|class| time_attack_sheet(class, config))
            .collect(),
        Standings::Trackday(classes) => classes.iter().map(trackday_sheet).collect(),
    }
}

/// Lap-column count for each session of a class.
///
/// At least `config.session_count` sessions of `config.laps_per_session` laps;
/// wider when any driver drove more.
fn session_widths(class: &ClassGroup<DriverResult>, config: &EngineConfig) -> Vec<usize> {
    let sessions = class
        .members
        .iter()
        .map(|r| r.sessions.len())
        .max()
        .unwrap_or(0)
        .max(config.session_count);

    (0..sessions)
        .map(|i| {
            class
                .members
                .iter()
                .filter_map(|r| r.sessions.get(i))
                .map(|s| s.lap_times.len())
                .max()
                .unwrap_or(0)
                .max(config.laps_per_session)
        })
        .collect()
}

/// Time-attack layout: every lap of every session, each session best and the
/// total.
pub fn time_attack_sheet(class: &ClassGroup<DriverResult>, config: &EngineConfig) -> ProtocolSheet {
    let widths = session_widths(class, config);

    let mut header = vec![
        POSITION_HEADER.to_string(),
        DRIVER_HEADER.to_string(),
        NUMBER_HEADER.to_string(),
    ];
    for (i, &laps) in widths.iter().enumerate() {
        header.extend((1..=laps).map(|lap| format!("{lap} {LAP_HEADER}")));
        header.push(format!("{} {SESSION_HEADER}", i + 1));
    }
    header.push(TOTAL_HEADER.to_string());

    let rows = class
        .members
        .iter()
        .enumerate()
        .map(|(position, result)| {
            let mut row = vec![
                (position + 1).to_string(),
                result.driver_name.clone(),
                result.driver_id.clone(),
            ];
            for (i, &laps) in widths.iter().enumerate() {
                let session = result.sessions.get(i);
                let lap_times = session.map(|s| s.lap_times.as_slice()).unwrap_or(&[]);
                row.extend((0..laps).map(|lap| match lap_times.get(lap) {
                    Some(&t) => format_lap_time(t),
                    None => NO_TIME.to_string(),
                }));
                row.push(format_optional_lap_time(session.and_then(|s| s.best_lap)));
            }
            row.push(format_lap_time(result.total_time));
            row
        })
        .collect();

    debug!(
        "Sheet {}: {} drivers, {} columns",
        class.class_name,
        class.len(),
        header.len()
    );

    ProtocolSheet {
        name: class.class_name.clone(),
        header,
        rows,
    }
}

/// Trackday layout: position, driver, vehicle and best lap.
pub fn trackday_sheet(class: &ClassGroup<LapRecord>) -> ProtocolSheet {
    let header = [
        POSITION_HEADER,
        DRIVER_HEADER,
        VEHICLE_HEADER,
        BEST_TIME_HEADER,
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();

    let rows = class
        .members
        .iter()
        .enumerate()
        .map(|(position, lap)| {
            let (name, vehicle) = split_driver_vehicle(&lap.driver_name);
            vec![
                (position + 1).to_string(),
                name,
                vehicle,
                format_lap_time(lap.lap_time),
            ]
        })
        .collect();

    ProtocolSheet {
        name: class.class_name.clone(),
        header,
        rows,
    }
}

fn driver_vehicle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<name>[^(]*?)\s*\((?P<vehicle>.*?)\)?\s*$").expect("regex is valid")
    })
}

/// Split `"Name (Vehicle)"` into its parts.
///
/// The split happens at the first `(`; a missing closing parenthesis is
/// tolerated. Without a `(` the vehicle is empty.
///
/// # Examples
///
/// ```
/// use protocol_report::sheet::split_driver_vehicle;
///
/// assert_eq!(
///     split_driver_vehicle("Ivan Petrov (BMW M3)"),
///     ("Ivan Petrov".to_string(), "BMW M3".to_string())
/// );
/// assert_eq!(split_driver_vehicle("Ivan"), ("Ivan".to_string(), String::new()));
/// ```
pub fn split_driver_vehicle(driver_name: &str) -> (String, String) {
    match driver_vehicle_re().captures(driver_name) {
        Some(caps) => (
            caps["name"].to_string(),
            caps["vehicle"].trim().to_string(),
        ),
        None => (driver_name.trim().to_string(), String::new()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
