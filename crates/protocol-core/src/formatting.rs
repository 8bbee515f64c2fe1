use std::time::Duration;

/// Placeholder shown for laps and sessions that were never driven.
pub const NO_TIME: &str = "–";

/// Format a lap or total time as `MM:SS.mmm`.
///
/// Minutes are zero-padded to two digits and keep counting past an hour.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use protocol_core::formatting::format_lap_time;
///
/// assert_eq!(format_lap_time(Duration::from_millis(83_456)), "01:23.456");
/// assert_eq!(format_lap_time(Duration::from_millis(5_007)), "00:05.007");
/// assert_eq!(format_lap_time(Duration::from_secs(3_725)), "62:05.000");
/// ```
pub fn format_lap_time(time: Duration) -> String {
    let total_ms = time.as_millis();
    let minutes = total_ms / 60_000;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
}

/// Format an optional time, using [`NO_TIME`] when absent.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use protocol_core::formatting::format_optional_lap_time;
///
/// assert_eq!(format_optional_lap_time(None), "–");
/// assert_eq!(format_optional_lap_time(Some(Duration::from_millis(47_000))), "00:47.000");
/// ```
pub fn format_optional_lap_time(time: Option<Duration>) -> String {
    match time {
        Some(t) => format_lap_time(t),
        None => NO_TIME.to_string(),
    }
}
