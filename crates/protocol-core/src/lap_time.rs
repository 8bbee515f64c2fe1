//! Parsing of lap-time cells from timing exports.

use std::time::Duration;

use crate::error::{ProtocolError, Result};

/// Parse a lap-time cell of the form `[[h:]m:]s[.fraction]`.
///
/// The fraction is read as a decimal fraction of a second, so `"59.9"` is
/// 59.9 s and `"1:23.456"` is 83.456 s. A bare number such as `"48"` is
/// whole seconds. Minute and second components after the leading one must be
/// below 60.
///
/// Some timing software reads the fraction as a millisecond count instead
/// (`"59.9"` as 59.009 s, a bare `"48"` as 48 ms). The two readings agree on
/// exports that always write three fraction digits and a seconds field, which
/// is what transponder exports produce.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use protocol_core::lap_time::parse_lap_time;
///
/// assert_eq!(parse_lap_time("1:23.456").unwrap(), Duration::from_millis(83_456));
/// assert_eq!(parse_lap_time("47.5").unwrap(), Duration::from_millis(47_500));
/// assert!(parse_lap_time("fast").is_err());
/// ```
pub fn parse_lap_time(raw: &str) -> Result<Duration> {
    let invalid = || ProtocolError::LapTimeParse(raw.to_string());

    let text = raw.trim();
    if text.is_empty() {
        return Err(invalid());
    }

    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let mut secs: u64 = 0;
    for (i, part) in parts.iter().enumerate() {
        if !is_digits(part) {
            return Err(invalid());
        }
        let value: u64 = part.parse().map_err(|_| invalid())?;
        if i > 0 && value >= 60 {
            return Err(invalid());
        }
        secs = secs
            .checked_mul(60)
            .and_then(|s| s.checked_add(value))
            .ok_or_else(invalid)?;
    }

    let nanos = match fraction {
        None => 0,
        Some(f) => {
            if !is_digits(f) || f.len() > 9 {
                return Err(invalid());
            }
            format!("{:0<9}", f).parse::<u32>().map_err(|_| invalid())?
        }
    };

    Ok(Duration::new(secs, nanos))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
