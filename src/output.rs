//! Output formatters for the `tail` command.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use crate::models::{AlertLevel, Earthquake};
use crate::style;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

// Magnitude-based colors
const RED: &str = "\x1b[91m"; // Critical: mag >= 7.0
const YELLOW: &str = "\x1b[93m"; // Warning: mag >= 6.0
const CYAN: &str = "\x1b[96m"; // Significant: mag >= 4.5
const GREEN: &str = "\x1b[92m"; // Moderate: mag >= 3.0
const WHITE: &str = "\x1b[97m"; // Minor: mag < 3.0

// Alert level colors
const ALERT_GREEN: &str = "\x1b[42;30m";
const ALERT_YELLOW: &str = "\x1b[43;30m";
const ALERT_ORANGE: &str = "\x1b[48;5;208;30m";
const ALERT_RED: &str = "\x1b[41;97m";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Get the terminal color code for a magnitude value.
fn magnitude_color(mag: f64) -> &'static str {
    if mag >= 7.0 {
        RED
    } else if mag >= 6.0 {
        YELLOW
    } else if mag >= 4.5 {
        CYAN
    } else if mag >= 3.0 {
        GREEN
    } else {
        WHITE
    }
}

/// Format alert level with color.
fn format_alert(alert: Option<AlertLevel>) -> String {
    match alert {
        Some(AlertLevel::Red) => format!(" {ALERT_RED} RED {RESET}"),
        Some(AlertLevel::Orange) => format!(" {ALERT_ORANGE} ORANGE {RESET}"),
        Some(AlertLevel::Yellow) => format!(" {ALERT_YELLOW} YELLOW {RESET}"),
        Some(AlertLevel::Green) => format!(" {ALERT_GREEN} GREEN {RESET}"),
        _ => String::new(),
    }
}

/// Write events in human-readable format with rich colors.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, events: &[Earthquake]) -> io::Result<()> {
    for event in events {
        let time = event
            .time_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".into());

        let place = event.place.as_deref().unwrap_or("Unknown location");
        let color = magnitude_color(event.magnitude);
        let label = style::magnitude_label(event.magnitude);
        let alert = format_alert(event.alert);
        let tsunami = if event.tsunami { " \u{1f30a}" } else { "" };

        writeln!(
            writer,
            "{color}{BOLD}M{mag:.1}{RESET} \u{2502} \
             {color}{label:8}{RESET} \u{2502} \
             {DIM}{depth:>5.0}km{RESET} \u{2502} \
             {time} UTC \u{2502} \
             {place}{tsunami}{alert}",
            mag = event.magnitude,
            depth = event.depth_km,
        )?;
    }
    Ok(())
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, events: &[Earthquake]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(events)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, events: &[Earthquake]) -> io::Result<()> {
    for event in events {
        let json = serde_json::to_string(event)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(
    writer: &mut W,
    events: &[Earthquake],
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events),
        Format::Json => write_json(writer, events),
        Format::Ndjson => write_ndjson(writer, events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_ndjson_one_line_per_event() {
        let event = Earthquake {
            id: "a".into(),
            place: Some("Test Ridge".into()),
            time: 1_700_000_000_000,
            magnitude: 5.2,
            longitude: 1.0,
            latitude: 2.0,
            depth_km: 10.0,
            url: None,
            felt: None,
            alert: None,
            tsunami: false,
            title: None,
            status: "reviewed".into(),
            event_type: None,
            significance: 300,
            sources: None,
        };

        let mut buf = Vec::new();
        write_ndjson(&mut buf, &[event.clone(), event]).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.contains("\"id\":\"a\"")));
    }
}
