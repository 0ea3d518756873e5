//! Visual derivation utilities.
//!
//! Pure functions mapping magnitudes, risk levels and alert levels to
//! marker weights and colors. All lookups are total: unrecognized input
//! falls back to a neutral gray rather than panicking, so risk levels not
//! yet enumerated still render.

use crate::models::{AlertLevel, RiskLevel};

/// Neutral fallback color for unrecognized levels.
const NEUTRAL: &str = "#90a4ae";

/// Minimum marker radius in display units.
const MIN_RADIUS: f64 = 6.0;

/// Maximum marker radius in display units.
const MAX_RADIUS: f64 = 25.0;

/// Get marker radius for an earthquake magnitude.
///
/// Monotonically increasing, clamped to `[6, 25]`.
#[must_use]
pub fn marker_radius(magnitude: f64) -> f64 {
    (magnitude * 3.0).clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Get the fill color for an earthquake magnitude.
///
/// Fixed step function over half-open buckets `[lower, upper)` with
/// thresholds at 3, 4.5, 6, 7 and 8; the top bucket is unbounded above.
#[must_use]
pub fn magnitude_color(magnitude: f64) -> &'static str {
    if magnitude < 3.0 {
        "#66bb6a" // Green
    } else if magnitude < 4.5 {
        "#26a69a" // Teal
    } else if magnitude < 6.0 {
        "#ffb74d" // Orange
    } else if magnitude < 7.0 {
        "#ff9800" // Dark Orange
    } else if magnitude < 8.0 {
        "#ef5350" // Red
    } else {
        "#c62828" // Dark Red
    }
}

/// Color and semantic style tag for a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskStyle {
    pub color: &'static str,
    pub class: &'static str,
}

/// Get the display style for a prediction or risk-zone risk level.
#[must_use]
pub fn risk_level_color(risk: RiskLevel) -> RiskStyle {
    match risk {
        RiskLevel::Low => RiskStyle {
            color: "#66bb6a",
            class: "bg-green-500",
        },
        RiskLevel::Moderate => RiskStyle {
            color: "#ffb74d",
            class: "bg-orange-400",
        },
        RiskLevel::High => RiskStyle {
            color: "#ef5350",
            class: "bg-red-500",
        },
        RiskLevel::Extreme => RiskStyle {
            color: "#c62828",
            class: "bg-red-800",
        },
        RiskLevel::Unknown => RiskStyle {
            color: NEUTRAL,
            class: "bg-gray-400",
        },
    }
}

/// Get the display color for a PAGER alert level.
#[must_use]
pub fn alert_color(alert: Option<AlertLevel>) -> &'static str {
    match alert {
        Some(AlertLevel::Green) => "#66bb6a",
        Some(AlertLevel::Yellow) => "#ffb74d",
        Some(AlertLevel::Orange) => "#ef5350",
        Some(AlertLevel::Red) => "#c62828",
        Some(AlertLevel::Unknown) | None => NEUTRAL,
    }
}

/// Get severity label for magnitude.
#[must_use]
pub fn magnitude_label(magnitude: f64) -> &'static str {
    if magnitude >= 7.0 {
        "MAJOR"
    } else if magnitude >= 6.0 {
        "STRONG"
    } else if magnitude >= 4.5 {
        "MODERATE"
    } else if magnitude >= 3.0 {
        "LIGHT"
    } else if magnitude >= 2.0 {
        "MINOR"
    } else {
        "MICRO"
    }
}
