//! Data models for the dashboard.
//!
//! The raw structures match the GeoJSON format from USGS summary feeds;
//! each raw feature is projected field-for-field into the [`Earthquake`]
//! shape the dashboard consumes. The prediction, historical and risk-zone
//! entities mirror the shapes of their backing datasets.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::QuakeAwareError;

// ============================================================================
// Raw USGS feed structures
// ============================================================================

/// Top-level GeoJSON response from USGS feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata
    pub metadata: Metadata,

    /// Earthquake events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakeAwareError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakeAwareError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// When this feed was generated (ms since epoch)
    pub generated: i64,

    /// Human-readable title
    pub title: String,

    /// Number of events in response
    pub count: usize,
}

/// A single raw earthquake feature.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Unique event ID (stable diff key)
    pub id: String,

    /// Geographic location
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

impl Feature {
    /// Validate the event structure.
    pub fn validate(&self) -> Result<(), QuakeAwareError> {
        if self.id.is_empty() {
            return Err(QuakeAwareError::Validation("empty event ID".into()));
        }
        if self.geometry.coordinates.len() != 3 {
            return Err(QuakeAwareError::Validation(format!(
                "expected 3 coordinates, got {}",
                self.geometry.coordinates.len()
            )));
        }
        Ok(())
    }

    /// Get longitude (degrees).
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.geometry.coordinates.first().copied().unwrap_or(0.0)
    }

    /// Get latitude (degrees).
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.geometry.coordinates.get(1).copied().unwrap_or(0.0)
    }

    /// Get depth in kilometers (positive down).
    #[must_use]
    pub fn depth_km(&self) -> f64 {
        self.geometry.coordinates.get(2).copied().unwrap_or(0.0)
    }
}

/// Geographic geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties from the USGS API, trimmed to the fields we project.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value
    pub mag: Option<f64>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,

    /// Event status: "automatic" or "reviewed"
    pub status: String,

    /// Alert level: null, "green", "yellow", "orange", "red"
    pub alert: Option<AlertLevel>,

    /// Tsunami flag: 0 or 1
    #[serde(default)]
    pub tsunami: i32,

    /// Significance score (0-1000+)
    pub sig: i32,

    /// Comma-separated source networks
    pub sources: Option<String>,

    /// Event page URL
    pub url: Option<String>,

    /// Human-readable title
    pub title: Option<String>,

    /// Number of "Did You Feel It?" reports
    pub felt: Option<i32>,

    /// Event type (earthquake, quarry, etc.)
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

// ============================================================================
// Dashboard entities
// ============================================================================

/// PAGER alert level as reported by USGS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Green,
    Yellow,
    Orange,
    Red,
    /// Forward-compatibility with levels not yet enumerated
    #[serde(other)]
    Unknown,
}

/// Coarse severity classification for predictions and risk zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
    /// Forward-compatibility with levels not yet enumerated
    #[serde(other)]
    Unknown,
}

impl RiskLevel {
    /// Whether this level warrants a dashboard-wide warning banner.
    #[must_use]
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Extreme)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Extreme => "extreme",
            Self::Unknown => "unknown",
        }
    }
}

/// Trust in a prediction, independent of its probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// A recent earthquake event, projected from the raw feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Earthquake {
    pub id: String,
    pub place: Option<String>,
    /// Event time (ms since epoch)
    pub time: i64,
    pub magnitude: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: f64,
    pub url: Option<String>,
    pub felt: Option<i32>,
    pub alert: Option<AlertLevel>,
    pub tsunami: bool,
    pub title: Option<String>,
    pub status: String,
    pub event_type: Option<String>,
    pub significance: i32,
    pub sources: Option<String>,
}

impl Earthquake {
    /// Get the event time as a `DateTime<Utc>`.
    #[must_use]
    pub fn time_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.time).single()
    }
}

impl From<&Feature> for Earthquake {
    fn from(f: &Feature) -> Self {
        Self {
            id: f.id.clone(),
            place: f.properties.place.clone(),
            time: f.properties.time,
            magnitude: f.properties.mag.unwrap_or(0.0),
            longitude: f.longitude(),
            latitude: f.latitude(),
            depth_km: f.depth_km(),
            url: f.properties.url.clone(),
            felt: f.properties.felt,
            alert: f.properties.alert,
            tsunami: f.properties.tsunami != 0,
            title: f.properties.title.clone(),
            status: f.properties.status.clone(),
            event_type: f.properties.event_type.clone(),
            significance: f.properties.sig,
            sources: f.properties.sources.clone(),
        }
    }
}

/// Predicted magnitude range. Invariant: `min <= max`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MagnitudeRange {
    pub min: f64,
    pub max: f64,
}

/// A probabilistic earthquake prediction.
///
/// The backing feed has no stable identifier; the controller uses
/// positional indices when interactive selection is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthquakePrediction {
    pub region: String,
    pub location: String,
    pub longitude: f64,
    pub latitude: f64,
    pub magnitude: MagnitudeRange,
    /// Probability percentage (0-100)
    pub probability: u8,
    /// Free-text window, e.g. "30 days"
    pub timeframe: String,
    pub confidence: ConfidenceLevel,
    pub data_sources: Vec<String>,
    pub risk: RiskLevel,
}

/// A significant earthquake from the historical record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalEarthquake {
    pub id: String,
    pub year: i32,
    pub region: String,
    pub location: String,
    pub magnitude: f64,
    /// Free text, may contain "+" (e.g. "50,000+")
    pub casualties: Option<String>,
    pub impact: String,
    pub longitude: f64,
    pub latitude: f64,
    pub image_url: Option<String>,
}

/// A static seismic risk zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskZone {
    pub id: String,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub radius_km: f64,
    pub risk: RiskLevel,
    pub description: Option<String>,
}

/// Togglable map overlays.
///
/// Fault lines, tectonic plates and infrastructure are declared but never
/// populated by any data source in the current scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapLayer {
    FaultLines,
    TectonicPlates,
    Infrastructure,
    RiskZones,
    Predictions,
}

impl MapLayer {
    /// Get the wire token for this layer.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FaultLines => "faultLines",
            Self::TectonicPlates => "tectonicPlates",
            Self::Infrastructure => "infrastructure",
            Self::RiskZones => "riskZones",
            Self::Predictions => "predictions",
        }
    }
}

impl std::str::FromStr for MapLayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "faultLines" => Ok(Self::FaultLines),
            "tectonicPlates" => Ok(Self::TectonicPlates),
            "infrastructure" => Ok(Self::Infrastructure),
            "riskZones" => Ok(Self::RiskZones),
            "predictions" => Ok(Self::Predictions),
            _ => Err(format!("unknown map layer: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEATURE: &str = r#"{
        "id": "us7000test",
        "geometry": { "type": "Point", "coordinates": [142.37, 38.32, 29.0] },
        "properties": {
            "mag": 6.1,
            "place": "off the east coast of Honshu, Japan",
            "time": 1700000000000,
            "status": "reviewed",
            "alert": "yellow",
            "tsunami": 1,
            "sig": 620,
            "sources": ",us,",
            "url": "https://earthquake.usgs.gov/earthquakes/eventpage/us7000test",
            "title": "M 6.1 - off the east coast of Honshu, Japan",
            "felt": 12,
            "type": "earthquake"
        }
    }"#;

    #[test]
    fn test_project_feature() {
        let feature: Feature = serde_json::from_str(SAMPLE_FEATURE).expect("parse feature");
        feature.validate().expect("valid feature");

        let eq = Earthquake::from(&feature);
        assert_eq!(eq.id, "us7000test");
        assert!((eq.magnitude - 6.1).abs() < f64::EPSILON);
        assert!((eq.longitude - 142.37).abs() < f64::EPSILON);
        assert!((eq.latitude - 38.32).abs() < f64::EPSILON);
        assert!((eq.depth_km - 29.0).abs() < f64::EPSILON);
        assert_eq!(eq.alert, Some(AlertLevel::Yellow));
        assert!(eq.tsunami);
        assert_eq!(eq.significance, 620);
        assert_eq!(eq.status, "reviewed");
        assert!(eq.time_utc().is_some());
    }

    #[test]
    fn test_unknown_alert_level_survives() {
        let json = SAMPLE_FEATURE.replace("\"yellow\"", "\"purple\"");
        let feature: Feature = serde_json::from_str(&json).expect("parse feature");
        assert_eq!(feature.properties.alert, Some(AlertLevel::Unknown));
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let json = SAMPLE_FEATURE.replace("[142.37, 38.32, 29.0]", "[142.37, 38.32]");
        let feature: Feature = serde_json::from_str(&json).expect("parse feature");
        assert!(feature.validate().is_err());
    }

    #[test]
    fn test_map_layer_round_trip() {
        for layer in [
            MapLayer::FaultLines,
            MapLayer::TectonicPlates,
            MapLayer::Infrastructure,
            MapLayer::RiskZones,
            MapLayer::Predictions,
        ] {
            let parsed: MapLayer = layer.as_str().parse().expect("failed to parse");
            assert_eq!(parsed, layer);
        }
        assert!("lavaFlows".parse::<MapLayer>().is_err());
    }
}
