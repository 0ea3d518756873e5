//! Map composition rules.
//!
//! Pure derivation from the controller's state to a serializable scene:
//! which marker layers are visible, how each marker is styled, and what
//! each popup shows. The embedded web UI renders the scene verbatim.

use serde::Serialize;

use crate::dashboard::Dashboard;
use crate::models::{Earthquake, EarthquakePrediction, MapLayer, RiskZone};
use crate::style;
use crate::timefmt;

/// Significance above which the view recenters on an event.
const FOCUS_SIGNIFICANCE: i32 = 800;

/// Zoom level used when focusing on a significant event.
const FOCUS_ZOOM: u8 = 5;

/// Default zoom: globally centered.
const DEFAULT_ZOOM: u8 = 2;

/// Fixed marker radius for overlays not scaled by magnitude.
///
/// Risk-zone markers are deliberately not spatially scaled to the zone's
/// actual kilometer radius.
const OVERLAY_RADIUS: f64 = 10.0;

/// Map center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            latitude: 20.0,
            longitude: 0.0,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Recompute the view for a freshly committed earthquake collection.
///
/// If the single highest-significance event exceeds the threshold, the
/// view recenters and zooms to it; otherwise the current view is kept.
#[must_use]
pub fn refocus(current: MapView, earthquakes: &[Earthquake]) -> MapView {
    let Some(most_significant) = earthquakes.iter().max_by_key(|e| e.significance) else {
        return current;
    };

    if most_significant.significance > FOCUS_SIGNIFICANCE {
        MapView {
            latitude: most_significant.latitude,
            longitude: most_significant.longitude,
            zoom: FOCUS_ZOOM,
        }
    } else {
        current
    }
}

/// Rendered layer tags.
///
/// The recent-earthquakes layer is always on, so it is not part of the
/// togglable [`MapLayer`] enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneLayerKind {
    Earthquakes,
    RiskZones,
    Predictions,
}

/// Popup content for a marker.
#[derive(Debug, Clone, Serialize)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One styled map marker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub fill_color: String,
    pub stroke_color: String,
    pub fill_opacity: f64,
    pub weight: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<&'static str>,
    /// Highlighted via the active selection
    pub selected: bool,
    pub popup: Popup,
}

/// One visible layer with its markers.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerLayer {
    pub kind: SceneLayerKind,
    pub markers: Vec<Marker>,
}

/// The full composed map state.
#[derive(Debug, Clone, Serialize)]
pub struct MapScene {
    pub view: MapView,
    pub layers: Vec<MarkerLayer>,
}

/// Compose the scene from the controller's current state.
///
/// Risk zones and predictions render only when present in the visible-layer
/// set; the recent-earthquakes layer always renders, last, so its markers
/// draw on top of the overlays. The declared but never-populated layers
/// (fault lines, tectonic plates, infrastructure) never render.
#[must_use]
pub fn compose_scene(dashboard: &Dashboard) -> MapScene {
    let mut layers = Vec::with_capacity(3);

    if dashboard.layer_visible(MapLayer::RiskZones) {
        layers.push(MarkerLayer {
            kind: SceneLayerKind::RiskZones,
            markers: dashboard.risk_zones().iter().map(risk_zone_marker).collect(),
        });
    }

    if dashboard.layer_visible(MapLayer::Predictions) {
        layers.push(MarkerLayer {
            kind: SceneLayerKind::Predictions,
            markers: dashboard
                .predictions()
                .iter()
                .enumerate()
                .map(|(idx, p)| prediction_marker(idx, p, dashboard.active_prediction()))
                .collect(),
        });
    }

    layers.push(MarkerLayer {
        kind: SceneLayerKind::Earthquakes,
        markers: dashboard
            .recent_earthquakes()
            .iter()
            .map(|eq| earthquake_marker(eq, dashboard.active_earthquake()))
            .collect(),
    });

    MapScene {
        view: dashboard.view(),
        layers,
    }
}

fn earthquake_marker(eq: &Earthquake, active: Option<&str>) -> Marker {
    let color = style::magnitude_color(eq.magnitude);

    let mut lines = vec![
        format!("Magnitude: {:.1}", eq.magnitude),
        format!("Time: {}", timefmt::format_date(eq.time)),
    ];
    if eq.tsunami {
        lines.push("Tsunami Alert".into());
    }

    Marker {
        id: eq.id.clone(),
        latitude: eq.latitude,
        longitude: eq.longitude,
        radius: style::marker_radius(eq.magnitude),
        fill_color: color.into(),
        stroke_color: color.into(),
        fill_opacity: 0.7,
        weight: 1,
        dash_array: None,
        selected: active == Some(eq.id.as_str()),
        popup: Popup {
            title: eq.place.clone().unwrap_or_else(|| "Unknown location".into()),
            lines,
            url: eq.url.clone(),
        },
    }
}

fn prediction_marker(index: usize, p: &EarthquakePrediction, active: Option<usize>) -> Marker {
    let color = style::risk_level_color(p.risk).color;

    Marker {
        id: format!("prediction-{index}"),
        latitude: p.latitude,
        longitude: p.longitude,
        radius: OVERLAY_RADIUS,
        fill_color: color.into(),
        stroke_color: color.into(),
        // Reduced opacity and a dashed outline distinguish forecast
        // from observation
        fill_opacity: 0.4,
        weight: 2,
        dash_array: Some("5, 5"),
        selected: active == Some(index),
        popup: Popup {
            title: p.location.clone(),
            lines: vec![
                p.region.clone(),
                format!(
                    "Predicted Magnitude: {}-{}",
                    p.magnitude.min, p.magnitude.max
                ),
                format!("Probability: {}% within {}", p.probability, p.timeframe),
                format!("Confidence: {}", p.confidence.as_str()),
            ],
            url: None,
        },
    }
}

fn risk_zone_marker(zone: &RiskZone) -> Marker {
    let color = style::risk_level_color(zone.risk).color;

    let mut lines = vec![format!("Risk Level: {}", zone.risk.as_str())];
    if let Some(description) = &zone.description {
        lines.push(description.clone());
    }

    Marker {
        id: zone.id.clone(),
        latitude: zone.latitude,
        longitude: zone.longitude,
        radius: OVERLAY_RADIUS,
        fill_color: color.into(),
        stroke_color: color.into(),
        fill_opacity: 0.2,
        weight: 1,
        dash_array: None,
        selected: false,
        popup: Popup {
            title: zone.name.clone(),
            lines,
            url: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceLevel, MagnitudeRange, RiskLevel};
    use crate::sources::DataSnapshot;

    fn quake(id: &str, magnitude: f64, significance: i32) -> Earthquake {
        Earthquake {
            id: id.into(),
            place: Some("Test Ridge".into()),
            time: 1_700_000_000_000,
            magnitude,
            longitude: 142.0,
            latitude: 38.0,
            depth_km: 10.0,
            url: Some("https://example.org/eq".into()),
            felt: None,
            alert: None,
            tsunami: true,
            title: None,
            status: "reviewed".into(),
            event_type: Some("earthquake".into()),
            significance,
            sources: None,
        }
    }

    fn sample_dashboard() -> Dashboard {
        let mut dash = Dashboard::new();
        dash.begin_load();
        dash.commit_initial_load(DataSnapshot {
            earthquakes: vec![quake("a", 6.2, 400)],
            predictions: vec![EarthquakePrediction {
                region: "Japan".into(),
                location: "Tokyo Region".into(),
                longitude: 139.65,
                latitude: 35.68,
                magnitude: MagnitudeRange { min: 5.5, max: 6.8 },
                probability: 30,
                timeframe: "2 weeks".into(),
                confidence: ConfidenceLevel::High,
                data_sources: vec!["JMA".into()],
                risk: RiskLevel::High,
            }],
            historical: Vec::new(),
            risk_zones: vec![RiskZone {
                id: "z1".into(),
                name: "Japan Trench".into(),
                longitude: 143.8,
                latitude: 39.07,
                radius_km: 250.0,
                risk: RiskLevel::Extreme,
                description: Some("Subduction zone".into()),
            }],
        });
        dash
    }

    #[test]
    fn test_refocus_threshold_is_strictly_greater() {
        let current = MapView::default();

        let unchanged = refocus(current, &[quake("a", 6.0, 800)]);
        assert_eq!(unchanged, current);

        let focused = refocus(current, &[quake("a", 6.0, 801)]);
        assert_eq!(focused.zoom, FOCUS_ZOOM);
        assert!((focused.latitude - 38.0).abs() < f64::EPSILON);
        assert!((focused.longitude - 142.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_refocus_picks_highest_significance() {
        let current = MapView::default();
        let mut far = quake("b", 7.0, 950);
        far.latitude = -20.0;

        let focused = refocus(current, &[quake("a", 6.0, 900), far]);
        assert!((focused.latitude - (-20.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_refocus_keeps_view_when_empty() {
        let moved = MapView {
            latitude: 5.0,
            longitude: 5.0,
            zoom: 4,
        };
        assert_eq!(refocus(moved, &[]), moved);
    }

    #[test]
    fn test_scene_default_layers() {
        let dash = sample_dashboard();
        let scene = compose_scene(&dash);

        let kinds: Vec<SceneLayerKind> = scene.layers.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SceneLayerKind::RiskZones,
                SceneLayerKind::Predictions,
                SceneLayerKind::Earthquakes,
            ]
        );
    }

    #[test]
    fn test_earthquake_layer_always_renders() {
        let mut dash = sample_dashboard();
        dash.toggle_layer(MapLayer::RiskZones);
        dash.toggle_layer(MapLayer::Predictions);

        let scene = compose_scene(&dash);
        assert_eq!(scene.layers.len(), 1);
        assert_eq!(scene.layers[0].kind, SceneLayerKind::Earthquakes);
        assert_eq!(scene.layers[0].markers.len(), 1);
    }

    #[test]
    fn test_earthquake_marker_styling() {
        let dash = sample_dashboard();
        let scene = compose_scene(&dash);

        let marker = &scene.layers[2].markers[0];
        assert!((marker.radius - 18.6).abs() < 1e-9);
        assert_eq!(marker.fill_color, "#ff9800");
        assert!((marker.fill_opacity - 0.7).abs() < f64::EPSILON);
        assert_eq!(marker.weight, 1);
        assert!(marker.dash_array.is_none());
        assert!(marker.popup.lines.contains(&"Tsunami Alert".to_string()));
        assert!(marker.popup.url.is_some());
    }

    #[test]
    fn test_prediction_marker_styling() {
        let dash = sample_dashboard();
        let scene = compose_scene(&dash);

        let marker = &scene.layers[1].markers[0];
        assert_eq!(marker.dash_array, Some("5, 5"));
        assert!((marker.fill_opacity - 0.4).abs() < f64::EPSILON);
        assert_eq!(marker.weight, 2);
        assert_eq!(marker.fill_color, "#ef5350");
        assert!(marker
            .popup
            .lines
            .contains(&"Predicted Magnitude: 5.5-6.8".to_string()));
    }

    #[test]
    fn test_risk_zone_marker_styling() {
        let dash = sample_dashboard();
        let scene = compose_scene(&dash);

        let marker = &scene.layers[0].markers[0];
        assert!((marker.fill_opacity - 0.2).abs() < f64::EPSILON);
        // Fixed radius, not scaled to the zone's kilometer radius
        assert!((marker.radius - OVERLAY_RADIUS).abs() < f64::EPSILON);
        assert_eq!(marker.fill_color, "#c62828");
        assert!(marker
            .popup
            .lines
            .contains(&"Risk Level: extreme".to_string()));
    }

    #[test]
    fn test_selection_flags_markers() {
        let mut dash = sample_dashboard();
        dash.select_earthquake(Some("a".into()));
        dash.select_prediction(Some(0));

        let scene = compose_scene(&dash);
        assert!(scene.layers[1].markers[0].selected);
        assert!(scene.layers[2].markers[0].selected);
    }
}
