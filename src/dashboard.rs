//! Dashboard data controller.
//!
//! One explicit state container owns all mutable dashboard state: the four
//! data collections, layer visibility, active selections, the map view and
//! the load/refresh lifecycle. Operations are pure state transitions that
//! return notification values; the server layer glues them to fetches and
//! the SSE channel, which keeps the state machine testable independent of
//! any rendering layer.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{
    Earthquake, EarthquakePrediction, HistoricalEarthquake, MapLayer, RiskZone,
};
use crate::scene::{self, MapView};
use crate::sources::DataSnapshot;

/// Lifecycle of the dashboard session.
///
/// `Idle -> Loading -> Ready`, with a recurring background
/// `Ready -> Refreshing -> Ready` that does not block the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardStatus {
    Idle,
    Loading,
    Ready,
    Refreshing,
}

impl DashboardStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Refreshing => "refreshing",
        }
    }
}

/// Severity hint for a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Destructive,
}

/// Follow-up a notification offers the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NotificationAction {
    /// Highlight the given earthquake across list and map
    #[serde(rename_all = "camelCase")]
    FocusEarthquake { id: String },
}

/// A user-facing toast notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
}

/// Persistent banner raised for the first elevated-risk prediction.
#[derive(Debug, Clone, Serialize)]
pub struct HighRiskAlert {
    /// Positional key of the prediction
    pub index: usize,
    pub location: String,
    pub region: String,
    pub probability: u8,
    pub message: String,
}

/// Strategy deciding which fetched events count as new.
///
/// Returns the ids of genuinely new events; an empty result means the held
/// collection is left untouched and no notification fires.
pub trait RefreshDiff: Send + Sync {
    fn new_events(&self, held: &[Earthquake], fetched: &[Earthquake]) -> Vec<String>;
}

/// Default strategy: only net growth triggers an alert.
///
/// If the feed's collection shrinks, or events roll off the requested time
/// window while others arrive, the size comparison suppresses the
/// notification even though membership changed. This is intentional,
/// documented behavior; [`MembershipDiff`] is the corrected alternative.
#[derive(Debug, Default)]
pub struct SizeGrowthDiff;

impl RefreshDiff for SizeGrowthDiff {
    fn new_events(&self, held: &[Earthquake], fetched: &[Earthquake]) -> Vec<String> {
        if fetched.len() <= held.len() {
            return Vec::new();
        }
        unseen_ids(held, fetched)
    }
}

/// Membership-based strategy: any unseen id counts as new.
#[derive(Debug, Default)]
pub struct MembershipDiff;

impl RefreshDiff for MembershipDiff {
    fn new_events(&self, held: &[Earthquake], fetched: &[Earthquake]) -> Vec<String> {
        unseen_ids(held, fetched)
    }
}

fn unseen_ids(held: &[Earthquake], fetched: &[Earthquake]) -> Vec<String> {
    let known: HashSet<&str> = held.iter().map(|e| e.id.as_str()).collect();
    fetched
        .iter()
        .filter(|e| !known.contains(e.id.as_str()))
        .map(|e| e.id.clone())
        .collect()
}

/// The dashboard state container.
pub struct Dashboard {
    status: DashboardStatus,
    recent: Vec<Earthquake>,
    predictions: Vec<EarthquakePrediction>,
    historical: Vec<HistoricalEarthquake>,
    risk_zones: Vec<RiskZone>,
    visible_layers: Vec<MapLayer>,
    active_earthquake: Option<String>,
    active_prediction: Option<usize>,
    view: MapView,
    refresh_in_progress: bool,
    diff: Box<dyn RefreshDiff>,
}

impl Dashboard {
    /// Create a controller with the default size-growth diff strategy and
    /// the default visible overlays (risk zones and predictions).
    #[must_use]
    pub fn new() -> Self {
        Self::with_diff(Box::new(SizeGrowthDiff))
    }

    /// Create a controller with a custom diff strategy.
    #[must_use]
    pub fn with_diff(diff: Box<dyn RefreshDiff>) -> Self {
        Self {
            status: DashboardStatus::Idle,
            recent: Vec::new(),
            predictions: Vec::new(),
            historical: Vec::new(),
            risk_zones: Vec::new(),
            visible_layers: vec![MapLayer::RiskZones, MapLayer::Predictions],
            active_earthquake: None,
            active_prediction: None,
            view: MapView::default(),
            refresh_in_progress: false,
            diff,
        }
    }

    #[must_use]
    pub fn status(&self) -> DashboardStatus {
        self.status
    }

    #[must_use]
    pub fn recent_earthquakes(&self) -> &[Earthquake] {
        &self.recent
    }

    #[must_use]
    pub fn predictions(&self) -> &[EarthquakePrediction] {
        &self.predictions
    }

    #[must_use]
    pub fn historical_earthquakes(&self) -> &[HistoricalEarthquake] {
        &self.historical
    }

    #[must_use]
    pub fn risk_zones(&self) -> &[RiskZone] {
        &self.risk_zones
    }

    #[must_use]
    pub fn view(&self) -> MapView {
        self.view
    }

    // ------------------------------------------------------------------
    // Load / refresh lifecycle
    // ------------------------------------------------------------------

    /// Enter the loading state while the initial fetches are pending.
    pub fn begin_load(&mut self) {
        self.status = DashboardStatus::Loading;
    }

    /// Commit the initial combined load.
    ///
    /// All four collections are committed together so the completion order
    /// of the underlying fetches cannot affect final state. Transitions to
    /// Ready regardless of whether any collection came back empty, and
    /// returns the summary notification.
    pub fn commit_initial_load(&mut self, snapshot: DataSnapshot) -> Notification {
        self.recent = snapshot.earthquakes;
        self.predictions = snapshot.predictions;
        self.historical = snapshot.historical;
        self.risk_zones = snapshot.risk_zones;
        self.view = scene::refocus(self.view, &self.recent);
        self.status = DashboardStatus::Ready;

        Notification {
            title: "Data loaded successfully".into(),
            description: format!(
                "Displaying {} recent earthquakes and {} predictions",
                self.recent.len(),
                self.predictions.len()
            ),
            severity: None,
            action: None,
        }
    }

    /// Report a combined-load failure.
    ///
    /// Defensive branch: the fail-soft data access functions cannot raise
    /// this in practice, but the path is kept so a future fallible source
    /// surfaces one user-visible error instead of a hang in Loading.
    pub fn fail_initial_load(&mut self) -> Notification {
        self.status = DashboardStatus::Ready;

        Notification {
            title: "Error loading data".into(),
            description: "There was a problem loading earthquake data. Please try again later."
                .into(),
            severity: Some(Severity::Destructive),
            action: None,
        }
    }

    /// Gate a poll tick.
    ///
    /// Returns false unless the dashboard is Ready with no refresh already
    /// in flight, so a slow response overlapping the next tick is skipped
    /// rather than run concurrently.
    pub fn begin_refresh(&mut self) -> bool {
        if self.refresh_in_progress || self.status != DashboardStatus::Ready {
            return false;
        }
        self.refresh_in_progress = true;
        self.status = DashboardStatus::Refreshing;
        true
    }

    /// Apply a freshly fetched recent-earthquake collection.
    ///
    /// Runs the diff strategy; when it reports new events, the held
    /// collection is replaced wholesale, the map refocuses, and exactly one
    /// notification is returned for the whole refresh cycle. Otherwise the
    /// held state is untouched. A result arriving after [`Self::shutdown`]
    /// is ignored.
    pub fn apply_poll_result(&mut self, fetched: Vec<Earthquake>) -> Option<Notification> {
        if self.status == DashboardStatus::Idle {
            return None;
        }

        self.finish_refresh();

        let new_ids = self.diff.new_events(&self.recent, &fetched);
        if new_ids.is_empty() {
            return None;
        }

        let newest = newest_of(&fetched, &new_ids);
        self.recent = fetched;
        self.view = scene::refocus(self.view, &self.recent);

        Some(Notification {
            title: "New Earthquake Detected".into(),
            description: format!(
                "{} new earthquake(s) have been detected.",
                new_ids.len()
            ),
            severity: None,
            action: newest.map(|id| NotificationAction::FocusEarthquake { id }),
        })
    }

    /// Clear the refresh state after a swallowed poll failure.
    pub fn abort_refresh(&mut self) {
        self.finish_refresh();
    }

    /// Tear the session down; later poll results become no-ops.
    pub fn shutdown(&mut self) {
        self.status = DashboardStatus::Idle;
        self.refresh_in_progress = false;
    }

    fn finish_refresh(&mut self) {
        self.refresh_in_progress = false;
        if self.status == DashboardStatus::Refreshing {
            self.status = DashboardStatus::Ready;
        }
    }

    // ------------------------------------------------------------------
    // Layer visibility and selection
    // ------------------------------------------------------------------

    /// Flip a layer's membership in the visible set. Involution.
    pub fn toggle_layer(&mut self, layer: MapLayer) {
        if let Some(pos) = self.visible_layers.iter().position(|l| *l == layer) {
            self.visible_layers.remove(pos);
        } else {
            self.visible_layers.push(layer);
        }
    }

    #[must_use]
    pub fn layer_visible(&self, layer: MapLayer) -> bool {
        self.visible_layers.contains(&layer)
    }

    #[must_use]
    pub fn visible_layers(&self) -> &[MapLayer] {
        &self.visible_layers
    }

    /// Set or clear the active earthquake. Independent of the active
    /// prediction; setting one never clears the other.
    pub fn select_earthquake(&mut self, id: Option<String>) {
        self.active_earthquake = id;
    }

    /// Set or clear the active prediction by positional key.
    pub fn select_prediction(&mut self, index: Option<usize>) {
        self.active_prediction = index;
    }

    #[must_use]
    pub fn active_earthquake(&self) -> Option<&str> {
        self.active_earthquake.as_deref()
    }

    #[must_use]
    pub fn active_prediction(&self) -> Option<usize> {
        self.active_prediction
    }

    // ------------------------------------------------------------------
    // High-risk banner
    // ------------------------------------------------------------------

    /// First prediction, in original order, whose risk level is high or
    /// extreme. First match wins, not the highest probability.
    #[must_use]
    pub fn high_risk_alert(&self) -> Option<HighRiskAlert> {
        self.predictions
            .iter()
            .enumerate()
            .find(|(_, p)| p.risk.is_elevated())
            .map(|(index, p)| HighRiskAlert {
                index,
                location: p.location.clone(),
                region: p.region.clone(),
                probability: p.probability,
                message: format!(
                    "High risk alert: {}, {} - {}% chance of M{}+ in {}",
                    p.location,
                    p.region,
                    p.probability,
                    fmt_magnitude(p.magnitude.min),
                    p.timeframe
                ),
            })
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Id of the most recent event among the given new ids.
fn newest_of(fetched: &[Earthquake], new_ids: &[String]) -> Option<String> {
    fetched
        .iter()
        .filter(|e| new_ids.contains(&e.id))
        .max_by_key(|e| e.time)
        .map(|e| e.id.clone())
}

/// Render a magnitude without a trailing `.0`, e.g. `6` and `6.5`.
fn fmt_magnitude(m: f64) -> String {
    if m.fract() == 0.0 {
        format!("{m:.0}")
    } else {
        format!("{m}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceLevel, MagnitudeRange, RiskLevel};

    fn quake(id: &str, time: i64) -> Earthquake {
        Earthquake {
            id: id.into(),
            place: Some(format!("near {id}")),
            time,
            magnitude: 5.0,
            longitude: 0.0,
            latitude: 0.0,
            depth_km: 10.0,
            url: None,
            felt: None,
            alert: None,
            tsunami: false,
            title: None,
            status: "reviewed".into(),
            event_type: Some("earthquake".into()),
            significance: 400,
            sources: None,
        }
    }

    fn prediction(location: &str, risk: RiskLevel, probability: u8) -> EarthquakePrediction {
        EarthquakePrediction {
            region: "Testland".into(),
            location: location.into(),
            longitude: 0.0,
            latitude: 0.0,
            magnitude: MagnitudeRange { min: 6.0, max: 7.5 },
            probability,
            timeframe: "30 days".into(),
            confidence: ConfidenceLevel::Moderate,
            data_sources: vec!["test".into()],
            risk,
        }
    }

    fn ready_dashboard(quakes: Vec<Earthquake>) -> Dashboard {
        let mut dash = Dashboard::new();
        dash.begin_load();
        dash.commit_initial_load(DataSnapshot {
            earthquakes: quakes,
            ..DataSnapshot::default()
        });
        dash
    }

    #[test]
    fn test_initial_load_reaches_ready_even_when_empty() {
        let mut dash = Dashboard::new();
        assert_eq!(dash.status(), DashboardStatus::Idle);

        dash.begin_load();
        assert_eq!(dash.status(), DashboardStatus::Loading);

        let note = dash.commit_initial_load(DataSnapshot::default());
        assert_eq!(dash.status(), DashboardStatus::Ready);
        assert_eq!(note.title, "Data loaded successfully");
        assert_eq!(
            note.description,
            "Displaying 0 recent earthquakes and 0 predictions"
        );
    }

    #[test]
    fn test_load_failure_is_destructive_and_terminal() {
        let mut dash = Dashboard::new();
        dash.begin_load();

        let note = dash.fail_initial_load();
        assert_eq!(dash.status(), DashboardStatus::Ready);
        assert_eq!(note.severity, Some(Severity::Destructive));
    }

    #[test]
    fn test_poll_identical_collection_is_a_no_op() {
        let held = vec![quake("a", 1000), quake("b", 2000)];
        let mut dash = ready_dashboard(held.clone());

        assert!(dash.begin_refresh());
        let note = dash.apply_poll_result(held);
        assert!(note.is_none());
        assert_eq!(dash.recent_earthquakes().len(), 2);
        assert_eq!(dash.status(), DashboardStatus::Ready);
    }

    #[test]
    fn test_poll_growth_fires_one_notification() {
        let mut dash = ready_dashboard(vec![quake("a", 1000), quake("b", 2000)]);

        assert!(dash.begin_refresh());
        let note = dash
            .apply_poll_result(vec![quake("a", 1000), quake("b", 2000), quake("c", 3000)])
            .expect("growth should notify");

        assert_eq!(note.title, "New Earthquake Detected");
        assert_eq!(note.description, "1 new earthquake(s) have been detected.");
        assert_eq!(
            note.action,
            Some(NotificationAction::FocusEarthquake { id: "c".into() })
        );
        assert_eq!(dash.recent_earthquakes().len(), 3);
    }

    #[test]
    fn test_action_targets_newest_new_event() {
        let mut dash = ready_dashboard(vec![quake("a", 1000)]);

        assert!(dash.begin_refresh());
        let note = dash
            .apply_poll_result(vec![quake("a", 1000), quake("d", 9000), quake("c", 3000)])
            .expect("growth should notify");

        assert_eq!(
            note.action,
            Some(NotificationAction::FocusEarthquake { id: "d".into() })
        );
    }

    #[test]
    fn test_poll_shrink_with_membership_change_is_suppressed() {
        // Documented quirk: A rolled off, so membership changed, but the
        // size comparison suppresses the notification and keeps held state.
        let mut dash = ready_dashboard(vec![quake("a", 1000), quake("b", 2000), quake("c", 3000)]);

        assert!(dash.begin_refresh());
        let note = dash.apply_poll_result(vec![quake("b", 2000), quake("c", 3000)]);
        assert!(note.is_none());
        assert_eq!(dash.recent_earthquakes().len(), 3);
        assert!(dash.recent_earthquakes().iter().any(|e| e.id == "a"));
    }

    #[test]
    fn test_same_size_different_membership_is_suppressed() {
        let mut dash = ready_dashboard(vec![quake("a", 1000), quake("b", 2000)]);

        assert!(dash.begin_refresh());
        let note = dash.apply_poll_result(vec![quake("b", 2000), quake("c", 3000)]);
        assert!(note.is_none());
        assert!(dash.recent_earthquakes().iter().any(|e| e.id == "a"));
    }

    #[test]
    fn test_membership_diff_catches_rollover() {
        let mut dash = Dashboard::with_diff(Box::new(MembershipDiff));
        dash.begin_load();
        dash.commit_initial_load(DataSnapshot {
            earthquakes: vec![quake("a", 1000), quake("b", 2000)],
            ..DataSnapshot::default()
        });

        assert!(dash.begin_refresh());
        let note = dash
            .apply_poll_result(vec![quake("b", 2000), quake("c", 3000)])
            .expect("membership diff should notify");
        assert_eq!(note.description, "1 new earthquake(s) have been detected.");
        assert!(!dash.recent_earthquakes().iter().any(|e| e.id == "a"));
    }

    #[test]
    fn test_refresh_guard_rejects_overlap() {
        let mut dash = ready_dashboard(vec![quake("a", 1000)]);

        assert!(dash.begin_refresh());
        assert!(!dash.begin_refresh());

        dash.apply_poll_result(vec![quake("a", 1000)]);
        assert!(dash.begin_refresh());
    }

    #[test]
    fn test_refresh_requires_ready() {
        let mut dash = Dashboard::new();
        assert!(!dash.begin_refresh());
        dash.begin_load();
        assert!(!dash.begin_refresh());
    }

    #[test]
    fn test_poll_after_shutdown_is_ignored() {
        let mut dash = ready_dashboard(vec![quake("a", 1000)]);
        assert!(dash.begin_refresh());

        dash.shutdown();
        let note = dash.apply_poll_result(vec![quake("a", 1000), quake("b", 2000)]);
        assert!(note.is_none());
        assert_eq!(dash.recent_earthquakes().len(), 1);
        assert_eq!(dash.status(), DashboardStatus::Idle);
    }

    #[test]
    fn test_abort_refresh_leaves_state_untouched() {
        let mut dash = ready_dashboard(vec![quake("a", 1000)]);
        assert!(dash.begin_refresh());

        dash.abort_refresh();
        assert_eq!(dash.status(), DashboardStatus::Ready);
        assert_eq!(dash.recent_earthquakes().len(), 1);
        assert!(dash.begin_refresh());
    }

    #[test]
    fn test_layer_toggle_is_an_involution() {
        let mut dash = Dashboard::new();
        assert!(dash.layer_visible(MapLayer::RiskZones));
        assert!(dash.layer_visible(MapLayer::Predictions));
        assert!(!dash.layer_visible(MapLayer::FaultLines));

        for layer in [
            MapLayer::FaultLines,
            MapLayer::TectonicPlates,
            MapLayer::Infrastructure,
            MapLayer::RiskZones,
            MapLayer::Predictions,
        ] {
            let before = dash.layer_visible(layer);
            dash.toggle_layer(layer);
            assert_eq!(dash.layer_visible(layer), !before);
            dash.toggle_layer(layer);
            assert_eq!(dash.layer_visible(layer), before);
        }
    }

    #[test]
    fn test_selections_are_independent() {
        let mut dash = ready_dashboard(vec![quake("a", 1000)]);

        dash.select_earthquake(Some("a".into()));
        dash.select_prediction(Some(2));
        assert_eq!(dash.active_earthquake(), Some("a"));
        assert_eq!(dash.active_prediction(), Some(2));

        dash.select_earthquake(None);
        assert_eq!(dash.active_earthquake(), None);
        assert_eq!(dash.active_prediction(), Some(2));
    }

    #[test]
    fn test_high_risk_banner_is_first_match() {
        let mut dash = Dashboard::new();
        dash.begin_load();
        dash.commit_initial_load(DataSnapshot {
            predictions: vec![
                prediction("Calmville", RiskLevel::Moderate, 90),
                prediction("X", RiskLevel::Extreme, 15),
                prediction("Y", RiskLevel::High, 80),
            ],
            ..DataSnapshot::default()
        });

        let alert = dash.high_risk_alert().expect("elevated risk present");
        assert_eq!(alert.location, "X");
        assert_eq!(alert.index, 1);
        assert_eq!(
            alert.message,
            "High risk alert: X, Testland - 15% chance of M6+ in 30 days"
        );
    }

    #[test]
    fn test_no_banner_without_elevated_risk() {
        let mut dash = Dashboard::new();
        dash.begin_load();
        dash.commit_initial_load(DataSnapshot {
            predictions: vec![prediction("Calmville", RiskLevel::Low, 5)],
            ..DataSnapshot::default()
        });
        assert!(dash.high_risk_alert().is_none());
    }

    #[test]
    fn test_fmt_magnitude() {
        assert_eq!(fmt_magnitude(6.0), "6");
        assert_eq!(fmt_magnitude(6.5), "6.5");
    }
}
