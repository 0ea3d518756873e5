//! Data access functions for the dashboard.
//!
//! Four independent operations returning typed collections: recent
//! earthquakes (real USGS fetch), predictions, historical earthquakes and
//! risk zones (static snapshots standing in for a model-serving endpoint
//! and a queryable historical store).
//!
//! Every operation fails soft: on any network or parse failure it logs the
//! failure and resolves to an empty collection, so the dashboard renders an
//! empty map rather than crashing when an upstream is unavailable.

use tracing::warn;

use crate::client::{FeedPeriod, UsgsClient};
use crate::models::{
    ConfidenceLevel, Earthquake, EarthquakePrediction, HistoricalEarthquake, MagnitudeRange,
    RiskLevel, RiskZone,
};

/// Query parameters for the recent-earthquakes fetch.
#[derive(Debug, Clone, Copy)]
pub struct RecentQuery {
    pub min_magnitude: f64,
    pub period: FeedPeriod,
    pub limit: usize,
}

impl Default for RecentQuery {
    fn default() -> Self {
        Self {
            min_magnitude: 4.5,
            period: FeedPeriod::Month,
            limit: 20,
        }
    }
}

/// One combined result of the initial parallel load.
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub earthquakes: Vec<Earthquake>,
    pub predictions: Vec<EarthquakePrediction>,
    pub historical: Vec<HistoricalEarthquake>,
    pub risk_zones: Vec<RiskZone>,
}

/// The dashboard's data access layer.
pub struct DataSources {
    client: UsgsClient,
}

impl DataSources {
    #[must_use]
    pub fn new(client: UsgsClient) -> Self {
        Self { client }
    }

    /// Fetch recent earthquakes from the USGS summary feed.
    ///
    /// Truncates to `query.limit` and projects each raw feature into the
    /// [`Earthquake`] shape. Never fails; resolves to empty on error.
    pub async fn recent_earthquakes(&self, query: RecentQuery) -> Vec<Earthquake> {
        match self
            .client
            .fetch_summary(query.min_magnitude, query.period)
            .await
        {
            Ok(feed) => feed
                .features
                .iter()
                .take(query.limit)
                .map(Earthquake::from)
                .collect(),
            Err(e) => {
                warn!("failed to fetch recent earthquakes: {e}");
                Vec::new()
            }
        }
    }

    /// Fetch probabilistic earthquake predictions.
    ///
    /// Simulated: a production system would call a model-serving endpoint
    /// here with the same async contract and fail-soft behavior.
    pub async fn predictions(&self) -> Vec<EarthquakePrediction> {
        prediction_table()
    }

    /// Fetch significant historical earthquakes.
    ///
    /// Simulated: stands in for a queryable historical store.
    pub async fn historical_earthquakes(&self) -> Vec<HistoricalEarthquake> {
        historical_table()
    }

    /// Fetch seismic risk zones.
    ///
    /// Simulated: stands in for real-time tectonic analysis.
    pub async fn risk_zones(&self) -> Vec<RiskZone> {
        risk_zone_table()
    }

    /// Issue all four fetches concurrently and commit them together.
    ///
    /// Completion order is unspecified and does not affect the result;
    /// each fetch already fails soft to empty.
    pub async fn snapshot(&self, query: RecentQuery) -> DataSnapshot {
        let (earthquakes, predictions, historical, risk_zones) = tokio::join!(
            self.recent_earthquakes(query),
            self.predictions(),
            self.historical_earthquakes(),
            self.risk_zones(),
        );

        DataSnapshot {
            earthquakes,
            predictions,
            historical,
            risk_zones,
        }
    }
}

fn prediction_table() -> Vec<EarthquakePrediction> {
    vec![
        EarthquakePrediction {
            region: "California".into(),
            location: "San Andreas Fault".into(),
            longitude: -119.4179,
            latitude: 36.7783,
            magnitude: MagnitudeRange { min: 6.0, max: 7.5 },
            probability: 25,
            timeframe: "30 days".into(),
            confidence: ConfidenceLevel::Moderate,
            data_sources: vec![
                "USGS".into(),
                "ML Model".into(),
                "Historical Patterns".into(),
            ],
            risk: RiskLevel::High,
        },
        EarthquakePrediction {
            region: "Japan".into(),
            location: "Tokyo Region".into(),
            longitude: 139.6503,
            latitude: 35.6762,
            magnitude: MagnitudeRange { min: 5.5, max: 6.8 },
            probability: 30,
            timeframe: "2 weeks".into(),
            confidence: ConfidenceLevel::High,
            data_sources: vec![
                "JMA".into(),
                "ML Model".into(),
                "Recent Tremor Analysis".into(),
            ],
            risk: RiskLevel::High,
        },
        EarthquakePrediction {
            region: "Indonesia".into(),
            location: "Mentawai Islands".into(),
            longitude: 99.1415,
            latitude: -1.2833,
            magnitude: MagnitudeRange { min: 7.0, max: 8.5 },
            probability: 15,
            timeframe: "60 days".into(),
            confidence: ConfidenceLevel::Moderate,
            data_sources: vec![
                "BMKG".into(),
                "ML Model".into(),
                "Tectonic Stress Analysis".into(),
            ],
            risk: RiskLevel::Extreme,
        },
        EarthquakePrediction {
            region: "Chile".into(),
            location: "Valparaiso Region".into(),
            longitude: -71.6127,
            latitude: -33.0472,
            magnitude: MagnitudeRange { min: 6.5, max: 7.8 },
            probability: 20,
            timeframe: "45 days".into(),
            confidence: ConfidenceLevel::Low,
            data_sources: vec!["CSN".into(), "ML Model".into()],
            risk: RiskLevel::High,
        },
        EarthquakePrediction {
            region: "New Zealand".into(),
            location: "Alpine Fault".into(),
            longitude: 170.4545,
            latitude: -44.0705,
            magnitude: MagnitudeRange { min: 6.0, max: 7.2 },
            probability: 10,
            timeframe: "90 days".into(),
            confidence: ConfidenceLevel::Low,
            data_sources: vec!["GNS".into(), "ML Model".into()],
            risk: RiskLevel::Moderate,
        },
    ]
}

fn historical_table() -> Vec<HistoricalEarthquake> {
    vec![
        HistoricalEarthquake {
            id: "1".into(),
            year: 2023,
            region: "Turkey-Syria".into(),
            location: "Gaziantep, Turkey".into(),
            magnitude: 7.8,
            casualties: Some("50,000+".into()),
            impact: "Devastating structural damage, humanitarian crisis".into(),
            longitude: 37.0662,
            latitude: 37.3825,
            image_url: None,
        },
        HistoricalEarthquake {
            id: "2".into(),
            year: 2021,
            region: "Haiti".into(),
            location: "Petit-Trou-de-Nippes".into(),
            magnitude: 7.2,
            casualties: Some("2,000+".into()),
            impact: "Extensive damage to infrastructure, landslides".into(),
            longitude: -73.4852,
            latitude: 18.4075,
            image_url: None,
        },
        HistoricalEarthquake {
            id: "3".into(),
            year: 2011,
            region: "Japan".into(),
            location: "T\u{14d}hoku region".into(),
            magnitude: 9.1,
            casualties: Some("18,000+".into()),
            impact: "Tsunami, nuclear disaster at Fukushima".into(),
            longitude: 142.3692,
            latitude: 38.3223,
            image_url: None,
        },
        HistoricalEarthquake {
            id: "4".into(),
            year: 2010,
            region: "Haiti".into(),
            location: "Port-au-Prince".into(),
            magnitude: 7.0,
            casualties: Some("100,000+".into()),
            impact: "Capital city devastated, critical infrastructure collapse".into(),
            longitude: -72.3388,
            latitude: 18.5944,
            image_url: None,
        },
        HistoricalEarthquake {
            id: "5".into(),
            year: 2008,
            region: "China".into(),
            location: "Sichuan".into(),
            magnitude: 7.9,
            casualties: Some("87,000+".into()),
            impact: "Massive landslides, schools collapsed, 4.8M homeless".into(),
            longitude: 103.3647,
            latitude: 31.0023,
            image_url: None,
        },
        HistoricalEarthquake {
            id: "6".into(),
            year: 2004,
            region: "Indonesia".into(),
            location: "Indian Ocean".into(),
            magnitude: 9.1,
            casualties: Some("227,000+".into()),
            impact: "Tsunami affecting 14 countries, global humanitarian response".into(),
            longitude: 95.8538,
            latitude: 3.2951,
            image_url: None,
        },
    ]
}

fn risk_zone_table() -> Vec<RiskZone> {
    vec![
        RiskZone {
            id: "1".into(),
            name: "San Andreas Fault Zone".into(),
            longitude: -119.4179,
            latitude: 36.7783,
            radius_km: 300.0,
            risk: RiskLevel::High,
            description: Some(
                "Major transform fault between Pacific & North American plates".into(),
            ),
        },
        RiskZone {
            id: "2".into(),
            name: "Japan Trench".into(),
            longitude: 143.7994,
            latitude: 39.0742,
            radius_km: 250.0,
            risk: RiskLevel::Extreme,
            description: Some(
                "Subduction zone where Pacific plate dives under Eurasian plate".into(),
            ),
        },
        RiskZone {
            id: "3".into(),
            name: "Ring of Fire - Indonesia".into(),
            longitude: 106.8456,
            latitude: -6.2088,
            radius_km: 400.0,
            risk: RiskLevel::Extreme,
            description: Some(
                "Complex convergent plate boundaries with frequent seismic activity".into(),
            ),
        },
        RiskZone {
            id: "4".into(),
            name: "Himalayan Front".into(),
            longitude: 86.925,
            latitude: 27.9881,
            radius_km: 350.0,
            risk: RiskLevel::High,
            description: Some(
                "Continental collision zone between Indian & Eurasian plates".into(),
            ),
        },
        RiskZone {
            id: "5".into(),
            name: "Cascadia Subduction Zone".into(),
            longitude: -124.7337,
            latitude: 47.9041,
            radius_km: 200.0,
            risk: RiskLevel::High,
            description: Some("Subduction zone capable of M9.0+ earthquakes".into()),
        },
        RiskZone {
            id: "6".into(),
            name: "New Madrid Seismic Zone".into(),
            longitude: -89.5833,
            latitude: 36.5667,
            radius_km: 150.0,
            risk: RiskLevel::Moderate,
            description: Some(
                "Intraplate seismic zone with history of major earthquakes".into(),
            ),
        },
        RiskZone {
            id: "7".into(),
            name: "Chile-Peru Trench".into(),
            longitude: -75.0,
            latitude: -25.0,
            radius_km: 400.0,
            risk: RiskLevel::High,
            description: Some("Subduction of Nazca plate under South American plate".into()),
        },
    ]
}
