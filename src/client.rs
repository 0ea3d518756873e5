//! USGS Earthquake API client.
//!
//! Provides async HTTP access to USGS summary feeds.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::errors::QuakeAwareError;
use crate::models::FeatureCollection;

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakeaware/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// Time window tokens accepted by the summary feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPeriod {
    Hour,
    Day,
    Week,
    #[default]
    Month,
}

impl FeedPeriod {
    /// Get the URL path token for this period.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl std::str::FromStr for FeedPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(format!("unknown feed period: {s}")),
        }
    }
}

/// Render the feed name segment, e.g. `4.5_month`.
///
/// The feeds spell whole-number thresholds with a trailing `.0` (`1.0_day`),
/// so fractional digits are kept to one place.
#[must_use]
pub fn feed_segment(min_magnitude: f64, period: FeedPeriod) -> String {
    format!("{min_magnitude:.1}_{}", period.as_str())
}

/// Client for the USGS earthquake API.
pub struct UsgsClient {
    client: Client,
    base_url: String,
}

impl UsgsClient {
    /// Create a new USGS client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, QuakeAwareError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: USGS_BASE_URL.to_string(),
        })
    }

    /// Fetch a summary GeoJSON feed filtered by magnitude and period.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or response cannot be parsed.
    #[instrument(skip(self), fields(period = period.as_str()))]
    pub async fn fetch_summary(
        &self,
        min_magnitude: f64,
        period: FeedPeriod,
    ) -> Result<FeatureCollection, QuakeAwareError> {
        let url = format!(
            "{}/earthquakes/feed/v1.0/summary/{}.geojson",
            self.base_url,
            feed_segment(min_magnitude, period)
        );

        debug!("fetching feed from {}", url);

        let response = self.client.get(&url).send().await?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuakeAwareError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let feed: FeatureCollection = response.json().await?;

        // Validate response structure
        feed.validate()?;

        debug!("fetched {} events", feed.features.len());
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_period_round_trip() {
        let periods = [
            FeedPeriod::Hour,
            FeedPeriod::Day,
            FeedPeriod::Week,
            FeedPeriod::Month,
        ];

        for period in periods {
            let s = period.as_str();
            let parsed: FeedPeriod = s.parse().expect("failed to parse");
            assert_eq!(parsed, period);
        }
    }

    #[test]
    fn test_feed_segment() {
        assert_eq!(feed_segment(4.5, FeedPeriod::Month), "4.5_month");
        assert_eq!(feed_segment(2.5, FeedPeriod::Day), "2.5_day");
        assert_eq!(feed_segment(1.0, FeedPeriod::Week), "1.0_week");
    }
}
