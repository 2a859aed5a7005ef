//! Upstream feed HTTP client.
//!
//! Async methods for the three admin-store feeds: schedules,
//! daily perturbations, and platform records. Every method returns
//! already-converted domain data; wire tolerance lives in
//! [`types`](super::types) and [`convert`](super::convert).

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::domain::{DailyPerturbation, PlatformAssignment, PlatformOverride, Schedule};

use super::convert::{convert_perturbations, convert_platforms, convert_schedules};
use super::error::FeedError;
use super::types::{Envelope, PerturbationDto, PlatformDto, ScheduleDto};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the admin store API.
    pub base_url: String,
    /// Optional API key, sent as `x-api-key`.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for the admin-store feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeedClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| FeedError::Api {
                status: 0,
                message: "invalid API key format".to_string(),
            })?;
            headers.insert("x-api-key", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the full schedule set.
    pub async fn fetch_schedules(&self) -> Result<Vec<Schedule>, FeedError> {
        let url = format!("{}/schedules", self.base_url);
        let envelope: Envelope<ScheduleDto> = self.get_json(&url).await?;
        Ok(convert_schedules(envelope.into_records()))
    }

    /// Fetch the perturbation records for one date.
    pub async fn fetch_daily_perturbations(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<DailyPerturbation>, FeedError> {
        let url = format!("{}/perturbations/daily?date={}", self.base_url, date);
        let envelope: Envelope<PerturbationDto> = self.get_json(&url).await?;
        Ok(convert_perturbations(envelope.into_records()))
    }

    /// Fetch the platform records, optionally scoped to one station.
    pub async fn fetch_platforms(
        &self,
        station: Option<&str>,
    ) -> Result<(Vec<PlatformOverride>, Vec<PlatformAssignment>), FeedError> {
        let url = match station {
            Some(s) => format!(
                "{}/platforms?stationName={}",
                self.base_url,
                urlencode(s)
            ),
            None => format!("{}/platforms", self.base_url),
        };
        let envelope: Envelope<PlatformDto> = self.get_json(&url).await?;
        Ok(convert_platforms(envelope.into_records()))
    }

    /// Fetch all three feeds for one date concurrently.
    pub async fn fetch_all(
        &self,
        date: NaiveDate,
    ) -> Result<FeedBundle, FeedError> {
        let (schedules, perturbations, platforms) = futures::try_join!(
            self.fetch_schedules(),
            self.fetch_daily_perturbations(date),
            self.fetch_platforms(None),
        )?;
        let (platform_overrides, platform_assignments) = platforms;

        Ok(FeedBundle {
            schedules,
            perturbations,
            platform_overrides,
            platform_assignments,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Json {
            message: e.to_string(),
        })
    }
}

/// Everything one refresh tick fetches.
#[derive(Debug, Clone, Default)]
pub struct FeedBundle {
    pub schedules: Vec<Schedule>,
    pub perturbations: Vec<DailyPerturbation>,
    pub platform_overrides: Vec<PlatformOverride>,
    pub platform_assignments: Vec<PlatformAssignment>,
}

/// Minimal query-string escaping for station names.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = FeedConfig::new("http://localhost:9000/")
            .with_api_key("secret")
            .with_timeout(5);
        assert_eq!(config.base_url, "http://localhost:9000/");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = FeedClient::new(FeedConfig::new("http://localhost:9000/")).unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[test]
    fn urlencode_station_names() {
        assert_eq!(urlencode("Gap"), "Gap");
        assert_eq!(urlencode("Gare de Lyon"), "Gare%20de%20Lyon");
        assert_eq!(urlencode("Briançon"), "Brian%C3%A7on");
    }
}
