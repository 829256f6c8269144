//! Schedule page HTTP client.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::domain::RouteSource;

use super::TimetableSource;
use super::error::ScrapeError;
use super::parse::{DayTimetables, parse_schedule};

const DEFAULT_USER_AGENT: &str = concat!("timetable-publisher/", env!("CARGO_PKG_VERSION"));

/// Configuration for the schedule page client.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set a custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches schedule pages over HTTP and parses their timetables.
///
/// The page must carry its schedule in the served markup; nothing is
/// rendered.
#[derive(Debug, Clone)]
pub struct HttpTimetableSource {
    http: reqwest::Client,
}

impl HttpTimetableSource {
    /// Create a new client.
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        if let Ok(user_agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, user_agent);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }
}

impl TimetableSource for HttpTimetableSource {
    async fn fetch(&self, source: &RouteSource) -> Result<DayTimetables, ScrapeError> {
        let response = self.http.get(source.url()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(route = %source.route(), bytes = body.len(), "fetched schedule page");

        parse_schedule(&body)
    }
}
