use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ScrapeError, ScrapeErrorKind, ScrapeResponse, Stage};

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Receives `(stage, message)` pairs while a scrape runs.
///
/// `emit` may wait until the receiver has room; scrapers await it before
/// moving on so events are never lost or reordered.
#[async_trait::async_trait]
pub trait ProgressSink: Send + Sync {
    async fn emit(&self, stage: Stage, message: &str);
}

#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    /// Extracts title and text from `url`. Progress is reported through `sink`
    /// strictly before the call returns.
    async fn scrape(
        &self,
        url: &str,
        timeout_ms: u64,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeResponse, ScrapeError>;
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the extraction service.
#[derive(Debug, Clone)]
pub struct ReqwestScraper {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestScraper {
    pub fn new(settings: ScraperSettings) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ScrapeError::new(ScrapeErrorKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Probes `/scraper/health`, falling back to `/health` when the first probe
    /// cannot be sent or the route does not exist.
    pub async fn check_health(&self) -> Result<(), ScrapeError> {
        let primary = self.client.get(self.endpoint("/scraper/health")).send().await;
        let response = match primary {
            Ok(response) if response.status() != reqwest::StatusCode::NOT_FOUND => response,
            other => {
                linkmgmt_logging::lm_debug!("Primary health probe unusable: {other:?}");
                self.client
                    .get(self.endpoint("/health"))
                    .send()
                    .await
                    .map_err(|err| {
                        ScrapeError::new(ScrapeErrorKind::ServiceUnavailable, err.to_string())
                    })?
            }
        };
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScrapeError::new(
                ScrapeErrorKind::ServiceUnavailable,
                format!("service unhealthy: status {}", status.as_u16()),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Scraper for ReqwestScraper {
    async fn scrape(
        &self,
        url: &str,
        timeout_ms: u64,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeResponse, ScrapeError> {
        url::Url::parse(url)
            .map_err(|err| ScrapeError::new(ScrapeErrorKind::InvalidUrl, err.to_string()))?;

        sink.emit(Stage::HealthCheck, "Checking scraper service...").await;
        sink.emit(Stage::Fetching, "Sending scrape request...").await;
        let request = ScrapeRequest {
            url,
            timeout: (timeout_ms > 0).then_some(timeout_ms),
        };
        let pending = self
            .client
            .post(self.endpoint("/scrape"))
            .json(&request)
            .send();
        sink.emit(Stage::Extracting, "Extracting content from URL...").await;

        let response = pending.await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if status != reqwest::StatusCode::OK {
            if let Ok(ErrorBody { error: Some(error) }) = serde_json::from_str::<ErrorBody>(&body) {
                if !error.is_empty() {
                    return Err(ScrapeError::new(ScrapeErrorKind::Extraction, error));
                }
            }
            return Err(ScrapeError::new(
                ScrapeErrorKind::InvalidResponse,
                format!("scraper service error (status {}): {body}", status.as_u16()),
            ));
        }

        let result: ScrapeResponse = serde_json::from_str(&body).map_err(|err| {
            ScrapeError::new(
                ScrapeErrorKind::InvalidResponse,
                format!("failed to decode response: {err}"),
            )
        })?;
        if !result.success {
            let message = result
                .error
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| "Failed to extract content".to_string());
            return Err(ScrapeError::new(ScrapeErrorKind::Extraction, message));
        }

        sink.emit(Stage::Complete, "Scraping completed successfully").await;
        Ok(result)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ScrapeError {
    if err.is_timeout() {
        return ScrapeError::new(ScrapeErrorKind::Timeout, err.to_string());
    }
    if err.is_connect() {
        return ScrapeError::new(ScrapeErrorKind::ServiceUnavailable, err.to_string());
    }
    ScrapeError::new(ScrapeErrorKind::Network, err.to_string())
}
