use std::fmt;

use chrono::{DateTime, Utc};

/// Monotonic identifier of one scrape job. Zero is never issued.
pub type JobId = u64;

/// Server-assigned identifier of a stored link.
pub type LinkId = String;

/// A stored link record as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Title for list rows; falls back to a placeholder when unset or blank.
    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or("(no title)")
    }

    pub fn has_title(&self) -> bool {
        non_blank(self.title.as_deref()).is_some()
    }

    pub fn has_text(&self) -> bool {
        non_blank(self.text.as_deref()).is_some()
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fields for a link that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkDraft {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub text: Option<String>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.text.is_none()
    }

    /// Builds a patch that only fills fields the link is missing.
    pub fn fill_missing(link: &Link, page: &ScrapedPage) -> Self {
        let mut patch = Self::default();
        if !link.has_title() && !page.title.trim().is_empty() {
            patch.title = Some(page.title.clone());
        }
        if !link.has_text() && !page.text.trim().is_empty() {
            patch.text = Some(page.text.clone());
        }
        patch
    }
}

/// Content returned by a successful scrape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapedPage {
    pub title: String,
    pub text: String,
}

/// Ordered progress stages a scrape passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScrapeStage {
    HealthCheck,
    Fetching,
    Extracting,
    Complete,
}

impl ScrapeStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeStage::HealthCheck => "health_check",
            ScrapeStage::Fetching => "fetching",
            ScrapeStage::Extracting => "extracting",
            ScrapeStage::Complete => "complete",
        }
    }
}

impl fmt::Display for ScrapeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeFailureKind {
    ServiceUnavailable,
    Timeout,
    Network,
    Extraction,
    InvalidUrl,
    InvalidResponse,
    Cancelled,
}

/// Classified scrape failure carried back to the flows as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeFailure {
    pub kind: ScrapeFailureKind,
    pub message: String,
}

impl ScrapeFailure {
    pub fn new(kind: ScrapeFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ScrapeFailureKind::Cancelled
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ScrapeFailureKind::ServiceUnavailable
                | ScrapeFailureKind::Network
                | ScrapeFailureKind::Timeout
        )
    }

    /// Text shown to the user in place of the raw error.
    pub fn user_message(&self) -> String {
        match self.kind {
            ScrapeFailureKind::ServiceUnavailable => {
                "Scraper service unavailable. Please check if the service is running.".to_string()
            }
            ScrapeFailureKind::Timeout => {
                "Scraping timed out. The URL may be slow to load or the service may be busy."
                    .to_string()
            }
            ScrapeFailureKind::Network => {
                "Network error occurred while scraping. Please check your connection and try again."
                    .to_string()
            }
            ScrapeFailureKind::Extraction => {
                format!("Failed to extract content from URL: {}", self.message)
            }
            ScrapeFailureKind::InvalidUrl => format!("Invalid URL: {}", self.message),
            ScrapeFailureKind::InvalidResponse => {
                "Received invalid response from scraper service. Please try again.".to_string()
            }
            ScrapeFailureKind::Cancelled => "Scraping was cancelled.".to_string(),
        }
    }
}

impl fmt::Display for ScrapeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFailureKind {
    Network,
    Status(u16),
    Decode,
}

/// Storage API failure carried back to the flows as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub kind: ApiFailureKind,
    pub message: String,
}

impl ApiFailure {
    pub fn new(kind: ApiFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ApiFailureKind::Status(code) => write!(f, "API error ({code}): {}", self.message),
            ApiFailureKind::Network => write!(f, "network error: {}", self.message),
            ApiFailureKind::Decode => write!(f, "invalid API response: {}", self.message),
        }
    }
}
