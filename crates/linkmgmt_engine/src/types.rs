use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type JobId = u64;

/// Progress stages reported by a scrape, in the order they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    HealthCheck,
    Fetching,
    Extracting,
    Complete,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::HealthCheck => "health_check",
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Body returned by the extraction service's `/scrape` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeResponse {
    pub success: bool,
    pub url: String,
    pub title: String,
    pub text: String,
    pub extracted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeErrorKind {
    ServiceUnavailable,
    Timeout,
    Network,
    Extraction,
    InvalidUrl,
    InvalidResponse,
    Cancelled,
}

impl fmt::Display for ScrapeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScrapeErrorKind::ServiceUnavailable => "service unavailable",
            ScrapeErrorKind::Timeout => "timeout",
            ScrapeErrorKind::Network => "network error",
            ScrapeErrorKind::Extraction => "extraction failed",
            ScrapeErrorKind::InvalidUrl => "invalid url",
            ScrapeErrorKind::InvalidResponse => "invalid response",
            ScrapeErrorKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ScrapeError {
    pub kind: ScrapeErrorKind,
    pub message: String,
}

impl ScrapeError {
    pub fn new(kind: ScrapeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// What a running scrape job reports. A job sends zero or more `Progress`
/// events followed by at most one `Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Progress {
        job_id: JobId,
        stage: Stage,
        message: String,
    },
    Finished {
        job_id: JobId,
        elapsed: Duration,
        result: Result<ScrapeResponse, ScrapeError>,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::Progress { job_id, .. } | JobEvent::Finished { job_id, .. } => *job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Finished { .. })
    }
}
