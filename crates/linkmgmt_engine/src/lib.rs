//! Link management engine: HTTP clients and background scrape jobs.
mod api;
mod job;
mod scraper;
mod types;

pub use api::{
    ApiError, ApiSettings, LinkApi, LinkChanges, LinkRecord, NewLink, ReqwestLinkApi, UserRecord,
};
pub use job::{ChannelProgressSink, JobControl, ProgressBridge, ScrapeJob, ScrapeOrchestrator, Watch};
pub use scraper::{ProgressSink, ReqwestScraper, Scraper, ScraperSettings};
pub use types::{JobEvent, JobId, ScrapeError, ScrapeErrorKind, ScrapeResponse, Stage};
