use std::time::Duration;

use crate::{ApiFailure, JobId, Key, Link, LinkId, ScrapeFailure, ScrapeStage, ScrapedPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Keyboard input.
    Key(Key),
    /// Terminal geometry changed.
    Resize { width: u16, height: u16 },
    /// Result of `Effect::LoadLinks`.
    LinksLoaded(Result<Vec<Link>, ApiFailure>),
    /// Result of `Effect::CreateLink`.
    LinkCreated(Result<Link, ApiFailure>),
    /// Result of `Effect::UpdateLink`.
    LinkUpdated(Result<Link, ApiFailure>),
    /// Result of `Effect::DeleteLink`; carries the id that was deleted.
    LinkDeleted(Result<LinkId, ApiFailure>),
    /// Intermediate progress of a scrape job.
    ScrapeProgress {
        job_id: JobId,
        stage: ScrapeStage,
        message: String,
    },
    /// Terminal result of a scrape job. Sent at most once per job.
    ScrapeFinished {
        job_id: JobId,
        elapsed: Duration,
        result: Result<ScrapedPage, ScrapeFailure>,
    },
    /// Render tick used for spinners.
    Tick,
    NoOp,
}
