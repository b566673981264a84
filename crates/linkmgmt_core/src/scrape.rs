use std::time::Duration;

use ratatui::text::{Line, Span};

use crate::screen::FlowContext;
use crate::widgets::{self, spinner_frame};
use crate::{styles, Effect, JobId, ScrapeFailure, ScrapeStage, ScrapedPage};

/// Issues job ids. Ids only ever grow, so an id identifies a job for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobIdAllocator {
    last: JobId,
}

impl JobIdAllocator {
    pub fn next_id(&mut self) -> JobId {
        self.last += 1;
        self.last
    }

    pub fn last_issued(&self) -> JobId {
        self.last
    }
}

/// Progress of the job a flow is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeView {
    pub job_id: JobId,
    pub url: String,
    pub stage: Option<ScrapeStage>,
    pub message: String,
}

/// Owns the one scrape job a flow may have in flight.
///
/// Events for any other job id are dropped, which covers late events from a
/// cancelled job as well as events that raced a newer job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeTracker {
    active: Option<ScrapeView>,
    spinner: usize,
}

const STAGES: [(ScrapeStage, &str); 4] = [
    (ScrapeStage::HealthCheck, "Check service"),
    (ScrapeStage::Fetching, "Send request"),
    (ScrapeStage::Extracting, "Extract content"),
    (ScrapeStage::Complete, "Complete"),
];

impl ScrapeTracker {
    /// Allocates a job and returns the effect that starts it, or `None` if a
    /// job is already pending.
    pub fn start(&mut self, url: &str, ctx: &mut FlowContext<'_>) -> Option<Effect> {
        if let Some(active) = &self.active {
            linkmgmt_logging::lm_warn!(
                "Refusing to start a scrape while job {} is pending",
                active.job_id
            );
            return None;
        }
        let job_id = ctx.job_ids.next_id();
        self.active = Some(ScrapeView {
            job_id,
            url: url.to_string(),
            stage: None,
            message: "Starting scrape...".to_string(),
        });
        self.spinner = 0;
        Some(start_effect(job_id, url, ctx.scrape_timeout))
    }

    /// Forgets the pending job and returns the effect that cancels it.
    pub fn cancel(&mut self) -> Option<Effect> {
        self.active
            .take()
            .map(|active| Effect::CancelScrape {
                job_id: active.job_id,
            })
    }

    /// Records a progress event. Returns false when the event is stale.
    pub fn on_progress(&mut self, job_id: JobId, stage: ScrapeStage, message: &str) -> bool {
        match &mut self.active {
            Some(active) if active.job_id == job_id => {
                active.stage = Some(stage);
                active.message = message.to_string();
                true
            }
            _ => {
                linkmgmt_logging::lm_debug!("Ignoring progress for stale job {job_id}");
                false
            }
        }
    }

    /// Accepts the terminal result of the pending job and clears it.
    /// Returns `None` when the result belongs to another job.
    pub fn on_finished(
        &mut self,
        job_id: JobId,
        result: Result<ScrapedPage, ScrapeFailure>,
    ) -> Option<Result<ScrapedPage, ScrapeFailure>> {
        if self.active.as_ref().map(|active| active.job_id) != Some(job_id) {
            linkmgmt_logging::lm_debug!("Ignoring result for stale job {job_id}");
            return None;
        }
        self.active = None;
        Some(result)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&ScrapeView> {
        self.active.as_ref()
    }

    pub fn tick(&mut self) -> bool {
        if self.active.is_some() {
            self.spinner = self.spinner.wrapping_add(1);
            true
        } else {
            false
        }
    }

    pub(crate) fn render(&self, title: &str) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        widgets::heading(&mut lines, title);
        let Some(active) = &self.active else {
            lines.push(widgets::info("Waiting..."));
            return lines;
        };
        lines.push(widgets::labelled(
            "URL",
            widgets::truncate(&active.url, 70),
            styles::URL,
        ));
        lines.push(Line::default());

        for (stage, label) in STAGES {
            let (mark, style) = match active.stage {
                Some(current) if stage < current => ("✓".to_string(), styles::SUCCESS),
                Some(current) if stage == current => {
                    (spinner_frame(self.spinner).to_string(), styles::SELECTED)
                }
                None if stage == ScrapeStage::HealthCheck => {
                    (spinner_frame(self.spinner).to_string(), styles::SELECTED)
                }
                _ => ("·".to_string(), styles::MUTED),
            };
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(mark, style),
                Span::raw(" "),
                Span::styled(label, style),
            ]));
        }
        lines.push(Line::default());
        lines.push(widgets::info(&active.message));
        lines
    }
}

fn start_effect(job_id: JobId, url: &str, timeout: Duration) -> Effect {
    Effect::StartScrape {
        job_id,
        url: url.to_string(),
        timeout,
    }
}
