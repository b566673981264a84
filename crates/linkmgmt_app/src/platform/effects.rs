use std::collections::HashMap;
use std::sync::Arc;

use linkmgmt_core::{
    ApiFailure, ApiFailureKind, Effect, JobId, Link, LinkDraft, LinkPatch, Msg, ScrapeFailure,
    ScrapeFailureKind, ScrapeStage, ScrapedPage,
};
use linkmgmt_engine::{
    ApiError, JobControl, JobEvent, LinkApi, LinkChanges, LinkRecord, NewLink, ProgressBridge,
    ScrapeError, ScrapeErrorKind, ScrapeOrchestrator, ScrapeResponse, Stage,
};
use linkmgmt_logging::{lm_debug, lm_info, lm_warn};
use tokio::sync::mpsc::UnboundedSender;

/// Executes effects off the event loop. Every effect that has a result posts
/// exactly one `Msg` back through `msg_tx`.
pub struct EffectRunner {
    api: Arc<dyn LinkApi>,
    orchestrator: ScrapeOrchestrator,
    msg_tx: UnboundedSender<Msg>,
    jobs: HashMap<JobId, JobControl>,
}

impl EffectRunner {
    pub fn new(
        api: Arc<dyn LinkApi>,
        orchestrator: ScrapeOrchestrator,
        msg_tx: UnboundedSender<Msg>,
    ) -> Self {
        Self {
            api,
            orchestrator,
            msg_tx,
            jobs: HashMap::new(),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run(effect);
        }
    }

    /// Drops bookkeeping for a job whose terminal event has been applied.
    pub fn forget_job(&mut self, job_id: JobId) {
        self.jobs.remove(&job_id);
    }

    pub fn active_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Cancels every job still running. Used on shutdown.
    pub fn cancel_all(&mut self) {
        for (job_id, control) in self.jobs.drain() {
            lm_debug!("Cancelling job {job_id} on shutdown");
            control.cancel();
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::LoadLinks => {
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let result = api
                        .list_links()
                        .await
                        .map(|records| records.into_iter().map(map_record).collect())
                        .map_err(map_api_error);
                    Msg::LinksLoaded(result)
                });
            }
            Effect::CreateLink(draft) => {
                lm_info!("CreateLink url={}", draft.url);
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let result = api
                        .create_link(&new_link(draft))
                        .await
                        .map(map_record)
                        .map_err(map_api_error);
                    Msg::LinkCreated(result)
                });
            }
            Effect::UpdateLink { id, patch } => {
                lm_info!("UpdateLink id={id}");
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let result = api
                        .update_link(&id, &link_changes(patch))
                        .await
                        .map(map_record)
                        .map_err(map_api_error);
                    Msg::LinkUpdated(result)
                });
            }
            Effect::DeleteLink { id } => {
                lm_info!("DeleteLink id={id}");
                let api = Arc::clone(&self.api);
                self.spawn(async move {
                    let result = api.delete_link(&id).await.map(|()| id).map_err(map_api_error);
                    Msg::LinkDeleted(result)
                });
            }
            Effect::StartScrape {
                job_id,
                url,
                timeout,
            } => {
                let job = self.orchestrator.start(job_id, url, timeout);
                if let Some(previous) = self.jobs.insert(job_id, job.control) {
                    lm_warn!("Job id {job_id} reused; cancelling the older job");
                    previous.cancel();
                }
                spawn_forwarder(job.bridge, self.msg_tx.clone());
            }
            Effect::CancelScrape { job_id } => match self.jobs.remove(&job_id) {
                Some(control) => {
                    lm_info!("Cancelling scrape job {job_id}");
                    control.cancel();
                }
                None => lm_debug!("CancelScrape for unknown job {job_id}"),
            },
            Effect::Quit => {
                // The event loop observes `should_quit` itself.
            }
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = Msg> + Send + 'static,
    {
        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let msg = task.await;
            if msg_tx.send(msg).is_err() {
                lm_debug!("Event loop gone; dropping effect result");
            }
        });
    }
}

/// Pumps one job's bridge into the message channel until the bridge stops.
fn spawn_forwarder(mut bridge: ProgressBridge, msg_tx: UnboundedSender<Msg>) {
    tokio::spawn(async move {
        while let Some(event) = bridge.next().await {
            if msg_tx.send(map_job_event(event)).is_err() {
                break;
            }
        }
        lm_debug!("Forwarder for job {} finished", bridge.job_id());
    });
}

pub fn map_job_event(event: JobEvent) -> Msg {
    match event {
        JobEvent::Progress {
            job_id,
            stage,
            message,
        } => Msg::ScrapeProgress {
            job_id,
            stage: map_stage(stage),
            message,
        },
        JobEvent::Finished {
            job_id,
            elapsed,
            result,
        } => Msg::ScrapeFinished {
            job_id,
            elapsed,
            result: result.map(map_page).map_err(map_scrape_error),
        },
    }
}

fn map_stage(stage: Stage) -> ScrapeStage {
    match stage {
        Stage::HealthCheck => ScrapeStage::HealthCheck,
        Stage::Fetching => ScrapeStage::Fetching,
        Stage::Extracting => ScrapeStage::Extracting,
        Stage::Complete => ScrapeStage::Complete,
    }
}

fn map_page(response: ScrapeResponse) -> ScrapedPage {
    ScrapedPage {
        title: response.title,
        text: response.text,
    }
}

pub fn map_scrape_error(err: ScrapeError) -> ScrapeFailure {
    let kind = match err.kind {
        ScrapeErrorKind::ServiceUnavailable => ScrapeFailureKind::ServiceUnavailable,
        ScrapeErrorKind::Timeout => ScrapeFailureKind::Timeout,
        ScrapeErrorKind::Network => ScrapeFailureKind::Network,
        ScrapeErrorKind::Extraction => ScrapeFailureKind::Extraction,
        ScrapeErrorKind::InvalidUrl => ScrapeFailureKind::InvalidUrl,
        ScrapeErrorKind::InvalidResponse => ScrapeFailureKind::InvalidResponse,
        ScrapeErrorKind::Cancelled => ScrapeFailureKind::Cancelled,
    };
    ScrapeFailure::new(kind, err.message)
}

pub fn map_api_error(err: ApiError) -> ApiFailure {
    match err {
        ApiError::Network(message) => ApiFailure::new(ApiFailureKind::Network, message),
        ApiError::Status { status, message } => {
            ApiFailure::new(ApiFailureKind::Status(status), message)
        }
        ApiError::Decode(message) => ApiFailure::new(ApiFailureKind::Decode, message),
    }
}

pub fn map_record(record: LinkRecord) -> Link {
    Link {
        id: record.id,
        url: record.url,
        title: record.title,
        description: record.description,
        text: record.text,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn new_link(draft: LinkDraft) -> NewLink {
    NewLink {
        url: draft.url,
        title: draft.title,
        description: draft.description,
        text: draft.text,
    }
}

fn link_changes(patch: LinkPatch) -> LinkChanges {
    LinkChanges {
        url: patch.url,
        title: patch.title,
        description: patch.description,
        text: patch.text,
    }
}
