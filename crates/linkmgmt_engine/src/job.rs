//! Background scrape jobs and the bridge that carries their events to the UI.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{JobEvent, JobId, ProgressSink, ScrapeError, ScrapeErrorKind, Scraper, Stage};

/// Events buffered per job. A full buffer makes the scraper wait for the reader.
pub const PROGRESS_CAPACITY: usize = 16;

/// Forwards progress into a job's channel, waiting for room when the reader
/// lags behind.
pub struct ChannelProgressSink {
    job_id: JobId,
    tx: mpsc::Sender<JobEvent>,
    token: CancellationToken,
}

impl ChannelProgressSink {
    pub fn new(job_id: JobId, tx: mpsc::Sender<JobEvent>, token: CancellationToken) -> Self {
        Self { job_id, tx, token }
    }
}

#[async_trait::async_trait]
impl ProgressSink for ChannelProgressSink {
    async fn emit(&self, stage: Stage, message: &str) {
        if self.token.is_cancelled() {
            return;
        }
        let event = JobEvent::Progress {
            job_id: self.job_id,
            stage,
            message: message.to_string(),
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {}
            sent = self.tx.send(event) => {
                if sent.is_err() {
                    linkmgmt_logging::lm_debug!(
                        "Nobody is watching job {}, {stage} not delivered",
                        self.job_id
                    );
                }
            }
        }
    }
}

/// Handle used to cancel a running job.
#[derive(Debug, Clone)]
pub struct JobControl {
    job_id: JobId,
    token: CancellationToken,
    deadline: Instant,
}

impl JobControl {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Requests cancellation. The job stops at its next await point and
    /// reports nothing further.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Result of one non-blocking look at a job's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Watch {
    Event(JobEvent),
    /// Nothing buffered yet; look again later.
    Idle,
    /// The job is over; it will never produce another event.
    Closed,
}

/// Receiving end of a job's event channel.
///
/// Yields events in production order and stops for good after the terminal
/// event, once the channel closes, or once the job is cancelled.
#[derive(Debug)]
pub struct ProgressBridge {
    job_id: JobId,
    rx: Option<mpsc::Receiver<JobEvent>>,
    token: CancellationToken,
}

impl ProgressBridge {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn is_stopped(&self) -> bool {
        self.rx.is_none()
    }

    /// Waits for the next event. Returns `None` once the bridge has stopped.
    pub async fn next(&mut self) -> Option<JobEvent> {
        let rx = self.rx.as_mut()?;
        let event = tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            event = rx.recv() => event,
        };
        self.observe(event)
    }

    /// Single non-blocking read attempt.
    pub fn try_next(&mut self) -> Watch {
        let Some(rx) = self.rx.as_mut() else {
            return Watch::Closed;
        };
        if self.token.is_cancelled() {
            self.stop();
            return Watch::Closed;
        }
        match rx.try_recv() {
            Ok(event) => match self.observe(Some(event)) {
                Some(event) => Watch::Event(event),
                None => Watch::Closed,
            },
            Err(TryRecvError::Empty) => Watch::Idle,
            Err(TryRecvError::Disconnected) => {
                self.stop();
                Watch::Closed
            }
        }
    }

    fn observe(&mut self, event: Option<JobEvent>) -> Option<JobEvent> {
        match event {
            Some(event) if event.is_terminal() => {
                self.stop();
                Some(event)
            }
            Some(event) => Some(event),
            None => {
                self.stop();
                None
            }
        }
    }

    fn stop(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            linkmgmt_logging::lm_debug!("Stopped watching job {}", self.job_id);
        }
    }
}

/// A started job: the control half stays with the effect runner, the bridge
/// goes to whoever forwards events to the UI.
#[derive(Debug)]
pub struct ScrapeJob {
    pub control: JobControl,
    pub bridge: ProgressBridge,
}

/// Starts scrape jobs on the current tokio runtime.
#[derive(Clone)]
pub struct ScrapeOrchestrator {
    scraper: Arc<dyn Scraper>,
}

impl ScrapeOrchestrator {
    pub fn new(scraper: Arc<dyn Scraper>) -> Self {
        Self { scraper }
    }

    /// Spawns one job performing a single scrape of `url`.
    ///
    /// The deadline is fixed here, before the task first runs. Must be called
    /// from within a tokio runtime.
    pub fn start(&self, job_id: JobId, url: impl Into<String>, timeout: Duration) -> ScrapeJob {
        let url = url.into();
        let started = Instant::now();
        let deadline = started + timeout;
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel(PROGRESS_CAPACITY);
        let scraper = Arc::clone(&self.scraper);
        let task_token = token.clone();

        linkmgmt_logging::lm_info!("Starting scrape job {job_id} for {url} (timeout {timeout:?})");
        tokio::spawn(async move {
            let sink = ChannelProgressSink::new(job_id, tx.clone(), task_token.clone());
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            let result = tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    linkmgmt_logging::lm_info!("Scrape job {job_id} cancelled");
                    return;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    linkmgmt_logging::lm_warn!("Scrape job {job_id} hit its deadline");
                    Err(ScrapeError::new(
                        ScrapeErrorKind::Timeout,
                        format!("no result within {:.1}s", timeout.as_secs_f64()),
                    ))
                }
                result = scraper.scrape(&url, timeout_ms, &sink) => result,
            };
            if task_token.is_cancelled() {
                return;
            }
            let elapsed = started.elapsed();
            match &result {
                Ok(_) => linkmgmt_logging::lm_info!("Scrape job {job_id} finished in {elapsed:?}"),
                Err(err) => linkmgmt_logging::lm_warn!("Scrape job {job_id} failed: {err}"),
            }
            let _ = tx
                .send(JobEvent::Finished {
                    job_id,
                    elapsed,
                    result,
                })
                .await;
        });

        ScrapeJob {
            control: JobControl {
                job_id,
                token: token.clone(),
                deadline,
            },
            bridge: ProgressBridge {
                job_id,
                rx: Some(rx),
                token,
            },
        }
    }
}
