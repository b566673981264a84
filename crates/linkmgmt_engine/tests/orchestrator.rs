use std::sync::Arc;
use std::time::Duration;

use linkmgmt_engine::{
    JobEvent, ProgressSink, ScrapeError, ScrapeErrorKind, ScrapeOrchestrator, ScrapeResponse,
    Scraper, Stage, Watch,
};
use pretty_assertions::assert_eq;

/// Emits a fixed number of progress events, then sleeps before answering.
struct FakeScraper {
    progress: usize,
    delay: Duration,
    outcome: Result<ScrapeResponse, ScrapeError>,
}

impl FakeScraper {
    fn ok(progress: usize, delay: Duration) -> Self {
        Self {
            progress,
            delay,
            outcome: Ok(ScrapeResponse {
                success: true,
                url: "https://example.com".to_string(),
                title: "Example".to_string(),
                text: "Body".to_string(),
                ..ScrapeResponse::default()
            }),
        }
    }
}

#[async_trait::async_trait]
impl Scraper for FakeScraper {
    async fn scrape(
        &self,
        _url: &str,
        _timeout_ms: u64,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeResponse, ScrapeError> {
        let stages = [Stage::HealthCheck, Stage::Fetching, Stage::Extracting];
        for index in 0..self.progress {
            sink.emit(stages[index % stages.len()], &format!("step {index}"))
                .await;
        }
        tokio::time::sleep(self.delay).await;
        self.outcome.clone()
    }
}

fn orchestrator(scraper: FakeScraper) -> ScrapeOrchestrator {
    ScrapeOrchestrator::new(Arc::new(scraper))
}

fn progress_messages(events: &[JobEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Progress { message, .. } => Some(message.clone()),
            JobEvent::Finished { .. } => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn progress_arrives_in_order_then_finished_then_nothing() {
    let mut job = orchestrator(FakeScraper::ok(3, Duration::from_millis(50))).start(
        7,
        "https://example.com",
        Duration::from_secs(5),
    );

    let mut events = Vec::new();
    while let Some(event) = job.bridge.next().await {
        assert_eq!(event.job_id(), 7);
        events.push(event);
    }

    assert_eq!(events.len(), 4);
    assert_eq!(progress_messages(&events), vec!["step 0", "step 1", "step 2"]);
    match events.last() {
        Some(JobEvent::Finished { result, .. }) => {
            assert_eq!(result.as_ref().map(|page| page.title.as_str()), Ok("Example"));
        }
        other => panic!("expected Finished last, got {other:?}"),
    }
    assert!(job.bridge.is_stopped());
    assert_eq!(job.bridge.next().await, None);
    assert_eq!(job.bridge.try_next(), Watch::Closed);
}

#[tokio::test(start_paused = true)]
async fn deadline_produces_timeout_before_slow_scraper_returns() {
    let mut job = orchestrator(FakeScraper::ok(0, Duration::from_secs(3))).start(
        1,
        "https://example.com",
        Duration::from_secs(1),
    );

    let event = job.bridge.next().await;
    match event {
        Some(JobEvent::Finished {
            elapsed, result, ..
        }) => {
            let err = result.unwrap_err();
            assert_eq!(err.kind, ScrapeErrorKind::Timeout);
            assert!(elapsed >= Duration::from_secs(1));
            assert!(elapsed < Duration::from_secs(3));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(job.bridge.next().await, None);
}

#[tokio::test(start_paused = true)]
async fn scraper_errors_are_passed_through() {
    let scraper = FakeScraper {
        progress: 1,
        delay: Duration::from_millis(10),
        outcome: Err(ScrapeError::new(ScrapeErrorKind::Extraction, "blocked")),
    };
    let mut job = orchestrator(scraper).start(2, "https://example.com", Duration::from_secs(5));

    let mut last = None;
    while let Some(event) = job.bridge.next().await {
        last = Some(event);
    }
    match last {
        Some(JobEvent::Finished { result, .. }) => {
            assert_eq!(
                result,
                Err(ScrapeError::new(ScrapeErrorKind::Extraction, "blocked"))
            );
        }
        other => panic!("expected Finished, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn cancel_closes_the_bridge_without_a_result() {
    let mut job = orchestrator(FakeScraper::ok(0, Duration::from_secs(3))).start(
        3,
        "https://example.com",
        Duration::from_secs(10),
    );

    job.control.cancel();
    assert!(job.control.is_cancelled());
    assert_eq!(job.bridge.next().await, None);
    assert_eq!(job.bridge.try_next(), Watch::Closed);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(job.bridge.next().await, None);
}

#[tokio::test(start_paused = true)]
async fn try_next_is_idle_before_the_job_runs() {
    let mut job = orchestrator(FakeScraper::ok(1, Duration::from_millis(100))).start(
        4,
        "https://example.com",
        Duration::from_secs(5),
    );

    assert_eq!(job.bridge.try_next(), Watch::Idle);

    let mut seen = Vec::new();
    loop {
        match job.bridge.try_next() {
            Watch::Event(event) => seen.push(event),
            Watch::Idle => tokio::time::sleep(Duration::from_millis(10)).await,
            Watch::Closed => break,
        }
    }
    assert_eq!(seen.len(), 2);
    assert!(seen[1].is_terminal());
}

#[tokio::test(start_paused = true)]
async fn slow_reader_still_sees_every_progress_event() {
    linkmgmt_logging::initialize_for_tests();
    let mut job = orchestrator(FakeScraper::ok(40, Duration::from_millis(10))).start(
        5,
        "https://example.com",
        Duration::from_secs(5),
    );

    // Let the scraper fill the buffer before anyone reads.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut events = Vec::new();
    while let Some(event) = job.bridge.next().await {
        events.push(event);
    }

    let expected: Vec<String> = (0..40).map(|index| format!("step {index}")).collect();
    assert_eq!(progress_messages(&events), expected);
    assert_eq!(events.len(), 41);
    match events.last() {
        Some(JobEvent::Finished { result, .. }) => assert!(result.is_ok()),
        other => panic!("expected Finished last, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn complete_stage_survives_a_full_buffer() {
    struct ChattyScraper;

    #[async_trait::async_trait]
    impl Scraper for ChattyScraper {
        async fn scrape(
            &self,
            url: &str,
            _timeout_ms: u64,
            sink: &dyn ProgressSink,
        ) -> Result<ScrapeResponse, ScrapeError> {
            for index in 0..19 {
                sink.emit(Stage::Extracting, &format!("chunk {index}")).await;
            }
            sink.emit(Stage::Complete, "final").await;
            Ok(ScrapeResponse {
                success: true,
                url: url.to_string(),
                ..ScrapeResponse::default()
            })
        }
    }

    let mut job = ScrapeOrchestrator::new(Arc::new(ChattyScraper)).start(
        8,
        "https://example.com",
        Duration::from_secs(5),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut progress = Vec::new();
    let mut finished = false;
    while let Some(event) = job.bridge.next().await {
        match event {
            JobEvent::Progress { stage, message, .. } => progress.push((stage, message)),
            JobEvent::Finished { result, .. } => {
                assert!(result.is_ok());
                finished = true;
            }
        }
    }

    assert!(finished);
    assert_eq!(progress.len(), 20);
    assert_eq!(progress.last(), Some(&(Stage::Complete, "final".to_string())));
}

#[tokio::test(start_paused = true)]
async fn cancel_releases_a_scraper_blocked_on_a_full_buffer() {
    let job = orchestrator(FakeScraper::ok(40, Duration::from_secs(60))).start(
        9,
        "https://example.com",
        Duration::from_secs(120),
    );
    tokio::time::sleep(Duration::from_millis(10)).await;
    job.control.cancel();

    let mut bridge = job.bridge;
    assert_eq!(bridge.next().await, None);
    assert!(bridge.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn deadline_is_fixed_at_start() {
    let before = tokio::time::Instant::now();
    let job = orchestrator(FakeScraper::ok(0, Duration::ZERO)).start(
        6,
        "https://example.com",
        Duration::from_secs(30),
    );
    assert_eq!(job.control.job_id(), 6);
    assert_eq!(job.control.deadline(), before + Duration::from_secs(30));
}
