mod common;

use std::time::Duration;

use common::{add_flow, init_logging, key, keys, link, run, scrape_job, text_of};
use linkmgmt_core::flows::{AddLinkStep, ReviewField};
use linkmgmt_core::{
    AppConfig, AppState, Effect, Key, Launch, LinkDraft, Msg, ScrapeFailure, ScrapeFailureKind,
    ScrapeStage, ScrapedPage,
};
use pretty_assertions::assert_eq;

fn add_state() -> AppState {
    AppState::new(AppConfig {
        scrape_timeout: Duration::from_secs(5),
        launch: Launch::AddLink,
    })
}

fn typed_url(url: &str) -> AppState {
    let (state, effects) = run(add_state(), keys(url));
    assert!(effects.is_empty());
    state
}

#[test]
fn skip_scraping_then_manual_entry_creates_exactly_entered_fields() {
    init_logging();
    let state = typed_url("https://example.com/post");

    let (state, effects) = run(state, [key(Key::Ctrl('s'))]);
    assert!(effects.is_empty());
    assert_eq!(add_flow(&state).step(), AddLinkStep::Review);
    assert_eq!(add_flow(&state).focus(), ReviewField::Title);

    let mut msgs = keys("My title");
    msgs.push(key(Key::Tab));
    msgs.extend(keys("Short description"));
    msgs.push(key(Key::Enter));
    let (state, effects) = run(state, msgs);

    assert_eq!(
        effects,
        vec![Effect::CreateLink(LinkDraft {
            url: "https://example.com/post".to_string(),
            title: Some("My title".to_string()),
            description: Some("Short description".to_string()),
            text: None,
        })]
    );
    assert_eq!(add_flow(&state).step(), AddLinkStep::Saving);

    let created = link("abc", "https://example.com/post", Some("My title"), None);
    let (state, effects) = run(state, [Msg::LinkCreated(Ok(created))]);
    assert!(effects.is_empty());
    assert_eq!(add_flow(&state).step(), AddLinkStep::Success);
    assert!(text_of(&state.view()).contains("Link created successfully!"));

    // Launched directly, so finishing the flow ends the program.
    let (state, effects) = run(state, [key(Key::Char('x'))]);
    assert!(state.should_quit());
    assert_eq!(effects, vec![Effect::Quit]);
}

#[test]
fn invalid_url_stays_on_input_with_inline_error() {
    let state = typed_url("not a url");
    let (state, effects) = run(state, [key(Key::Enter)]);

    assert!(effects.is_empty());
    let flow = add_flow(&state);
    assert_eq!(flow.step(), AddLinkStep::UrlInput);
    assert!(flow.error().is_some_and(|e| e.starts_with("invalid URL")));
    assert!(text_of(&state.view()).contains("invalid URL"));

    let (state, _) = run(add_state(), [key(Key::Enter)]);
    assert_eq!(add_flow(&state).error(), Some("URL is required"));
}

#[test]
fn successful_scrape_prefills_only_empty_fields() {
    let state = typed_url("https://example.com");
    let (state, effects) = run(state, [key(Key::Enter)]);
    let (job_id, url, timeout) = scrape_job(&effects);
    assert_eq!(job_id, 1);
    assert_eq!(url, "https://example.com");
    assert_eq!(timeout, Duration::from_secs(5));
    assert_eq!(add_flow(&state).step(), AddLinkStep::Scraping);

    let (state, _) = run(
        state,
        [
            Msg::ScrapeProgress {
                job_id,
                stage: ScrapeStage::Fetching,
                message: "Sending scrape request...".to_string(),
            },
            Msg::ScrapeFinished {
                job_id,
                elapsed: Duration::from_millis(1200),
                result: Ok(ScrapedPage {
                    title: "Scraped title".to_string(),
                    text: "Body text".to_string(),
                }),
            },
        ],
    );

    let flow = add_flow(&state);
    assert_eq!(flow.step(), AddLinkStep::Review);
    assert_eq!(flow.field(ReviewField::Title).value(), "Scraped title");
    assert_eq!(flow.field(ReviewField::Body).value(), "Body text");
    assert!(!flow.scrape().is_active());
    assert!(text_of(&state.view()).contains("Title: (scraped)"));
}

#[test]
fn timeout_failure_warns_and_allows_manual_entry() {
    let state = typed_url("https://slow.example.com");
    let (state, effects) = run(state, [key(Key::Enter)]);
    let (job_id, _, _) = scrape_job(&effects);

    let (state, effects) = run(
        state,
        [Msg::ScrapeFinished {
            job_id,
            elapsed: Duration::from_secs(5),
            result: Err(ScrapeFailure::new(ScrapeFailureKind::Timeout, "deadline elapsed")),
        }],
    );

    assert!(effects.is_empty());
    let flow = add_flow(&state);
    assert_eq!(flow.step(), AddLinkStep::Review);
    assert_eq!(
        flow.scrape_warning(),
        Some("Scraping timed out. The URL may be slow to load or the service may be busy.")
    );
    assert!(text_of(&state.view()).contains("you can still fill fields manually"));
}

#[test]
fn esc_while_scraping_cancels_and_returns_to_input() {
    let state = typed_url("https://example.com");
    let (state, effects) = run(state, [key(Key::Enter)]);
    let (job_id, _, _) = scrape_job(&effects);

    let (state, effects) = run(state, [key(Key::Esc)]);
    assert_eq!(effects, vec![Effect::CancelScrape { job_id }]);
    let flow = add_flow(&state);
    assert_eq!(flow.step(), AddLinkStep::UrlInput);
    assert_eq!(flow.error(), None);
    assert_eq!(flow.scrape_warning(), None);

    // A late result from the cancelled job changes nothing.
    let before = state.clone();
    let (state, effects) = run(
        state,
        [Msg::ScrapeFinished {
            job_id,
            elapsed: Duration::from_secs(1),
            result: Ok(ScrapedPage::default()),
        }],
    );
    assert!(effects.is_empty());
    assert_eq!(add_flow(&state), add_flow(&before));
}

#[test]
fn create_failure_returns_to_review_with_error() {
    let state = typed_url("https://example.com");
    let (state, _) = run(state, [key(Key::Ctrl('s')), key(Key::Enter)]);
    assert_eq!(add_flow(&state).step(), AddLinkStep::Saving);

    let failure = linkmgmt_core::ApiFailure::new(linkmgmt_core::ApiFailureKind::Status(500), "boom");
    let (state, effects) = run(state, [Msg::LinkCreated(Err(failure))]);

    assert!(effects.is_empty());
    let flow = add_flow(&state);
    assert_eq!(flow.step(), AddLinkStep::Review);
    assert_eq!(flow.error(), Some("Failed to create link: API error (500): boom"));
}

#[test]
fn body_field_takes_newlines_and_tab_cycles_back_to_url() {
    let state = typed_url("https://example.com");
    let mut msgs = vec![key(Key::Ctrl('s')), key(Key::Tab), key(Key::Tab)];
    msgs.extend(keys("line one"));
    msgs.push(key(Key::Ctrl('j')));
    msgs.extend(keys("line two"));
    msgs.push(key(Key::Tab));
    let (state, effects) = run(state, msgs);

    assert!(effects.is_empty());
    let flow = add_flow(&state);
    assert_eq!(flow.field(ReviewField::Body).value(), "line one\nline two");
    assert_eq!(flow.focus(), ReviewField::Url);

    let (state, _) = run(state, [key(Key::BackTab)]);
    assert_eq!(add_flow(&state).focus(), ReviewField::Body);
}
