mod common;

use std::time::Duration;

use common::{init_logging, key, keys, link, manage_flow, run, scrape_job, text_of};
use linkmgmt_core::flows::{ManageStep, NoticeKind};
use linkmgmt_core::{
    ApiFailure, ApiFailureKind, AppConfig, AppState, Effect, Key, Launch, Link, LinkPatch, Msg,
    ScrapeFailure, ScrapeFailureKind, ScrapeStage, ScrapedPage,
};
use pretty_assertions::assert_eq;

fn three_links() -> Vec<Link> {
    vec![
        link("id-0", "https://a.example.com", Some("Alpha"), None),
        link("id-1", "https://b.example.com", Some("Beta"), Some("b body")),
        link("id-2", "https://c.example.com", None, Some("existing body")),
    ]
}

fn loaded_state(links: Vec<Link>) -> AppState {
    let mut state = AppState::new(AppConfig {
        scrape_timeout: Duration::from_secs(1),
        launch: Launch::ManageLinks,
    });
    assert_eq!(state.init(), vec![Effect::LoadLinks]);
    let (state, effects) = run(state, [Msg::LinksLoaded(Ok(links))]);
    assert!(effects.is_empty());
    state
}

fn progress(job_id: u64, stage: ScrapeStage, message: &str) -> Msg {
    Msg::ScrapeProgress {
        job_id,
        stage,
        message: message.to_string(),
    }
}

#[test]
fn scrape_enriches_missing_title_of_selected_link() {
    init_logging();
    let state = loaded_state(three_links());
    let (state, effects) = run(
        state,
        [
            key(Key::Down),
            key(Key::Char('j')),
            key(Key::Enter),
            key(Key::Char('s')),
        ],
    );
    assert_eq!(manage_flow(&state).selected_index(), 2);
    assert_eq!(manage_flow(&state).step(), ManageStep::Scraping);
    let (job_id, url, timeout) = scrape_job(&effects);
    assert_eq!(url, "https://c.example.com");
    assert_eq!(timeout, Duration::from_secs(1));

    let (state, effects) = run(
        state,
        [
            progress(job_id, ScrapeStage::HealthCheck, "Checking scraper service..."),
            progress(job_id, ScrapeStage::Fetching, "Sending scrape request..."),
            progress(job_id, ScrapeStage::Extracting, "Extracting content from URL..."),
        ],
    );
    assert!(effects.is_empty());
    let current = manage_flow(&state).scrape().current().cloned().unwrap();
    assert_eq!(current.stage, Some(ScrapeStage::Extracting));
    assert_eq!(current.message, "Extracting content from URL...");
    let frame = text_of(&state.view());
    assert!(frame.contains("Extracting content from URL..."));
    assert!(!frame.contains("Sending scrape request..."));

    let (state, effects) = run(
        state,
        [
            progress(job_id, ScrapeStage::Complete, "Scraping completed successfully"),
            Msg::ScrapeFinished {
                job_id,
                elapsed: Duration::from_millis(300),
                result: Ok(ScrapedPage {
                    title: "T".to_string(),
                    text: "B".to_string(),
                }),
            },
        ],
    );
    assert_eq!(
        effects,
        vec![Effect::UpdateLink {
            id: "id-2".to_string(),
            patch: LinkPatch {
                title: Some("T".to_string()),
                ..LinkPatch::default()
            },
        }]
    );
    assert_eq!(manage_flow(&state).step(), ManageStep::ScrapeSaving);
    assert!(!manage_flow(&state).scrape().is_active());

    let updated = link("id-2", "https://c.example.com", Some("T"), Some("existing body"));
    let (state, effects) = run(state, [Msg::LinkUpdated(Ok(updated))]);
    assert_eq!(effects, vec![Effect::LoadLinks]);
    let flow = manage_flow(&state);
    assert_eq!(flow.step(), ManageStep::ScrapeDone);
    assert_eq!(flow.notice().map(|n| n.kind), Some(NoticeKind::Success));
    let frame = text_of(&state.view());
    assert!(frame.contains("Link enriched successfully"));
    assert!(frame.contains("Title: T"));
}

#[test]
fn scrape_timeout_warns_without_updating() {
    let state = loaded_state(three_links());
    let (state, effects) = run(state, [key(Key::Enter), key(Key::Char('3'))]);
    let (job_id, _, _) = scrape_job(&effects);

    let (state, effects) = run(
        state,
        [Msg::ScrapeFinished {
            job_id,
            elapsed: Duration::from_secs(1),
            result: Err(ScrapeFailure::new(ScrapeFailureKind::Timeout, "deadline elapsed")),
        }],
    );

    assert!(effects.is_empty());
    let flow = manage_flow(&state);
    assert_eq!(flow.step(), ManageStep::ScrapeDone);
    assert_eq!(flow.notice().map(|n| n.kind), Some(NoticeKind::Warning));
    assert!(text_of(&state.view()).contains("Scraping timed out"));

    let (state, _) = run(state, [key(Key::Char('x'))]);
    assert_eq!(manage_flow(&state).step(), ManageStep::ActionMenu);
}

#[test]
fn scrape_with_nothing_missing_applies_no_changes() {
    let state = loaded_state(three_links());
    let (state, effects) = run(state, [key(Key::Char('j')), key(Key::Enter), key(Key::Char('s'))]);
    let (job_id, _, _) = scrape_job(&effects);

    let (state, effects) = run(
        state,
        [Msg::ScrapeFinished {
            job_id,
            elapsed: Duration::from_millis(10),
            result: Ok(ScrapedPage {
                title: "Other".to_string(),
                text: "Other body".to_string(),
            }),
        }],
    );

    assert!(effects.is_empty());
    assert_eq!(manage_flow(&state).step(), ManageStep::ScrapeDone);
    assert!(text_of(&state.view()).contains("Done. (No changes applied.)"));
}

#[test]
fn delete_requires_confirmation() {
    let state = loaded_state(three_links());
    let (state, effects) = run(state, [key(Key::Enter), key(Key::Char('d')), key(Key::Enter)]);
    assert!(effects.is_empty());
    assert_eq!(manage_flow(&state).step(), ManageStep::ActionMenu);

    let mut msgs = vec![key(Key::Char('2'))];
    msgs.extend(keys("yes"));
    msgs.push(key(Key::Enter));
    let (state, effects) = run(state, msgs);
    assert_eq!(
        effects,
        vec![Effect::DeleteLink {
            id: "id-0".to_string()
        }]
    );
    assert_eq!(manage_flow(&state).step(), ManageStep::Done);

    // Keys are ignored until the delete result arrives.
    let (state, effects) = run(state, [key(Key::Char('x'))]);
    assert!(effects.is_empty());
    assert_eq!(manage_flow(&state).step(), ManageStep::Done);

    let (state, _) = run(state, [Msg::LinkDeleted(Ok("id-0".to_string()))]);
    assert_eq!(manage_flow(&state).links().len(), 2);
    assert!(text_of(&state.view()).contains("Link deleted successfully!"));

    let (state, effects) = run(state, [key(Key::Char('x'))]);
    assert!(state.should_quit());
    assert_eq!(effects, vec![Effect::Quit]);
}

#[test]
fn load_failure_shows_error_and_retries() {
    let mut state = AppState::new(AppConfig {
        launch: Launch::ManageLinks,
        ..AppConfig::default()
    });
    state.init();
    let failure = ApiFailure::new(ApiFailureKind::Network, "connection refused");
    let (state, _) = run(state, [Msg::LinksLoaded(Err(failure))]);
    assert!(text_of(&state.view()).contains("Error: network error: connection refused"));

    let (state, effects) = run(state, [key(Key::Char('r'))]);
    assert_eq!(effects, vec![Effect::LoadLinks]);
    assert!(manage_flow(&state).is_loading());
    assert_eq!(manage_flow(&state).load_error(), None);
}

#[test]
fn reload_keeps_selection_on_same_link() {
    let state = loaded_state(three_links());
    let (state, _) = run(state, [key(Key::Down)]);
    assert_eq!(manage_flow(&state).selected_link().unwrap().id, "id-1");

    let mut reordered = three_links();
    reordered.reverse();
    let (state, _) = run(state, [Msg::LinksLoaded(Ok(reordered))]);
    assert_eq!(manage_flow(&state).selected_index(), 1);
    assert_eq!(manage_flow(&state).selected_link().unwrap().id, "id-1");

    let (state, _) = run(state, [Msg::LinksLoaded(Ok(vec![three_links().remove(0)]))]);
    assert_eq!(manage_flow(&state).selected_index(), 0);
}

#[test]
fn action_on_vanished_link_returns_to_list() {
    let state = loaded_state(three_links());
    let (state, _) = run(state, [key(Key::End), key(Key::Enter)]);
    assert_eq!(manage_flow(&state).step(), ManageStep::ActionMenu);

    let (state, _) = run(state, [Msg::LinksLoaded(Ok(Vec::new()))]);
    let (state, effects) = run(state, [key(Key::Char('v'))]);

    assert!(effects.is_empty());
    assert_eq!(manage_flow(&state).step(), ManageStep::ListLinks);
    assert!(text_of(&state.view()).contains("No links found."));
}

#[test]
fn menu_key_leaves_flow_and_cancels_job() {
    let state = AppState::default();
    let (state, effects) = run(state, [key(Key::Char('2'))]);
    assert_eq!(effects, vec![Effect::LoadLinks]);
    let (state, _) = run(state, [Msg::LinksLoaded(Ok(three_links()))]);
    let (state, effects) = run(state, [key(Key::Enter), key(Key::Char('s'))]);
    let (job_id, _, _) = scrape_job(&effects);

    let (state, effects) = run(state, [key(Key::Char('m'))]);
    assert_eq!(effects, vec![Effect::CancelScrape { job_id }]);
    assert!(state.screen().is_menu());
    assert!(!state.should_quit());
}
