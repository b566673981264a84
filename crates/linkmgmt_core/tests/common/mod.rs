#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use linkmgmt_core::flows::{AddLinkFlow, ManageLinksFlow};
use linkmgmt_core::{update, ActiveScreen, AppState, Effect, Key, Link, Msg};
use ratatui::text::Text;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(linkmgmt_logging::initialize_for_tests);
}

/// Feeds messages in order, collecting every effect produced.
pub fn run(state: AppState, msgs: impl IntoIterator<Item = Msg>) -> (AppState, Vec<Effect>) {
    let mut state = state;
    let mut all = Vec::new();
    for msg in msgs {
        let (next, effects) = update(state, msg);
        state = next;
        all.extend(effects);
    }
    (state, all)
}

pub fn keys(text: &str) -> Vec<Msg> {
    text.chars().map(|c| Msg::Key(Key::Char(c))).collect()
}

pub fn key(key: Key) -> Msg {
    Msg::Key(key)
}

pub fn link(id: &str, url: &str, title: Option<&str>, text: Option<&str>) -> Link {
    Link {
        id: id.to_string(),
        url: url.to_string(),
        title: title.map(str::to_string),
        description: None,
        text: text.map(str::to_string),
        created_at: None,
        updated_at: None,
    }
}

pub fn add_flow(state: &AppState) -> &AddLinkFlow {
    match state.screen() {
        ActiveScreen::AddLink(viewport) => viewport.screen(),
        other => panic!("expected add-link screen, got {other:?}"),
    }
}

pub fn manage_flow(state: &AppState) -> &ManageLinksFlow {
    match state.screen() {
        ActiveScreen::ManageLinks(viewport) => viewport.screen(),
        other => panic!("expected manage-links screen, got {other:?}"),
    }
}

pub fn text_of(text: &Text<'_>) -> String {
    text.lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn scrape_job(effects: &[Effect]) -> (u64, String, Duration) {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartScrape {
                job_id,
                url,
                timeout,
            } => Some((*job_id, url.clone(), *timeout)),
            _ => None,
        })
        .expect("StartScrape effect")
}
