use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::screen::{FlowContext, FlowExit, FlowOutcome, Screen, Selection};
use crate::scrape::ScrapeTracker;
use crate::{
    styles, widgets, ApiFailure, Effect, HelpItem, Key, Link, LinkId, LinkPatch, Msg,
    ScrapeFailure, ScrapedPage, TextField,
};

const ITEM_HEIGHT: u16 = 2;
const LIST_HEADER_HEIGHT: u16 = 2;
const PAGE_ITEMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageStep {
    ListLinks,
    ActionMenu,
    ViewDetails,
    DeleteConfirm,
    Scraping,
    ScrapeSaving,
    ScrapeDone,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

/// Outcome message shown by the result steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn render(&self) -> Line<'static> {
        match self.kind {
            NoticeKind::Success => widgets::success(&self.text),
            NoticeKind::Info => widgets::info(&self.text),
            NoticeKind::Warning => widgets::warning(&self.text),
            NoticeKind::Error => widgets::error(&self.text),
        }
    }
}

const HELP_LIST: &[HelpItem] = &[
    HelpItem::new("↑/k, ↓/j", "Move selection"),
    HelpItem::new("PgUp, PgDn, Home, End", "Jump through the list"),
    HelpItem::new("Enter", "Choose an action for the selected link"),
    HelpItem::new("r", "Reload links"),
    HelpItem::new("q, Esc", "Back"),
];

const HELP_ACTIONS: &[HelpItem] = &[
    HelpItem::new("1, v", "View details"),
    HelpItem::new("2, d", "Delete"),
    HelpItem::new("3, s", "Scrape & enrich"),
    HelpItem::new("Esc, b", "Back to the list"),
];

const HELP_DETAILS: &[HelpItem] = &[
    HelpItem::new("↑, ↓, PgUp, PgDn", "Scroll"),
    HelpItem::new("Esc, b, Enter", "Back to actions"),
];

const HELP_CONFIRM: &[HelpItem] = &[
    HelpItem::new("y + Enter", "Delete the link"),
    HelpItem::new("Enter, Esc", "Keep the link"),
];

const HELP_SCRAPING: &[HelpItem] = &[HelpItem::new("Esc", "Cancel scraping")];

const HELP_RESULT: &[HelpItem] = &[HelpItem::new("any key", "Continue")];

/// Manage-Links flow: list, act on one link, enrich it by scraping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManageLinksFlow {
    step: ManageStep,
    links: Vec<Link>,
    selected: usize,
    loading: bool,
    load_error: Option<String>,
    confirm: TextField,
    scrape: ScrapeTracker,
    notice: Option<Notice>,
    pending_delete: Option<LinkId>,
}

impl Default for ManageLinksFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ManageLinksFlow {
    pub fn new() -> Self {
        Self {
            step: ManageStep::ListLinks,
            links: Vec::new(),
            selected: 0,
            loading: true,
            load_error: None,
            confirm: TextField::new("y/N").with_char_limit(3),
            scrape: ScrapeTracker::default(),
            notice: None,
            pending_delete: None,
        }
    }

    pub fn step(&self) -> ManageStep {
        self.step
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_link(&self) -> Option<&Link> {
        self.links.get(self.selected)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn scrape(&self) -> &ScrapeTracker {
        &self.scrape
    }

    fn reload(&mut self) -> Vec<Effect> {
        self.loading = true;
        self.load_error = None;
        vec![Effect::LoadLinks]
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(self.links.len().saturating_sub(1));
    }

    /// Falls back to the list when the selection no longer points at a link.
    fn guard_selection(&mut self) -> Option<Link> {
        match self.links.get(self.selected) {
            Some(link) => Some(link.clone()),
            None => {
                linkmgmt_logging::lm_warn!(
                    "Selection {} out of range for {} links",
                    self.selected,
                    self.links.len()
                );
                self.select(self.selected);
                self.step = ManageStep::ListLinks;
                None
            }
        }
    }

    fn on_links_loaded(&mut self, result: Result<Vec<Link>, ApiFailure>) {
        self.loading = false;
        match result {
            Ok(links) => {
                let keep = self.selected_link().map(|link| link.id.clone());
                self.links = links;
                self.load_error = None;
                let index = keep
                    .and_then(|id| self.links.iter().position(|link| link.id == id))
                    .unwrap_or(self.selected);
                self.select(index);
            }
            Err(err) => {
                linkmgmt_logging::lm_error!("Failed to load links: {err}");
                self.load_error = Some(err.to_string());
            }
        }
    }

    fn on_list_key(&mut self, key: Key) -> FlowOutcome {
        if self.load_error.is_some() || (self.links.is_empty() && !self.loading) {
            return match key {
                Key::Char('r') => FlowOutcome::effects(self.reload()),
                _ => FlowOutcome::exit(FlowExit::Done),
            };
        }
        let last = self.links.len().saturating_sub(1);
        match key {
            Key::Up | Key::Char('k') => self.select(self.selected.saturating_sub(1)),
            Key::Down | Key::Char('j') => self.select(self.selected + 1),
            Key::PageUp => self.select(self.selected.saturating_sub(PAGE_ITEMS)),
            Key::PageDown => self.select(self.selected + PAGE_ITEMS),
            Key::Home | Key::Char('g') => self.select(0),
            Key::End | Key::Char('G') => self.select(last),
            Key::Enter if !self.links.is_empty() => {
                self.step = ManageStep::ActionMenu;
            }
            Key::Char('r') => return FlowOutcome::effects(self.reload()),
            Key::Char('q') | Key::Esc => return FlowOutcome::exit(FlowExit::Done),
            _ => {}
        }
        FlowOutcome::none()
    }

    fn on_action_key(&mut self, key: Key, ctx: &mut FlowContext<'_>) -> FlowOutcome {
        let Some(link) = self.guard_selection() else {
            return FlowOutcome::none();
        };
        match key {
            Key::Char('1') | Key::Char('v') => self.step = ManageStep::ViewDetails,
            Key::Char('2') | Key::Char('d') => {
                self.confirm.clear();
                self.confirm.focus();
                self.step = ManageStep::DeleteConfirm;
            }
            Key::Char('3') | Key::Char('s') => {
                if let Some(effect) = self.scrape.start(&link.url, ctx) {
                    self.notice = None;
                    self.step = ManageStep::Scraping;
                    return FlowOutcome::effects(vec![effect]);
                }
            }
            Key::Esc | Key::Char('b') => self.step = ManageStep::ListLinks,
            _ => {}
        }
        FlowOutcome::none()
    }

    fn on_confirm_key(&mut self, key: Key) -> FlowOutcome {
        match key {
            Key::Enter => {
                self.confirm.blur();
                let answer = self.confirm.value().trim().to_lowercase();
                if answer != "y" && answer != "yes" {
                    self.step = ManageStep::ActionMenu;
                    return FlowOutcome::none();
                }
                let Some(link) = self.guard_selection() else {
                    return FlowOutcome::none();
                };
                self.pending_delete = Some(link.id.clone());
                self.notice = None;
                self.step = ManageStep::Done;
                FlowOutcome::effects(vec![Effect::DeleteLink { id: link.id }])
            }
            Key::Esc => {
                self.confirm.blur();
                self.step = ManageStep::ActionMenu;
                FlowOutcome::none()
            }
            other => {
                self.confirm.handle_key(other);
                FlowOutcome::none()
            }
        }
    }

    fn on_link_deleted(&mut self, result: Result<LinkId, ApiFailure>) {
        if self.pending_delete.take().is_none() {
            return;
        }
        match result {
            Ok(id) => {
                self.links.retain(|link| link.id != id);
                self.select(self.selected);
                self.notice = Some(Notice::new(NoticeKind::Success, "Link deleted successfully!"));
            }
            Err(err) => {
                self.notice = Some(Notice::new(
                    NoticeKind::Error,
                    format!("Failed to delete link: {err}"),
                ));
            }
        }
    }

    fn on_scrape_finished(&mut self, result: Result<ScrapedPage, ScrapeFailure>) -> FlowOutcome {
        match result {
            Ok(page) => {
                let Some(link) = self.guard_selection() else {
                    return FlowOutcome::none();
                };
                let patch = LinkPatch::fill_missing(&link, &page);
                if patch.is_empty() {
                    self.notice = Some(Notice::new(NoticeKind::Info, "Done. (No changes applied.)"));
                    self.step = ManageStep::ScrapeDone;
                    return FlowOutcome::none();
                }
                self.step = ManageStep::ScrapeSaving;
                FlowOutcome::effects(vec![Effect::UpdateLink { id: link.id, patch }])
            }
            Err(failure) if failure.is_cancelled() => {
                self.step = ManageStep::ActionMenu;
                FlowOutcome::none()
            }
            Err(failure) => {
                linkmgmt_logging::lm_warn!("Scrape failed: {failure:?}");
                self.notice = Some(Notice::new(
                    NoticeKind::Warning,
                    format!("Scraping failed: {}", failure.user_message()),
                ));
                self.step = ManageStep::ScrapeDone;
                FlowOutcome::none()
            }
        }
    }

    fn on_link_updated(&mut self, result: Result<Link, ApiFailure>) -> FlowOutcome {
        self.step = ManageStep::ScrapeDone;
        match result {
            Ok(updated) => {
                if let Some(slot) = self.links.iter_mut().find(|link| link.id == updated.id) {
                    *slot = updated;
                }
                self.notice = Some(Notice::new(NoticeKind::Success, "Link enriched successfully!"));
                FlowOutcome::effects(self.reload())
            }
            Err(err) => {
                self.notice = Some(Notice::new(
                    NoticeKind::Error,
                    format!("Failed to update link: {err}"),
                ));
                FlowOutcome::none()
            }
        }
    }

    fn render_list(&self, lines: &mut Vec<Line<'static>>) {
        if self.loading && self.links.is_empty() {
            lines.push(widgets::info("Loading links..."));
            return;
        }
        if let Some(error) = &self.load_error {
            lines.push(widgets::error(&format!("Error: {error}")));
            lines.push(Line::default());
            lines.push(widgets::hint("Press r to retry, any other key to go back"));
            return;
        }
        if self.links.is_empty() {
            lines.push(Line::styled("No links found.", styles::MUTED));
            lines.push(Line::default());
            lines.push(widgets::hint("Press r to reload, any other key to go back"));
            return;
        }
        // Header height must match LIST_HEADER_HEIGHT.
        lines.push(Line::styled(
            format!("Select a link: ({} total)", self.links.len()),
            styles::LABEL,
        ));
        lines.push(Line::default());
        for (index, link) in self.links.iter().enumerate() {
            let selected = index == self.selected;
            let (marker, style) = if selected {
                ("→ ", styles::SELECTED)
            } else {
                ("  ", Style::new())
            };
            lines.push(Line::from(vec![
                Span::styled(marker, styles::MARKER),
                Span::styled(link.display_title().to_string(), style),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(widgets::truncate(&link.url, 60), styles::URL),
            ]));
        }
    }

    fn render_actions(&self, lines: &mut Vec<Line<'static>>) {
        widgets::heading(lines, "Link Actions");
        if let Some(link) = self.selected_link() {
            lines.extend(widgets::link_summary(link));
            lines.push(Line::default());
        }
        if let Some(notice) = &self.notice {
            lines.push(notice.render());
            lines.push(Line::default());
        }
        for (key, label) in [("1", "View details"), ("2", "Delete"), ("3", "Scrape & enrich")] {
            lines.push(Line::from(vec![
                Span::styled(format!("  [{key}] "), styles::LABEL),
                Span::raw(label),
            ]));
        }
    }

    fn render_confirm(&self, lines: &mut Vec<Line<'static>>) {
        widgets::heading(lines, "Delete Link");
        if let Some(link) = self.selected_link() {
            lines.extend(widgets::link_summary(link));
            lines.push(Line::default());
        }
        lines.push(widgets::warning("Are you sure you want to delete this link?"));
        lines.push(Line::default());
        widgets::field(lines, "Type 'y' to confirm:", &self.confirm);
    }

    fn render_result(&self, lines: &mut Vec<Line<'static>>) {
        match &self.notice {
            Some(notice) => lines.push(notice.render()),
            None => lines.push(widgets::info("Working...")),
        }
        lines.push(Line::default());
        if self.step == ManageStep::ScrapeDone {
            if let Some(link) = self.selected_link() {
                lines.extend(widgets::link_summary(link));
            }
        }
    }
}

impl Screen for ManageLinksFlow {
    fn init(&mut self) -> Vec<Effect> {
        self.reload()
    }

    fn update(&mut self, msg: Msg, ctx: &mut FlowContext<'_>) -> FlowOutcome {
        match msg {
            Msg::Key(key) => match self.step {
                ManageStep::ListLinks => self.on_list_key(key),
                ManageStep::ActionMenu => self.on_action_key(key, ctx),
                ManageStep::ViewDetails => {
                    if matches!(key, Key::Esc | Key::Enter | Key::Char('b') | Key::Char('q')) {
                        self.step = ManageStep::ActionMenu;
                    }
                    FlowOutcome::none()
                }
                ManageStep::DeleteConfirm => self.on_confirm_key(key),
                ManageStep::Scraping => {
                    if key == Key::Esc {
                        self.step = ManageStep::ActionMenu;
                        FlowOutcome::effects(self.scrape.cancel().into_iter().collect())
                    } else {
                        FlowOutcome::none()
                    }
                }
                ManageStep::ScrapeSaving => FlowOutcome::none(),
                ManageStep::ScrapeDone => {
                    self.step = ManageStep::ActionMenu;
                    FlowOutcome::none()
                }
                ManageStep::Done if self.pending_delete.is_some() => FlowOutcome::none(),
                ManageStep::Done => FlowOutcome::exit(FlowExit::Done),
            },
            Msg::LinksLoaded(result) => {
                self.on_links_loaded(result);
                FlowOutcome::none()
            }
            Msg::LinkDeleted(result) => {
                self.on_link_deleted(result);
                FlowOutcome::none()
            }
            Msg::LinkUpdated(result) if self.step == ManageStep::ScrapeSaving => {
                self.on_link_updated(result)
            }
            Msg::ScrapeProgress {
                job_id,
                stage,
                message,
            } => {
                self.scrape.on_progress(job_id, stage, &message);
                FlowOutcome::none()
            }
            Msg::ScrapeFinished { job_id, result, .. } => {
                if self.step != ManageStep::Scraping {
                    return FlowOutcome::none();
                }
                match self.scrape.on_finished(job_id, result) {
                    Some(result) => self.on_scrape_finished(result),
                    None => FlowOutcome::none(),
                }
            }
            Msg::LinkUpdated(_)
            | Msg::LinkCreated(_)
            | Msg::Resize { .. }
            | Msg::Tick
            | Msg::NoOp => FlowOutcome::none(),
        }
    }

    fn view(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        match self.step {
            ManageStep::ListLinks => self.render_list(&mut lines),
            ManageStep::ActionMenu => self.render_actions(&mut lines),
            ManageStep::ViewDetails => {
                widgets::heading(&mut lines, "Link Details");
                if let Some(link) = self.selected_link() {
                    lines.extend(widgets::link_details(link, width));
                }
            }
            ManageStep::DeleteConfirm => self.render_confirm(&mut lines),
            ManageStep::Scraping => lines.extend(self.scrape.render("Scraping & Enriching Link")),
            ManageStep::ScrapeSaving => lines.push(widgets::info("Saving scraped content...")),
            ManageStep::ScrapeDone | ManageStep::Done => self.render_result(&mut lines),
        }
        lines
    }

    fn hint(&self) -> &'static str {
        match self.step {
            ManageStep::ListLinks => "↑/↓ j/k move  Enter select  r reload  q back  ? help",
            ManageStep::ActionMenu => "1 view  2 delete  3 scrape & enrich  Esc back  ? help",
            ManageStep::ViewDetails => "↑/↓ scroll  Esc back",
            ManageStep::DeleteConfirm => "y + Enter delete  Enter/Esc cancel",
            ManageStep::Scraping => "Esc cancel scraping",
            ManageStep::ScrapeSaving => "Saving...",
            ManageStep::ScrapeDone => "Press any key to return to actions",
            ManageStep::Done => "Press any key to continue",
        }
    }

    fn help(&self) -> &'static [HelpItem] {
        match self.step {
            ManageStep::ListLinks => HELP_LIST,
            ManageStep::ActionMenu => HELP_ACTIONS,
            ManageStep::ViewDetails => HELP_DETAILS,
            ManageStep::DeleteConfirm => HELP_CONFIRM,
            ManageStep::Scraping => HELP_SCRAPING,
            ManageStep::ScrapeSaving | ManageStep::ScrapeDone | ManageStep::Done => HELP_RESULT,
        }
    }

    fn selection(&self) -> Option<Selection> {
        let showing_list = self.step == ManageStep::ListLinks
            && self.load_error.is_none()
            && !self.links.is_empty();
        showing_list.then_some(Selection {
            index: self.selected,
            item_height: ITEM_HEIGHT,
            list_header_height: LIST_HEADER_HEIGHT,
        })
    }

    fn captures_text(&self) -> bool {
        self.step == ManageStep::DeleteConfirm
    }

    fn tick(&mut self) -> bool {
        self.step == ManageStep::Scraping && self.scrape.tick()
    }

    fn teardown(&mut self) -> Vec<Effect> {
        self.scrape.cancel().into_iter().collect()
    }
}
