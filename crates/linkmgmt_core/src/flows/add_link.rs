use std::time::Duration;

use ratatui::style::Style;
use ratatui::text::Line;

use crate::screen::{FlowContext, FlowExit, FlowOutcome, Screen};
use crate::scrape::ScrapeTracker;
use crate::{
    styles, validate_url, widgets, Effect, HelpItem, Key, Link, LinkDraft, Msg, ScrapeFailure,
    ScrapedPage, TextField,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLinkStep {
    UrlInput,
    Scraping,
    Review,
    Saving,
    Success,
}

/// Editable fields of the review form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewField {
    Url,
    Title,
    Description,
    Body,
}

impl ReviewField {
    const ORDER: [ReviewField; 4] = [
        ReviewField::Url,
        ReviewField::Title,
        ReviewField::Description,
        ReviewField::Body,
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

const HELP_URL: &[HelpItem] = &[
    HelpItem::new("Enter", "Validate the URL and scrape it"),
    HelpItem::new("Ctrl+S", "Skip scraping and fill fields manually"),
    HelpItem::new("Esc", "Cancel"),
];

const HELP_SCRAPING: &[HelpItem] = &[HelpItem::new("Esc", "Cancel scraping")];

const HELP_REVIEW: &[HelpItem] = &[
    HelpItem::new("Tab, Shift+Tab", "Next / previous field"),
    HelpItem::new("Ctrl+J", "New line in the text field"),
    HelpItem::new("Enter", "Save the link"),
    HelpItem::new("Esc", "Cancel"),
];

const HELP_SAVING: &[HelpItem] = &[];

const HELP_DONE: &[HelpItem] = &[HelpItem::new("any key", "Finish")];

/// Add-Link flow: URL entry, optional scrape, review, save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLinkFlow {
    step: AddLinkStep,
    focus: ReviewField,
    url: TextField,
    title: TextField,
    description: TextField,
    body: TextField,
    scrape: ScrapeTracker,
    scraped: Option<ScrapedPage>,
    scrape_elapsed: Option<Duration>,
    scrape_warning: Option<String>,
    error: Option<String>,
    created: Option<Link>,
}

impl Default for AddLinkFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AddLinkFlow {
    pub fn new() -> Self {
        let mut url = TextField::new("https://example.com").with_char_limit(2048);
        url.focus();
        Self {
            step: AddLinkStep::UrlInput,
            focus: ReviewField::Url,
            url,
            title: TextField::new("Title (optional, will use scraped title if available)")
                .with_char_limit(255),
            description: TextField::new("Optional description").with_char_limit(1000),
            body: TextField::new("Optional text content (multi-line, will use scraped text if available)")
                .with_char_limit(10_000)
                .multiline(),
            scrape: ScrapeTracker::default(),
            scraped: None,
            scrape_elapsed: None,
            scrape_warning: None,
            error: None,
            created: None,
        }
    }

    pub fn step(&self) -> AddLinkStep {
        self.step
    }

    pub fn focus(&self) -> ReviewField {
        self.focus
    }

    pub fn field(&self, field: ReviewField) -> &TextField {
        match field {
            ReviewField::Url => &self.url,
            ReviewField::Title => &self.title,
            ReviewField::Description => &self.description,
            ReviewField::Body => &self.body,
        }
    }

    fn field_mut(&mut self, field: ReviewField) -> &mut TextField {
        match field {
            ReviewField::Url => &mut self.url,
            ReviewField::Title => &mut self.title,
            ReviewField::Description => &mut self.description,
            ReviewField::Body => &mut self.body,
        }
    }

    pub fn scrape(&self) -> &ScrapeTracker {
        &self.scrape
    }

    pub fn scrape_warning(&self) -> Option<&str> {
        self.scrape_warning.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created(&self) -> Option<&Link> {
        self.created.as_ref()
    }

    fn set_focus(&mut self, focus: ReviewField) {
        for field in ReviewField::ORDER {
            self.field_mut(field).blur();
        }
        self.focus = focus;
        self.field_mut(focus).focus();
    }

    fn enter_review(&mut self) {
        self.step = AddLinkStep::Review;
        self.set_focus(ReviewField::Title);
    }

    fn back_to_url_input(&mut self) {
        self.step = AddLinkStep::UrlInput;
        self.set_focus(ReviewField::Url);
    }

    /// Validates the URL field in place; stores the inline error on failure.
    fn checked_url(&mut self) -> Option<String> {
        match validate_url(self.url.value()) {
            Ok(url) => {
                self.error = None;
                Some(url)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    fn on_url_key(&mut self, key: Key, ctx: &mut FlowContext<'_>) -> FlowOutcome {
        match key {
            Key::Enter => {
                let Some(url) = self.checked_url() else {
                    return FlowOutcome::none();
                };
                self.scrape_warning = None;
                self.scraped = None;
                match self.scrape.start(&url, ctx) {
                    Some(effect) => {
                        self.step = AddLinkStep::Scraping;
                        self.url.blur();
                        FlowOutcome::effects(vec![effect])
                    }
                    None => FlowOutcome::none(),
                }
            }
            Key::Ctrl('s') => {
                if self.checked_url().is_some() {
                    self.scrape_warning = None;
                    self.enter_review();
                }
                FlowOutcome::none()
            }
            Key::Esc => FlowOutcome::exit(FlowExit::Done),
            other => {
                self.url.handle_key(other);
                FlowOutcome::none()
            }
        }
    }

    fn on_review_key(&mut self, key: Key) -> FlowOutcome {
        match key {
            Key::Tab => self.set_focus(self.focus.next()),
            Key::BackTab => self.set_focus(self.focus.previous()),
            Key::Enter => return self.submit(),
            Key::Esc => return FlowOutcome::exit(FlowExit::Done),
            other => {
                self.field_mut(self.focus).handle_key(other);
            }
        }
        FlowOutcome::none()
    }

    fn submit(&mut self) -> FlowOutcome {
        let Some(url) = self.checked_url() else {
            self.set_focus(ReviewField::Url);
            return FlowOutcome::none();
        };
        let draft = LinkDraft {
            url,
            title: self.title.trimmed(),
            description: self.description.trimmed(),
            text: self.body.trimmed(),
        };
        self.step = AddLinkStep::Saving;
        FlowOutcome::effects(vec![Effect::CreateLink(draft)])
    }

    fn on_scrape_finished(&mut self, elapsed: Duration, result: Result<ScrapedPage, ScrapeFailure>) {
        match result {
            Ok(page) => {
                if self.title.is_blank() && !page.title.trim().is_empty() {
                    self.title.set_value(page.title.trim());
                }
                if self.body.is_blank() && !page.text.trim().is_empty() {
                    self.body.set_value(page.text.trim());
                }
                self.scrape_elapsed = Some(elapsed);
                self.scraped = Some(page);
                self.enter_review();
            }
            Err(failure) if failure.is_cancelled() => self.back_to_url_input(),
            Err(failure) => {
                linkmgmt_logging::lm_warn!("Scrape failed: {failure:?}");
                self.scrape_warning = Some(failure.user_message());
                self.enter_review();
            }
        }
    }

    fn render_url_input(&self, lines: &mut Vec<Line<'static>>) {
        widgets::heading(lines, "Add New Link");
        widgets::field(lines, "URL (required):", &self.url);
        if let Some(error) = &self.error {
            lines.push(Line::default());
            lines.push(widgets::error(error));
        }
    }

    fn render_review(&self, lines: &mut Vec<Line<'static>>) {
        widgets::heading(lines, "Review & Edit Link");
        let scraped_title = self
            .scraped
            .as_ref()
            .is_some_and(|page| !page.title.trim().is_empty());
        for (field, label) in [
            (ReviewField::Url, "URL:"),
            (
                ReviewField::Title,
                if scraped_title { "Title: (scraped)" } else { "Title:" },
            ),
            (ReviewField::Description, "Description (optional):"),
            (ReviewField::Body, "Text (optional):"),
        ] {
            widgets::field(lines, label, self.field(field));
            lines.push(Line::default());
        }
        if let Some(elapsed) = self.scrape_elapsed.filter(|_| self.scraped.is_some()) {
            lines.push(widgets::labelled(
                "Scraped in",
                format!("{:.1}s", elapsed.as_secs_f64()),
                styles::MUTED,
            ));
        }
        if let Some(warning) = &self.scrape_warning {
            lines.push(widgets::warning(&format!(
                "Scraping failed: {warning} (you can still fill fields manually)"
            )));
        }
        if let Some(error) = &self.error {
            lines.push(widgets::error(error));
        }
        if self.step == AddLinkStep::Saving {
            lines.push(widgets::info("Saving link..."));
        }
    }

    fn render_success(&self, lines: &mut Vec<Line<'static>>) {
        lines.push(widgets::success("Link created successfully!"));
        lines.push(Line::default());
        if let Some(link) = &self.created {
            lines.extend(widgets::link_summary(link));
        }
        if let Some(elapsed) = self.scrape_elapsed.filter(|_| self.scraped.is_some()) {
            lines.push(widgets::labelled(
                "Scraped in",
                format!("{:.1}s", elapsed.as_secs_f64()),
                Style::new(),
            ));
        }
    }
}

impl Screen for AddLinkFlow {
    fn update(&mut self, msg: Msg, ctx: &mut FlowContext<'_>) -> FlowOutcome {
        match msg {
            Msg::Key(key) => match self.step {
                AddLinkStep::UrlInput => self.on_url_key(key, ctx),
                AddLinkStep::Scraping => {
                    if key == Key::Esc {
                        let effects = self.scrape.cancel().into_iter().collect();
                        self.back_to_url_input();
                        FlowOutcome::effects(effects)
                    } else {
                        FlowOutcome::none()
                    }
                }
                AddLinkStep::Review => self.on_review_key(key),
                AddLinkStep::Saving => FlowOutcome::none(),
                AddLinkStep::Success => FlowOutcome::exit(FlowExit::Done),
            },
            Msg::ScrapeProgress {
                job_id,
                stage,
                message,
            } => {
                self.scrape.on_progress(job_id, stage, &message);
                FlowOutcome::none()
            }
            Msg::ScrapeFinished {
                job_id,
                elapsed,
                result,
            } => {
                if self.step == AddLinkStep::Scraping {
                    if let Some(result) = self.scrape.on_finished(job_id, result) {
                        self.on_scrape_finished(elapsed, result);
                    }
                }
                FlowOutcome::none()
            }
            Msg::LinkCreated(result) if self.step == AddLinkStep::Saving => {
                match result {
                    Ok(link) => {
                        linkmgmt_logging::lm_info!("Created link {}", link.id);
                        self.created = Some(link);
                        self.error = None;
                        self.step = AddLinkStep::Success;
                    }
                    Err(err) => {
                        self.error = Some(format!("Failed to create link: {err}"));
                        self.step = AddLinkStep::Review;
                    }
                }
                FlowOutcome::none()
            }
            Msg::LinkCreated(_)
            | Msg::LinksLoaded(_)
            | Msg::LinkUpdated(_)
            | Msg::LinkDeleted(_)
            | Msg::Resize { .. }
            | Msg::Tick
            | Msg::NoOp => FlowOutcome::none(),
        }
    }

    fn view(&self, _width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        match self.step {
            AddLinkStep::UrlInput => self.render_url_input(&mut lines),
            AddLinkStep::Scraping => lines.extend(self.scrape.render("Scraping URL")),
            AddLinkStep::Review | AddLinkStep::Saving => self.render_review(&mut lines),
            AddLinkStep::Success => self.render_success(&mut lines),
        }
        lines
    }

    fn hint(&self) -> &'static str {
        match self.step {
            AddLinkStep::UrlInput => "Enter scrape  Ctrl+S skip scraping  Esc cancel  F1 help",
            AddLinkStep::Scraping => "Esc cancel scraping",
            AddLinkStep::Review => "Tab/Shift+Tab navigate  Ctrl+J new line  Enter save  Esc cancel",
            AddLinkStep::Saving => "Saving...",
            AddLinkStep::Success => "Press any key to continue",
        }
    }

    fn help(&self) -> &'static [HelpItem] {
        match self.step {
            AddLinkStep::UrlInput => HELP_URL,
            AddLinkStep::Scraping => HELP_SCRAPING,
            AddLinkStep::Saving => HELP_SAVING,
            AddLinkStep::Review => HELP_REVIEW,
            AddLinkStep::Success => HELP_DONE,
        }
    }

    fn captures_text(&self) -> bool {
        matches!(self.step, AddLinkStep::UrlInput | AddLinkStep::Review)
    }

    fn tick(&mut self) -> bool {
        self.step == AddLinkStep::Scraping && self.scrape.tick()
    }

    fn teardown(&mut self) -> Vec<Effect> {
        self.scrape.cancel().into_iter().collect()
    }
}
