//! Scrollable frame around a [`Screen`]: header, visible slice of content, footer.
//!
//! The wrapper owns all geometry. Screens render their full content and report
//! an optional [`Selection`]; the wrapper keeps that selection on screen.
use ratatui::text::{Line, Span, Text};

use crate::help::render_help;
use crate::screen::{FlowContext, FlowExit, FlowOutcome, Screen, Selection};
use crate::{styles, Effect, Key, Msg};

/// Lines of context kept above or below the selection after an auto-scroll.
const SCROLL_PADDING: usize = 2;
const HELP_HINT: &str = "?/Esc close help";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportConfig {
    pub title: &'static str,
    pub show_header: bool,
    pub show_footer: bool,
    pub scrollable: bool,
    pub enable_help: bool,
    pub enable_menu: bool,
    pub min_width: u16,
    pub min_height: u16,
}

impl ViewportConfig {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            show_header: true,
            show_footer: true,
            scrollable: true,
            enable_help: true,
            enable_menu: true,
            min_width: 20,
            min_height: 5,
        }
    }

    pub fn without_menu(mut self) -> Self {
        self.enable_menu = false;
        self
    }
}

/// Geometry of the scrollable region.
///
/// `height` is the content region only. `0 <= scroll_offset <= max(0, content_height - height)`
/// holds after every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    pub width: u16,
    pub height: u16,
    pub scroll_offset: usize,
    pub content_height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChromeCache {
    width: u16,
    hint: &'static str,
    header: u16,
    footer: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport<S> {
    screen: S,
    config: ViewportConfig,
    total_width: u16,
    total_height: u16,
    state: ViewportState,
    chrome: Option<ChromeCache>,
    show_help: bool,
    prev_selected: Option<usize>,
}

/// Smallest change to `offset` that puts the whole selected item inside a
/// window of `viewport_height` rows.
///
/// Scrolling up leaves a little lead-in above the item and scrolling down a
/// little padding below it, as long as the item still fits. A window shorter
/// than one item leaves `offset` untouched.
pub fn scroll_offset_for(offset: usize, selection: Selection, viewport_height: usize) -> usize {
    let item_height = usize::from(selection.item_height);
    if item_height == 0 || viewport_height < item_height {
        return offset;
    }
    let top = selection.top();
    let bottom = selection.bottom();
    if top >= offset && bottom <= offset + viewport_height {
        return offset;
    }
    let slack = viewport_height - item_height;
    if top < offset {
        top - SCROLL_PADDING.min(slack).min(top)
    } else {
        (bottom + SCROLL_PADDING.min(slack)).saturating_sub(viewport_height)
    }
}

impl<S: Screen> Viewport<S> {
    pub fn new(screen: S, config: ViewportConfig, width: u16, height: u16) -> Self {
        let mut viewport = Self {
            screen,
            config,
            total_width: width,
            total_height: height,
            state: ViewportState {
                width,
                height: 1,
                scroll_offset: 0,
                content_height: 0,
            },
            chrome: None,
            show_help: false,
            prev_selected: None,
        };
        viewport.sync(true);
        viewport
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    pub fn init(&mut self) -> Vec<Effect> {
        let effects = self.screen.init();
        self.sync(false);
        effects
    }

    pub fn tick(&mut self) -> bool {
        self.screen.tick()
    }

    pub fn teardown(&mut self) -> Vec<Effect> {
        self.screen.teardown()
    }

    pub fn update(&mut self, msg: Msg, ctx: &mut FlowContext<'_>) -> FlowOutcome {
        match msg {
            Msg::Resize { width, height } => {
                self.resize(width, height);
                return FlowOutcome::none();
            }
            Msg::Key(key) => {
                if let Some(outcome) = self.handle_own_key(key) {
                    return outcome;
                }
            }
            _ => {}
        }
        let outcome = self.screen.update(msg, ctx);
        self.sync(false);
        outcome
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.total_width = width;
        self.total_height = height;
        self.state.width = width;
        self.chrome = None;
        self.sync(true);
    }

    fn handle_own_key(&mut self, key: Key) -> Option<FlowOutcome> {
        let captures = self.screen.captures_text();
        if self.show_help {
            if matches!(
                key,
                Key::F(1) | Key::Esc | Key::Char('?') | Key::Char('q')
            ) {
                self.show_help = false;
                self.refresh_chrome();
            }
            return Some(FlowOutcome::none());
        }
        if self.config.enable_help && (key == Key::F(1) || (key == Key::Char('?') && !captures)) {
            self.show_help = true;
            self.refresh_chrome();
            return Some(FlowOutcome::none());
        }
        if self.config.enable_menu && key == Key::Char('m') && !captures {
            return Some(FlowOutcome::exit(FlowExit::Menu));
        }
        let text_owns_key = captures && matches!(key, Key::Home | Key::End);
        if self.config.scrollable
            && key.is_scroll_key()
            && !text_owns_key
            && self.screen.selection().is_none()
        {
            self.scroll(key);
            return Some(FlowOutcome::none());
        }
        None
    }

    fn scroll(&mut self, key: Key) {
        let page = usize::from(self.state.height).max(1);
        let offset = self.state.scroll_offset;
        self.state.scroll_offset = match key {
            Key::Up => offset.saturating_sub(1),
            Key::Down => offset + 1,
            Key::PageUp => offset.saturating_sub(page),
            Key::PageDown => offset + page,
            Key::Home => 0,
            Key::End => self.max_offset(),
            _ => offset,
        };
        self.clamp();
    }

    fn max_offset(&self) -> usize {
        self.state
            .content_height
            .saturating_sub(usize::from(self.state.height))
    }

    fn clamp(&mut self) {
        self.state.scroll_offset = self.state.scroll_offset.min(self.max_offset());
    }

    fn current_hint(&self) -> &'static str {
        if self.show_help {
            HELP_HINT
        } else {
            self.screen.hint()
        }
    }

    /// Re-measures header and footer when width or hint changed since the last measure,
    /// then re-clamps the offset against the new content height.
    fn refresh_chrome(&mut self) {
        let hint = self.current_hint();
        let width = self.total_width;
        let fresh = self
            .chrome
            .as_ref()
            .is_some_and(|cache| cache.width == width && cache.hint == hint);
        if !fresh {
            let header = u16::try_from(self.header_lines().len()).unwrap_or(u16::MAX);
            let footer = u16::try_from(self.footer_lines(hint).len()).unwrap_or(u16::MAX);
            self.chrome = Some(ChromeCache {
                width,
                hint,
                header,
                footer,
            });
        }
        let (header, footer) = self
            .chrome
            .as_ref()
            .map_or((0, 0), |cache| (cache.header, cache.footer));
        self.state.height = self
            .total_height
            .saturating_sub(header)
            .saturating_sub(footer)
            .max(1);
        self.clamp();
    }

    /// Recomputes content height and keeps the selection visible.
    fn sync(&mut self, geometry_changed: bool) {
        self.refresh_chrome();
        self.state.content_height = self.screen.view(self.state.width).len();
        let selection = self.screen.selection();
        match (self.prev_selected, selection) {
            (Some(_), None) => self.state.scroll_offset = 0,
            (previous, Some(selection)) if geometry_changed || previous != Some(selection.index) => {
                self.state.scroll_offset = scroll_offset_for(
                    self.state.scroll_offset,
                    selection,
                    usize::from(self.state.height),
                );
            }
            _ => {}
        }
        self.prev_selected = selection.map(|selection| selection.index);
        self.clamp();
    }

    fn header_lines(&self) -> Vec<Line<'static>> {
        if !self.config.show_header {
            return Vec::new();
        }
        let width = usize::from(self.total_width).max(1);
        let mut lines: Vec<Line<'static>> = textwrap::wrap(self.config.title, width)
            .into_iter()
            .map(|row| Line::styled(row.into_owned(), styles::TITLE))
            .collect();
        lines.push(Line::styled("─".repeat(width), styles::HELP));
        lines
    }

    fn footer_lines(&self, hint: &str) -> Vec<Line<'static>> {
        if !self.config.show_footer {
            return Vec::new();
        }
        let width = usize::from(self.total_width).max(1);
        let mut lines = vec![self.footer_rule(width)];
        lines.extend(
            textwrap::wrap(hint, width)
                .into_iter()
                .map(|row| Line::styled(row.into_owned(), styles::HELP)),
        );
        lines
    }

    fn footer_rule(&self, width: usize) -> Line<'static> {
        let visible = usize::from(self.state.height);
        let total = self.state.content_height;
        if self.show_help || total <= visible {
            return Line::styled("─".repeat(width), styles::HELP);
        }
        let first = self.state.scroll_offset + 1;
        let last = (self.state.scroll_offset + visible).min(total);
        let label = format!(" {first}-{last}/{total} ");
        let rule = "─".repeat(width.saturating_sub(label.chars().count() + 2));
        Line::from(vec![
            Span::styled(rule, styles::HELP),
            Span::styled(label, styles::MUTED),
            Span::styled("──", styles::HELP),
        ])
    }

    pub fn view(&self) -> Text<'static> {
        if self.total_width < self.config.min_width || self.total_height < self.config.min_height {
            return Text::from(vec![
                Line::styled("Terminal too small", styles::WARNING),
                Line::styled(
                    format!(
                        "Need {}x{}, have {}x{}",
                        self.config.min_width,
                        self.config.min_height,
                        self.total_width,
                        self.total_height
                    ),
                    styles::MUTED,
                ),
            ]);
        }

        let (body, offset) = if self.show_help {
            (render_help(self.screen.help(), self.config.enable_menu), 0)
        } else {
            (self.screen.view(self.state.width), self.state.scroll_offset)
        };
        let visible = usize::from(self.state.height);

        let mut lines = self.header_lines();
        let before = lines.len();
        lines.extend(body.into_iter().skip(offset).take(visible));
        while lines.len() - before < visible {
            lines.push(Line::default());
        }
        lines.extend(self.footer_lines(self.current_hint()));
        Text::from(lines)
    }
}
