use ratatui::text::{Line, Span};

use crate::screen::{Destination, FlowContext, FlowExit, FlowOutcome, Screen, Selection};
use crate::{styles, widgets, HelpItem, Key, Msg};

const ITEMS: [(&str, &str, Option<Destination>); 3] = [
    ("Add link", "Save a new link, optionally scraping its content", Some(Destination::AddLink)),
    ("Manage links", "Browse, view, enrich and delete saved links", Some(Destination::ManageLinks)),
    ("Quit", "Leave link-mgmt", None),
];

const HELP: &[HelpItem] = &[
    HelpItem::new("↑/k, ↓/j", "Move selection"),
    HelpItem::new("Enter", "Open selected entry"),
    HelpItem::new("1, 2", "Open Add link / Manage links"),
    HelpItem::new("q, Esc", "Quit"),
];

/// Entry screen listing the available flows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainMenu {
    selected: usize,
}

impl MainMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn open(&self, index: usize) -> FlowOutcome {
        match ITEMS.get(index) {
            Some((_, _, Some(destination))) => FlowOutcome::exit(FlowExit::Open(*destination)),
            _ => FlowOutcome::exit(FlowExit::Quit),
        }
    }
}

impl Screen for MainMenu {
    fn update(&mut self, msg: Msg, _ctx: &mut FlowContext<'_>) -> FlowOutcome {
        let Msg::Key(key) = msg else {
            return FlowOutcome::none();
        };
        match key {
            Key::Up | Key::Char('k') => self.selected = self.selected.saturating_sub(1),
            Key::Down | Key::Char('j') => self.selected = (self.selected + 1).min(ITEMS.len() - 1),
            Key::Home => self.selected = 0,
            Key::End => self.selected = ITEMS.len() - 1,
            Key::Enter => return self.open(self.selected),
            Key::Char('1') => return self.open(0),
            Key::Char('2') => return self.open(1),
            Key::Char('q') | Key::Esc => return FlowOutcome::exit(FlowExit::Quit),
            _ => {}
        }
        FlowOutcome::none()
    }

    fn view(&self, _width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        widgets::heading(&mut lines, "What would you like to do?");
        for (index, (label, description, _)) in ITEMS.iter().enumerate() {
            let selected = index == self.selected;
            let (marker, style) = if selected {
                ("→ ", styles::SELECTED)
            } else {
                ("  ", ratatui::style::Style::new())
            };
            lines.push(Line::from(vec![
                Span::styled(marker, styles::MARKER),
                Span::styled(format!("{}. {label}", index + 1), style),
                Span::raw("  "),
                Span::styled(*description, styles::MUTED),
            ]));
        }
        lines
    }

    fn hint(&self) -> &'static str {
        "↑/↓ move  Enter open  1/2 shortcut  q quit  ? help"
    }

    fn help(&self) -> &'static [HelpItem] {
        HELP
    }

    fn selection(&self) -> Option<Selection> {
        Some(Selection {
            index: self.selected,
            item_height: 1,
            list_header_height: 2,
        })
    }
}
