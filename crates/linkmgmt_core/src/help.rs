use ratatui::text::{Line, Span};

use crate::styles;

/// One row of a help overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpItem {
    pub keys: &'static str,
    pub description: &'static str,
}

impl HelpItem {
    pub const fn new(keys: &'static str, description: &'static str) -> Self {
        Self { keys, description }
    }
}

const HELP_TOGGLE: HelpItem = HelpItem::new("?, F1", "Toggle this help");
const MENU: HelpItem = HelpItem::new("m", "Back to main menu");
const QUIT: HelpItem = HelpItem::new("Ctrl+C", "Quit");

pub(crate) fn render_help(items: &[HelpItem], with_menu: bool) -> Vec<Line<'static>> {
    let globals: Vec<HelpItem> = if with_menu {
        vec![HELP_TOGGLE, MENU, QUIT]
    } else {
        vec![HELP_TOGGLE, QUIT]
    };
    let key_width = items
        .iter()
        .chain(globals.iter())
        .map(|item| item.keys.chars().count())
        .max()
        .unwrap_or(0);

    let row = |item: &HelpItem| {
        Line::from(vec![
            Span::styled(format!("  {:<key_width$}  ", item.keys), styles::LABEL),
            Span::raw(item.description),
        ])
    };

    let mut lines = vec![Line::styled("Keyboard shortcuts", styles::TITLE), Line::default()];
    lines.extend(items.iter().map(row));
    lines.push(Line::default());
    lines.push(Line::styled("Global", styles::TITLE));
    lines.extend(globals.iter().map(row));
    lines.push(Line::default());
    lines.push(Line::styled("Press ? or Esc to close help", styles::HELP));
    lines
}
