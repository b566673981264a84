use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::types::non_blank;
use crate::{styles, Link, TextField};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(crate) fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

pub(crate) fn heading(lines: &mut Vec<Line<'static>>, text: &str) {
    lines.push(Line::styled(text.to_string(), styles::TITLE));
    lines.push(Line::default());
}

pub(crate) fn hint(text: &str) -> Line<'static> {
    Line::styled(text.to_string(), styles::HELP)
}

pub(crate) fn success(text: &str) -> Line<'static> {
    Line::styled(format!("✓ {text}"), styles::SUCCESS)
}

pub(crate) fn warning(text: &str) -> Line<'static> {
    Line::styled(format!("⚠ {text}"), styles::WARNING)
}

pub(crate) fn error(text: &str) -> Line<'static> {
    Line::styled(format!("✗ {text}"), styles::ERROR)
}

pub(crate) fn info(text: &str) -> Line<'static> {
    Line::styled(text.to_string(), styles::INFO)
}

pub(crate) fn labelled(label: &str, value: impl Into<String>, style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}:"), styles::LABEL),
        Span::raw(" "),
        Span::styled(value.into(), style),
    ])
}

/// Label line followed by the field itself, highlighted when focused.
pub(crate) fn field(lines: &mut Vec<Line<'static>>, label: &str, field: &TextField) {
    let marker = if field.is_focused() { "› " } else { "  " };
    lines.push(Line::from(vec![
        Span::styled(marker, styles::MARKER),
        Span::styled(label.to_string(), styles::LABEL),
    ]));
    for line in field.render() {
        let mut spans = vec![Span::raw("  ")];
        spans.extend(line.spans);
        lines.push(Line::from(spans));
    }
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Word-wraps `text` to `width` columns, prefixing every row with `indent`.
pub(crate) fn wrapped(text: &str, width: u16, indent: &str, style: Style) -> Vec<Line<'static>> {
    let usable = usize::from(width).saturating_sub(indent.len()).max(10);
    text.lines()
        .flat_map(|paragraph| {
            if paragraph.trim().is_empty() {
                return vec![Line::default()];
            }
            textwrap::wrap(paragraph, usable)
                .into_iter()
                .map(|row| Line::styled(format!("{indent}{row}"), style))
                .collect()
        })
        .collect()
}

pub(crate) fn link_summary(link: &Link) -> Vec<Line<'static>> {
    let mut lines = vec![
        labelled("ID", short_id(&link.id), styles::MUTED),
        labelled("URL", link.url.clone(), styles::URL),
        labelled("Title", link.display_title().to_string(), Style::new()),
    ];
    if let Some(created) = link.created_at {
        lines.push(labelled(
            "Created",
            created.format("%Y-%m-%d %H:%M").to_string(),
            styles::MUTED,
        ));
    }
    lines
}

pub(crate) fn link_details(link: &Link, width: u16) -> Vec<Line<'static>> {
    let mut lines = link_summary(link);
    lines[0] = labelled("ID", link.id.clone(), styles::MUTED);
    if let Some(updated) = link.updated_at {
        lines.push(labelled(
            "Updated",
            updated.format("%Y-%m-%d %H:%M").to_string(),
            styles::MUTED,
        ));
    }
    lines.push(Line::default());
    for (label, value) in [
        ("Description", link.description.as_deref()),
        ("Text", link.text.as_deref()),
    ] {
        match non_blank(value) {
            Some(value) => {
                lines.push(Line::styled(format!("{label}:"), styles::LABEL));
                lines.extend(wrapped(value, width, "  ", Style::new()));
            }
            None => lines.push(labelled(label, "(not set)", styles::MUTED)),
        }
    }
    lines
}

fn short_id(id: &str) -> String {
    if id.chars().count() > 8 {
        format!("{}...", id.chars().take(8).collect::<String>())
    } else {
        id.to_string()
    }
}
