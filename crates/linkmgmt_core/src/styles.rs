//! Shared palette for every screen.
use ratatui::style::{Color, Modifier, Style};

pub const TITLE: Style = Style::new().fg(Color::Magenta).add_modifier(Modifier::BOLD);
pub const LABEL: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const HELP: Style = Style::new().fg(Color::DarkGray);
pub const MUTED: Style = Style::new().fg(Color::Gray);
pub const SELECTED: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
pub const MARKER: Style = Style::new().fg(Color::Yellow);
pub const URL: Style = Style::new().fg(Color::Blue);
pub const SUCCESS: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
pub const WARNING: Style = Style::new().fg(Color::Yellow);
pub const ERROR: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);
pub const INFO: Style = Style::new().fg(Color::Cyan);
pub const CURSOR: Style = Style::new().add_modifier(Modifier::REVERSED);
pub const PLACEHOLDER: Style = Style::new().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
