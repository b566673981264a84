use std::mem;

use ratatui::text::{Line, Span};

use crate::{styles, Key};

/// Editable text value with a character cursor.
///
/// Single-line by default; a multi-line field accepts `Ctrl+J` as a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
    placeholder: &'static str,
    char_limit: Option<usize>,
    multiline: bool,
    focused: bool,
}

impl TextField {
    pub fn new(placeholder: &'static str) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            placeholder,
            char_limit: None,
            multiline: false,
            focused: false,
        }
    }

    pub fn with_char_limit(mut self, limit: usize) -> Self {
        self.char_limit = Some(limit);
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Trimmed value, or `None` when blank.
    pub fn trimmed(&self) -> Option<String> {
        let trimmed = self.value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Replaces the value and moves the cursor to its end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let mut value: String = value.into();
        if !self.multiline {
            value = value.replace(['\r', '\n'], " ");
        }
        if let Some(limit) = self.char_limit {
            if value.chars().count() > limit {
                value = value.chars().take(limit).collect();
            }
        }
        self.cursor = value.chars().count();
        self.value = value;
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(idx, _)| idx)
    }

    fn insert(&mut self, ch: char) -> bool {
        if self.char_limit.is_some_and(|limit| self.len() >= limit) {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
        true
    }

    /// Applies an editing key. Returns `true` when the key was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Char(ch) if !ch.is_control() => {
                self.insert(ch);
                true
            }
            Key::Ctrl('j') if self.multiline => {
                self.insert('\n');
                true
            }
            Key::Ctrl('u') => {
                let at = self.byte_index(self.cursor);
                self.value.replace_range(..at, "");
                self.cursor = 0;
                true
            }
            Key::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            Key::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            Key::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            Key::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
                true
            }
            Key::Home | Key::Ctrl('a') => {
                self.cursor = 0;
                true
            }
            Key::End | Key::Ctrl('e') => {
                self.cursor = self.len();
                true
            }
            _ => false,
        }
    }

    /// Renders the value, drawing the cursor as a reversed cell when focused.
    pub fn render(&self) -> Vec<Line<'static>> {
        if self.value.is_empty() {
            let mut spans = Vec::with_capacity(2);
            if self.focused {
                spans.push(Span::styled(" ", styles::CURSOR));
            }
            spans.push(Span::styled(self.placeholder, styles::PLACEHOLDER));
            return vec![Line::from(spans)];
        }

        let mut lines = Vec::new();
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut run = String::new();
        for (idx, ch) in self.value.chars().enumerate() {
            let at_cursor = self.focused && idx == self.cursor;
            if (at_cursor || ch == '\n') && !run.is_empty() {
                spans.push(Span::raw(mem::take(&mut run)));
            }
            match (at_cursor, ch) {
                (true, '\n') => {
                    spans.push(Span::styled(" ", styles::CURSOR));
                    lines.push(Line::from(mem::take(&mut spans)));
                }
                (true, _) => spans.push(Span::styled(ch.to_string(), styles::CURSOR)),
                (false, '\n') => lines.push(Line::from(mem::take(&mut spans))),
                (false, _) => run.push(ch),
            }
        }
        if !run.is_empty() {
            spans.push(Span::raw(run));
        }
        if self.focused && self.cursor >= self.len() {
            spans.push(Span::styled(" ", styles::CURSOR));
        }
        lines.push(Line::from(spans));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(field: &mut TextField, text: &str) {
        for ch in text.chars() {
            field.handle_key(Key::Char(ch));
        }
    }

    #[test]
    fn edits_at_cursor_with_multibyte_chars() {
        let mut field = TextField::new("");
        type_str(&mut field, "héllo");
        field.handle_key(Key::Left);
        field.handle_key(Key::Left);
        field.handle_key(Key::Backspace);
        assert_eq!(field.value(), "hélo");
        field.handle_key(Key::Home);
        field.handle_key(Key::Delete);
        assert_eq!(field.value(), "élo");
        assert_eq!(field.cursor(), 0);
    }

    #[test]
    fn respects_char_limit_and_single_line() {
        let mut field = TextField::new("").with_char_limit(3);
        type_str(&mut field, "abcd");
        assert_eq!(field.value(), "abc");
        assert!(!field.handle_key(Key::Ctrl('j')));
        field.set_value("x\ny");
        assert_eq!(field.value(), "x y");
    }

    #[test]
    fn multiline_renders_one_line_per_row() {
        let mut field = TextField::new("").multiline();
        type_str(&mut field, "a");
        field.handle_key(Key::Ctrl('j'));
        type_str(&mut field, "b");
        assert_eq!(field.value(), "a\nb");
        assert_eq!(field.render().len(), 2);
    }
}
