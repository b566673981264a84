/// Terminal-independent key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    F(u8),
}

impl Key {
    /// Keys the viewport may consume for its own scrolling.
    pub fn is_scroll_key(self) -> bool {
        matches!(
            self,
            Key::Up | Key::Down | Key::PageUp | Key::PageDown | Key::Home | Key::End
        )
    }

    pub fn is_char(self, c: char) -> bool {
        self == Key::Char(c)
    }
}
