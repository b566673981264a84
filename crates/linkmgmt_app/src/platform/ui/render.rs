use linkmgmt_core::AppState;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Draws the active screen. The core already laid out and clipped the lines
/// to the terminal size, so no wrapping happens here.
pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    frame.render_widget(Paragraph::new(state.view()), frame.area());
}
