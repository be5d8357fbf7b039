//! Placeholder views for the main area while there is no thread to show.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::tui::component::Component;

pub const LOADING_TEXT: &str = "Loading messages...";

/// Centered loading indicator.
pub struct LoadingView;

impl Component for LoadingView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [line_area] = Layout::vertical([Constraint::Length(1)])
            .flex(Flex::Center)
            .areas(area);
        let line = Line::styled(
            LOADING_TEXT,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        );
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), line_area);
    }
}

/// Bordered error message shown in place of the thread.
pub struct ErrorView<'a> {
    pub message: &'a str,
}

impl<'a> ErrorView<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Component for ErrorView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(format!("Error: {}", self.message))
            .style(Style::default().fg(Color::Red))
            .block(Block::bordered().title("ERROR"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_to_text(component: &mut dyn Component) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 7)).unwrap();
        terminal.draw(|f| component.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn loading_view_shows_loading_text() {
        assert!(render_to_text(&mut LoadingView).contains(LOADING_TEXT));
    }

    #[test]
    fn error_view_prefixes_message() {
        let text = render_to_text(&mut ErrorView::new("HTTP 503"));
        assert!(text.contains("ERROR"));
        assert!(text.contains("Error: HTTP 503"));
    }
}
