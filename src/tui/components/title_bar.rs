//! # TitleBar Component
//!
//! Top status bar showing where the thread came from and what the viewer is doing.
//!
//! ## Responsibilities
//!
//! - Display the message source (relay host or URL)
//! - Display status messages (e.g., "Loading messages...", "12 messages in 3 groups")
//! - Show "↓ New" indicator when the view is far above the latest message
//!
//! ## Props-in-Struct Pattern
//!
//! Rather than passing props as render() parameters, they are stored as struct
//! fields, because the Component trait requires a fixed render() signature.
//!
//! ## Conditional Formatting
//!
//! 1. **Far from bottom**: `"Threadview (source: relay) | 12 messages in 3 groups | ↓ New"`
//! 2. **Status message**: `"Threadview (source: relay) | Loading messages..."`
//! 3. **Default**: `"Threadview (source: relay)"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

/// Top status bar component.
pub struct TitleBar {
    /// Where messages are fetched from (e.g., "localhost:3000")
    pub source_name: String,
    /// Status message (e.g., "Loading messages...")
    pub status_message: String,
    /// Whether the latest messages are out of view
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(source_name: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            source_name,
            status_message,
            has_unseen_content,
        }
    }

    fn text(&self) -> String {
        if self.has_unseen_content {
            format!(
                "Threadview (source: {}) | {} | ↓ New",
                self.source_name, self.status_message
            )
        } else if self.status_message.is_empty() {
            format!("Threadview (source: {})", self.source_name)
        } else {
            format!(
                "Threadview (source: {}) | {}",
                self.source_name, self.status_message
            )
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let span = Span::styled(self.text(), Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(span, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_to_text(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let mut title_bar = TitleBar::new(
            "localhost:3000".to_string(),
            "12 messages in 3 groups".to_string(),
            true,
        );
        let text = render_to_text(&mut title_bar);

        assert!(text.contains("Threadview"));
        assert!(text.contains("localhost:3000"));
        assert!(text.contains("12 messages in 3 groups"));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let mut title_bar = TitleBar::new(
            "relay".to_string(),
            "Loading messages...".to_string(),
            false,
        );
        let text = render_to_text(&mut title_bar);

        assert!(text.contains("Loading messages..."));
        assert!(!text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("relay".to_string(), String::new(), false);
        let text = render_to_text(&mut title_bar);

        assert!(text.contains("Threadview (source: relay)"));
        assert!(!text.contains('|'));
    }
}
