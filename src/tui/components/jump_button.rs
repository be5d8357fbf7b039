//! Floating "jump to latest" button, anchored to the bottom-right of the thread.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;

pub const JUMP_LABEL: &str = "[ ↓ Latest ]";

/// Columns kept free on the right for the scrollbar.
const RIGHT_MARGIN: u16 = 2;

pub struct JumpButton;

impl JumpButton {
    /// Screen rect the button occupies inside `main_area`.
    ///
    /// Sits one row above the bottom edge, clear of the scrollbar.
    /// Returns `None` if the area is too small to hold it.
    pub fn area(main_area: Rect) -> Option<Rect> {
        let width = JUMP_LABEL.width() as u16;
        if main_area.width < width + RIGHT_MARGIN || main_area.height < 2 {
            return None;
        }
        Some(Rect::new(
            main_area.right() - width - RIGHT_MARGIN,
            main_area.bottom() - 2,
            width,
            1,
        ))
    }
}

impl Component for JumpButton {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(JUMP_LABEL).style(style), area);
    }
}
