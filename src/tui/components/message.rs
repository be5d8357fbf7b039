use std::fmt::Write as _;

use chrono::Local;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::core::message::{Message, Role};

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Timestamp line under the content.
const FOOTER_LINES: u16 = 1;
/// Copy action line, only present while selected.
const ACTION_LINES: u16 = 1;

const MIN_BUBBLE_WIDTH: u16 = 16;
/// Bubbles never take more than this share of the thread width.
const MAX_WIDTH_PERCENT: u32 = 75;

pub const COPY_LABEL: &str = "⧉ Copy (c)";
pub const COPIED_LABEL: &str = "✓ Copied";

/// A single message drawn as a chat bubble.
///
/// User bubbles hug the right edge, assistant bubbles the left. The bubble
/// shrinks to its content up to `MAX_WIDTH_PERCENT` of the row.
///
/// ```text
///                        ╭user──────────╮
///                        │ hi           │
///                        │        10:00 │
///                        │ ⧉ Copy (c)   │   <- selected only
///                        ╰──────────────╯
/// ```
#[derive(Clone, Copy)]
pub struct MessageBubble<'a> {
    pub message: &'a Message,
    /// Pre-formatted local time for the footer
    pub time_label: &'a str,
    pub is_selected: bool,
    /// Whether the "copied" indicator is active for this message
    pub is_copied: bool,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a Message, time_label: &'a str, is_selected: bool, is_copied: bool) -> Self {
        Self {
            message,
            time_label,
            is_selected,
            is_copied,
        }
    }

    /// Outer width of the bubble when laid out in a row `available` columns wide.
    ///
    /// Independent of selection, so toggling selection only changes height.
    pub fn bubble_width(message: &Message, available: u16) -> u16 {
        let max = ((available as u32 * MAX_WIDTH_PERCENT) / 100) as u16;
        let max = max.max(MIN_BUBBLE_WIDTH).min(available);

        let longest_line = message
            .content
            .trim()
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .max(COPY_LABEL.width());
        let natural = (longest_line as u16).saturating_add(HORIZONTAL_OVERHEAD);

        natural.clamp(MIN_BUBBLE_WIDTH.min(max), max)
    }

    /// Rows this message occupies in a row `available` columns wide.
    ///
    /// Content is wrapped here with `textwrap` and rendered from the same
    /// wrapped lines, so the prediction is exact.
    pub fn calculate_height(message: &Message, available: u16, is_selected: bool) -> u16 {
        let width = Self::bubble_width(message, available);
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }

        let content_lines =
            u16::try_from(wrap_content(&message.content, content_width).len()).unwrap_or(u16::MAX);
        let action_lines = if is_selected { ACTION_LINES } else { 0 };
        content_lines
            .saturating_add(FOOTER_LINES)
            .saturating_add(action_lines)
            .saturating_add(VERTICAL_OVERHEAD)
    }

    /// Row offset (from the bubble top) of the copy action line, if shown.
    pub fn action_line_offset(height: u16) -> u16 {
        height.saturating_sub(VERTICAL_OVERHEAD)
    }
}

fn wrap_content(content: &str, width: u16) -> Vec<String> {
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    let options = textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);

    textwrap::wrap(content, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Formats the message time in local time with a strftime pattern.
///
/// Invalid patterns fall back to the raw timestamp instead of panicking.
pub fn format_time(message: &Message, pattern: &str) -> String {
    let Some(instant) = message.timestamp() else {
        return message.created_at.clone();
    };
    let mut out = String::new();
    if write!(out, "{}", instant.with_timezone(&Local).format(pattern)).is_err() {
        return message.created_at.clone();
    }
    out
}

fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Green),
        Role::Assistant => Style::default().fg(Color::Blue),
    }
}

impl<'a> Widget for MessageBubble<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let width = Self::bubble_width(self.message, area.width);
        let x = match self.message.role {
            Role::User => area.x + area.width.saturating_sub(width),
            Role::Assistant => area.x,
        };
        let bubble_area = Rect::new(x, area.y, width, area.height);

        let style = role_style(self.message.role);
        let border_style = if self.is_selected {
            Style::default().fg(Color::Cyan)
        } else {
            style.add_modifier(Modifier::DIM)
        };
        let title_alignment = match self.message.role {
            Role::User => Alignment::Right,
            Role::Assistant => Alignment::Left,
        };

        let block = Block::bordered()
            .title(self.message.role.label())
            .title_alignment(title_alignment)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(bubble_area);
        block.render(bubble_area, buf);

        let mut lines: Vec<Line> = wrap_content(&self.message.content, inner_area.width)
            .into_iter()
            .map(|line| Line::styled(line, style))
            .collect();

        lines.push(
            Line::styled(self.time_label.to_string(), Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Right),
        );

        if self.is_selected {
            let action = if self.is_copied {
                Line::styled(COPIED_LABEL, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            } else {
                Line::styled(COPY_LABEL, Style::default().fg(Color::Cyan))
            };
            lines.push(action);
        }

        Paragraph::new(lines).render(inner_area, buf);
    }
}
