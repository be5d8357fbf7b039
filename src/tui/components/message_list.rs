//! # MessageList Component
//!
//! Scrollable view of the grouped thread.
//!
//! ## Responsibilities
//!
//! - Flatten `GroupedMessages` into rows (group headers + message bubbles)
//! - Manage scrolling, including the pinned-to-bottom mode
//! - Cache row heights for hit testing and partial rendering
//! - Report scroll geometry so the core can decide on the jump button
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the thread (props).
//!
//! Since `Component::render` takes `&mut self`, we can safely mutate the state
//! (including layout cache and scroll state) during the render pass, aligning
//! with Ratatui's `StatefulWidget` pattern.

use log::warn;
use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::{GroupedMessages, Message};
use crate::core::state::ScrollMetrics;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{MessageBubble, format_time};
use crate::tui::event::TuiEvent;

/// Blank spacer line plus the label line.
const HEADER_HEIGHT: u16 = 2;

/// One renderable row of the thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Row<'a> {
    Header(&'a str),
    Message(&'a Message),
}

/// Flattens the thread into rows in render order.
pub fn thread_rows(grouped: &GroupedMessages) -> Vec<Row<'_>> {
    let mut rows = Vec::with_capacity(grouped.message_count() + grouped.groups().len());
    for group in grouped.groups() {
        rows.push(Row::Header(&group.label));
        rows.extend(group.messages.iter().map(Row::Message));
    }
    rows
}

/// Index of the row holding the message with `id`.
pub fn row_of(rows: &[Row<'_>], id: &str) -> Option<usize> {
    rows.iter()
        .position(|row| matches!(row, Row::Message(message) if message.id == id))
}

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, the next frames keep the view scrolled to the bottom
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: false,
            viewport_height: 0,
        }
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.layout.total_height().saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Move the offset to the last full page of content.
    pub fn pin_to_bottom(&mut self) {
        let max_y = self.layout.total_height().saturating_sub(self.viewport_height);
        self.scroll_state.set_offset(Position { x: 0, y: max_y });
    }

    /// Clamp scroll and re-engage pinning if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.layout.total_height().saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Current scroll geometry. Reflects the last rendered frame.
    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.scroll_state.offset().y,
            content_height: self.layout.total_height(),
            viewport_height: self.viewport_height,
        }
    }

    /// Whether the last row (the bottom anchor) is inside the viewport.
    pub fn bottom_in_view(&self) -> bool {
        let offset = self.scroll_state.offset().y;
        offset.saturating_add(self.viewport_height) >= self.layout.total_height()
    }
}

/// Scrollable thread view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub thread: &'a GroupedMessages,
    pub selected_id: Option<&'a str>,
    pub copied_id: Option<&'a str>,
    pub time_format: &'a str,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        thread: &'a GroupedMessages,
        selected_id: Option<&'a str>,
        copied_id: Option<&'a str>,
        time_format: &'a str,
    ) -> Self {
        Self {
            state,
            thread,
            selected_id,
            copied_id,
            time_format,
        }
    }
}

fn row_height(row: &Row<'_>, width: u16, selected_id: Option<&str>) -> u16 {
    match row {
        Row::Header(_) => HEADER_HEIGHT,
        Row::Message(message) => {
            let is_selected = selected_id == Some(message.id.as_str());
            MessageBubble::calculate_height(message, width, is_selected)
        }
    }
}

/// Centered `── label ──` group header.
struct GroupHeader<'a> {
    label: &'a str,
}

impl Widget for GroupHeader<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        if area.height < HEADER_HEIGHT {
            return;
        }
        let label_area = Rect::new(area.x, area.y + 1, area.width, 1);
        let line = Line::styled(
            format!("── {} ──", self.label),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        );
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(label_area, buf);
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let rows = thread_rows(self.thread);
        let selected_row = self.selected_id.and_then(|id| row_of(&rows, id));

        // 1. Update Layout Cache (Internal Mutation)
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(rows.len(), content_width, selected_row);
        layout.heights.truncate(reusable.min(layout.heights.len()));
        for row in rows.iter().skip(layout.heights.len()) {
            layout.heights.push(row_height(row, content_width, self.selected_id));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(rows.len(), content_width, selected_row);
        if layout.overflowed && !layout.overflow_reported {
            warn!(
                "Thread is taller than {} rows; later messages are not drawn",
                u16::MAX
            );
            layout.overflow_reported = true;
        }

        let total_height = self.state.layout.total_height();

        // 2. Clamp scroll offset to prevent overscrolling past content
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            self.state.pin_to_bottom();
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible rows into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let height = self.state.layout.heights[i];
            let row_rect = Rect::new(0, y_offset, content_width, height);

            match rows[i] {
                Row::Header(label) => {
                    scroll_view.render_widget(GroupHeader { label }, row_rect);
                }
                Row::Message(message) => {
                    let time_label = format_time(message, self.time_format);
                    let is_selected = self.selected_id == Some(message.id.as_str());
                    let is_copied = self.copied_id == Some(message.id.as_str());
                    let bubble = MessageBubble::new(message, &time_label, is_selected, is_copied);
                    scroll_view.render_widget(bubble, row_rect);
                }
            }

            y_offset = y_offset.saturating_add(height);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList`
/// because `MessageList` is recreated each frame and can't hold scroll state.
impl EventHandler for MessageListState {
    type Event = (); // Scroll changes are reported through metrics() after the next draw

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::JumpToBottom => {
                self.stick_to_bottom = true;
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
///
/// Offsets are `u16` because the scroll canvas is. Prefix sums saturate at
/// `u16::MAX`; rows that start past it are never drawn and `overflowed` is set.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    /// True when the summed heights exceed what the canvas can address.
    pub overflowed: bool,
    overflow_reported: bool,
    row_count: usize,
    content_width: u16,
    /// Selected row at the time of caching; its height includes the copy line.
    cached_selected_row: Option<usize>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            overflowed: false,
            overflow_reported: false,
            row_count: 0,
            content_width: 0,
            cached_selected_row: None,
        }
    }

    /// Number of leading cached heights that are still valid.
    pub fn reusable_count(&self, row_count: usize, content_width: u16, selected_row: Option<usize>) -> usize {
        if self.content_width != content_width || self.heights.is_empty() || row_count != self.row_count {
            return 0;
        }

        // Selection moved → the old and new selected rows change height.
        // Invalidate from the earliest of the two onward.
        if selected_row != self.cached_selected_row {
            return [selected_row, self.cached_selected_row]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(row_count);
        }

        row_count
    }

    pub fn update_metadata(&mut self, row_count: usize, content_width: u16, selected_row: Option<usize>) {
        self.row_count = row_count;
        self.content_width = content_width;
        self.cached_selected_row = selected_row;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
        let exact: u32 = self.heights.iter().map(|&h| u32::from(h)).sum();
        self.overflowed = exact > u32::from(u16::MAX);
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
