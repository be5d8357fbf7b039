use crate::core::message::{GroupedMessages, Role};
use crate::core::state::{Phase, ViewState};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::message_list::{Row, thread_rows};
use crate::tui::components::{
    ErrorView, JumpButton, LoadingView, MessageBubble, MessageList, TitleBar,
};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

const HELP_TEXT: &str = "click select · c copy · End latest · Esc clear · q quit";

/// Title row, thread, help row.
pub fn main_layout(area: Rect) -> [Rect; 3] {
    use Constraint::{Length, Min};
    Layout::vertical([Length(1), Min(0), Length(1)]).areas(area)
}

pub fn draw_ui(frame: &mut Frame, state: &ViewState, tui: &mut TuiState) {
    let [title_area, main_area, help_area] = main_layout(frame.area());
    tui.jump_button_area = None;

    match &state.phase {
        Phase::Loading => LoadingView.render(frame, main_area),
        Phase::Errored(message) => ErrorView::new(message).render(frame, main_area),
        Phase::Ready(grouped) => {
            let copied_id = state
                .copy_feedback
                .as_ref()
                .map(|feedback| feedback.message_id.as_str());
            MessageList::new(
                &mut tui.message_list,
                grouped,
                state.selected_id.as_deref(),
                copied_id,
                &tui.time_format,
            )
            .render(frame, main_area);

            if state.show_jump_to_bottom()
                && let Some(area) = JumpButton::area(main_area)
            {
                JumpButton.render(frame, area);
                tui.jump_button_area = Some(area);
            }
        }
    }

    TitleBar::new(
        tui.source_name.clone(),
        state.status_message.clone(),
        state.show_jump_to_bottom(),
    )
    .render(frame, title_area);

    frame.render_widget(
        Span::styled(HELP_TEXT, Style::default().fg(Color::DarkGray)),
        help_area,
    );
}

/// What a mouse click landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Message { id: String, on_copy_line: bool },
    JumpButton,
    Nothing,
}

/// Hit test: given a screen Y coordinate, find which row (if any) is at that
/// position and the Y offset inside that row.
pub fn hit_test_row(
    screen_y: u16,
    main_area: Rect,
    scroll_offset_y: u16,
    prefix_heights: &[u16],
) -> Option<(usize, u16)> {
    // Check if mouse is within the main content area
    if screen_y < main_area.y || screen_y >= main_area.y + main_area.height {
        return None;
    }

    // Convert screen Y to content Y (accounting for scroll)
    let content_y = (screen_y - main_area.y).saturating_add(scroll_offset_y);

    let index = prefix_heights.partition_point(|&end| end <= content_y);
    if index >= prefix_heights.len() {
        return None; // Below all content
    }
    let row_top = if index == 0 { 0 } else { prefix_heights[index - 1] };
    Some((index, content_y - row_top))
}

/// Resolves a click at (`col`, `row`) against the last drawn frame.
pub fn hit_test(col: u16, row: u16, frame_area: Rect, state: &ViewState, tui: &TuiState) -> Hit {
    if tui
        .jump_button_area
        .is_some_and(|area| area.contains((col, row).into()))
    {
        return Hit::JumpButton;
    }

    let Some(grouped) = state.messages() else {
        return Hit::Nothing;
    };
    let [_, main_area, _] = main_layout(frame_area);
    let list = &tui.message_list;
    let Some((index, local_y)) = hit_test_row(
        row,
        main_area,
        list.scroll_state.offset().y,
        &list.layout.prefix_heights,
    ) else {
        return Hit::Nothing;
    };

    message_hit(grouped, index, local_y, col, main_area, state, tui)
}

fn message_hit(
    grouped: &GroupedMessages,
    index: usize,
    local_y: u16,
    col: u16,
    main_area: Rect,
    state: &ViewState,
    tui: &TuiState,
) -> Hit {
    let rows = thread_rows(grouped);
    let Some(Row::Message(message)) = rows.get(index).copied() else {
        return Hit::Nothing;
    };

    // Only the bubble itself is clickable, not the empty side of the row.
    let content_width = main_area.width.saturating_sub(1);
    let width = MessageBubble::bubble_width(message, content_width);
    let left = match message.role {
        Role::User => main_area.x + content_width.saturating_sub(width),
        Role::Assistant => main_area.x,
    };
    if col < left || col >= left + width {
        return Hit::Nothing;
    }

    let is_selected = state.selected_id.as_deref() == Some(message.id.as_str());
    let height = tui.message_list.layout.heights.get(index).copied().unwrap_or(0);
    let on_copy_line = is_selected && local_y == MessageBubble::action_line_offset(height);

    Hit::Message {
        id: message.id.clone(),
        on_copy_line,
    }
}

/// Screen row where the message's copy line is drawn, if it is on screen.
#[cfg(test)]
fn copy_line_screen_y(state: &ViewState, tui: &TuiState, frame_area: Rect, id: &str) -> Option<u16> {
    let grouped = state.messages()?;
    let index = crate::tui::components::message_list::row_of(&thread_rows(grouped), id)?;
    let layout = &tui.message_list.layout;
    let top = if index == 0 { 0 } else { layout.prefix_heights[index - 1] };
    let y = top + MessageBubble::action_line_offset(layout.heights[index]);
    let [_, main_area, _] = main_layout(frame_area);
    let offset = tui.message_list.scroll_state.offset().y;
    let screen = y.checked_sub(offset)?;
    (screen < main_area.height).then_some(main_area.y + screen)
}
