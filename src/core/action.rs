//! # Actions
//!
//! Everything that can happen in the viewer becomes an `Action`.
//! The load finishes? That's `Action::LoadSucceeded(grouped)`.
//! The user clicks a message? That's `Action::ToggleSelection(id)`.
//!
//! `update()` applies an action to the state and returns the `Effect` the
//! adapter has to carry out (spawn the load, scroll, write the clipboard).
//! No I/O here, and no clock reads: times arrive inside the actions.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use std::time::Instant;

use log::{debug, warn};

use crate::core::message::GroupedMessages;
use crate::core::state::{COPY_FEEDBACK_WINDOW, CopyFeedback, Phase, ScrollMetrics, ViewState};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The view became visible. Requests the one-shot load.
    Mount,
    LoadSucceeded(GroupedMessages),
    LoadFailed(String),
    /// The viewport scrolled or resized.
    Scrolled(ScrollMetrics),
    JumpToBottom,
    ToggleSelection(String),
    ClearSelection,
    CopySelected,
    CopySucceeded { message_id: String, at: Instant },
    CopyFailed(String),
    /// Periodic clock signal, used to expire the "copied" indicator.
    Tick(Instant),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    SpawnLoad,
    ScrollToBottom,
    CopyToClipboard { message_id: String, content: String },
    Quit,
}

pub fn update(state: &mut ViewState, action: Action) -> Effect {
    debug!("update: {}", action_name(&action));
    match action {
        Action::Mount => {
            if state.load_requested {
                return Effect::None;
            }
            state.load_requested = true;
            Effect::SpawnLoad
        }
        Action::LoadSucceeded(grouped) => {
            if !state.is_loading() {
                return Effect::None;
            }
            state.status_message = format!(
                "{} messages in {} groups",
                grouped.message_count(),
                grouped.groups().len()
            );
            state.phase = Phase::Ready(grouped);
            Effect::ScrollToBottom
        }
        Action::LoadFailed(message) => {
            if !state.is_loading() {
                return Effect::None;
            }
            state.status_message = String::from("Load failed");
            state.phase = Phase::Errored(message);
            Effect::None
        }
        Action::Scrolled(metrics) => {
            if state.messages().is_some() {
                state.far_from_bottom = metrics.is_far_from_bottom();
            }
            Effect::None
        }
        Action::JumpToBottom => {
            if !state.show_jump_to_bottom() {
                return Effect::None;
            }
            state.far_from_bottom = false;
            Effect::ScrollToBottom
        }
        Action::ToggleSelection(id) => {
            let Some(grouped) = state.messages() else {
                return Effect::None;
            };
            if grouped.find(&id).is_none() {
                return Effect::None;
            }
            if state.selected_id.as_deref() == Some(id.as_str()) {
                state.selected_id = None;
            } else {
                state.selected_id = Some(id);
            }
            Effect::None
        }
        Action::ClearSelection => {
            state.selected_id = None;
            Effect::None
        }
        Action::CopySelected => match state.selected_message() {
            Some(message) => Effect::CopyToClipboard {
                message_id: message.id.clone(),
                content: message.content.clone(),
            },
            None => Effect::None,
        },
        Action::CopySucceeded { message_id, at } => {
            state.copy_feedback = Some(CopyFeedback {
                message_id,
                until: at + COPY_FEEDBACK_WINDOW,
            });
            Effect::None
        }
        Action::CopyFailed(reason) => {
            warn!("Clipboard write failed: {}", reason);
            Effect::None
        }
        Action::Tick(now) => {
            if state
                .copy_feedback
                .as_ref()
                .is_some_and(|feedback| now >= feedback.until)
            {
                state.copy_feedback = None;
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

/// Short action name for logs; payloads (whole threads, clipboard text) stay out.
fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Mount => "Mount",
        Action::LoadSucceeded(_) => "LoadSucceeded",
        Action::LoadFailed(_) => "LoadFailed",
        Action::Scrolled(_) => "Scrolled",
        Action::JumpToBottom => "JumpToBottom",
        Action::ToggleSelection(_) => "ToggleSelection",
        Action::ClearSelection => "ClearSelection",
        Action::CopySelected => "CopySelected",
        Action::CopySucceeded { .. } => "CopySucceeded",
        Action::CopyFailed(_) => "CopyFailed",
        Action::Tick(_) => "Tick",
        Action::Quit => "Quit",
    }
}
