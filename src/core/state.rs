//! # View State
//!
//! Everything the viewer knows, in one place:
//!
//! ```text
//! ViewState
//! ├── phase: Phase                      // Loading | Ready(GroupedMessages) | Errored(String)
//! ├── load_requested: bool              // the one-shot load was spawned
//! ├── selected_id: Option<String>       // at most one selected message
//! ├── far_from_bottom: bool             // gates the jump-to-latest button
//! ├── copy_feedback: Option<CopyFeedback>  // "copied" indicator and its deadline
//! └── status_message: String           // title bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::time::{Duration, Instant};

use crate::core::message::{GroupedMessages, Message};

/// How long the "copied" indicator stays up after a successful copy.
pub const COPY_FEEDBACK_WINDOW: Duration = Duration::from_secs(2);

/// The list counts as "far from bottom" once the unseen content below the
/// viewport top exceeds this multiple of the viewport height.
pub const FAR_FROM_BOTTOM_FACTOR: f32 = 1.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready(GroupedMessages),
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFeedback {
    pub message_id: String,
    pub until: Instant,
}

/// Scroll geometry of the thread viewport, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub offset: u16,
    pub content_height: u16,
    pub viewport_height: u16,
}

impl ScrollMetrics {
    pub fn is_far_from_bottom(&self) -> bool {
        let remaining = self.content_height.saturating_sub(self.offset) as f32;
        remaining > self.viewport_height as f32 * FAR_FROM_BOTTOM_FACTOR
    }
}

pub struct ViewState {
    pub phase: Phase,
    pub load_requested: bool,
    pub selected_id: Option<String>,
    pub far_from_bottom: bool,
    pub copy_feedback: Option<CopyFeedback>,
    pub status_message: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            load_requested: false,
            selected_id: None,
            far_from_bottom: false,
            copy_feedback: None,
            status_message: String::from("Loading messages..."),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn messages(&self) -> Option<&GroupedMessages> {
        match &self.phase {
            Phase::Ready(grouped) => Some(grouped),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn selected_message(&self) -> Option<&Message> {
        let id = self.selected_id.as_deref()?;
        self.messages()?.find(id)
    }

    /// Jump-to-latest is only offered on a loaded thread.
    pub fn show_jump_to_bottom(&self) -> bool {
        self.messages().is_some() && self.far_from_bottom
    }

    pub fn is_copied(&self, message_id: &str) -> bool {
        self.copy_feedback
            .as_ref()
            .is_some_and(|feedback| feedback.message_id == message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_loading_with_nothing_selected() {
        let state = ViewState::new();
        assert!(state.is_loading());
        assert!(!state.load_requested);
        assert!(state.selected_id.is_none());
        assert!(!state.show_jump_to_bottom());
        assert_eq!(state.status_message, "Loading messages...");
    }

    #[test]
    fn far_from_bottom_uses_one_and_a_half_viewports() {
        let at = |offset| ScrollMetrics {
            offset,
            content_height: 100,
            viewport_height: 20,
        };
        assert!(at(0).is_far_from_bottom());
        assert!(at(69).is_far_from_bottom()); // 31 rows left > 30
        assert!(!at(70).is_far_from_bottom()); // exactly 30
        assert!(!at(80).is_far_from_bottom());
    }

    #[test]
    fn short_content_is_never_far_from_bottom() {
        let metrics = ScrollMetrics {
            offset: 0,
            content_height: 10,
            viewport_height: 20,
        };
        assert!(!metrics.is_far_from_bottom());
    }
}
