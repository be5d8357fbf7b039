//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;

use crate::core::action::{Action, update};
use crate::core::message::{GroupedMessages, RawMessageRecord, build_thread, parse_timestamp};
use crate::core::state::ViewState;
use crate::source::{FetchError, MessageSource};

/// A source that answers from memory.
pub struct StaticSource {
    result: Result<Vec<RawMessageRecord>, FetchError>,
}

impl StaticSource {
    pub fn records(records: Vec<RawMessageRecord>) -> Self {
        Self {
            result: Ok(records),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl MessageSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<Vec<RawMessageRecord>, FetchError> {
        self.result.clone()
    }
}

/// Builds a raw record the way the relay sends it.
pub fn raw(date: &str, text: &str, bot_sender: bool) -> RawMessageRecord {
    RawMessageRecord {
        business_id: Some(1),
        message_text: text.to_string(),
        message_date: Some(date.to_string()),
        platform: Some("web".to_string()),
        bot_sender,
    }
}

/// Three messages in two groups ("Yesterday", "Today"), grouped at 2024-01-05 noon UTC.
pub fn sample_thread() -> GroupedMessages {
    let now = parse_timestamp("2024-01-05T12:00:00Z").expect("valid fixture date");
    build_thread(
        vec![
            raw("2024-01-05T10:00:00Z", "hi", false),
            raw("2024-01-05T10:05:00Z", "hello! how can I help?", true),
            raw("2024-01-04T09:00:00Z", "are you there?", false),
        ],
        &now,
    )
}

/// A view state that has finished loading `sample_thread()`.
pub fn ready_state() -> ViewState {
    let mut state = ViewState::new();
    update(&mut state, Action::Mount);
    update(&mut state, Action::LoadSucceeded(sample_thread()));
    state
}

/// A thread long enough to scroll in a small terminal.
pub fn long_thread(count: usize) -> GroupedMessages {
    let now = parse_timestamp("2024-01-05T23:00:00Z").expect("valid fixture date");
    let records = (0..count)
        .map(|i| {
            raw(
                &format!("2024-01-05T{:02}:{:02}:00Z", (i / 60) % 24, i % 60),
                &format!("message number {i}"),
                i % 2 == 1,
            )
        })
        .collect();
    build_thread(records, &now)
}
