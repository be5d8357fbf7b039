//! # Message Model
//!
//! Turns the records delivered by the message source into the display model.
//!
//! ```text
//! Vec<RawMessageRecord>
//!        │  normalize()       id = "<message_date>-<index>", role from bot_sender,
//!        ▼                    records with missing/unparseable dates dropped
//! Vec<Message>
//!        │  group_messages()  stable sort by instant, bucket against `now`
//!        ▼
//! GroupedMessages            "Today" | "Yesterday" | "This Week" | "January 5, 2024"
//! ```
//!
//! Everything here is pure. "Now" is passed in, so grouping is reproducible in tests.

use chrono::{Datelike, DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const TODAY_LABEL: &str = "Today";
pub const YESTERDAY_LABEL: &str = "Yesterday";
pub const THIS_WEEK_LABEL: &str = "This Week";

/// Label format for anything older than the current week, e.g. "January 5, 2024".
const DATE_LABEL_FORMAT: &str = "%B %-d, %Y";

/// Timestamp layouts accepted without an explicit offset. Read as local wall-clock time.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// A record exactly as the message source sends it.
///
/// Every field is lenient: a null or mistyped value never fails the record.
/// A non-string `message_date` becomes `None`, so `normalize` drops the record.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RawMessageRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub business_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message_text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub bot_sender: bool,
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_i64())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Scalars are shown as their text; null and containers as nothing.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

/// Truthiness of a loosely typed flag: null, false, 0 and "" are false.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Parses a response body holding a JSON array of records.
///
/// Only a body that is not an array fails. An element that is not an object
/// becomes an empty record, which keeps the array index of every later record
/// and is dropped by `normalize` for lack of a date.
pub fn parse_records(body: &str) -> Result<Vec<RawMessageRecord>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(body)?;
    let mut unreadable = 0;
    let records: Vec<RawMessageRecord> = values
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|_| {
                unreadable += 1;
                RawMessageRecord::default()
            })
        })
        .collect();

    if unreadable > 0 {
        debug!("{} of {} records were not objects", unreadable, records.len());
    }
    Ok(records)
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn from_bot_sender(bot_sender: bool) -> Self {
        if bot_sender {
            Role::Assistant
        } else {
            Role::User
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: Role,
    /// Original timestamp string, kept for redisplay.
    pub created_at: String,
}

impl Message {
    /// Builds a message from the record at `index` in the raw sequence.
    pub fn from_raw(index: usize, record: RawMessageRecord) -> Self {
        let created_at = record.message_date.unwrap_or_default();
        Self {
            id: format!("{}-{}", created_at, index),
            content: record.message_text,
            role: Role::from_bot_sender(record.bot_sender),
            created_at,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// Parses a source timestamp into an absolute instant.
///
/// Accepts RFC 3339, RFC 2822, offset-less `YYYY-MM-DD[T ]HH:MM:SS[.fff]`
/// and bare `YYYY-MM-DD`. Offset-less date-times are local time; a bare date
/// is midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_in(raw, &Local)
}

/// `parse_timestamp` with offset-less date-times read in `zone`.
pub fn parse_timestamp_in<Tz: TimeZone>(raw: &str, zone: &Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return from_wall_clock(&naive, zone);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolves a wall-clock time in `zone`. Ambiguous times take the earlier
/// instant; times skipped by a DST gap move forward an hour.
fn from_wall_clock<Tz: TimeZone>(naive: &NaiveDateTime, zone: &Tz) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(naive)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(*naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Maps raw records to messages, silently dropping those without a usable date.
pub fn normalize(records: Vec<RawMessageRecord>) -> Vec<Message> {
    let total = records.len();
    let messages: Vec<Message> = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| Message::from_raw(index, record))
        .filter(|message| message.timestamp().is_some())
        .collect();

    if messages.len() < total {
        debug!(
            "Dropped {} of {} records with missing or unparseable dates",
            total - messages.len(),
            total
        );
    }
    messages
}

/// Picks the display bucket for `instant`, evaluated in `now`'s timezone.
///
/// Precedence is Today, Yesterday, This Week (Monday-start), then the date itself.
pub fn bucket_label<Tz: TimeZone>(instant: &DateTime<Utc>, now: &DateTime<Tz>) -> String {
    let day = instant.with_timezone(&now.timezone()).date_naive();
    let today = now.date_naive();

    if day == today {
        TODAY_LABEL.to_string()
    } else if today.pred_opt() == Some(day) {
        YESTERDAY_LABEL.to_string()
    } else if day.iso_week() == today.iso_week() {
        THIS_WEEK_LABEL.to_string()
    } else {
        day.format(DATE_LABEL_FORMAT).to_string()
    }
}

/// A labelled run of messages, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageGroup {
    pub label: String,
    pub messages: Vec<Message>,
}

/// Ordered label → messages mapping. Labels keep first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedMessages {
    groups: Vec<MessageGroup>,
}

impl GroupedMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` to the group named `label`, creating it at the end if new.
    pub fn push(&mut self, label: String, message: Message) {
        match self.groups.iter_mut().find(|group| group.label == label) {
            Some(group) => group.messages.push(message),
            None => self.groups.push(MessageGroup {
                label,
                messages: vec![message],
            }),
        }
    }

    pub fn groups(&self) -> &[MessageGroup] {
        &self.groups
    }

    pub fn get(&self, label: &str) -> Option<&[Message]> {
        self.groups
            .iter()
            .find(|group| group.label == label)
            .map(|group| group.messages.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.label.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn message_count(&self) -> usize {
        self.groups.iter().map(|group| group.messages.len()).sum()
    }

    /// All messages in render order.
    pub fn iter_messages(&self) -> impl Iterator<Item = &Message> {
        self.groups.iter().flat_map(|group| group.messages.iter())
    }

    pub fn find(&self, id: &str) -> Option<&Message> {
        self.iter_messages().find(|message| message.id == id)
    }

    pub fn flatten(&self) -> Vec<Message> {
        self.iter_messages().cloned().collect()
    }
}

/// Sorts messages by instant (stable for ties) and buckets them against `now`.
///
/// Messages whose timestamp does not parse are skipped.
pub fn group_messages<Tz: TimeZone>(messages: Vec<Message>, now: &DateTime<Tz>) -> GroupedMessages {
    let mut dated: Vec<(DateTime<Utc>, Message)> = messages
        .into_iter()
        .filter_map(|message| message.timestamp().map(|instant| (instant, message)))
        .collect();
    dated.sort_by_key(|(instant, _)| *instant);

    let mut grouped = GroupedMessages::new();
    for (instant, message) in dated {
        grouped.push(bucket_label(&instant, now), message);
    }
    grouped
}

/// Full transformation from source records to the grouped thread.
pub fn build_thread<Tz: TimeZone>(records: Vec<RawMessageRecord>, now: &DateTime<Tz>) -> GroupedMessages {
    let grouped = group_messages(normalize(records), now);
    debug!(
        "Built thread: {} messages in {} groups",
        grouped.message_count(),
        grouped.groups().len()
    );
    grouped
}
