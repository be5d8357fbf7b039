use chrono::{DateTime, TimeZone};
use log::{info, warn};

use crate::core::message::{GroupedMessages, build_thread};
use crate::source::provider::{FetchError, MessageSource};

/// Fetches once from `source` and builds the grouped thread.
///
/// `now` is read after the response arrives, so buckets reflect the moment of
/// grouping. Fails only when the request or the body as a whole fails;
/// individual records with bad dates are dropped.
pub async fn load<Tz, F>(source: &dyn MessageSource, now: F) -> Result<GroupedMessages, FetchError>
where
    Tz: TimeZone,
    F: FnOnce() -> DateTime<Tz>,
{
    let records = source.fetch().await.inspect_err(|e| {
        warn!("Load from {} source failed: {}", source.name(), e);
    })?;

    let grouped = build_thread(records, &now());
    info!(
        "Loaded {} messages in {} groups",
        grouped.message_count(),
        grouped.groups().len()
    );
    Ok(grouped)
}
