//! Structured tracing for relation query entry points.
//!
//! Events use target `rtc::query_json` and are meant to be read with
//! `RTC_LOG=rtc::query_json=trace RTC_LOG_FORMAT=json`.
//!
//! `RTC_QUERY_RUN_ID`, when set, is attached to every event.

use crate::types::TypeId;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "rtc::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| std::env::var("RTC_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string()))
        .as_str()
}

/// `source` is absent for value queries on a dangling reference.
#[inline]
pub(crate) fn relation_start(
    query_id: u64,
    op: &'static str,
    source: Option<TypeId>,
    target: TypeId,
) {
    trace!(
        target: "rtc::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        source_type_id = source.map(|id| id.0),
        target_type_id = target.0
    );
}

#[inline]
pub(crate) fn relation_end(query_id: u64, op: &'static str, result: bool, depth_exceeded: bool) {
    trace!(
        target: "rtc::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        result,
        depth_exceeded
    );
}
