//! Validates the requested date window and splits it into service-sized
//! chunks.

use crate::error::{NldasError, VALID_DATE_WINDOW};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// The first hourly stamp the service publishes (1979-01-01 13:00 UTC).
pub(crate) const SERVICE_EPOCH: NaiveDateTime = expect_datetime(1979, 1, 1, 13);

/// Longest span a single service request may cover, in days.
pub(crate) const MAX_CHUNK_DAYS: i64 = 10_000;

const fn expect_datetime(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => match date.and_hms_opt(hour, 0, 0) {
            Some(dt) => dt,
            None => panic!("invalid time literal"),
        },
        None => panic!("invalid date literal"),
    }
}

/// Resolves calendar dates into the retrieval window
/// `[start 00:00, end_date 00:00 + 1 day)` and checks it against the
/// service's supported range.
///
/// `now` is injected so the "yesterday" bound is testable.
pub(crate) fn resolve_window(
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: NaiveDateTime,
) -> Result<(NaiveDateTime, NaiveDateTime), NldasError> {
    if end_date < start_date {
        return Err(NldasError::InvalidInput {
            param: "end_date",
            expected: "a date on or after start_date".to_string(),
        });
    }
    let start = start_date.and_time(NaiveTime::MIN);
    let end = end_date.and_time(NaiveTime::MIN) + Duration::days(1);
    if start < SERVICE_EPOCH {
        return Err(NldasError::DateOutOfRange {
            field: "start_date",
            valid: VALID_DATE_WINDOW,
        });
    }
    if end > now - Duration::days(1) {
        return Err(NldasError::DateOutOfRange {
            field: "end_date",
            valid: VALID_DATE_WINDOW,
        });
    }
    Ok((start, end))
}

/// Splits `[start, end)` into consecutive `(chunk_start, chunk_end)` pairs
/// of at most `max_days` each.
///
/// Walks from `start` in `max_days` steps and closes the sequence with
/// `end`, so the final chunk's end always equals the overall end.
/// Consecutive chunks share their boundary instant.
pub(crate) fn partition_window(
    start: NaiveDateTime,
    end: NaiveDateTime,
    max_days: i64,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let step = Duration::days(max_days);
    let mut points = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        points.push(cursor);
        cursor += step;
    }
    if points.last().is_some_and(|last| *last < end) {
        points.push(end);
    }
    points.windows(2).map(|pair| (pair[0], pair[1])).collect()
}
