//! Occurrence arithmetic for one-shot and repeating events.
//!
//! Everything is computed on absolute UTC instants so offsets and daylight
//! saving never shift a draw.

use time::{Duration, OffsetDateTime};

/// Instant of the first draw, independent of the current time.
///
/// `None` when the instant is not representable.
pub fn first_draw_instant(start: OffsetDateTime, duration: Duration) -> Option<OffsetDateTime> {
    start.checked_add(duration)
}

/// Returns the next draw instant of an event, or `None` if it never draws again.
///
/// An instant past the representable range also yields `None`.
///
/// - Before `start`, the first draw is still pending.
/// - A one-shot event (`repeat_interval` of zero) draws at `start + duration`
///   and expires once that instant is reached.
/// - A repeating event draws at `start + k * repeat_interval + duration` with
///   `k = ceil((now - start) / repeat_interval)`.
pub fn next_draw_instant(
    start: OffsetDateTime,
    duration: Duration,
    repeat_interval: Duration,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    if now < start {
        return first_draw_instant(start, duration);
    }
    if !repeat_interval.is_positive() {
        return first_draw_instant(start, duration).filter(|first| now < *first);
    }

    // `now >= start` here, so both operands are non-negative.
    let elapsed = (now - start).whole_nanoseconds();
    let interval = repeat_interval.whole_nanoseconds();
    let k = (elapsed + interval - 1) / interval;
    let next = start
        .unix_timestamp_nanos()
        .checked_add(k.checked_mul(interval)?)?
        .checked_add(duration.whole_nanoseconds())?;

    OffsetDateTime::from_unix_timestamp_nanos(next).ok()
}
