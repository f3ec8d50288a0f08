//! Composed date/time/timezone lexical I/O and calendar arithmetic (§4.K),
//! grounded on `original_source/src/date_time.c`.

use crate::date::{days_in_month, DateFields};
use crate::duration::Duration;
use crate::status::{FixedResult, Status};
use crate::time::TimeFields;
use crate::timezone::{self, LOCAL};

/// A `dateTime` value. `time.hour == 24` (the `24:00:00` tolerance) is
/// preserved as read — [`read_date_time`] does not roll it into the next
/// day. Only canonicalization ([`canonicalize_midnight`], used by
/// [`crate::value::write_canonical`]) performs that wrap; the plain
/// reader/writer pair round-trips the alias as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeFields {
    pub date: DateFields,
    pub time: TimeFields,
    pub timezone: i8,
}

/// Calendar arithmetic saturates to these sentinels instead of wrapping or
/// panicking when a duration addition would overflow the representable
/// range: `year` at its type's extreme with every other numeric field at
/// its own type's extreme (`month`/`day`/`hour`/`minute`/`second` at `255`,
/// `nanosecond` at `u32::MAX` for the future sentinel; everything `0` for
/// the past one) — detectable by `year == i16::MAX && month == 255` or
/// `year == i16::MIN && month == 0`, matching the original's treatment of
/// out-of-range results as a definite (if unbounded) point rather than an
/// error.
pub const INFINITE_PAST: DateTimeFields = DateTimeFields {
    date: DateFields::new(i16::MIN, 0, 0),
    time: TimeFields::new(0, 0, 0, 0),
    timezone: 0,
};
pub const INFINITE_FUTURE: DateTimeFields = DateTimeFields {
    date: DateFields::new(i16::MAX, 255, 255),
    time: TimeFields::new(255, 255, 255, u32::MAX),
    timezone: 0,
};

fn is_future_sentinel(date: DateFields) -> bool {
    date.year == i16::MAX && date.month == 255
}

fn is_past_sentinel(date: DateFields) -> bool {
    date.year == i16::MIN && date.month == 0
}

pub fn read_date_time(s: &[u8]) -> (Status, DateTimeFields, usize) {
    let (status, date, n_date) = crate::date::read_date(s);
    if !status.is_success() {
        return (status, INFINITE_PAST, 0);
    }
    let mut i = n_date;
    if s.get(i) != Some(&b'T') {
        return (Status::ExpectedTimeSep, INFINITE_PAST, 0);
    }
    i += 1;
    let (status, time, n_time) = crate::time::read_time(&s[i..]);
    if !status.is_success() {
        return (status, INFINITE_PAST, 0);
    }
    i += n_time;
    let (status, tz, n_tz) = timezone::read_timezone(&s[i..]);
    if !status.is_success() {
        return (status, INFINITE_PAST, 0);
    }
    i += n_tz;

    (Status::Success, DateTimeFields { date, time, timezone: tz }, i)
}

pub fn write_date_time(dt: DateTimeFields, dst: &mut [u8]) -> FixedResult {
    let date_r = crate::date::write_date(dt.date, dst);
    if !date_r.is_success() {
        return date_r;
    }
    let mut i = date_r.count;
    if dst.len() < i + 1 {
        return FixedResult::err(Status::NoSpace);
    }
    dst[i] = b'T';
    i += 1;
    let time_r = crate::time::write_time(dt.time, &mut dst[i..]);
    if !time_r.is_success() {
        return time_r;
    }
    i += time_r.count;
    let tz_r = timezone::write_timezone(dt.timezone, &mut dst[i..]);
    if !tz_r.is_success() {
        return tz_r;
    }
    i += tz_r.count;
    FixedResult::ok(i)
}

/// Add `days` (may be negative) to a date, rolling over month/year
/// boundaries. Saturates to [`INFINITE_FUTURE`]/[`INFINITE_PAST`]'s date
/// on overflow.
pub fn add_days(date: DateFields, days: i64) -> DateFields {
    let mut year = i64::from(date.year);
    let mut month = date.month as i64;
    let mut day = date.day as i64 + days;

    loop {
        if day < 1 {
            month -= 1;
            if month < 1 {
                month = 12;
                year -= 1;
                if year < i64::from(i16::MIN) {
                    return INFINITE_PAST.date;
                }
            }
            day += i64::from(days_in_month(year as i16, month as u8));
        } else {
            let in_month = i64::from(days_in_month(year as i16, month as u8));
            if day <= in_month {
                break;
            }
            day -= in_month;
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
                if year > i64::from(i16::MAX) {
                    return INFINITE_FUTURE.date;
                }
            }
        }
    }

    DateFields::new(year as i16, month as u8, day as u8)
}

/// Add `months` (may be negative) to a date. Days that overflow the
/// target month clamp to the last valid day (per XSD's `dateTime` +
/// `duration` semantics), e.g. Jan 31 + 1 month = Feb 28/29.
pub fn add_months(date: DateFields, months: i64) -> DateFields {
    let total = i64::from(date.year) * 12 + i64::from(date.month) - 1 + months;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u8;
    if year > i64::from(i16::MAX) {
        return INFINITE_FUTURE.date;
    }
    if year < i64::from(i16::MIN) {
        return INFINITE_PAST.date;
    }
    let year = year as i16;
    let day = date.day.min(days_in_month(year, month));
    DateFields::new(year, month, day)
}

/// Add a [`Duration`] to a `dateTime`, composing month-then-second
/// arithmetic as XSD's `op:add-yearMonthDuration-to-dateTime` /
/// `op:add-dayTimeDuration-to-dateTime` do in sequence.
pub fn add_duration(dt: DateTimeFields, d: Duration) -> DateTimeFields {
    let month_delta = if d.negative { -(d.months as i64) } else { d.months as i64 };
    let date = add_months(dt.date, month_delta);
    if is_future_sentinel(date) {
        return DateTimeFields { date, time: INFINITE_FUTURE.time, timezone: dt.timezone };
    }
    if is_past_sentinel(date) {
        return DateTimeFields { date, time: INFINITE_PAST.time, timezone: dt.timezone };
    }

    let mut total_nanos = i128::from(dt.time.nanosecond) + i128::from(d.nanoseconds) * if d.negative { -1 } else { 1 };
    let mut total_seconds = i128::from(dt.time.hour) * 3600
        + i128::from(dt.time.minute) * 60
        + i128::from(dt.time.second)
        + if d.negative { -(d.seconds as i128) } else { d.seconds as i128 };

    // Borrow/carry between the nanosecond and whole-second fields.
    if total_nanos < 0 {
        total_seconds -= 1;
        total_nanos += 1_000_000_000;
    } else if total_nanos >= 1_000_000_000 {
        total_seconds += 1;
        total_nanos -= 1_000_000_000;
    }

    let day_delta = total_seconds.div_euclid(86_400);
    let seconds_of_day = total_seconds.rem_euclid(86_400);

    let date = add_days(date, day_delta as i64);
    if is_future_sentinel(date) {
        return DateTimeFields { date, time: INFINITE_FUTURE.time, timezone: dt.timezone };
    }
    if is_past_sentinel(date) {
        return DateTimeFields { date, time: INFINITE_PAST.time, timezone: dt.timezone };
    }
    let hour = (seconds_of_day / 3600) as u8;
    let minute = ((seconds_of_day % 3600) / 60) as u8;
    let second = (seconds_of_day % 60) as u8;

    DateTimeFields {
        date,
        time: TimeFields::new(hour, minute, second, total_nanos as u32),
        timezone: dt.timezone,
    }
}

/// Resolve a `24:00:00` end-of-day alias into the canonical next-day
/// midnight, per §9's "midnight-wrap is only invoked by the canonicalizer"
/// design note. A no-op for any value that doesn't carry the alias — adding
/// a zero duration to an ordinary time never changes its fields.
pub fn canonicalize_midnight(dt: DateTimeFields) -> DateTimeFields {
    add_duration(dt, Duration::zero())
}

/// Normalize to UTC by applying the timezone offset, clearing the zone to
/// `Z`. A [`LOCAL`] (zone-unspecified) value is returned unchanged — there
/// is no offset to apply.
pub fn to_utc(dt: DateTimeFields) -> DateTimeFields {
    if dt.timezone == LOCAL || dt.timezone == 0 {
        return DateTimeFields {
            timezone: 0,
            ..dt
        };
    }
    let minutes = i64::from(dt.timezone) * 15;
    let mut d = Duration::zero();
    d.negative = minutes < 0;
    d.seconds = (minutes.unsigned_abs()) * 60;
    // Subtract the offset to convert local time to UTC.
    d.negative = !d.negative;
    add_duration(dt, d)
}

/// XSD's five-valued `dateTime` order. Unlike [`crate::duration::compare`]'s
/// total order, two values where exactly one side carries a timezone can be
/// genuinely indeterminate: `MaybeLess`/`MaybeGreater` report that outcome,
/// defaulting toward whichever side is conventionally deemed to sort first
/// (local time sorts first on a tie).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialOrder {
    StrictlyLess,
    MaybeLess,
    Equal,
    MaybeGreater,
    StrictlyGreater,
}

impl PartialOrder {
    fn from_std(o: std::cmp::Ordering) -> PartialOrder {
        match o {
            std::cmp::Ordering::Less => PartialOrder::StrictlyLess,
            std::cmp::Ordering::Equal => PartialOrder::Equal,
            std::cmp::Ordering::Greater => PartialOrder::StrictlyGreater,
        }
    }

    pub fn invert(self) -> PartialOrder {
        match self {
            PartialOrder::StrictlyLess => PartialOrder::StrictlyGreater,
            PartialOrder::MaybeLess => PartialOrder::MaybeGreater,
            PartialOrder::Equal => PartialOrder::Equal,
            PartialOrder::MaybeGreater => PartialOrder::MaybeLess,
            PartialOrder::StrictlyGreater => PartialOrder::StrictlyLess,
        }
    }
}

fn sort_key(dt: &DateTimeFields) -> (i64, u8, u8, u8, u8, u8, u32) {
    (
        dt.date.year,
        dt.date.month,
        dt.date.day,
        dt.time.hour,
        dt.time.minute,
        dt.time.second,
        dt.time.nanosecond,
    )
}

/// Shift `dt` by a plain `hours`-hour offset (may be negative), ignoring
/// its zone field. Used to widen a zone-unspecified value into its earliest
/// and latest possible UTC instants.
fn shift_hours(dt: DateTimeFields, hours: i64) -> DateTimeFields {
    let mut d = Duration::zero();
    d.negative = hours < 0;
    d.seconds = hours.unsigned_abs() * 3_600;
    add_duration(DateTimeFields { timezone: 0, ..dt }, d)
}

/// Compare a zoned value to a local (zone-unspecified) one by widening the
/// local side across the ±14:00 offset envelope, per the algorithm in
/// `original_source`'s `date_time.c` comparison routine. Returns the
/// ordering of `zoned` relative to `local`; an indeterminate result
/// defaults to `MaybeGreater`.
fn bound_compare(zoned: DateTimeFields, local: DateTimeFields) -> PartialOrder {
    let earliest = shift_hours(local, -14);
    let latest = shift_hours(local, 14);
    let z = to_utc(zoned);
    if sort_key(&z) < sort_key(&earliest) {
        PartialOrder::StrictlyLess
    } else if sort_key(&z) > sort_key(&latest) {
        PartialOrder::StrictlyGreater
    } else {
        PartialOrder::MaybeGreater
    }
}

pub fn compare(a: DateTimeFields, b: DateTimeFields) -> PartialOrder {
    let a_zoned = a.timezone != LOCAL;
    let b_zoned = b.timezone != LOCAL;

    if a_zoned == b_zoned {
        let ua = if a_zoned { to_utc(a) } else { a };
        let ub = if b_zoned { to_utc(b) } else { b };
        return PartialOrder::from_std(sort_key(&ua).cmp(&sort_key(&ub)));
    }

    if a_zoned {
        bound_compare(a, b)
    } else {
        bound_compare(b, a).invert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_basic_datetime() {
        let (status, dt, consumed) = read_date_time(b"2024-02-29T13:45:09Z");
        assert_eq!(status, Status::Success);
        assert_eq!(consumed, 20);
        let mut buf = [0u8; 32];
        let r = write_date_time(dt, &mut buf);
        assert_eq!(&buf[..r.count], b"2024-02-29T13:45:09Z");
    }

    #[test]
    fn read_date_time_preserves_24_00_00_alias() {
        let (status, dt, _) = read_date_time(b"2024-01-01T24:00:00Z");
        assert_eq!(status, Status::Success);
        assert_eq!(dt.date, DateFields::new(2024, 1, 1));
        assert_eq!(dt.time, TimeFields::new(24, 0, 0, 0));
    }

    #[test]
    fn canonicalize_midnight_wraps_24_00_00_into_next_day() {
        let (_, dt, _) = read_date_time(b"2001-02-28T24:00:00Z");
        let wrapped = canonicalize_midnight(dt);
        assert_eq!(wrapped.date, DateFields::new(2001, 3, 1));
        assert_eq!(wrapped.time, TimeFields::new(0, 0, 0, 0));
        assert_eq!(wrapped.timezone, dt.timezone);
    }

    #[test]
    fn canonicalize_midnight_is_noop_for_ordinary_time() {
        let (_, dt, _) = read_date_time(b"2024-02-29T13:45:09Z");
        assert_eq!(canonicalize_midnight(dt), dt);
    }

    #[test]
    fn add_months_clamps_short_month() {
        let jan31 = DateFields::new(2024, 1, 31);
        assert_eq!(add_months(jan31, 1), DateFields::new(2024, 2, 29));
    }

    #[test]
    fn add_days_rolls_year_boundary() {
        let dec31 = DateFields::new(2023, 12, 31);
        assert_eq!(add_days(dec31, 1), DateFields::new(2024, 1, 1));
    }

    #[test]
    fn add_duration_beyond_year_range_saturates_to_infinite_future() {
        let dt = DateTimeFields {
            date: DateFields::new(i16::MAX, 12, 1),
            time: TimeFields::new(0, 0, 0, 0),
            timezone: 8,
        };
        let mut d = Duration::zero();
        d.months = 1;
        let result = add_duration(dt, d);
        assert_eq!(result.date.year, i16::MAX);
        assert_eq!(result.date.month, 255);
        assert_eq!(result.timezone, 8);
    }

    #[test]
    fn to_utc_applies_offset() {
        let (_, dt, _) = read_date_time(b"2024-01-01T01:00:00+02:00");
        let utc = to_utc(dt);
        assert_eq!(utc.time, TimeFields::new(23, 0, 0, 0));
        assert_eq!(utc.date, DateFields::new(2023, 12, 31));
        assert_eq!(utc.timezone, 0);
    }

    #[test]
    fn local_vs_zoned_within_envelope_is_indeterminate() {
        // Same instant read two ways; within the ±14h envelope so the
        // comparison can't be resolved to a strict order.
        let (_, a, _) = read_date_time(b"2024-01-01T12:00:00");
        let (_, b, _) = read_date_time(b"2024-01-01T12:00:00Z");
        assert_eq!(compare(a, b), PartialOrder::MaybeLess);
    }

    #[test]
    fn local_vs_zoned_beyond_envelope_is_strict() {
        let (_, a, _) = read_date_time(b"2024-01-01T01:00:00Z");
        let (_, b, _) = read_date_time(b"2024-01-01T15:00:01");
        assert_eq!(compare(a, b), PartialOrder::StrictlyLess);
    }
}
