//! ISO-8601 duration lexical I/O (§4.L), grounded on
//! `original_source/src/duration.c`.
//!
//! XSD durations are stored as two independent counters — months (years*12
//! + months) and seconds (days/hours/minutes/seconds, with nanosecond
//! fractional resolution) — because the two scales are not commensurable
//! without a calendar reference (a month has no fixed length in seconds).
//! Comparison is therefore only ever partial; see [`compare`].

use crate::status::{FixedResult, Status};
use crate::surface::is_digit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    /// Negative means the whole duration is negative (`months` and
    /// `seconds` are both stored non-negative magnitudes).
    pub negative: bool,
    pub months: u64,
    pub seconds: u64,
    pub nanoseconds: u32,
}

impl Duration {
    pub const fn zero() -> Self {
        Duration {
            negative: false,
            months: 0,
            seconds: 0,
            nanoseconds: 0,
        }
    }
}

/// Read `[-]P(nY)?(nM)?(nD)?(T(nH)?(nM)?(n[.f]S)?)?`, rejecting an empty
/// field list (`P` alone), fields out of their fixed order, and a `T` with
/// no time fields after it.
pub fn read_duration(s: &[u8]) -> (Status, Duration, usize) {
    let mut i = 0usize;
    let negative = if s.first() == Some(&b'-') {
        i += 1;
        true
    } else {
        false
    };
    if s.get(i) != Some(&b'P') {
        return (Status::ExpectedDuration, Duration::zero(), 0);
    }
    i += 1;

    // Tags in fixed order: Y, M, D, (T, H, M, S). `stage` tracks how far
    // through that order we've progressed so an out-of-order tag is
    // rejected rather than silently accepted.
    const STAGE_YEAR: u8 = 0;
    const STAGE_MONTH: u8 = 1;
    const STAGE_DAY: u8 = 2;
    const STAGE_TIME: u8 = 3;
    const STAGE_HOUR: u8 = 4;
    const STAGE_MINUTE: u8 = 5;
    const STAGE_SECOND: u8 = 6;

    let mut stage = STAGE_YEAR;
    let mut months: u64 = 0;
    let mut seconds: u64 = 0;
    let mut nanoseconds: u32 = 0;
    let mut any_field = false;
    let mut in_time = false;

    loop {
        if s.get(i) == Some(&b'T') {
            if in_time || stage > STAGE_TIME {
                return (Status::BadOrder, Duration::zero(), 0);
            }
            in_time = true;
            stage = STAGE_TIME;
            i += 1;
            continue;
        }

        let digits_start = i;
        let mut has_dot = false;
        let mut frac_digits: u32 = 0;
        let mut frac_start = 0usize;
        while i < s.len() && (is_digit(s[i]) || (s[i] == b'.' && in_time && !has_dot)) {
            if s[i] == b'.' {
                has_dot = true;
                frac_start = i + 1;
            }
            i += 1;
        }
        if i == digits_start {
            break;
        }
        let int_end = if has_dot { frac_start - 1 } else { i };
        if int_end == digits_start {
            return (Status::ExpectedDigit, Duration::zero(), 0);
        }
        let mut value: u64 = 0;
        for &b in &s[digits_start..int_end] {
            value = match value.checked_mul(10).and_then(|v| v.checked_add(u64::from(b - b'0'))) {
                Some(v) => v,
                None => return (Status::OutOfRange, Duration::zero(), 0),
            };
        }
        if has_dot {
            frac_digits = (i - frac_start) as u32;
        }

        let tag = match s.get(i) {
            Some(&c) => c,
            None => return (Status::ExpectedTimeTag, Duration::zero(), 0),
        };

        match tag {
            b'Y' if !in_time && stage <= STAGE_YEAR => {
                months = months.saturating_add(value.saturating_mul(12));
                stage = STAGE_MONTH;
            }
            b'M' if !in_time && stage <= STAGE_MONTH => {
                months = months.saturating_add(value);
                stage = STAGE_DAY;
            }
            b'D' if !in_time && stage <= STAGE_DAY => {
                seconds = seconds.saturating_add(value.saturating_mul(86_400));
                stage = STAGE_TIME;
            }
            b'H' if in_time && stage <= STAGE_HOUR => {
                seconds = seconds.saturating_add(value.saturating_mul(3_600));
                stage = STAGE_MINUTE;
            }
            b'M' if in_time && stage <= STAGE_MINUTE => {
                seconds = seconds.saturating_add(value.saturating_mul(60));
                stage = STAGE_SECOND;
            }
            b'S' if in_time && stage <= STAGE_SECOND => {
                seconds = seconds.saturating_add(value);
                if has_dot {
                    let mut n = 0u32;
                    let take = frac_digits.min(9) as usize;
                    for &b in &s[frac_start..frac_start + take] {
                        n = n * 10 + u32::from(b - b'0');
                    }
                    for _ in take..9 {
                        n *= 10;
                    }
                    nanoseconds = n;
                }
                stage = STAGE_SECOND + 1;
            }
            _ => return (Status::ExpectedDateTag, Duration::zero(), 0),
        }
        any_field = true;
        i += 1;
    }

    if !any_field {
        return (Status::ExpectedDigit, Duration::zero(), 0);
    }
    if in_time && stage == STAGE_TIME {
        // `T` present but no time field followed.
        return (Status::ExpectedTimeTag, Duration::zero(), 0);
    }

    (
        Status::Success,
        Duration {
            negative,
            months,
            seconds,
            nanoseconds,
        },
        i,
    )
}

pub fn write_duration(d: Duration, dst: &mut [u8]) -> FixedResult {
    let mut buf = [0u8; 64];
    let mut i = 0usize;
    if d.negative && (d.months != 0 || d.seconds != 0 || d.nanoseconds != 0) {
        buf[i] = b'-';
        i += 1;
    }
    buf[i] = b'P';
    i += 1;

    let years = d.months / 12;
    let months = d.months % 12;
    if years != 0 {
        i += write_u64_tag(years, b'Y', &mut buf[i..]);
    }
    if months != 0 {
        i += write_u64_tag(months, b'M', &mut buf[i..]);
    }
    let days = d.seconds / 86_400;
    let mut remaining_seconds = d.seconds % 86_400;
    if days != 0 {
        i += write_u64_tag(days, b'D', &mut buf[i..]);
    }

    let has_time = remaining_seconds != 0 || d.nanoseconds != 0;
    if has_time {
        buf[i] = b'T';
        i += 1;
        let hours = remaining_seconds / 3_600;
        remaining_seconds %= 3_600;
        let minutes = remaining_seconds / 60;
        let secs = remaining_seconds % 60;
        if hours != 0 {
            i += write_u64_tag(hours, b'H', &mut buf[i..]);
        }
        if minutes != 0 {
            i += write_u64_tag(minutes, b'M', &mut buf[i..]);
        }
        if secs != 0 || d.nanoseconds != 0 || (years == 0 && months == 0 && days == 0 && hours == 0 && minutes == 0) {
            i += write_seconds_tag(secs, d.nanoseconds, &mut buf[i..]);
        }
    } else if years == 0 && months == 0 && days == 0 {
        // the zero duration: P0D is more conventional than a bare "P"
        i += write_u64_tag(0, b'D', &mut buf[i..]);
    }

    if dst.len() < i {
        return FixedResult::err(Status::NoSpace);
    }
    dst[..i].copy_from_slice(&buf[..i]);
    FixedResult::ok(i)
}

fn write_u64_tag(value: u64, tag: u8, dst: &mut [u8]) -> usize {
    let mut digits = [0u8; 20];
    let mut n = 0usize;
    let mut v = value;
    if v == 0 {
        digits[0] = b'0';
        n = 1;
    } else {
        while v > 0 {
            digits[n] = b'0' + (v % 10) as u8;
            v /= 10;
            n += 1;
        }
        digits[..n].reverse();
    }
    dst[..n].copy_from_slice(&digits[..n]);
    dst[n] = tag;
    n + 1
}

fn write_seconds_tag(whole: u64, nanoseconds: u32, dst: &mut [u8]) -> usize {
    let mut i = write_u64_tag(whole, b'S', dst);
    if nanoseconds != 0 {
        // splice the fractional part in before the trailing 'S'
        let tag_pos = i - 1;
        dst[tag_pos] = b'.';
        let mut digits = [0u8; 9];
        let mut v = nanoseconds;
        for k in (0..9).rev() {
            digits[k] = b'0' + (v % 10) as u8;
            v /= 10;
        }
        let mut last = 8;
        while last > 0 && digits[last] == b'0' {
            last -= 1;
        }
        dst[tag_pos + 1..tag_pos + 1 + last + 1].copy_from_slice(&digits[..=last]);
        i = tag_pos + 1 + last + 1;
        dst[i] = b'S';
        i += 1;
    }
    i
}

/// Compare by representation order: months first, then seconds+nanoseconds,
/// sign-adjusted. This is always a total order over the encoded fields —
/// deliberately *not* a true ordering of real time intervals, since a month
/// has no fixed length in seconds. The richer five-valued partial order
/// (see [`crate::datetime::compare`]) applies to dateTime/date/time, not to
/// durations; this crate documents that distinction rather than attempting
/// to calendar-resolve month/second durations against each other.
pub fn compare(a: Duration, b: Duration) -> std::cmp::Ordering {
    let signed_months = |d: &Duration| {
        if d.negative {
            -(d.months as i128)
        } else {
            d.months as i128
        }
    };
    let signed_seconds = |d: &Duration| {
        let total = (d.seconds as i128) * 1_000_000_000 + d.nanoseconds as i128;
        if d.negative {
            -total
        } else {
            total
        }
    };

    signed_months(&a)
        .cmp(&signed_months(&b))
        .then(signed_seconds(&a).cmp(&signed_seconds(&b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_full_duration() {
        let (status, d, consumed) = read_duration(b"P1Y2M3DT4H5M6.5S");
        assert_eq!(status, Status::Success);
        assert_eq!(d.months, 14);
        assert_eq!(d.seconds, 3 * 86_400 + 4 * 3_600 + 5 * 60 + 6);
        assert_eq!(d.nanoseconds, 500_000_000);
        assert_eq!(consumed, 16);
    }

    #[test]
    fn reads_negative_duration() {
        let (status, d, _) = read_duration(b"-P1D");
        assert_eq!(status, Status::Success);
        assert!(d.negative);
        assert_eq!(d.seconds, 86_400);
    }

    #[test]
    fn rejects_out_of_order_fields() {
        let (status, _, _) = read_duration(b"P1M1Y");
        assert_eq!(status, Status::ExpectedDateTag);
    }

    #[test]
    fn rejects_dangling_time_designator() {
        let (status, _, _) = read_duration(b"P1DT");
        assert_eq!(status, Status::ExpectedTimeTag);
    }

    #[test]
    fn write_roundtrips() {
        let mut buf = [0u8; 64];
        let (_, d, _) = read_duration(b"P1Y2M3DT4H5M6.5S");
        let r = write_duration(d, &mut buf);
        assert_eq!(&buf[..r.count], b"P1Y2M3DT4H5M6.5S");
    }

    #[test]
    fn mixed_month_and_second_durations_compare_by_representation_order() {
        // P1M has a zero seconds field, so it sorts before any duration
        // with a nonzero months field regardless of its seconds magnitude.
        let (_, a, _) = read_duration(b"P30D");
        let (_, b, _) = read_duration(b"P1M");
        assert_eq!(compare(a, b), std::cmp::Ordering::Less);
    }

    #[test]
    fn same_scale_durations_compare_by_magnitude() {
        let (_, a, _) = read_duration(b"P1D");
        let (_, b, _) = read_duration(b"P2D");
        assert_eq!(compare(a, b), std::cmp::Ordering::Less);
    }
}
