//! Timezone offset lexical I/O (§4.H), grounded on
//! `original_source/src/timezone.c`.
//!
//! Offsets are stored as a signed count of 15-minute units in `[-56, 56]`
//! (±14:00), with `127` reserved as the "local time, zone unspecified"
//! sentinel (no `Z`/`±HH:MM` suffix was present in the lexical form).

use crate::status::{FixedResult, Status};
use crate::surface::read_fixed_digits;

pub const LOCAL: i8 = 127;
const MIN_QUARTER_HOURS: i32 = -56;
const MAX_QUARTER_HOURS: i32 = 56;

/// Read an optional timezone suffix: `Z`, `+HH:MM`, `-HH:MM`, or nothing
/// (yielding [`LOCAL`]). Returns bytes consumed (0 when absent).
pub fn read_timezone(s: &[u8]) -> (Status, i8, usize) {
    match s.first() {
        None => (Status::Success, LOCAL, 0),
        Some(b'Z') => (Status::Success, 0, 1),
        Some(b'+') | Some(b'-') => {
            let negative = s[0] == b'-';
            let rest = &s[1..];
            let (hours, n1) = match read_fixed_digits(rest, 2, 2) {
                Some(v) => v,
                None => return (Status::ExpectedDigit, LOCAL, 0),
            };
            if rest.get(n1) != Some(&b':') {
                return (Status::ExpectedColon, LOCAL, 0);
            }
            let (minutes, n2) = match read_fixed_digits(&rest[n1 + 1..], 2, 2) {
                Some(v) => v,
                None => return (Status::ExpectedDigit, LOCAL, 0),
            };
            if minutes % 15 != 0 {
                return (Status::BadValue, LOCAL, 0);
            }
            let total_quarters = (hours as i32) * 4 + (minutes as i32) / 15;
            if total_quarters > MAX_QUARTER_HOURS {
                return (Status::OutOfRange, LOCAL, 0);
            }
            let signed = if negative { -total_quarters } else { total_quarters };
            if signed < MIN_QUARTER_HOURS || signed > MAX_QUARTER_HOURS {
                return (Status::OutOfRange, LOCAL, 0);
            }
            (Status::Success, signed as i8, 1 + n1 + 1 + n2)
        }
        _ => (Status::Success, LOCAL, 0),
    }
}

/// Format a timezone offset. Writes nothing for [`LOCAL`].
pub fn write_timezone(offset: i8, dst: &mut [u8]) -> FixedResult {
    if offset == LOCAL {
        return FixedResult::ok(0);
    }
    if offset == 0 {
        if dst.is_empty() {
            return FixedResult::err(Status::NoSpace);
        }
        dst[0] = b'Z';
        return FixedResult::ok(1);
    }
    if dst.len() < 6 {
        return FixedResult::err(Status::NoSpace);
    }
    let negative = offset < 0;
    let total_quarters = i32::from(offset).unsigned_abs();
    let hours = total_quarters / 4;
    let minutes = (total_quarters % 4) * 15;
    dst[0] = if negative { b'-' } else { b'+' };
    dst[1] = b'0' + (hours / 10) as u8;
    dst[2] = b'0' + (hours % 10) as u8;
    dst[3] = b':';
    dst[4] = b'0' + (minutes / 10) as u8;
    dst[5] = b'0' + (minutes % 10) as u8;
    FixedResult::ok(6)
}
