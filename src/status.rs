//! Structured return values (§3, §4.P, §6.2 of the datatype specification).
//!
//! Every public parse/format/compare/coerce entry point in this crate
//! reports success or failure by value through [`Status`], never through a
//! panic or a process abort. `Status` doubles as this crate's
//! [`std::error::Error`] type via `thiserror`, so callers who prefer
//! `Result`-style propagation can use the `*_checked` wrappers built on top
//! of the raw `(Status, count...)` records.

use thiserror::Error;

/// Closed set of outcomes for every read/write/compare/coerce operation.
///
/// Ordinals are stable (new variants are only ever appended) because some
/// embedders persist them; `#[repr(u8)]` documents that stability intent
/// without forcing callers to rely on the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[repr(u8)]
pub enum Status {
    #[error("success")]
    Success = 0,
    #[error("expected end of input")]
    ExpectedEnd,
    #[error("expected a boolean")]
    ExpectedBoolean,
    #[error("expected an integer")]
    ExpectedInteger,
    #[error("expected a duration")]
    ExpectedDuration,
    #[error("expected a sign")]
    ExpectedSign,
    #[error("expected a digit")]
    ExpectedDigit,
    #[error("expected a zero")]
    ExpectedZero,
    #[error("expected a colon")]
    ExpectedColon,
    #[error("expected a dash")]
    ExpectedDash,
    #[error("expected a time separator")]
    ExpectedTimeSep,
    #[error("expected a time field tag")]
    ExpectedTimeTag,
    #[error("expected a date field tag")]
    ExpectedDateTag,
    #[error("expected a seconds field tag")]
    ExpectedSecondTag,
    #[error("expected hexadecimal data")]
    ExpectedHex,
    #[error("expected base64 data")]
    ExpectedBase64,
    #[error("fields are out of order")]
    BadOrder,
    #[error("bad value")]
    BadValue,
    #[error("out of range")]
    OutOfRange,
    #[error("not enough space")]
    NoSpace,
    #[error("would reduce precision")]
    WouldReducePrecision,
    #[error("would round")]
    WouldRound,
    #[error("would truncate")]
    WouldTruncate,
    #[error("unsupported")]
    Unsupported,
}

impl Status {
    /// Whether this status represents success.
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Human-readable single sentence, capitalized, without trailing
    /// punctuation (mirrors the original `exess_strerror` table).
    pub fn strerror(self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::ExpectedEnd => "Expected end of input",
            Status::ExpectedBoolean => "Expected a boolean",
            Status::ExpectedInteger => "Expected an integer",
            Status::ExpectedDuration => "Expected a duration",
            Status::ExpectedSign => "Expected a sign",
            Status::ExpectedDigit => "Expected a digit",
            Status::ExpectedZero => "Expected a zero",
            Status::ExpectedColon => "Expected a colon",
            Status::ExpectedDash => "Expected a dash",
            Status::ExpectedTimeSep => "Expected a time separator",
            Status::ExpectedTimeTag => "Expected a time field tag",
            Status::ExpectedDateTag => "Expected a date field tag",
            Status::ExpectedSecondTag => "Expected a seconds field tag",
            Status::ExpectedHex => "Expected hexadecimal data",
            Status::ExpectedBase64 => "Expected base64 data",
            Status::BadOrder => "Fields are out of order",
            Status::BadValue => "Bad value",
            Status::OutOfRange => "Out of range",
            Status::NoSpace => "Not enough space",
            Status::WouldReducePrecision => "Would reduce precision",
            Status::WouldRound => "Would round",
            Status::WouldTruncate => "Would truncate",
            Status::Unsupported => "Unsupported",
        }
    }

    /// Convert to a `Result` for callers who prefer `?`-propagation.
    /// The success value carries no payload; use the raw `(Status, ..)`
    /// forms directly when partial byte counts on failure matter.
    pub fn into_result(self) -> Result<(), Status> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// `(status, count)` — bytes read from input or written to output,
/// excluding any null terminator. Used by codecs whose input and output
/// sizes are always equal in successful cases (everything but binary and
/// the generic/canonical paths).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedResult {
    pub status: Status,
    pub count: usize,
}

impl FixedResult {
    #[inline]
    pub const fn new(status: Status, count: usize) -> Self {
        FixedResult { status, count }
    }

    #[inline]
    pub const fn ok(count: usize) -> Self {
        FixedResult::new(Status::Success, count)
    }

    #[inline]
    pub const fn err(status: Status) -> Self {
        FixedResult::new(status, 0)
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// `(status, read_count, write_count)` — used by codecs whose input and
/// output sizes differ (binary, canonicalization, value-level generic read).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableResult {
    pub status: Status,
    pub read_count: usize,
    pub write_count: usize,
}

impl VariableResult {
    #[inline]
    pub const fn new(status: Status, read_count: usize, write_count: usize) -> Self {
        VariableResult {
            status,
            read_count,
            write_count,
        }
    }

    #[inline]
    pub const fn ok(read_count: usize, write_count: usize) -> Self {
        VariableResult::new(Status::Success, read_count, write_count)
    }

    #[inline]
    pub const fn err(status: Status) -> Self {
        VariableResult::new(status, 0, 0)
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strerror_is_capitalized_no_trailing_punctuation() {
        for s in [Status::Success, Status::BadValue, Status::NoSpace] {
            let msg = s.strerror();
            assert!(msg.chars().next().unwrap().is_uppercase());
            assert!(!msg.ends_with('.'));
        }
    }

    #[test]
    fn display_matches_strerror_lowercased_intent() {
        // Display (thiserror) and strerror both exist independently but
        // should never contradict each other's meaning.
        assert_eq!(format!("{}", Status::NoSpace), "not enough space");
        assert_eq!(Status::NoSpace.strerror(), "Not enough space");
    }

    #[test]
    fn into_result_roundtrips() {
        assert_eq!(Status::Success.into_result(), Ok(()));
        assert_eq!(Status::BadValue.into_result(), Err(Status::BadValue));
    }
}
