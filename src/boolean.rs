//! Boolean lexical I/O (§4.F), grounded on `original_source/src/boolean.c`.

use crate::status::{FixedResult, Status};
use crate::surface::skip_whitespace;

/// Parse `true`, `false`, `1`, or `0` (optionally preceded by whitespace).
/// Returns the parsed value and the number of bytes consumed.
pub fn read_boolean(s: &[u8]) -> (Status, bool, usize) {
    let start = skip_whitespace(s);
    let rest = &s[start..];

    if rest.starts_with(b"true") {
        return (Status::Success, true, start + 4);
    }
    if rest.starts_with(b"false") {
        return (Status::Success, false, start + 5);
    }
    if rest.starts_with(b"1") {
        return (Status::Success, true, start + 1);
    }
    if rest.starts_with(b"0") {
        return (Status::Success, false, start + 1);
    }
    (Status::ExpectedBoolean, false, 0)
}

/// Format as canonical `true`/`false`.
pub fn write_boolean(value: bool, dst: &mut [u8]) -> FixedResult {
    let text: &[u8] = if value { b"true" } else { b"false" };
    if dst.len() < text.len() {
        return FixedResult::err(Status::NoSpace);
    }
    dst[..text.len()].copy_from_slice(text);
    FixedResult::ok(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_words_and_digits() {
        assert_eq!(read_boolean(b"true"), (Status::Success, true, 4));
        assert_eq!(read_boolean(b"false"), (Status::Success, false, 5));
        assert_eq!(read_boolean(b"1"), (Status::Success, true, 1));
        assert_eq!(read_boolean(b"0"), (Status::Success, false, 1));
    }

    #[test]
    fn rejects_garbage() {
        let (status, _, _) = read_boolean(b"yes");
        assert_eq!(status, Status::ExpectedBoolean);
    }

    #[test]
    fn writes_canonical_words() {
        let mut buf = [0u8; 8];
        let r = write_boolean(true, &mut buf);
        assert_eq!(&buf[..r.count], b"true");
        let r = write_boolean(false, &mut buf);
        assert_eq!(&buf[..r.count], b"false");
    }
}
