//! Generic, tag-dispatched value read/write/compare (§4.N), grounded on
//! `original_source/src/variant.c` and, for the dispatch-by-tag shape
//! itself, the teacher's own `Value`/`write_value` dispatch in the old
//! `lib.rs`/`serialize.rs`.

use crate::binary;
use crate::boolean;
use crate::datatype::Datatype;
use crate::datetime::{self, DateTimeFields, PartialOrder};
use crate::decimal_parse;
use crate::duration::{self, Duration};
use crate::floating_decimal::FloatingDecimal;
use crate::integer;
use crate::status::{Status, VariableResult};
use crate::time::TimeFields;

/// A decoded value of any supported datatype, tagged by [`Datatype`]. This
/// is the crate's one dynamically-typed entry point; every other module
/// exposes statically-typed `read_*`/`write_*` pairs that this dispatches
/// to.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Decimal(f64),
    Double(f64),
    Float(f32),
    Long(i64),
    ULong(u64),
    Duration(Duration),
    DateTime(DateTimeFields),
    Date(crate::date::DateFields),
    Time(TimeFields),
    Hex(Vec<u8>),
    Base64(Vec<u8>),
}

impl Value {
    pub fn datatype(&self) -> Datatype {
        match self {
            Value::Boolean(_) => Datatype::Boolean,
            Value::Decimal(_) => Datatype::Decimal,
            Value::Double(_) => Datatype::Double,
            Value::Float(_) => Datatype::Float,
            Value::Long(_) => Datatype::Long,
            Value::ULong(_) => Datatype::UnsignedLong,
            Value::Duration(_) => Datatype::Duration,
            Value::DateTime(_) => Datatype::DateTime,
            Value::Date(_) => Datatype::Date,
            Value::Time(_) => Datatype::Time,
            Value::Hex(_) => Datatype::HexBinary,
            Value::Base64(_) => Datatype::Base64Binary,
        }
    }
}

/// Read a value of `datatype` from `s`.
pub fn read_value(datatype: Datatype, s: &[u8]) -> (Status, Value, usize) {
    let result = read_value_inner(datatype, s);
    log::trace!("read_value({}) -> {:?}", datatype.short_name(), result.0);
    result
}

fn read_value_inner(datatype: Datatype, s: &[u8]) -> (Status, Value, usize) {
    match datatype {
        Datatype::Boolean => {
            let (status, v, n) = boolean::read_boolean(s);
            (status, Value::Boolean(v), n)
        }
        Datatype::Decimal => {
            let (status, v, n) = decimal_parse::parse_decimal(s);
            (status, Value::Decimal(v), n)
        }
        Datatype::Double => {
            let (status, v, n) = decimal_parse::parse_double(s);
            (status, Value::Double(v), n)
        }
        Datatype::Float => {
            let (status, v, n) = decimal_parse::parse_float(s);
            (status, Value::Float(v), n)
        }
        Datatype::Long | Datatype::Integer => {
            let (status, parsed) = integer::read_long(s);
            (status, Value::Long(parsed.value), parsed.consumed)
        }
        Datatype::NonNegativeInteger => {
            let (status, parsed) = integer::read_non_negative_integer(s);
            (status, Value::Long(parsed.value), parsed.consumed)
        }
        Datatype::PositiveInteger => {
            let (status, parsed) = integer::read_positive_integer(s);
            (status, Value::Long(parsed.value), parsed.consumed)
        }
        Datatype::NonPositiveInteger => {
            let (status, parsed) = integer::read_non_positive_integer(s);
            (status, Value::Long(parsed.value), parsed.consumed)
        }
        Datatype::NegativeInteger => {
            let (status, parsed) = integer::read_negative_integer(s);
            (status, Value::Long(parsed.value), parsed.consumed)
        }
        Datatype::UnsignedLong => {
            let (status, v, n) = integer::read_ulong(s);
            (status, Value::ULong(v), n)
        }
        Datatype::Int => {
            let (status, v, n) = integer::read_int(s);
            (status, Value::Long(i64::from(v)), n)
        }
        Datatype::UnsignedInt => {
            let (status, v, n) = integer::read_uint(s);
            (status, Value::ULong(u64::from(v)), n)
        }
        Datatype::Short => {
            let (status, v, n) = integer::read_short(s);
            (status, Value::Long(i64::from(v)), n)
        }
        Datatype::UnsignedShort => {
            let (status, v, n) = integer::read_ushort(s);
            (status, Value::ULong(u64::from(v)), n)
        }
        Datatype::Byte => {
            let (status, v, n) = integer::read_byte(s);
            (status, Value::Long(i64::from(v)), n)
        }
        Datatype::UnsignedByte => {
            let (status, v, n) = integer::read_ubyte(s);
            (status, Value::ULong(u64::from(v)), n)
        }
        Datatype::Duration => {
            let (status, v, n) = duration::read_duration(s);
            (status, Value::Duration(v), n)
        }
        Datatype::DateTime => {
            let (status, v, n) = datetime::read_date_time(s);
            (status, Value::DateTime(v), n)
        }
        Datatype::Date => {
            let (status, v, n) = crate::date::read_date(s);
            (status, Value::Date(v), n)
        }
        Datatype::Time => {
            let (status, v, n) = crate::time::read_time(s);
            (status, Value::Time(v), n)
        }
        Datatype::HexBinary => {
            // Decoded bytes are never longer than the lexical text itself
            // (2 hex digits per byte, at least 1 char consumed per output
            // byte), so the input length is always a safe upper bound.
            let mut buf = vec![0u8; s.len()];
            let r = binary::read_hex(s, &mut buf);
            buf.truncate(r.write_count);
            (r.status, Value::Hex(buf), r.read_count)
        }
        Datatype::Base64Binary => {
            let mut buf = vec![0u8; s.len()];
            let r = binary::read_base64(s, &mut buf);
            buf.truncate(r.write_count);
            (r.status, Value::Base64(buf), r.read_count)
        }
    }
}

pub fn write_value(value: &Value, dst: &mut [u8]) -> VariableResult {
    let result = match value {
        Value::Boolean(v) => boolean::write_boolean(*v, dst),
        Value::Decimal(v) => write_decimal_digits(*v, dst),
        Value::Double(v) => write_scientific_digits(*v, dst),
        Value::Float(v) => write_scientific_digits(f64::from(*v), dst),
        Value::Long(v) => integer::write_long(*v, dst),
        Value::ULong(v) => integer::write_ulong(*v, dst),
        Value::Duration(d) => duration::write_duration(*d, dst),
        Value::DateTime(dt) => datetime::write_date_time(*dt, dst),
        Value::Date(d) => crate::date::write_date(*d, dst),
        Value::Time(t) => crate::time::write_time(*t, dst),
        Value::Hex(bytes) => {
            let r = binary::write_hex(bytes, dst);
            crate::status::FixedResult::new(r.status, r.write_count)
        }
        Value::Base64(bytes) => {
            let r = binary::write_base64(bytes, dst);
            crate::status::FixedResult::new(r.status, r.write_count)
        }
    };
    log::trace!("write_value({:?}) -> {:?}", value.datatype().short_name(), result.status);
    VariableResult::new(result.status, 0, result.count)
}

/// Render a finite `f64` using the shortest round-tripping digit string
/// from [`FloatingDecimal`], in plain (non-exponential) notation, with a
/// mandatory digit after the point (`"100.0"`, not `"100"`). This is
/// decimal's canonical form; double/float use [`write_scientific_digits`]
/// instead.
fn write_decimal_digits(v: f64, dst: &mut [u8]) -> crate::status::FixedResult {
    use crate::floating_decimal::Kind;
    let fd = FloatingDecimal::from_f64(v);
    let text: &[u8] = match fd.kind {
        Kind::Nan | Kind::PosInfinity | Kind::NegInfinity => {
            return crate::status::FixedResult::err(Status::BadValue);
        }
        Kind::PosZero => b"0.0",
        Kind::NegZero => b"-0.0",
        _ => {
            return write_plain_digits(&fd, dst);
        }
    };
    if dst.len() < text.len() {
        return crate::status::FixedResult::err(Status::NoSpace);
    }
    dst[..text.len()].copy_from_slice(text);
    crate::status::FixedResult::ok(text.len())
}

fn write_plain_digits(fd: &FloatingDecimal, dst: &mut [u8]) -> crate::status::FixedResult {
    let digits = fd.digits_str();
    let negative = fd.kind.is_negative();
    // Decimal point sits after the first `exponent + 1` digits.
    let point_pos = fd.exponent + 1;
    let mut out = [0u8; 32];
    let mut i = 0usize;
    if negative {
        out[i] = b'-';
        i += 1;
    }
    if point_pos <= 0 {
        out[i] = b'0';
        i += 1;
        out[i] = b'.';
        i += 1;
        for _ in 0..(-point_pos) {
            out[i] = b'0';
            i += 1;
        }
        for &d in digits {
            out[i] = b'0' + d;
            i += 1;
        }
    } else if (point_pos as usize) >= digits.len() {
        for &d in digits {
            out[i] = b'0' + d;
            i += 1;
        }
        for _ in digits.len()..(point_pos as usize) {
            out[i] = b'0';
            i += 1;
        }
        out[i] = b'.';
        i += 1;
        out[i] = b'0';
        i += 1;
    } else {
        let split = point_pos as usize;
        for &d in &digits[..split] {
            out[i] = b'0' + d;
            i += 1;
        }
        out[i] = b'.';
        i += 1;
        for &d in &digits[split..] {
            out[i] = b'0' + d;
            i += 1;
        }
    }
    if dst.len() < i {
        return crate::status::FixedResult::err(Status::NoSpace);
    }
    dst[..i].copy_from_slice(&out[..i]);
    crate::status::FixedResult::ok(i)
}

/// Render a finite `f64` in double/float canonical scientific form:
/// `[-]d.dddE[-]e` — exactly one digit before the point, no trailing
/// mantissa zeros beyond the shortest round-tripping digit string (except
/// the mandatory `.0` when that string is a single digit), and a decimal
/// exponent with no leading zero.
fn write_scientific_digits(v: f64, dst: &mut [u8]) -> crate::status::FixedResult {
    use crate::floating_decimal::Kind;
    let fd = FloatingDecimal::from_f64(v);
    let text: &[u8] = match fd.kind {
        Kind::Nan => b"NaN",
        Kind::PosInfinity => b"INF",
        Kind::NegInfinity => b"-INF",
        Kind::PosZero => b"0.0E0",
        Kind::NegZero => b"-0.0E0",
        _ => {
            return write_scientific_finite(&fd, dst);
        }
    };
    if dst.len() < text.len() {
        return crate::status::FixedResult::err(Status::NoSpace);
    }
    dst[..text.len()].copy_from_slice(text);
    crate::status::FixedResult::ok(text.len())
}

fn write_scientific_finite(fd: &FloatingDecimal, dst: &mut [u8]) -> crate::status::FixedResult {
    let digits = fd.digits_str();
    let negative = fd.kind.is_negative();
    let mut out = [0u8; 32];
    let mut i = 0usize;
    if negative {
        out[i] = b'-';
        i += 1;
    }
    out[i] = b'0' + digits[0];
    i += 1;
    out[i] = b'.';
    i += 1;
    if digits.len() > 1 {
        for &d in &digits[1..] {
            out[i] = b'0' + d;
            i += 1;
        }
    } else {
        out[i] = b'0';
        i += 1;
    }
    out[i] = b'E';
    i += 1;
    if fd.exponent < 0 {
        out[i] = b'-';
        i += 1;
    }
    let mut exp_digits = [0u8; 10];
    let mut n = 0usize;
    let mut magnitude = fd.exponent.unsigned_abs();
    if magnitude == 0 {
        exp_digits[0] = b'0';
        n = 1;
    } else {
        while magnitude > 0 {
            exp_digits[n] = b'0' + (magnitude % 10) as u8;
            magnitude /= 10;
            n += 1;
        }
        exp_digits[..n].reverse();
    }
    if dst.len() < i + n {
        return crate::status::FixedResult::err(Status::NoSpace);
    }
    out[i..i + n].copy_from_slice(&exp_digits[..n]);
    i += n;
    dst[..i].copy_from_slice(&out[..i]);
    crate::status::FixedResult::ok(i)
}

/// Compare two values. If the datatypes differ, the values are ordered by
/// tag short-name, always reported as `MaybeLess`/`MaybeGreater` (never a
/// strict result, since values of different types are never truly
/// comparable) per §4.N. Otherwise: primitives use their built-in two-valued
/// order; `Hex`/`Base64` compare their decoded bytes (`memcmp` over the
/// shared prefix, then shorter-sorts-first); `Duration` uses its own total
/// order (never indeterminate, see
/// [`crate::duration::compare`]); `DateTime`/`Date`/`Time` use the
/// five-valued partial comparator (see [`crate::datetime::compare`]).
pub fn compare_value(a: &Value, b: &Value) -> PartialOrder {
    let result = compare_value_inner(a, b);
    log::trace!(
        "compare_value({}, {}) -> {:?}",
        a.datatype().short_name(),
        b.datatype().short_name(),
        result
    );
    result
}

fn compare_value_inner(a: &Value, b: &Value) -> PartialOrder {
    if a.datatype() != b.datatype() {
        return match a.datatype().short_name().cmp(b.datatype().short_name()) {
            std::cmp::Ordering::Less => PartialOrder::MaybeLess,
            std::cmp::Ordering::Greater => PartialOrder::MaybeGreater,
            std::cmp::Ordering::Equal => PartialOrder::MaybeLess,
        };
    }
    match (a, b) {
        (Value::Boolean(x), Value::Boolean(y)) => from_std(x.cmp(y)),
        (Value::Long(x), Value::Long(y)) => from_std(x.cmp(y)),
        (Value::ULong(x), Value::ULong(y)) => from_std(x.cmp(y)),
        (Value::Double(x), Value::Double(y)) | (Value::Decimal(x), Value::Decimal(y)) => x
            .partial_cmp(y)
            .map(from_std)
            .unwrap_or(PartialOrder::MaybeGreater),
        (Value::Float(x), Value::Float(y)) => x
            .partial_cmp(y)
            .map(from_std)
            .unwrap_or(PartialOrder::MaybeGreater),
        (Value::Duration(x), Value::Duration(y)) => from_std(duration::compare(*x, *y)),
        (Value::DateTime(x), Value::DateTime(y)) => datetime::compare(*x, *y),
        (Value::Date(x), Value::Date(y)) => from_std(x.cmp(y)),
        (Value::Time(x), Value::Time(y)) => from_std(x.cmp(y)),
        // memcmp over the shared prefix, then shorter-sorts-first — exactly
        // what slice `Ord` already gives.
        (Value::Hex(x), Value::Hex(y)) => from_std(x.cmp(y)),
        (Value::Base64(x), Value::Base64(y)) => from_std(x.cmp(y)),
        // Unreachable: the datatype check above already ruled out any
        // other combination.
        _ => PartialOrder::MaybeGreater,
    }
}

fn from_std(o: std::cmp::Ordering) -> PartialOrder {
    match o {
        std::cmp::Ordering::Less => PartialOrder::StrictlyLess,
        std::cmp::Ordering::Equal => PartialOrder::Equal,
        std::cmp::Ordering::Greater => PartialOrder::StrictlyGreater,
    }
}

/// Write `value`'s canonical lexical form. For most datatypes this is
/// exactly [`write_value`] (each type's writer already produces the one
/// canonical spelling); `DateTime` additionally resolves a `24:00:00`
/// midnight alias into the next day and normalizes to UTC, so two values
/// that denote the same instant in different zones (or in the `24:00:00`
/// alias) canonicalize to the same text.
pub fn write_canonical(value: &Value, dst: &mut [u8]) -> VariableResult {
    let result = if let Value::DateTime(dt) = value {
        let dt = datetime::canonicalize_midnight(*dt);
        if dt.timezone != crate::timezone::LOCAL {
            write_value(&Value::DateTime(datetime::to_utc(dt)), dst)
        } else {
            write_value(&Value::DateTime(dt), dst)
        }
    } else {
        write_value(value, dst)
    };
    log::trace!(
        "write_canonical({}) -> {:?}",
        value.datatype().short_name(),
        result.status
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_boolean() {
        let (status, v, n) = read_value(Datatype::Boolean, b"true");
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Boolean(true));
        assert_eq!(n, 4);
    }

    #[test]
    fn dispatches_bounded_int_narrowing() {
        let (status, v, _) = read_value(Datatype::Byte, b"127");
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Long(127));
    }

    #[test]
    fn write_value_roundtrips_long() {
        let mut buf = [0u8; 32];
        let r = write_value(&Value::Long(-42), &mut buf);
        assert_eq!(&buf[..r.write_count], b"-42");
    }

    #[test]
    fn write_value_renders_decimal_digits() {
        let mut buf = [0u8; 32];
        let r = write_value(&Value::Decimal(0.1), &mut buf);
        assert_eq!(&buf[..r.write_count], b"0.1");
    }

    #[test]
    fn write_value_renders_decimal_whole_number_with_trailing_point_zero() {
        let mut buf = [0u8; 32];
        let r = write_value(&Value::Decimal(100.0), &mut buf);
        assert_eq!(&buf[..r.write_count], b"100.0");
    }

    #[test]
    fn write_value_renders_double_in_scientific_notation() {
        let mut buf = [0u8; 32];
        let r = write_value(&Value::Double(0.1), &mut buf);
        assert_eq!(&buf[..r.write_count], b"1.0E-1");
    }

    #[test]
    fn write_value_renders_large_double_in_scientific_notation() {
        let mut buf = [0u8; 32];
        let r = write_value(&Value::Double(4.2e16), &mut buf);
        assert_eq!(&buf[..r.write_count], b"4.2E16");
    }

    #[test]
    fn write_value_renders_float_in_scientific_notation() {
        let mut buf = [0u8; 32];
        let r = write_value(&Value::Float(42.0), &mut buf);
        assert_eq!(&buf[..r.write_count], b"4.2E1");
    }

    #[test]
    fn dispatches_sign_restricted_integer_sub_tags() {
        let (status, _, _) = read_value(Datatype::NonNegativeInteger, b"-5");
        assert_eq!(status, Status::OutOfRange);
        let (status, v, _) = read_value(Datatype::NonNegativeInteger, b"5");
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Long(5));

        let (status, _, _) = read_value(Datatype::PositiveInteger, b"0");
        assert_eq!(status, Status::OutOfRange);

        let (status, _, _) = read_value(Datatype::NonPositiveInteger, b"5");
        assert_eq!(status, Status::OutOfRange);

        let (status, _, _) = read_value(Datatype::NegativeInteger, b"0");
        assert_eq!(status, Status::OutOfRange);
    }

    #[test]
    fn dispatches_hex_binary_round_trip() {
        let (status, v, n) = read_value(Datatype::HexBinary, b"deadBEEF");
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Hex(vec![0xDE, 0xAD, 0xBE, 0xEF]));
        assert_eq!(n, 8);

        let mut buf = [0u8; 16];
        let r = write_value(&v, &mut buf);
        assert_eq!(&buf[..r.write_count], b"DEADBEEF");
    }

    #[test]
    fn dispatches_base64_round_trip() {
        let (status, v, n) = read_value(Datatype::Base64Binary, b"Zm9vYmFy");
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Base64(b"foobar".to_vec()));
        assert_eq!(n, 8);

        let mut buf = [0u8; 16];
        let r = write_value(&v, &mut buf);
        assert_eq!(&buf[..r.write_count], b"Zm9vYmFy");
    }

    #[test]
    fn compare_value_orders_hex_by_bytes_then_length() {
        assert_eq!(
            compare_value(&Value::Hex(vec![0x01]), &Value::Hex(vec![0x02])),
            PartialOrder::StrictlyLess
        );
        assert_eq!(
            compare_value(&Value::Hex(vec![0x01]), &Value::Hex(vec![0x01, 0x00])),
            PartialOrder::StrictlyLess
        );
    }

    #[test]
    fn compare_value_orders_longs() {
        assert_eq!(
            compare_value(&Value::Long(1), &Value::Long(2)),
            PartialOrder::StrictlyLess
        );
    }

    #[test]
    fn compare_value_mismatched_datatypes_order_by_tag_name() {
        // "long" > "boolean" lexicographically.
        assert_eq!(
            compare_value(&Value::Long(1), &Value::Boolean(true)),
            PartialOrder::MaybeGreater
        );
    }

    #[test]
    fn write_canonical_normalizes_datetime_to_utc() {
        let (_, dt, _) = datetime::read_date_time(b"2024-01-01T01:00:00+02:00");
        let mut buf = [0u8; 32];
        let r = write_canonical(&Value::DateTime(dt), &mut buf);
        assert_eq!(&buf[..r.write_count], b"2023-12-31T23:00:00Z");
    }

    #[test]
    fn write_canonical_wraps_midnight_alias() {
        let (_, dt, _) = datetime::read_date_time(b"2001-02-28T24:00:00Z");
        let mut buf = [0u8; 32];
        let r = write_canonical(&Value::DateTime(dt), &mut buf);
        assert_eq!(&buf[..r.write_count], b"2001-03-01T00:00:00Z");
    }
}
