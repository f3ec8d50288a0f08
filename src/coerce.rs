//! Lossy cross-type coercion (§4.O), grounded on
//! `original_source/src/coerce.c`.
//!
//! Coercions that would lose information are rejected unless the caller's
//! [`CoercionPolicy`] explicitly permits that class of loss.

use crate::datatype::Datatype;
use crate::status::Status;
use crate::value::Value;

/// Bitset of loss classes a caller is willing to accept. Named after, and
/// numerically laid out the same as, `original_source/src/coerce.c`'s
/// policy flags, so a caller porting a policy value across languages
/// doesn't need to remap bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionPolicy(u8);

impl CoercionPolicy {
    pub const LOSSLESS: CoercionPolicy = CoercionPolicy(0);
    /// Allow converting a floating value to an integer type, or a larger
    /// integer type to a smaller one, by dropping fractional/low-order
    /// precision rather than refusing.
    pub const REDUCE_PRECISION: CoercionPolicy = CoercionPolicy(1 << 0);
    /// Allow rounding a fractional value to the nearest integer instead of
    /// requiring it to already be exactly integral.
    pub const ROUND: CoercionPolicy = CoercionPolicy(1 << 1);
    /// Allow truncating toward zero instead of rounding.
    pub const TRUNCATE: CoercionPolicy = CoercionPolicy(1 << 2);

    pub const fn union(self, other: CoercionPolicy) -> CoercionPolicy {
        CoercionPolicy(self.0 | other.0)
    }

    pub const fn contains(self, flag: CoercionPolicy) -> bool {
        self.0 & flag.0 == flag.0
    }
}

/// Coerce `value` to `target`, applying only the loss classes `policy`
/// permits. On success the returned [`Value`] always carries `target`'s
/// datatype.
pub fn coerce_value(value: &Value, target: Datatype, policy: CoercionPolicy) -> (Status, Value) {
    let result = coerce_value_inner(value, target, policy);
    log::trace!(
        "coerce_value({} -> {}) -> {:?}",
        value.datatype().short_name(),
        target.short_name(),
        result.0
    );
    result
}

/// Largest integer an `f32` represents exactly (`2^24 - 1`).
const MAX_FLOAT_INT: i64 = 16_777_215;
/// Largest integer an `f64` represents exactly (`2^53 - 1`).
const MAX_DOUBLE_INT: i64 = 9_007_199_254_740_991;

fn coerce_value_inner(value: &Value, target: Datatype, policy: CoercionPolicy) -> (Status, Value) {
    match (value, target) {
        (Value::Long(v), Datatype::Double) => (Status::Success, Value::Double(*v as f64)),
        (Value::Long(v), Datatype::Decimal) => (Status::Success, Value::Decimal(*v as f64)),
        (Value::Long(v), Datatype::Float) => {
            let widened = *v as f64;
            let narrowed = widened as f32;
            if narrowed as f64 != widened && !policy.contains(CoercionPolicy::REDUCE_PRECISION) {
                return (Status::WouldReducePrecision, value.clone());
            }
            (Status::Success, Value::Float(narrowed))
        }
        (Value::ULong(v), Datatype::Double) => (Status::Success, Value::Double(*v as f64)),
        (Value::ULong(v), Datatype::Long) => {
            if *v > i64::MAX as u64 {
                return (Status::OutOfRange, value.clone());
            }
            (Status::Success, Value::Long(*v as i64))
        }
        (Value::Long(v), Datatype::UnsignedLong) => {
            if *v < 0 {
                return (Status::OutOfRange, value.clone());
            }
            (Status::Success, Value::ULong(*v as u64))
        }
        (Value::Double(v), Datatype::Long) | (Value::Decimal(v), Datatype::Long) => {
            coerce_float_to_long(value, *v, policy, MAX_DOUBLE_INT)
        }
        (Value::Float(v), Datatype::Long) => {
            coerce_float_to_long(value, f64::from(*v), policy, MAX_FLOAT_INT)
        }
        (Value::Double(v), Datatype::Decimal) => (Status::Success, Value::Decimal(*v)),
        (Value::Decimal(v), Datatype::Double) => (Status::Success, Value::Double(*v)),
        (Value::Double(v), Datatype::Float) => {
            let narrowed = *v as f32;
            if narrowed as f64 != *v && !policy.contains(CoercionPolicy::REDUCE_PRECISION) {
                return (Status::WouldReducePrecision, value.clone());
            }
            (Status::Success, Value::Float(narrowed))
        }
        (Value::Float(v), Datatype::Double) => (Status::Success, Value::Double(f64::from(*v))),
        (Value::Boolean(v), Datatype::Long) => (Status::Success, Value::Long(i64::from(*v))),
        (Value::Long(v), Datatype::Boolean) => coerce_number_to_boolean(value, *v != 0, policy),
        (Value::ULong(v), Datatype::Boolean) => coerce_number_to_boolean(value, *v != 0, policy),
        (Value::Double(v), Datatype::Boolean) | (Value::Decimal(v), Datatype::Boolean) => {
            coerce_number_to_boolean(value, *v != 0.0, policy)
        }
        (Value::Float(v), Datatype::Boolean) => coerce_number_to_boolean(value, *v != 0.0, policy),

        (Value::Hex(bytes), Datatype::Base64Binary) => (Status::Success, Value::Base64(bytes.clone())),
        (Value::Base64(bytes), Datatype::HexBinary) => (Status::Success, Value::Hex(bytes.clone())),

        (Value::DateTime(dt), Datatype::Time) => {
            if !policy.contains(CoercionPolicy::TRUNCATE) {
                return (Status::WouldTruncate, value.clone());
            }
            (Status::Success, Value::Time(dt.time))
        }
        (Value::DateTime(dt), Datatype::Date) => {
            if !policy.contains(CoercionPolicy::TRUNCATE) {
                return (Status::WouldTruncate, value.clone());
            }
            (Status::Success, Value::Date(dt.date))
        }

        (Value::Long(v), target) => match coerce_long_to(*v, target) {
            Some(Ok(result)) => (Status::Success, result),
            Some(Err(status)) => (status, value.clone()),
            None if value.datatype() == target => (Status::Success, value.clone()),
            None => (Status::Unsupported, value.clone()),
        },
        (Value::ULong(v), target) => match coerce_ulong_to(*v, target) {
            Some(Ok(result)) => (Status::Success, result),
            Some(Err(status)) => (status, value.clone()),
            None if value.datatype() == target => (Status::Success, value.clone()),
            None => (Status::Unsupported, value.clone()),
        },

        _ if value.datatype() == target => (Status::Success, value.clone()),
        _ => (Status::Unsupported, value.clone()),
    }
}

fn coerce_number_to_boolean(original: &Value, nonzero: bool, policy: CoercionPolicy) -> (Status, Value) {
    // Every nonzero number collapses to `true`, so the distinct magnitude
    // is lost unless the caller accepts truncation.
    if !policy.contains(CoercionPolicy::TRUNCATE) {
        return (Status::WouldTruncate, original.clone());
    }
    (Status::Success, Value::Boolean(nonzero))
}

/// Inclusive `(min, max)` bounds for the bounded signed integer sub-tags
/// narrower than `i64`.
fn signed_bound(target: Datatype) -> Option<(i64, i64)> {
    match target {
        Datatype::Int => Some((i32::MIN as i64, i32::MAX as i64)),
        Datatype::Short => Some((i16::MIN as i64, i16::MAX as i64)),
        Datatype::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
        _ => None,
    }
}

/// Inclusive upper bound for the bounded unsigned integer sub-tags
/// narrower than `u64`.
fn unsigned_bound(target: Datatype) -> Option<u64> {
    match target {
        Datatype::UnsignedInt => Some(u32::MAX as u64),
        Datatype::UnsignedShort => Some(u16::MAX as u64),
        Datatype::UnsignedByte => Some(u8::MAX as u64),
        _ => None,
    }
}

/// Sign predicate for the `i64`-backed arbitrary-precision integer sub-tags.
fn sign_constraint(target: Datatype) -> Option<fn(i64) -> bool> {
    match target {
        Datatype::NonNegativeInteger => Some(|v| v >= 0),
        Datatype::PositiveInteger => Some(|v| v > 0),
        Datatype::NonPositiveInteger => Some(|v| v <= 0),
        Datatype::NegativeInteger => Some(|v| v < 0),
        _ => None,
    }
}

/// Coerce a `Long`-family value to another signed integer sub-tag. `None`
/// means `target` isn't one of those sub-tags (caller falls back to its own
/// default); `Some(Err(status))` means it is, but `v` doesn't satisfy its
/// range or sign constraint.
fn coerce_long_to(v: i64, target: Datatype) -> Option<Result<Value, Status>> {
    if let Some((min, max)) = signed_bound(target) {
        return Some(if v < min || v > max {
            Err(Status::OutOfRange)
        } else {
            Ok(Value::Long(v))
        });
    }
    if let Some(constraint) = sign_constraint(target) {
        return Some(if constraint(v) {
            Ok(Value::Long(v))
        } else {
            Err(Status::OutOfRange)
        });
    }
    if matches!(target, Datatype::Long | Datatype::Integer) {
        return Some(Ok(Value::Long(v)));
    }
    None
}

/// Coerce a `ULong`-family value to another unsigned integer sub-tag.
fn coerce_ulong_to(v: u64, target: Datatype) -> Option<Result<Value, Status>> {
    if let Some(max) = unsigned_bound(target) {
        return Some(if v > max { Err(Status::OutOfRange) } else { Ok(Value::ULong(v)) });
    }
    if target == Datatype::UnsignedLong {
        return Some(Ok(Value::ULong(v)));
    }
    None
}

fn coerce_float_to_long(original: &Value, v: f64, policy: CoercionPolicy, bound: i64) -> (Status, Value) {
    if !v.is_finite() {
        return (Status::OutOfRange, original.clone());
    }
    let is_integral = v.fract() == 0.0;
    let rounded = if is_integral {
        v
    } else if policy.contains(CoercionPolicy::ROUND) {
        v.round()
    } else if policy.contains(CoercionPolicy::TRUNCATE) {
        v.trunc()
    } else {
        return (Status::WouldRound, original.clone());
    };
    if rounded < -(bound as f64) || rounded > bound as f64 {
        return (Status::OutOfRange, original.clone());
    }
    if !is_integral && !policy.contains(CoercionPolicy::REDUCE_PRECISION) {
        // Rounding/truncating a non-integral value always loses precision,
        // independent of which of ROUND/TRUNCATE was used to get there.
        return (Status::WouldReducePrecision, original.clone());
    }
    (Status::Success, Value::Long(rounded as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_int_to_double_always_succeeds() {
        let (status, v) = coerce_value(&Value::Long(42), Datatype::Double, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Double(42.0));
    }

    #[test]
    fn exact_double_to_long_succeeds_without_policy() {
        let (status, v) = coerce_value(&Value::Double(5.0), Datatype::Long, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Long(5));
    }

    #[test]
    fn fractional_double_to_long_needs_policy() {
        let (status, _) = coerce_value(&Value::Double(5.5), Datatype::Long, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::WouldRound);

        let (status, v) = coerce_value(
            &Value::Double(5.5),
            Datatype::Long,
            CoercionPolicy::ROUND.union(CoercionPolicy::REDUCE_PRECISION),
        );
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Long(6));
    }

    #[test]
    fn negative_ulong_coercion_rejected() {
        let (status, _) = coerce_value(&Value::Long(-1), Datatype::UnsignedLong, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::OutOfRange);
    }

    #[test]
    fn long_to_boolean_needs_truncate_policy() {
        let (status, _) = coerce_value(&Value::Long(2), Datatype::Boolean, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::WouldTruncate);

        let (status, v) = coerce_value(&Value::Long(2), Datatype::Boolean, CoercionPolicy::TRUNCATE);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Boolean(true));
    }

    #[test]
    fn double_to_boolean_needs_truncate_policy() {
        let (status, _) = coerce_value(&Value::Double(3.5), Datatype::Boolean, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::WouldTruncate);

        let (status, v) = coerce_value(&Value::Double(0.0), Datatype::Boolean, CoercionPolicy::TRUNCATE);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Boolean(false));
    }

    #[test]
    fn hex_and_base64_coerce_by_byte_copy() {
        let (status, v) = coerce_value(&Value::Hex(vec![0xDE, 0xAD]), Datatype::Base64Binary, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Base64(vec![0xDE, 0xAD]));

        let (status, v) = coerce_value(&Value::Base64(vec![0xDE, 0xAD]), Datatype::HexBinary, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Hex(vec![0xDE, 0xAD]));
    }

    #[test]
    fn datetime_to_time_and_date_need_truncate_policy() {
        use crate::datetime;
        let (_, dt, _) = datetime::read_date_time(b"2024-03-05T12:30:00Z");

        let (status, _) = coerce_value(&Value::DateTime(dt), Datatype::Time, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::WouldTruncate);

        let (status, v) = coerce_value(&Value::DateTime(dt), Datatype::Time, CoercionPolicy::TRUNCATE);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Time(dt.time));

        let (status, v) = coerce_value(&Value::DateTime(dt), Datatype::Date, CoercionPolicy::TRUNCATE);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Date(dt.date));
    }

    #[test]
    fn bounded_sub_tag_coercion_range_checks() {
        let (status, v) = coerce_value(&Value::Long(127), Datatype::Byte, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Long(127));

        let (status, _) = coerce_value(&Value::Long(128), Datatype::Byte, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::OutOfRange);

        let (status, v) = coerce_value(&Value::ULong(255), Datatype::UnsignedByte, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::ULong(255));

        let (status, _) = coerce_value(&Value::ULong(256), Datatype::UnsignedByte, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::OutOfRange);
    }

    #[test]
    fn sign_constrained_sub_tag_coercion() {
        let (status, v) = coerce_value(&Value::Long(5), Datatype::NonNegativeInteger, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Long(5));

        let (status, _) = coerce_value(&Value::Long(-5), Datatype::NonNegativeInteger, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::OutOfRange);

        let (status, _) = coerce_value(&Value::Long(0), Datatype::PositiveInteger, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::OutOfRange);
    }

    #[test]
    fn double_to_long_out_of_range_past_max_double_int() {
        // 1e16 exceeds 2^53-1, so it isn't guaranteed to round-trip exactly
        // even though it happens to be an integral f64.
        let (status, _) = coerce_value(&Value::Double(1e16), Datatype::Long, CoercionPolicy::ROUND);
        assert_eq!(status, Status::OutOfRange);
    }

    #[test]
    fn float_to_long_uses_the_narrower_max_float_int_bound() {
        let (status, v) = coerce_value(&Value::Float(16_777_215.0), Datatype::Long, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::Success);
        assert_eq!(v, Value::Long(16_777_215));

        let (status, _) = coerce_value(&Value::Float(16_777_216.0), Datatype::Long, CoercionPolicy::LOSSLESS);
        assert_eq!(status, Status::OutOfRange);
    }
}
