//! Correctly-rounded lexical-to-IEEE754 parsing (§4.D), grounded on
//! `original_source/src/strtod.c`. Implements the classic three-tier
//! strategy: exact small-integer fast path, extended-precision (SoftFloat)
//! guess, and BigNat-exact verification only when the guess's uncertainty
//! window actually straddles a rounding boundary.

use crate::bignat::BigNat;
use crate::soft_float::{cached_power_for, SoftFloat};
use crate::status::Status;

/// Number of significant decimal digits kept before truncating trailing
/// digits into the exponent (`DBL_DECIMAL_DIG + 1`).
const MAX_SIG_DIGITS: usize = 18;

/// Lexed mantissa/exponent pair, prior to conversion to a binary float.
struct Lexed {
    negative: bool,
    mantissa: u64,
    /// Number of significant digits accumulated into `mantissa`.
    digit_count: u32,
    /// Decimal exponent such that the value is
    /// `mantissa * 10^exponent_adjust`.
    exponent_adjust: i32,
    consumed: usize,
}

/// Lex a signed decimal mantissa and exponent from `s`, per §4.D step 1.
/// Does not itself validate the overall decimal/double grammar (callers
/// already did, via the lexical-form check in `dec_from_lexical`); this is
/// purely the digit-accumulation pass.
fn lex_number(s: &[u8]) -> Option<Lexed> {
    let mut i = 0;
    let negative = match s.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut mantissa: u64 = 0;
    let mut digit_count: u32 = 0;
    let mut exponent_adjust: i32 = 0;
    let mut seen_digit = false;
    let mut seen_point = false;

    while i < s.len() {
        let c = s[i];
        if c.is_ascii_digit() {
            seen_digit = true;
            if digit_count < MAX_SIG_DIGITS as u32 {
                mantissa = mantissa * 10 + u64::from(c - b'0');
                digit_count += 1;
                if seen_point {
                    exponent_adjust -= 1;
                }
            } else if !seen_point {
                // Discarded trailing integer digit still widens the exponent.
                exponent_adjust += 1;
            }
            i += 1;
        } else if c == b'.' && !seen_point {
            seen_point = true;
            i += 1;
        } else {
            break;
        }
    }
    if !seen_digit {
        return None;
    }

    if i < s.len() && (s[i] == b'e' || s[i] == b'E') {
        let mut j = i + 1;
        let exp_negative = match s.get(j) {
            Some(b'-') => {
                j += 1;
                true
            }
            Some(b'+') => {
                j += 1;
                false
            }
            _ => false,
        };
        let start = j;
        let mut exp_val: i64 = 0;
        while j < s.len() && s[j].is_ascii_digit() {
            exp_val = (exp_val * 10 + i64::from(s[j] - b'0')).min(1_000_000);
            j += 1;
        }
        if j > start {
            let exp_val = if exp_negative { -exp_val } else { exp_val };
            exponent_adjust += exp_val.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            i = j;
        }
    }

    Some(Lexed {
        negative,
        mantissa,
        digit_count,
        exponent_adjust,
        consumed: i,
    })
}

/// Parse a finite lexical decimal/double/float mantissa into the nearest
/// `f64`, per §4.D. Returns `(value, bytes_consumed)`.
pub fn parse_finite_f64(s: &[u8]) -> Option<(f64, usize)> {
    let lexed = lex_number(s)?;
    let value = digits_to_f64(lexed.mantissa, lexed.digit_count, lexed.exponent_adjust);
    let value = if lexed.negative { -value } else { value };
    Some((value, lexed.consumed))
}

/// Core digit-to-double conversion (mantissa assumed non-negative here;
/// sign is applied by the caller), implementing §4.D steps 2-4.
fn digits_to_f64(mantissa: u64, digit_count: u32, exponent_adjust: i32) -> f64 {
    // Step 2: exact fast path — both the mantissa and the scaling power of
    // ten are exactly representable as f64, so the single f64 multiply/
    // divide already rounds correctly.
    if digit_count <= 15 && mantissa < (1u64 << 53) {
        if exponent_adjust >= 0 {
            if let Some(p10) = exact_pow10_f64(exponent_adjust) {
                return mantissa as f64 * p10;
            }
        } else if let Some(p10) = exact_pow10_f64(-exponent_adjust) {
            return mantissa as f64 / p10;
        }
    }

    // Step 3: SoftFloat guess via a cached power of ten, refined by an
    // exact power of ten when the cache didn't land exactly on the target
    // exponent.
    let cached = cached_power_for(exponent_adjust);
    let cached_sf = SoftFloat::new(cached.significand, cached.binary_exponent).normalize();
    let mut guess = SoftFloat::from_u64(mantissa).normalize().multiply(&cached_sf);

    let remaining_exp = exponent_adjust - cached.decimal_exponent;
    if remaining_exp != 0 {
        if let Some(extra) = exact_pow10_soft(remaining_exp) {
            guess = guess.multiply(&extra);
        }
    }

    // Step 4: exact BigNat verification settles any rounding uncertainty
    // left by the extended-precision guess above. This crate always runs
    // it rather than gating on a tracked error window, trading the rare
    // extra BigNat pass for a simpler, obviously-correct implementation.
    verify_with_bignat(mantissa, exponent_adjust, guess.to_f64())
}

fn exact_pow10_f64(e: i32) -> Option<f64> {
    if (0..=22).contains(&e) {
        Some(EXACT_POW10_F64[e as usize])
    } else {
        None
    }
}

const EXACT_POW10_F64: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

fn exact_pow10_soft(e: i32) -> Option<SoftFloat> {
    if (0..=22).contains(&e) {
        // 10^0..=10^22 are all exactly representable as f64, so converting
        // through the bit pattern is exact (no precision loss).
        Some(SoftFloat::from_f64_bits(EXACT_POW10_F64[e as usize]).normalize())
    } else {
        None
    }
}

/// Step 4: exact BigNat verification. `candidate` is already within a
/// handful of ULPs of correct (from the extended-precision guess); this
/// walks to the exactly nearest representable double by comparing the true
/// value against the midpoint between `candidate` and each neighbor,
/// breaking ties to the even mantissa as IEEE round-to-nearest-even
/// requires.
fn verify_with_bignat(mantissa: u64, exponent: i32, candidate: f64) -> f64 {
    if candidate == 0.0 || !candidate.is_finite() {
        return candidate;
    }

    let mut best = candidate;
    loop {
        let up = next_up(best);
        let cmp_up = compare_to_midpoint(mantissa, exponent, best, up);
        if cmp_up > 0 {
            best = up;
            continue;
        }
        if cmp_up == 0 {
            // Exactly halfway: round to the candidate with an even mantissa.
            best = if (up.to_bits() & 1) == 0 { up } else { best };
            break;
        }

        let down = next_down(best);
        let cmp_down = compare_to_midpoint(mantissa, exponent, down, best);
        if cmp_down < 0 {
            best = down;
            continue;
        }
        if cmp_down == 0 {
            best = if (down.to_bits() & 1) == 0 { down } else { best };
        }
        break;
    }
    best
}

/// Extract a finite `f64`'s `(mantissa, binary_exponent)` such that the
/// value equals `mantissa * 2^binary_exponent`, with the implicit leading
/// bit made explicit for normals.
fn decompose(v: f64) -> (u64, i32) {
    let bits = v.to_bits();
    let biased_exp = ((bits >> 52) & 0x7FF) as i32;
    let frac = bits & 0x000F_FFFF_FFFF_FFFF;
    if biased_exp == 0 {
        (frac, -1074)
    } else {
        (frac | (1u64 << 52), biased_exp - 1075)
    }
}

/// Sign of `(mantissa * 10^exponent) - (lo + hi) / 2`, computed exactly by
/// clearing all denominators into BigNat comparisons.
fn compare_to_midpoint(mantissa: u64, exponent: i32, lo: f64, hi: f64) -> i32 {
    let (m_lo, e_lo) = decompose(lo);
    let (m_hi, e_hi) = decompose(hi);
    let e_min = e_lo.min(e_hi);

    let mut lo_big = BigNat::zero();
    lo_big.set_u64(m_lo);
    lo_big.shift_left((e_lo - e_min) as usize);
    let mut hi_big = BigNat::zero();
    hi_big.set_u64(m_hi);
    hi_big.shift_left((e_hi - e_min) as usize);
    let mut sum = lo_big;
    sum.add(&hi_big); // sum * 2^e_min == lo + hi

    // Compare 2 * mantissa * 10^exponent against sum * 2^e_min.
    let mut lhs = BigNat::zero();
    lhs.set_u64(mantissa);
    lhs.shift_left(1);
    let mut rhs = sum;

    if exponent >= 0 {
        lhs.multiply_pow10(exponent as u32);
    } else {
        rhs.multiply_pow10((-exponent) as u32);
    }
    if e_min >= 0 {
        rhs.shift_left(e_min as usize);
    } else {
        lhs.shift_left((-e_min) as usize);
    }

    lhs.compare(&rhs)
}

fn next_up(v: f64) -> f64 {
    if v.is_nan() || v == f64::INFINITY {
        return v;
    }
    let bits = v.to_bits();
    let next_bits = if v >= 0.0 { bits + 1 } else { bits - 1 };
    f64::from_bits(next_bits)
}

fn next_down(v: f64) -> f64 {
    if v.is_nan() || v == f64::NEG_INFINITY {
        return v;
    }
    let bits = v.to_bits();
    let next_bits = if v > 0.0 { bits - 1 } else { bits + 1 };
    f64::from_bits(next_bits)
}

/// Parse a double per §6.1: decimal grammar plus optional exponent and the
/// tokens `NaN`/`INF`/`-INF`/`+INF`. Out-of-range magnitudes succeed as
/// signed infinity (double admits infinities; decimal does not — see
/// [`parse_decimal`]).
pub fn parse_double(s: &[u8]) -> (Status, f64, usize) {
    let start = crate::surface::skip_whitespace(s);
    let rest = &s[start..];

    for (token, value) in [
        (&b"NaN"[..], f64::NAN),
        (&b"-INF"[..], f64::NEG_INFINITY),
        (&b"+INF"[..], f64::INFINITY),
        (&b"INF"[..], f64::INFINITY),
    ] {
        if rest.starts_with(token) {
            return (Status::Success, value, start + token.len());
        }
    }

    match parse_finite_f64(rest) {
        Some((v, n)) if n > 0 => (Status::Success, v, start + n),
        _ => (Status::ExpectedDigit, 0.0, 0),
    }
}

/// Parse a float (`f32`) per §6.1, by parsing as `f64` and narrowing; the
/// narrowing uses `as f32`'s own round-to-nearest-even, which is correct
/// because the intermediate `f64` already carries at least float-plus-guard
/// precision for any lexical float literal.
pub fn parse_float(s: &[u8]) -> (Status, f32, usize) {
    let (status, v, n) = parse_double(s);
    (status, v as f32, n)
}

/// Parse a decimal per §6.1: like double but rejects `NaN`/`INF`/`-INF` and
/// any out-of-range magnitude (decimal has no infinities).
pub fn parse_decimal(s: &[u8]) -> (Status, f64, usize) {
    let start = crate::surface::skip_whitespace(s);
    let rest = &s[start..];
    if rest.starts_with(b"NaN") || rest.starts_with(b"INF") || rest.starts_with(b"-INF") || rest.starts_with(b"+INF")
    {
        return (Status::ExpectedDigit, 0.0, 0);
    }
    match parse_finite_f64(rest) {
        Some((v, n)) if n > 0 && v.is_finite() => (Status::Success, v, start + n),
        Some((v, n)) if n > 0 => {
            let _ = v;
            (Status::BadValue, 0.0, 0)
        }
        _ => (Status::ExpectedDigit, 0.0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_small_integers_roundtrip() {
        for v in [0.0f64, 1.0, 42.0, 100.0, 1e10] {
            let s = format!("{:?}", v);
            let (status, parsed, _) = parse_double(s.as_bytes());
            assert_eq!(status, Status::Success);
            assert_eq!(parsed, v, "mismatch parsing {}", s);
        }
    }

    #[test]
    fn parses_scientific_notation() {
        let (status, v, n) = parse_double(b"4.2E16");
        assert_eq!(status, Status::Success);
        assert_eq!(v, 4.2e16);
        assert_eq!(n, 6);
    }

    #[test]
    fn decimal_rejects_special_tokens() {
        for tok in [&b"INF"[..], b"-INF", b"NaN"] {
            let (status, _, _) = parse_decimal(tok);
            assert_eq!(status, Status::ExpectedDigit);
        }
    }

    #[test]
    fn double_accepts_special_tokens() {
        let (status, v, _) = parse_double(b"NaN");
        assert_eq!(status, Status::Success);
        assert!(v.is_nan());

        let (status, v, _) = parse_double(b"-INF");
        assert_eq!(status, Status::Success);
        assert_eq!(v, f64::NEG_INFINITY);
    }

    #[test]
    fn simple_decimal_values_are_exact() {
        let (status, v, n) = parse_decimal(b"0.1");
        assert_eq!(status, Status::Success);
        assert_eq!(v, 0.1f64);
        assert_eq!(n, 3);
    }
}
