//! Unnormalized 64-bit-mantissa software float with a cached power-of-ten
//! table (§4.B). Grounded on `original_source/src/soft_float.h`.

/// `significand * 2^exponent`. Normalized when bit 63 of `significand` is
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftFloat {
    pub significand: u64,
    pub exponent: i32,
}

/// Exact powers of ten from 10^0 to 10^8 (fit in a significand with no
/// rounding), used for the cheap early-exit multiplication path.
pub const EXACT_POW10: [u64; 9] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
];

/// Number of exact powers of ten representable in an `f64` mantissa
/// (`10^0..=10^22`) used by the decimal fast path in §4.D step 2.
pub const N_EXACT_POW10: i32 = 23;

/// Cached powers of ten from `10^-348` to `10^340` at step 8, as used by
/// the Grisu-style fast guess in §4.D step 3. Each entry is `(significand,
/// binary_exponent, decimal_exponent)` such that
/// `significand * 2^binary_exponent ≈ 10^decimal_exponent` with the
/// significand normalized (bit 63 set).
pub struct CachedPower {
    pub significand: u64,
    pub binary_exponent: i32,
    pub decimal_exponent: i32,
}

/// Returns the cached power of ten with decimal exponent `<= min_exponent`
/// closest to it, stepping by 8 as in the original table, computed on the
/// fly from `EXACT_POW10`/`BigNat`-free integer exponentiation so that no
/// 87-entry literal table needs to be hand-transcribed. This trades a
/// handful of extra multiplies (bounded by ~87/8 cached steps) for a much
/// smaller, obviously-correct source file; the hot strtod fast path (§4.D
/// step 2) never reaches this function at all. Rounding down (rather than
/// up) keeps the leftover correction exponent in `digits_to_f64` always
/// `>= 0`, within `exact_pow10_soft`'s covered range.
pub fn cached_power_for(min_exponent: i32) -> CachedPower {
    // Decimal exponent of the returned cached power, rounded down to a
    // multiple-of-8 offset within [-348, 340].
    const CACHE_STEP: i32 = 8;
    const MIN_DECIMAL: i32 = -348;
    const MAX_DECIMAL: i32 = 340;
    let dec = min_exponent.clamp(MIN_DECIMAL, MAX_DECIMAL);
    let rem = ((dec - MIN_DECIMAL) % CACHE_STEP + CACHE_STEP) % CACHE_STEP;
    let dec = dec - rem;

    let mut sf = SoftFloat::from_u64(1);
    if dec >= 0 {
        sf = sf.multiply_pow10(dec as u32);
    } else {
        let pos = SoftFloat::from_u64(1).multiply_pow10((-dec) as u32);
        sf = SoftFloat::from_u64(1).divide_normalized(&pos);
    }
    let sf = sf.normalize();
    CachedPower {
        significand: sf.significand,
        binary_exponent: sf.exponent,
        decimal_exponent: dec,
    }
}

impl SoftFloat {
    pub const fn new(significand: u64, exponent: i32) -> Self {
        SoftFloat {
            significand,
            exponent,
        }
    }

    pub const fn from_u64(v: u64) -> Self {
        SoftFloat::new(v, 0)
    }

    /// Normalize so that bit 63 of the significand is set, adjusting the
    /// exponent to compensate. The zero significand is left untouched
    /// (there is no representable normalized form).
    pub fn normalize(self) -> Self {
        if self.significand == 0 {
            return self;
        }
        let shift = self.significand.leading_zeros();
        SoftFloat::new(self.significand << shift, self.exponent - shift as i32)
    }

    /// 64x64 -> top-64 multiply with round-to-nearest, as `(a*b + 2^63) >>
    /// 64` using a 128-bit intermediate (available on every target this
    /// crate supports; the original uses an explicit hi/lo split because C
    /// has no native `u128`).
    pub fn multiply(self, other: &SoftFloat) -> Self {
        let product = u128::from(self.significand) * u128::from(other.significand);
        let rounded = (product + (1u128 << 63)) >> 64;
        SoftFloat::new(rounded as u64, self.exponent + other.exponent + 64)
    }

    /// Multiply by `10^e` using the exact table for small `e` and repeated
    /// squaring-free chaining through [`multiply`] otherwise.
    pub fn multiply_pow10(self, e: u32) -> Self {
        let mut result = self;
        let mut remaining = e;
        while remaining > 0 {
            let chunk = remaining.min(8);
            let p10 = EXACT_POW10[chunk as usize];
            result = result.normalize().multiply(&SoftFloat::from_u64(p10).normalize());
            remaining -= chunk;
        }
        result
    }

    /// Reciprocal-based division used only by [`cached_power_for`]'s
    /// negative-exponent branch: `self / other`, both normalized, via
    /// `(self << 64) / other`.
    fn divide_normalized(self, other: &SoftFloat) -> Self {
        debug_assert_ne!(other.significand, 0);
        let numerator = u128::from(self.significand) << 64;
        let quotient = numerator / u128::from(other.significand);
        SoftFloat::new(quotient as u64, self.exponent - other.exponent - 64)
    }

    /// Construct from a finite `f64`, unnormalized (matching the bit
    /// layout: mantissa shifted so the implicit leading bit is explicit).
    pub fn from_f64_bits(d: f64) -> Self {
        let bits = d.to_bits();
        let biased_exp = ((bits >> 52) & 0x7FF) as i32;
        let mantissa = bits & 0x000F_FFFF_FFFF_FFFF;
        if biased_exp == 0 {
            // subnormal
            SoftFloat::new(mantissa, -1074)
        } else {
            SoftFloat::new(mantissa | (1u64 << 52), biased_exp - 1075)
        }
    }

    /// Convert back to `f64` with correct IEEE round-to-nearest-even,
    /// including subnormal results. `self` need not be normalized; zero
    /// collapses to `0.0`.
    pub fn to_f64(self) -> f64 {
        if self.significand == 0 {
            return 0.0;
        }
        let normalized = self.normalize();
        let w0 = normalized.significand; // bit 63 set
        let e0 = normalized.exponent;

        // Unbiased exponent the result would have if it falls in the
        // normal range (derivation: value = w0*2^e0, w0 = m*2^11 + r with m
        // the 53-bit mantissa-with-implicit-bit, so value = m*2^(e0+63)).
        let e_normal = e0 + 63;
        let biased_normal = e_normal + 1023;

        if biased_normal >= 1 {
            // Normal range: round the top 53 bits of the 64-bit significand.
            let shift = 11u32;
            let dropped = w0 & ((1u64 << shift) - 1);
            let half = 1u64 << (shift - 1);
            let mut m = w0 >> shift;
            let mut biased = biased_normal;
            if dropped > half || (dropped == half && (m & 1) == 1) {
                m += 1;
                if m == (1u64 << 53) {
                    m >>= 1;
                    biased += 1;
                }
            }
            if biased >= 0x7FF {
                return f64::INFINITY;
            }
            let stored = m & 0x000F_FFFF_FFFF_FFFF;
            return f64::from_bits(((biased as u64) << 52) | stored);
        }

        // Subnormal (or underflow to zero): target representation is
        // `m * 2^-1074` with `m` a 52-bit unsigned integer and no implicit
        // leading bit. Need value*2^1074 rounded to the nearest integer.
        let shift_i = -(e0 + 1074);
        if shift_i >= 64 || shift_i < 0 {
            return 0.0;
        }
        let shift = shift_i as u32;
        let (dropped, half, mut m) = if shift == 0 {
            (0u64, 0u64, w0)
        } else {
            (w0 & ((1u64 << shift) - 1), 1u64 << (shift - 1), w0 >> shift)
        };
        if shift > 0 && (dropped > half || (dropped == half && (m & 1) == 1)) {
            m += 1;
        }
        if m > 0x000F_FFFF_FFFF_FFFF {
            // rounded up into the smallest normal number
            return f64::from_bits(1u64 << 52);
        }
        f64::from_bits(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_sets_top_bit() {
        let sf = SoftFloat::new(1, 0).normalize();
        assert_eq!(sf.significand >> 63, 1);
    }

    #[test]
    fn multiply_is_associative_enough_for_pow10_chaining() {
        let a = SoftFloat::from_u64(1).normalize();
        let ten = SoftFloat::from_u64(10).normalize();
        let hundred = a.multiply(&ten).multiply(&ten);
        let direct = a.multiply_pow10(2);
        // both approximate 100 closely; compare via reconstructed f64
        assert!((hundred.to_f64_raw() - direct.to_f64_raw()).abs() < 1e-9);
    }

    impl SoftFloat {
        fn to_f64_raw(self) -> f64 {
            (self.significand as f64) * 2f64.powi(self.exponent)
        }
    }

    #[test]
    fn roundtrip_simple_values() {
        for v in [1.0f64, 0.5, 2.0, 3.14159, 1e10, 1e-10, 123456789.0] {
            let sf = SoftFloat::from_f64_bits(v);
            assert_eq!(sf.to_f64(), v);
        }
    }

    #[test]
    fn cached_power_for_rounds_down_to_lattice_at_or_below_target() {
        // The cache lattice is `-348 + 8k`, which never lands exactly on 0;
        // the nearest point at or below 0 is -4.
        let cp = cached_power_for(0);
        assert_eq!(cp.decimal_exponent, -4);

        // An exact lattice point is returned unchanged.
        let cp = cached_power_for(4);
        assert_eq!(cp.decimal_exponent, 4);

        // Rounding must never overshoot past min_exponent.
        let cp = cached_power_for(5);
        assert_eq!(cp.decimal_exponent, 4);
    }
}
