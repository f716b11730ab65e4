use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for every time quantity (cycle time, timer interval, elapsed time,
/// host deltas) so that catch-up arithmetic is exact and reproducible.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use at the host/data boundary only.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display or host integration.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Checked division for Fixed64 that returns None on zero divisor.
#[inline]
pub fn checked_div_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_div(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
    }

    #[test]
    fn fixed64_checked_div_by_zero() {
        let a = f64_to_fixed64(1.0);
        let zero = f64_to_fixed64(0.0);
        assert!(checked_div_64(a, zero).is_none());
    }

    #[test]
    fn fixed64_repeated_subtraction_is_exact() {
        let mut acc = f64_to_fixed64(3.5);
        let one = Fixed64::from_num(1);
        for _ in 0..3 {
            acc -= one;
        }
        assert_eq!(acc, f64_to_fixed64(0.5));
    }
}
