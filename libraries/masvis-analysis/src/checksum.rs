//! Energy checksum of the fixed-point samples
//!
//! A cheap fingerprint to tell whether two analyses saw the same samples.
//! Not cryptographic.

/// Sum of the squared samples reinterpreted as `u32`
///
/// Each square wraps modulo 2^32 and the sum wraps modulo 2^64, so the
/// result does not depend on summation order.
pub fn checksum<S: AsRef<[i32]>>(channels: &[S]) -> u64 {
    channels
        .iter()
        .flat_map(|c| c.as_ref().iter())
        .fold(0_u64, |sum, &x| {
            let x = x as u32;
            sum.wrapping_add(u64::from(x.wrapping_mul(x)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_square_exactly() {
        assert_eq!(checksum(&[vec![1, 2, 3]]), 14);
        assert_eq!(checksum(&[vec![1], vec![2, 3]]), 14);
    }

    #[test]
    fn negative_values_wrap_as_unsigned() {
        // (2^32 - 1)^2 mod 2^32 == 1
        assert_eq!(checksum(&[vec![-1]]), 1);
        // 65536^2 wraps to 0
        assert_eq!(checksum(&[vec![65_536]]), 0);
    }

    #[test]
    fn order_does_not_matter() {
        let a = vec![vec![5, -7, 1_000_000], vec![i32::MIN, i32::MAX]];
        let b = vec![vec![i32::MAX, 1_000_000], vec![-7, i32::MIN, 5]];
        assert_eq!(checksum(&a), checksum(&b));
    }

    #[test]
    fn silence_is_zero() {
        assert_eq!(checksum(&[vec![0; 100], vec![0; 100]]), 0);
    }
}
