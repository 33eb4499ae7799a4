#![crate_name = "hec_util"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Numeric utilities for the hec library.

#[cfg(test)]
#[macro_use]
extern crate proptest;

use num_bigint_dig::{prime::probably_prime, BigUint};
use num_traits::PrimInt;
use std::{mem::size_of, panic::UnwindSafe};

/// Define catch_unwind to silence the panic in unit tests.
pub fn catch_unwind<F, R>(f: F) -> std::thread::Result<R>
where
    F: FnOnce() -> R + UnwindSafe,
{
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let r = std::panic::catch_unwind(f);
    std::panic::set_hook(prev_hook);
    r
}

/// Returns whether the modulus p is prime; this function is 100% accurate.
pub fn is_prime(p: u64) -> bool {
    probably_prime(&BigUint::from(p), 0)
}

/// Returns the number of bits b such that 2^b <= value.
/// Panics when `value` is 0.
pub fn ilog2<T: PrimInt>(value: T) -> usize {
    assert!(value > T::zero());
    // When 2^b <= value < 2^(b+1), value.leading_zeros() = sizeof(T) - (b + 1).
    size_of::<T>() * 8 - 1 - value.leading_zeros() as usize
}

/// Returns the number of bits needed to represent `value`, i.e. `ilog2(value) + 1`.
/// Panics when `value` is 0.
pub fn bit_length<T: PrimInt>(value: T) -> usize {
    ilog2(value) + 1
}

#[cfg(test)]
mod tests {
    use super::{bit_length, ilog2, is_prime};

    #[test]
    fn prime() {
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(is_prime(5));
        assert!(is_prime(7));
        assert!(is_prime(786433));
        assert!(is_prime(4611686018326724609));

        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(!is_prime(4));
        assert!(!is_prime(6));
        assert!(!is_prime(8));
        assert!(!is_prime(9));
        assert!(!is_prime(786432));
        assert!(!is_prime(4611686018326724607));
    }

    #[test]
    fn ilog2_is_correct() {
        assert_eq!(ilog2(1), 0);
        assert_eq!(ilog2(2), 1);
        assert_eq!(ilog2(3), 1);
        assert_eq!(ilog2(4), 2);
        for i in 2..=62 {
            assert_eq!(ilog2(1u64 << i), i);
            assert_eq!(ilog2((1u64 << i) + 1), i);
            assert_eq!(ilog2((1u64 << (i + 1)) - 1), i);
        }
    }

    proptest! {
        #[test]
        fn bit_length_matches_std(value in 1u64..) {
            prop_assert_eq!(bit_length(value), (64 - value.leading_zeros()) as usize);
        }
    }
}
