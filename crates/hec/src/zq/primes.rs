//! Downward prime search in the style of the NFLlib parameter tables.

use hec_util::is_prime;

/// Generate a `num_bits`-bit prime, congruent to 1 mod `modulo`, strictly
/// smaller than `upper_bound`. Note that `num_bits` must belong to (10..=60),
/// and upper_bound must be <= 1 << num_bits.
pub fn generate_prime(num_bits: usize, modulo: u64, upper_bound: u64) -> Option<u64> {
    if !(10..=60).contains(&num_bits) {
        None
    } else {
        debug_assert!(
            (1u64 << num_bits) >= upper_bound,
            "upper_bound larger than number of bits"
        );

        let leading_zeros = (64 - num_bits) as u32;

        let mut tentative_prime = upper_bound - 1;
        while tentative_prime % modulo != 1 && tentative_prime.leading_zeros() == leading_zeros {
            tentative_prime -= 1
        }

        while tentative_prime.leading_zeros() == leading_zeros
            && !is_prime(tentative_prime)
            && tentative_prime >= modulo
        {
            tentative_prime -= modulo
        }

        if tentative_prime.leading_zeros() == leading_zeros && is_prime(tentative_prime) {
            Some(tentative_prime)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generate_prime;
    use hec_util::catch_unwind;

    #[test]
    fn found() {
        // 8161 is the largest 13-bit prime congruent to 1 modulo 16.
        assert_eq!(generate_prime(13, 16, 1 << 13), Some(8161));
        // 786433 is the first hit when the search starts right above it.
        assert_eq!(generate_prime(20, 8192, 786434), Some(786433));
    }

    #[test]
    fn congruence_and_size() {
        for degree in [1024u64, 2048, 4096, 8192] {
            for num_bits in [20usize, 30, 40, 50, 60] {
                let p = generate_prime(num_bits, 2 * degree, 1 << num_bits).unwrap();
                assert_eq!(p % (2 * degree), 1);
                assert_eq!(64 - p.leading_zeros() as usize, num_bits);
            }
        }
    }

    #[test]
    fn upper_bound() {
        debug_assert!(catch_unwind(|| generate_prime(60, 2 * 1048576, (1 << 60) + 1)).is_err());
    }

    #[test]
    fn modulo_too_large() {
        assert!(generate_prime(10, 2048, 1 << 10).is_none());
    }

    #[test]
    fn not_found() {
        // 1033 is the smallest 11-bit prime congruent to 1 modulo 16, so looking for a
        // smaller one should fail.
        assert!(generate_prime(11, 16, 1033).is_none());
    }

    #[test]
    fn unsupported_sizes() {
        assert!(generate_prime(9, 16, 1 << 9).is_none());
        assert!(generate_prime(61, 16, 1 << 61).is_none());
    }
}
