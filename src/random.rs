//! Randomized sampling: Solinas primes, ranged and fixed-width integers,
//! and random curve points.
//!
//! Like the low-level scheme operations, everything here is bounded by
//! [`Rng`] only, not [`CryptoRng`][rand::CryptoRng]. That is what makes the
//! generation procedures testable with a seeded generator — but when you
//! call them outside of tests, hand them a cryptographically secure source.

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;

use crate::arith::{is_probable_prime, sqrt_mod};
use crate::curve::{AffinePoint, EllipticCurve};
use crate::error::{Error, Result};

pub const SOLINAS_GENERATION_ATTEMPT_LIMIT: u32 = 100;
pub const POINT_GENERATION_ATTEMPT_LIMIT: u32 = 100;

const PRIME_SEARCH_ATTEMPT_LIMIT: u32 = 100_000;
const MILLER_RABIN_ROUNDS: u32 = 30;

/// Samples uniformly from `[0, bound)`.
pub fn random_in_range<R: Rng>(rng: &mut R, bound: &BigUint) -> BigUint {
    rng.gen_biguint_below(bound)
}

/// Samples an integer of exactly `bits` bits (the top bit is forced).
pub fn random_of_length<R: Rng>(rng: &mut R, bits: u64) -> BigUint {
    let mut value = rng.gen_biguint(bits);
    value.set_bit(bits - 1, true);
    value
}

/// Searches for a Solinas prime `2^a ± 2^b ± 1` with `a = bits` and random
/// `0 < b < a`, giving up after `limit` attempts.
pub fn random_solinas_prime<R: Rng>(rng: &mut R, bits: u64, limit: u32) -> Result<BigUint> {
    for _ in 0..limit {
        let b = rng.gen_range(1..bits);
        let mut candidate = BigUint::one() << bits;
        if rng.gen::<bool>() {
            candidate += BigUint::one() << b;
        } else {
            candidate -= BigUint::one() << b;
        }
        if rng.gen::<bool>() {
            candidate += BigUint::one();
        } else {
            candidate -= BigUint::one();
        }
        if is_probable_prime(&candidate, rng, MILLER_RABIN_ROUNDS) {
            return Ok(candidate);
        }
    }
    Err(Error::SolinasGenerationFailed)
}

/// Samples a random point of `E(F_p)` by drawing x-coordinates until the
/// curve equation has a square right-hand side, up to `limit` attempts.
pub fn random_affine_point<R: Rng>(
    rng: &mut R,
    ec: &EllipticCurve,
    limit: u32,
) -> Result<AffinePoint> {
    for _ in 0..limit {
        let x = rng.gen_biguint_below(&ec.p);
        let rhs = ec.rhs(&x);
        if let Some(y) = sqrt_mod(&rhs, &ec.p) {
            return Ok(AffinePoint::new(x, y));
        }
    }
    Err(Error::PointGenerationFailed)
}

/// Samples the pairing group shared by the protocol layers: a Solinas prime
/// `q`, a field order `p = 12·r·q - 1`, the supersingular curve
/// `y² = x³ + 1` over `p`, and a generator of the order-q subgroup.
pub fn generate_group<R: Rng>(
    rng: &mut R,
    level: crate::SecurityLevel,
) -> Result<(EllipticCurve, BigUint, AffinePoint)> {
    let q = random_solinas_prime(rng, level.q_bits(), SOLINAS_GENERATION_ATTEMPT_LIMIT)?;

    // find r such that p = 12 * r * q - 1 is prime
    let r_bits = level.p_bits() - level.q_bits() - 3;
    let mut cofactor;
    let p = {
        let mut attempts = 0;
        loop {
            if attempts == PRIME_SEARCH_ATTEMPT_LIMIT {
                return Err(Error::PrimalityTestFailed);
            }
            attempts += 1;
            let r = random_of_length(rng, r_bits);
            cofactor = r * 12u32;
            let candidate = &cofactor * &q - 1u32;
            if is_probable_prime(&candidate, rng, MILLER_RABIN_ROUNDS) {
                break candidate;
            }
        }
    };
    let ec = EllipticCurve::supersingular(p);

    // push a random point into the order-q subgroup
    let generator = loop {
        let candidate = random_affine_point(rng, &ec, POINT_GENERATION_ATTEMPT_LIMIT)?;
        let point = candidate.mul(&cofactor, &ec)?;
        if !point.is_infinity() {
            break point;
        }
    };

    Ok((ec, q, generator))
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn ranged_sampling_respects_bounds() {
        let mut rng = ChaChaRng::from_seed([1; 32]);
        let bound = BigUint::from(1000u32);
        for _ in 0..100 {
            assert!(random_in_range(&mut rng, &bound) < bound);
        }
    }

    #[test]
    fn sized_sampling_pins_the_top_bit() {
        let mut rng = ChaChaRng::from_seed([2; 32]);
        for bits in [8u64, 160, 349] {
            let v = random_of_length(&mut rng, bits);
            assert_eq!(v.bits(), bits);
        }
    }

    #[test]
    fn solinas_prime_has_expected_shape() {
        let mut rng = ChaChaRng::from_seed([3; 32]);
        let q = random_solinas_prime(&mut rng, 160, SOLINAS_GENERATION_ATTEMPT_LIMIT).unwrap();
        // 2^160 ± 2^b ± 1 stays within one bit of 2^160
        assert!(q.bits() == 160 || q.bits() == 161);
        assert!(is_probable_prime(&q, &mut rng, 30));
    }

    #[test]
    fn solinas_generation_is_deterministic_with_a_fixed_seed() {
        let a = {
            let mut rng = ChaChaRng::from_seed([4; 32]);
            random_solinas_prime(&mut rng, 160, SOLINAS_GENERATION_ATTEMPT_LIMIT).unwrap()
        };
        let b = {
            let mut rng = ChaChaRng::from_seed([4; 32]);
            random_solinas_prime(&mut rng, 160, SOLINAS_GENERATION_ATTEMPT_LIMIT).unwrap()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn random_points_lie_on_the_curve() {
        let mut rng = ChaChaRng::from_seed([5; 32]);
        let ec = EllipticCurve::supersingular(BigUint::from(131u32));
        for _ in 0..20 {
            let point = random_affine_point(&mut rng, &ec, POINT_GENERATION_ATTEMPT_LIMIT).unwrap();
            assert!(point.is_on_curve(&ec));
        }
    }
}
