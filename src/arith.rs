//! Modular arithmetic helpers on top of [`num_bigint`].
//!
//! Everything in this module works on non-negative integers; signed
//! intermediates (extended Euclid, Lagrange numerators) are reduced back into
//! `[0, m)` before they leave.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

use crate::error::{Error, Result};

/// Modular inverse of `a` modulo `m` via the extended Euclidean algorithm.
///
/// Returns [`Error::InverseNonInvertible`] if `gcd(a, m) != 1`.
pub fn mod_inv(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    if m.is_zero() {
        return Err(Error::InverseNonInvertible);
    }

    let mut r0 = BigInt::from(m.clone());
    let mut r1 = BigInt::from(a % m);
    let mut t0 = BigInt::zero();
    let mut t1 = BigInt::one();

    while !r1.is_zero() {
        let quotient = &r0 / &r1;
        let r2 = &r0 - &quotient * &r1;
        let t2 = &t0 - &quotient * &t1;
        r0 = r1;
        r1 = r2;
        t0 = t1;
        t1 = t2;
    }

    if !r0.is_one() {
        return Err(Error::InverseNonInvertible);
    }
    Ok(reduce_signed(&t0, m))
}

/// Reduces a possibly negative integer into `[0, m)`.
pub fn reduce_signed(value: &BigInt, m: &BigUint) -> BigUint {
    let modulus = BigInt::from(m.clone());
    let reduced = value.mod_floor(&modulus);
    let (_, magnitude) = reduced.into_parts();
    magnitude
}

/// Subtraction modulo `m`, assuming both operands already lie in `[0, m)`.
pub fn sub_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    ((a + m) - b) % m
}

/// Square root modulo a prime `p` with `p = 3 (mod 4)`.
///
/// Returns `None` when `a` is a quadratic non-residue.
pub fn sqrt_mod(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a = a % p;
    if a.is_zero() {
        return Some(BigUint::zero());
    }
    let exponent = (p + 1u32) >> 2;
    let root = a.modpow(&exponent, p);
    if (&root * &root) % p == a {
        Some(root)
    } else {
        None
    }
}

const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Miller-Rabin primality test with `rounds` random bases, preceded by
/// trial division against a table of small primes.
pub fn is_probable_prime<R: Rng>(n: &BigUint, rng: &mut R, rounds: u32) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for small in SMALL_PRIMES {
        let small = BigUint::from(small);
        if *n == small {
            return true;
        }
        if (n % small).is_zero() {
            return false;
        }
    }

    // n - 1 = 2^s * d with d odd
    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let base = rng.gen_biguint_below(&(n - 3u32)) + &two;
        let mut x = base.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 0..s.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn mod_inv_small() {
        let inv = mod_inv(&big(3), &big(11)).unwrap();
        assert_eq!(inv, big(4));
        assert_eq!((big(3) * inv) % big(11), big(1));
    }

    #[test]
    fn mod_inv_large_prime() {
        let p = big(1_000_000_007);
        let a = big(123_456_789);
        let inv = mod_inv(&a, &p).unwrap();
        assert_eq!((a * inv) % p, big(1));
    }

    #[test]
    fn mod_inv_non_invertible() {
        assert_eq!(mod_inv(&big(6), &big(9)), Err(Error::InverseNonInvertible));
        assert_eq!(mod_inv(&big(0), &big(7)), Err(Error::InverseNonInvertible));
    }

    #[test]
    fn sub_mod_wraps() {
        assert_eq!(sub_mod(&big(2), &big(5), &big(7)), big(4));
        assert_eq!(sub_mod(&big(5), &big(2), &big(7)), big(3));
    }

    #[test]
    fn sqrt_mod_residues() {
        // 131 = 3 (mod 4)
        let p = big(131);
        let root = sqrt_mod(&big(9), &p).unwrap();
        assert_eq!((&root * &root) % &p, big(9));
        // 2 is a non-residue modulo 131
        assert_eq!(sqrt_mod(&big(2), &p), None);
    }

    #[test]
    fn miller_rabin_knowns() {
        let mut rng = ChaChaRng::from_seed([7; 32]);
        for prime in [2u64, 3, 5, 131, 1091, 1_000_000_007] {
            assert!(is_probable_prime(&big(prime), &mut rng, 30), "{prime}");
        }
        for composite in [1u64, 4, 15, 561, 1105, 1_000_000_005] {
            assert!(!is_probable_prime(&big(composite), &mut rng, 30), "{composite}");
        }
    }

    #[test]
    fn miller_rabin_solinas() {
        // 2^160 - 2^31 - 1 is a known Solinas prime
        let mut rng = ChaChaRng::from_seed([9; 32]);
        let q = (BigUint::one() << 160u32) - (BigUint::one() << 31u32) - BigUint::one();
        assert!(is_probable_prime(&q, &mut rng, 30));
    }
}
