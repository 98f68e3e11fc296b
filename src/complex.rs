//! Arithmetic in the quadratic extension field F_p² = F_p[i]/(i² + 1).
//!
//! Elements are written `a + b·i`. The modulus is passed into every
//! operation rather than stored per element; all operations reduce their
//! result into `[0, p)` component-wise.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::arith::{mod_inv, sub_mod};
use crate::error::Result;

/// An element of F_p².
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complex {
    /// The real part `a`.
    pub re: BigUint,
    /// The imaginary part `b`.
    pub im: BigUint,
}

impl Complex {
    pub fn new(re: BigUint, im: BigUint) -> Self {
        Self { re, im }
    }

    /// Lifts an element of F_p into F_p².
    pub fn from_real(re: BigUint) -> Self {
        Self {
            re,
            im: BigUint::zero(),
        }
    }

    pub fn zero() -> Self {
        Self {
            re: BigUint::zero(),
            im: BigUint::zero(),
        }
    }

    pub fn one() -> Self {
        Self {
            re: BigUint::one(),
            im: BigUint::zero(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.re.is_one() && self.im.is_zero()
    }

    pub fn add(&self, other: &Self, p: &BigUint) -> Self {
        Self {
            re: (&self.re + &other.re) % p,
            im: (&self.im + &other.im) % p,
        }
    }

    pub fn sub(&self, other: &Self, p: &BigUint) -> Self {
        Self {
            re: sub_mod(&(&self.re % p), &(&other.re % p), p),
            im: sub_mod(&(&self.im % p), &(&other.im % p), p),
        }
    }

    /// `(a + bi)(c + di) = (ac - bd) + (ad + bc)i`
    pub fn mul(&self, other: &Self, p: &BigUint) -> Self {
        let ac = (&self.re * &other.re) % p;
        let bd = (&self.im * &other.im) % p;
        let ad = (&self.re * &other.im) % p;
        let bc = (&self.im * &other.re) % p;
        Self {
            re: sub_mod(&ac, &bd, p),
            im: (ad + bc) % p,
        }
    }

    /// Multiplication by an integer scalar.
    pub fn scale(&self, k: &BigUint, p: &BigUint) -> Self {
        Self {
            re: (&self.re * k) % p,
            im: (&self.im * k) % p,
        }
    }

    /// Square-and-multiply exponentiation.
    pub fn pow(&self, exponent: &BigUint, p: &BigUint) -> Self {
        if exponent.is_zero() {
            return Self::one();
        }
        let mut result = Self::one();
        let bits = exponent.bits();
        for i in (0..bits).rev() {
            result = result.mul(&result, p);
            if exponent.bit(i) {
                result = result.mul(self, p);
            }
        }
        result
    }

    /// Multiplicative inverse: `(a + bi)^-1 = (a - bi) / (a² + b²)`.
    ///
    /// Fails with [`crate::error::Error::InverseNonInvertible`] when the norm
    /// `a² + b²` vanishes modulo `p`.
    pub fn inverse(&self, p: &BigUint) -> Result<Self> {
        let norm = (&self.re * &self.re + &self.im * &self.im) % p;
        let norm_inv = mod_inv(&norm, p)?;
        Ok(Self {
            re: (&self.re * &norm_inv) % p,
            im: (sub_mod(&BigUint::zero(), &self.im, p) * &norm_inv) % p,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    fn cx(re: u64, im: u64) -> Complex {
        Complex::new(big(re), big(im))
    }

    #[test]
    fn mul_against_hand_computation() {
        let p = big(131);
        // (3 + 4i)(5 + 6i) = (15 - 24) + (18 + 20)i = -9 + 38i
        let product = cx(3, 4).mul(&cx(5, 6), &p);
        assert_eq!(product, cx(122, 38));
    }

    #[test]
    fn mul_commutes_and_respects_one() {
        let p = big(131);
        let a = cx(17, 90);
        let b = cx(111, 3);
        assert_eq!(a.mul(&b, &p), b.mul(&a, &p));
        assert_eq!(a.mul(&Complex::one(), &p), a);
    }

    #[test]
    fn inverse_roundtrip() {
        let p = big(131);
        let a = cx(17, 90);
        let inv = a.inverse(&p).unwrap();
        assert!(a.mul(&inv, &p).is_one());
    }

    #[test]
    fn inverse_of_zero_fails() {
        let p = big(131);
        assert!(Complex::zero().inverse(&p).is_err());
    }

    #[test]
    fn pow_matches_repeated_multiplication() {
        let p = big(131);
        let a = cx(2, 5);
        let mut expected = Complex::one();
        for _ in 0..13 {
            expected = expected.mul(&a, &p);
        }
        assert_eq!(a.pow(&big(13), &p), expected);
        assert!(a.pow(&big(0), &p).is_one());
    }

    #[test]
    fn fermat_in_the_extension() {
        // the multiplicative group of F_p² has order p² - 1
        let p = big(131);
        let a = cx(29, 84);
        let order = &p * &p - 1u32;
        assert!(a.pow(&order, &p).is_one());
    }

    #[test]
    fn sub_wraps_around_modulus() {
        let p = big(131);
        assert_eq!(cx(1, 0).sub(&cx(2, 130), &p), cx(130, 1));
    }
}
