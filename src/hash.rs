//! Hash primitives: hashing to integer ranges, to curve points, and the
//! keyed pseudo-random byte generator, together with the canonical
//! serialization of F_p² elements.
//!
//! The algorithms follow RFC 5091 (sections 4.1, 4.2, 4.3, and 4.4); the
//! hash function itself is a small tagged capability over the supported
//! SHA variants, so no dynamic dispatch is involved.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::complex::Complex;
use crate::curve::{AffinePoint, EllipticCurve};
use crate::error::{Error, Result};

const HASH_TO_POINT_ATTEMPT_LIMIT: u32 = 100;

/// A SHA-family hash with a fixed output length.
///
/// SHA-1 is kept for the legacy lowest security level only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashFunction {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashFunction {
    /// The digest length in octets.
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha224 => Sha224::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// Hashes a string onto `[0, n)` (RFC 5091, HashToRange).
///
/// Digests are chained over `(h_{i-1} || s)` and concatenated big-endian
/// until they cover the bit length of `n`; the assembled integer is reduced
/// modulo `n`.
pub fn hash_to_range(s: &[u8], n: &BigUint, hash: HashFunction) -> BigUint {
    let hashlen = hash.output_len();
    let rounds = n.bits().div_ceil(8 * hashlen as u64).max(1);

    let mut state = vec![0u8; hashlen];
    let mut v = BigUint::zero();
    for _ in 0..rounds {
        let mut input = state.clone();
        input.extend_from_slice(s);
        state = hash.digest(&input);
        v = (v << (8 * hashlen)) + BigUint::from_bytes_be(&state);
    }
    v % n
}

/// The keyed pseudo-random byte generator (RFC 5091, HashBytes).
///
/// Produces exactly `count` octets from the key `seed` by running the hash
/// over an internally rolled state.
pub fn hash_bytes(count: usize, seed: &[u8], hash: HashFunction) -> Vec<u8> {
    let key = hash.digest(seed);
    let mut state = vec![0u8; hash.output_len()];
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        state = hash.digest(&state);
        let mut block = state.clone();
        block.extend_from_slice(&key);
        out.extend_from_slice(&hash.digest(&block));
    }
    out.truncate(count);
    out
}

/// Hashes an identity string onto a point of order `q` in `E(F_p)`
/// (RFC 5091, HashToPoint for Type-1 curves).
///
/// The y-coordinate comes from [`hash_to_range`]; `x = (y² - 1)^((2p-1)/3)`
/// is the matching cube root on `y² = x³ + 1`, and the cofactor multiple
/// `[(p+1)/q]` pushes the candidate into the order-q subgroup. If that
/// lands at infinity the seed is re-derived deterministically; after 100
/// fruitless attempts the operation fails.
pub fn hash_to_point(
    id: &[u8],
    ec: &EllipticCurve,
    q: &BigUint,
    hash: HashFunction,
) -> Result<AffinePoint> {
    let p = &ec.p;
    let cofactor = (p + 1u32) / q;
    let exponent = ((p * 2u32) - 1u32) / 3u32;

    let mut y = hash_to_range(id, p, hash);
    for _ in 0..HASH_TO_POINT_ATTEMPT_LIMIT {
        let y2 = (&y * &y) % p;
        let base = crate::arith::sub_mod(&y2, &BigUint::one(), p);
        let x = base.modpow(&exponent, p);
        let candidate = AffinePoint::new(x, y.clone());
        let point = candidate.mul(&cofactor, ec)?;
        if !point.is_infinity() {
            return Ok(point);
        }
        y = hash_to_range(&y.to_bytes_be(), p, hash);
    }
    Err(Error::HashToPointFailed)
}

/// Fixed-width big-endian serialization of an F_p² element (RFC 5091,
/// Canonical).
///
/// Both components are zero-padded to `ceil(log2(p) / 8)` octets; `order`
/// selects `(a, b)` (0) or `(b, a)` (1).
pub fn canonical(p: &BigUint, v: &Complex, order: u8) -> Vec<u8> {
    let width = component_width(p);
    let re = pad_left(&v.re.to_bytes_be(), width);
    let im = pad_left(&v.im.to_bytes_be(), width);
    let mut out = Vec::with_capacity(2 * width);
    match order {
        0 => {
            out.extend_from_slice(&re);
            out.extend_from_slice(&im);
        }
        _ => {
            out.extend_from_slice(&im);
            out.extend_from_slice(&re);
        }
    }
    out
}

/// Inverse of [`canonical`] for the same `p` and `order`.
pub fn parse_canonical(p: &BigUint, bytes: &[u8], order: u8) -> Result<Complex> {
    let width = component_width(p);
    if bytes.len() != 2 * width {
        return Err(Error::MalformedBytes);
    }
    let first = BigUint::from_bytes_be(&bytes[..width]);
    let second = BigUint::from_bytes_be(&bytes[width..]);
    if first >= *p || second >= *p {
        return Err(Error::MalformedBytes);
    }
    Ok(match order {
        0 => Complex::new(first, second),
        _ => Complex::new(second, first),
    })
}

fn component_width(p: &BigUint) -> usize {
    (p.bits() as usize).div_ceil(8)
}

fn pad_left(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = vec![0u8; width.saturating_sub(bytes.len())];
    out.extend_from_slice(bytes);
    out
}
