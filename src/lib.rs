//! Identity-based and attribute-based encryption over supersingular Tate
//! pairings.
//!
//! # ⚠️ Warning: Cryptographic Hazmat ☣️
//!
//! This crate is made for playing around with pairing-based encryption and
//! for prototyping of applications and protocols using IBE and ABE. It has
//! *not* been audited, it is *not* battle tested, and *nobody* claims it to
//! be secure.
//!
//! Use it at **your own risk** and if you know what you are doing!
//!
//! # Introduction
//!
//! In identity-based encryption (IBE), any string — an e-mail address, a
//! host name — acts as a public key; a trusted authority holding a master
//! secret hands out the matching private keys. In ciphertext-policy
//! attribute-based encryption (CP-ABE), a ciphertext carries a Boolean
//! policy over attribute labels, and a key decrypts it exactly when the
//! attributes baked into the key satisfy the policy.
//!
//! Both schemes here — Boneh–Franklin IBE in the RFC 5091 flavour and
//! Bethencourt–Sahai–Waters CP-ABE — run on the same home-grown pairing
//! stack: the supersingular curve `y² = x³ + 1` over a large prime field,
//! with the Tate pairing computed by Miller's algorithm over the order-q
//! subgroup. The library is not optimized for speed, but rather for
//! usability and clarity (it requires the standard library and allocations,
//! and it unconditionally requires `serde` for serialization).
//!
//! # Crate Structure
//!
//! The protocol layers live in [`ibe`] (setup / extract / encrypt /
//! decrypt), [`abe`] (setup / keygen / encrypt / decrypt over
//! [`abe::AccessTree`] policies), and [`sign`] (the Hess identity-based
//! signature sharing the IBE parameters).
//!
//! Below them, [`pairing`] drives the Miller loop over [`curve`] points with
//! coefficients from [`complex`] and [`arith`]; [`hash`] provides the
//! RFC 5091 hash-to-range, hash-to-point, and byte-generator primitives, and
//! [`random`] the Solinas-prime and point sampling. [`wire`] holds the
//! explicit length-prefixed encodings of the IBE artifacts.
//!
//! # Example
//!
//! ```no_run
//! use tateid::{ibe, SecurityLevel};
//!
//! let mut rng = rand::thread_rng();
//! let (pp, master) = ibe::setup(SecurityLevel::Lowest, &mut rng).unwrap();
//! let key = ibe::extract(b"alice@example.com", &pp, &master).unwrap();
//! let ct = ibe::encrypt(b"hello world", b"alice@example.com", &pp, &mut rng).unwrap();
//! assert_eq!(ibe::decrypt(&ct, &key, &pp).unwrap(), b"hello world");
//! ```

pub mod abe;
pub mod arith;
pub mod complex;
pub mod curve;
pub mod error;
pub mod hash;
pub mod ibe;
pub mod pairing;
pub mod random;
pub mod sign;
pub mod wire;

use serde::{Deserialize, Serialize};

use hash::HashFunction;

/// A trait to provide byte-level access to objects.
pub trait ByteAccess {
    /// Provides access to the bytes.
    ///
    /// Unlike [`AsRef`], there are no statements made about the performance
    /// of this operation. This operation will allocate a fresh vector, and
    /// the byte representation may or may not have to be computed first.
    fn bytes(&self) -> Vec<u8>;

    /// Provide a short fingerprint of the bytes.
    ///
    /// This can be used to "summarize" long keys when displaying them, to
    /// still provide distinguishing features but to not print out the whole
    /// key.
    ///
    /// By default, this method uses the first 16 bytes of the
    /// [`ByteAccess::bytes`] representation, and formats them as a hex
    /// string.
    fn fingerprint(&self) -> String {
        hex::encode(&self.bytes()[..16])
    }
}

/// The security level of a scheme instantiation.
///
/// The level fixes the bit lengths of the subgroup order `q` and the field
/// order `p`, and the hash function used throughout, per the RFC 5091
/// parameter table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SecurityLevel {
    /// 160-bit `q`, 512-bit `p`, SHA-1. Legacy only.
    Lowest,
    /// 224-bit `q`, 1024-bit `p`, SHA-224.
    Low,
    /// 256-bit `q`, 1536-bit `p`, SHA-256.
    Medium,
    /// 384-bit `q`, 3840-bit `p`, SHA-384.
    High,
    /// 512-bit `q`, 7680-bit `p`, SHA-512.
    Highest,
}

impl SecurityLevel {
    /// Bit length of the Solinas subgroup order `q`.
    pub fn q_bits(self) -> u64 {
        match self {
            Self::Lowest => 160,
            Self::Low => 224,
            Self::Medium => 256,
            Self::High => 384,
            Self::Highest => 512,
        }
    }

    /// Bit length of the field order `p`.
    pub fn p_bits(self) -> u64 {
        match self {
            Self::Lowest => 512,
            Self::Low => 1024,
            Self::Medium => 1536,
            Self::High => 3840,
            Self::Highest => 7680,
        }
    }

    /// The hash function tied to this level.
    pub fn hash_function(self) -> HashFunction {
        match self {
            Self::Lowest => HashFunction::Sha1,
            Self::Low => HashFunction::Sha224,
            Self::Medium => HashFunction::Sha256,
            Self::High => HashFunction::Sha384,
            Self::Highest => HashFunction::Sha512,
        }
    }
}
