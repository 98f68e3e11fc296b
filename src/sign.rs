//! Hess identity-based signatures on top of the Boneh–Franklin parameters.
//!
//! The scheme shares [`setup`][crate::ibe::setup] and
//! [`extract`][crate::ibe::extract] with the encryption side: the same
//! [`PublicParameters`] and per-identity [`PrivateKey`] sign and verify.
//!
//! Signing commits to a random pairing power `r = e(P, P)^k`, derives the
//! challenge `v` by hashing the message together with the canonical form of
//! `r`, and binds both with `U = v·sk + k·P`. Verification reconstructs `r`
//! from public data only and recomputes the challenge.

use std::fmt::{self, Debug};

use num_bigint::BigUint;
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use crate::curve::AffinePoint;
use crate::error::{Error, Result};
use crate::hash::{canonical, hash_to_point, hash_to_range};
use crate::ibe::{PrivateKey, PublicParameters};
use crate::pairing::pairing;
use crate::random::random_in_range;
use crate::ByteAccess;

/// A Hess signature `(U, v)`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub u: AffinePoint,
    pub v: BigUint,
}

impl Signature {
    fn validate(&self, pp: &PublicParameters) -> Result<()> {
        if !self.u.is_infinity() && self.u.is_on_curve(&pp.curve) && self.v < pp.q {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }
}

impl ByteAccess for Signature {
    fn bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap()
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature")
            .field(&self.fingerprint())
            .finish()
    }
}

/// Signs a message with an identity's private key.
///
/// Parameters:
///
/// * `message` - The message to sign; must not be empty.
/// * `key` - The signer's private key (from [`crate::ibe::extract`]).
/// * `pp` - The public parameters.
/// * `rng` - The randomness to use.
pub fn sign<R: Rng + CryptoRng>(
    message: &[u8],
    key: &PrivateKey,
    pp: &PublicParameters,
    rng: &mut R,
) -> Result<Signature> {
    if message.is_empty() {
        return Err(Error::MessageEmpty);
    }
    pp.validate()?;
    key.validate(pp)?;

    let k = random_in_range(rng, &(&pp.q - 1u32)) + 1u32;
    let theta = pairing(&pp.point_p, &pp.point_p, &pp.q, &pp.curve)?;
    let commitment = theta.pow(&k, &pp.curve.p);

    let v = challenge(message, &commitment, pp);
    let u = key
        .0
        .mul(&v, &pp.curve)?
        .add(&pp.point_p.mul(&k, &pp.curve)?, &pp.curve)?;

    Ok(Signature { u, v })
}

/// Verifies a signature against a message and the signer's identity.
///
/// Returns [`Error::InvalidSignature`] when the signature does not match.
pub fn verify(
    message: &[u8],
    signature: &Signature,
    identity: &[u8],
    pp: &PublicParameters,
) -> Result<()> {
    if message.is_empty() {
        return Err(Error::MessageEmpty);
    }
    if identity.is_empty() {
        return Err(Error::IdentityEmpty);
    }
    pp.validate()?;
    signature.validate(pp)?;

    // r' = e(U, P) * e(Q_id, P_pub)^(-v)
    let q_id = hash_to_point(identity, &pp.curve, &pp.q, pp.hash)?;
    let lhs = pairing(&signature.u, &pp.point_p, &pp.q, &pp.curve)?;
    let rhs = pairing(&q_id, &pp.point_p_public, &pp.q, &pp.curve)?
        .pow(&signature.v, &pp.curve.p)
        .inverse(&pp.curve.p)
        .map_err(|_| Error::InvalidSignature)?;
    let commitment = lhs.mul(&rhs, &pp.curve.p);

    if challenge(message, &commitment, pp) == signature.v {
        Ok(())
    } else {
        Err(Error::InvalidSignature)
    }
}

/// `v = hashToRange(message || canonical(r), q)`
fn challenge(message: &[u8], commitment: &crate::complex::Complex, pp: &PublicParameters) -> BigUint {
    let mut input = message.to_vec();
    input.extend_from_slice(&canonical(&pp.curve.p, commitment, 1));
    hash_to_range(&input, &pp.q, pp.hash)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ibe::{extract, setup};
    use crate::SecurityLevel;
    use num_traits::One;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn rng() -> ChaChaRng {
        ChaChaRng::from_seed([23; 32])
    }

    #[test]
    fn sign_verify_roundtrip() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = extract(b"alice@example.com", &pp, &master).unwrap();
        let signature = sign(b"attack at dawn", &key, &pp, &mut rng).unwrap();
        assert!(verify(b"attack at dawn", &signature, b"alice@example.com", &pp).is_ok());
    }

    #[test]
    fn verify_rejects_other_message() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = extract(b"alice", &pp, &master).unwrap();
        let signature = sign(b"attack at dawn", &key, &pp, &mut rng).unwrap();
        assert_eq!(
            verify(b"attack at dusk", &signature, b"alice", &pp),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_other_identity() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = extract(b"alice", &pp, &master).unwrap();
        let signature = sign(b"attack at dawn", &key, &pp, &mut rng).unwrap();
        assert_eq!(
            verify(b"attack at dawn", &signature, b"mallory", &pp),
            Err(Error::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_tampered_challenge() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = extract(b"alice", &pp, &master).unwrap();
        let mut signature = sign(b"attack at dawn", &key, &pp, &mut rng).unwrap();
        signature.v = (&signature.v + BigUint::one()) % &pp.q;
        assert_eq!(
            verify(b"attack at dawn", &signature, b"alice", &pp),
            Err(Error::InvalidSignature)
        );
    }
}
