//! Boneh–Franklin identity-based encryption in the RFC 5091 flavour.
//!
//! A trusted authority runs [`setup`] once, publishes the resulting
//! [`PublicParameters`], and keeps the [`MasterSecret`]. Anyone can then
//! [`encrypt`] towards an identity string; the authority hands the matching
//! [`PrivateKey`] to that identity via [`extract`], and [`decrypt`] checks
//! the ciphertext's internal consistency before releasing the plaintext.
//!
//! The methods in this module are restricted to [`CryptoRng`] random
//! generators to enforce the use of cryptographically secure algorithms.

use std::fmt::{self, Debug};

use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use crate::curve::{AffinePoint, EllipticCurve};
use crate::error::{Error, Result};
use crate::hash::{canonical, hash_bytes, hash_to_point, hash_to_range, HashFunction};
use crate::pairing::pairing;
use crate::random::{generate_group, random_in_range};
use crate::{ByteAccess, SecurityLevel};

/// The public parameters of a Boneh–Franklin instantiation.
///
/// `point_p_public = s·P` for the master secret `s`; everything else is
/// public group structure. Parameters are created by [`setup`] and immutable
/// afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParameters {
    pub curve: EllipticCurve,
    /// The order of the pairing subgroup; a Solinas prime.
    pub q: BigUint,
    pub point_p: AffinePoint,
    pub point_p_public: AffinePoint,
    pub hash: HashFunction,
}

impl PublicParameters {
    pub(crate) fn validate(&self) -> Result<()> {
        let consistent = !self.point_p.is_infinity()
            && !self.point_p_public.is_infinity()
            && self.point_p.is_on_curve(&self.curve)
            && self.point_p_public.is_on_curve(&self.curve)
            && !self.q.is_zero();
        if consistent {
            Ok(())
        } else {
            Err(Error::IllegalPublicParameters)
        }
    }
}

impl ByteAccess for PublicParameters {
    fn bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap()
    }
}

impl Debug for PublicParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicParameters")
            .field(&self.fingerprint())
            .finish()
    }
}

/// The master secret `s` with `2 <= s < q`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSecret(pub(crate) BigUint);

impl ByteAccess for MasterSecret {
    fn bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap()
    }
}

impl Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MasterSecret")
            .field(&self.fingerprint())
            .finish()
    }
}

/// An identity's private key: `s·Q_id`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey(pub(crate) AffinePoint);

impl PrivateKey {
    pub(crate) fn validate(&self, pp: &PublicParameters) -> Result<()> {
        if !self.0.is_infinity() && self.0.is_on_curve(&pp.curve) {
            Ok(())
        } else {
            Err(Error::IllegalPrivateKey)
        }
    }
}

impl ByteAccess for PrivateKey {
    fn bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap()
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey")
            .field(&self.fingerprint())
            .finish()
    }
}

/// A Boneh–Franklin ciphertext `(U, V, W)`.
///
/// `U` commits to the encryptor's randomness, `V` masks the random seed, and
/// `W` masks the message under the seed-derived byte stream.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherText {
    pub u: AffinePoint,
    pub v: Vec<u8>,
    pub w: Vec<u8>,
}

impl CipherText {
    pub(crate) fn validate(&self, pp: &PublicParameters) -> Result<()> {
        let consistent = !self.u.is_infinity()
            && self.u.is_on_curve(&pp.curve)
            && self.v.len() == pp.hash.output_len()
            && !self.w.is_empty();
        if consistent {
            Ok(())
        } else {
            Err(Error::IllegalCiphertext)
        }
    }
}

impl ByteAccess for CipherText {
    fn bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap()
    }
}

impl Debug for CipherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CipherText")
            .field(&self.fingerprint())
            .finish()
    }
}

/// Establishes a master secret and public parameters for the given security
/// level.
///
/// Parameters:
///
/// * `level` - The desired security level.
/// * `rng` - The randomness to use.
pub fn setup<R: Rng + CryptoRng>(
    level: SecurityLevel,
    rng: &mut R,
) -> Result<(PublicParameters, MasterSecret)> {
    let (curve, q, point_p) = generate_group(rng, level)?;

    // master secret s in [2, q)
    let s = random_in_range(rng, &(&q - 2u32)) + 2u32;
    let point_p_public = point_p.mul(&s, &curve)?;

    Ok((
        PublicParameters {
            curve,
            q,
            point_p,
            point_p_public,
            hash: level.hash_function(),
        },
        MasterSecret(s),
    ))
}

/// Extracts the private key for an identity: `s·hashToPoint(id)`.
///
/// Parameters:
///
/// * `identity` - The identity string the key is extracted for.
/// * `pp` - The public parameters.
/// * `master` - The master secret corresponding to `pp`.
pub fn extract(
    identity: &[u8],
    pp: &PublicParameters,
    master: &MasterSecret,
) -> Result<PrivateKey> {
    if identity.is_empty() {
        return Err(Error::IdentityEmpty);
    }
    pp.validate()?;

    let q_id = hash_to_point(identity, &pp.curve, &pp.q, pp.hash)?;
    Ok(PrivateKey(q_id.mul(&master.0, &pp.curve)?))
}

/// Encrypts a message towards an identity.
///
/// Parameters:
///
/// * `message` - The plaintext; must not be empty.
/// * `identity` - The recipient's identity string.
/// * `pp` - The public parameters.
/// * `rng` - The randomness to use.
pub fn encrypt<R: Rng + CryptoRng>(
    message: &[u8],
    identity: &[u8],
    pp: &PublicParameters,
    rng: &mut R,
) -> Result<CipherText> {
    if message.is_empty() {
        return Err(Error::MessageEmpty);
    }
    if identity.is_empty() {
        return Err(Error::IdentityEmpty);
    }
    pp.validate()?;

    let hashlen = pp.hash.output_len();
    let q_id = hash_to_point(identity, &pp.curve, &pp.q, pp.hash)?;

    let mut rho = vec![0u8; hashlen];
    rng.fill_bytes(&mut rho);

    // l = hashToRange(rho || H(m), q) ties the scalar to both secrets
    let digest = pp.hash.digest(message);
    let mut concat = rho.clone();
    concat.extend_from_slice(&digest);
    let l = hash_to_range(&concat, &pp.q, pp.hash);

    let u = pp.point_p.mul(&l, &pp.curve)?;

    let theta = pairing(&pp.point_p_public, &q_id, &pp.q, &pp.curve)?;
    let theta_l = theta.pow(&l, &pp.curve.p);
    let mask = pp.hash.digest(&canonical(&pp.curve.p, &theta_l, 1));

    let v = xor(&mask, &rho);
    let w = xor(&hash_bytes(message.len(), &rho, pp.hash), message);

    Ok(CipherText { u, v, w })
}

/// Decrypts a ciphertext with an identity's private key.
///
/// The recovered randomness is re-committed and compared against `U`; any
/// mismatch — wrong key, tampered `V` or `W` — surfaces uniformly as
/// [`Error::DecryptionFailed`].
pub fn decrypt(ciphertext: &CipherText, key: &PrivateKey, pp: &PublicParameters) -> Result<Vec<u8>> {
    pp.validate()?;
    key.validate(pp)?;
    ciphertext.validate(pp)?;

    let theta = pairing(&ciphertext.u, &key.0, &pp.q, &pp.curve)?;
    let mask = pp.hash.digest(&canonical(&pp.curve.p, &theta, 1));
    let rho = xor(&mask, &ciphertext.v);

    let message = xor(&hash_bytes(ciphertext.w.len(), &rho, pp.hash), &ciphertext.w);

    // consistency: the encryptor's scalar must reproduce U
    let digest = pp.hash.digest(&message);
    let mut concat = rho;
    concat.extend_from_slice(&digest);
    let l = hash_to_range(&concat, &pp.q, pp.hash);
    if pp.point_p.mul(&l, &pp.curve)? != ciphertext.u {
        return Err(Error::DecryptionFailed);
    }
    Ok(message)
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(x, y)| x ^ y).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn rng() -> ChaChaRng {
        ChaChaRng::from_seed([42; 32])
    }

    #[test]
    fn roundtrip_lowest_level() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = extract(b"alice@example.com", &pp, &master).unwrap();
        let ct = encrypt(b"hello world", b"alice@example.com", &pp, &mut rng).unwrap();
        assert_eq!(decrypt(&ct, &key, &pp).unwrap(), b"hello world");
    }

    #[test]
    fn roundtrip_low_level() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Low, &mut rng).unwrap();
        let key = extract(b"alice@example.com", &pp, &master).unwrap();
        let ct = encrypt(b"hello world", b"alice@example.com", &pp, &mut rng).unwrap();
        assert_eq!(decrypt(&ct, &key, &pp).unwrap(), b"hello world");
    }

    #[test]
    fn roundtrip_longer_message() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = extract(b"bob", &pp, &master).unwrap();
        let message: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
        let ct = encrypt(&message, b"bob", &pp, &mut rng).unwrap();
        assert_eq!(decrypt(&ct, &key, &pp).unwrap(), message);
    }

    #[test]
    fn wrong_identity_fails() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key_b = extract(b"b", &pp, &master).unwrap();
        let ct = encrypt(b"secret", b"a", &pp, &mut rng).unwrap();
        assert_eq!(decrypt(&ct, &key_b, &pp), Err(Error::DecryptionFailed));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = extract(b"alice", &pp, &master).unwrap();
        let ct = encrypt(b"hello world", b"alice", &pp, &mut rng).unwrap();

        let mut flipped_v = ct.clone();
        flipped_v.v[0] ^= 0x01;
        assert_eq!(decrypt(&flipped_v, &key, &pp), Err(Error::DecryptionFailed));

        let mut flipped_w = ct.clone();
        let last = flipped_w.w.len() - 1;
        flipped_w.w[last] ^= 0x80;
        assert_eq!(decrypt(&flipped_w, &key, &pp), Err(Error::DecryptionFailed));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        assert_eq!(extract(b"", &pp, &master), Err(Error::IdentityEmpty));
        assert_eq!(
            encrypt(b"", b"alice", &pp, &mut rng).unwrap_err(),
            Error::MessageEmpty
        );
        assert_eq!(
            encrypt(b"hi", b"", &pp, &mut rng).unwrap_err(),
            Error::IdentityEmpty
        );
    }

    #[test]
    fn malformed_ciphertext_is_rejected_up_front() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = extract(b"alice", &pp, &master).unwrap();
        let ct = encrypt(b"hello", b"alice", &pp, &mut rng).unwrap();

        let mut truncated = ct.clone();
        truncated.v.pop();
        assert_eq!(decrypt(&truncated, &key, &pp), Err(Error::IllegalCiphertext));

        let mut at_infinity = ct;
        at_infinity.u = AffinePoint::Infinity;
        assert_eq!(
            decrypt(&at_infinity, &key, &pp),
            Err(Error::IllegalCiphertext)
        );
    }

    #[test]
    fn setup_produces_consistent_parameters() {
        let mut rng = rng();
        let (pp, master) = setup(SecurityLevel::Lowest, &mut rng).unwrap();
        assert!(pp.validate().is_ok());
        // q * P = infinity and P_pub = s * P
        assert!(pp.point_p.mul(&pp.q, &pp.curve).unwrap().is_infinity());
        assert_eq!(
            pp.point_p.mul(&master.0, &pp.curve).unwrap(),
            pp.point_p_public
        );
        // p = 11 (mod 12)
        assert_eq!(&pp.curve.p % 12u32, BigUint::from(11u32));
    }
}
