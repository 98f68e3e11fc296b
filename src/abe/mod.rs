//! Bethencourt–Sahai–Waters ciphertext-policy attribute-based encryption.
//!
//! Ciphertexts carry an [`AccessTree`] policy; secret keys carry attribute
//! labels. [`decrypt`] succeeds exactly when the key's attributes satisfy
//! the ciphertext's policy: every satisfied leaf yields a blinded pairing
//! value, and threshold gates recombine their children's values through
//! Lagrange interpolation in the exponent, all modulo the subgroup order.
//!
//! Plaintexts are packed into integers strictly below the field order; a
//! message longer than one such block is split into fixed-size blocks that
//! are masked individually with `e(g,g)^{αs}`.
//!
//! The methods in this module are restricted to [`CryptoRng`] random
//! generators to enforce the use of cryptographically secure algorithms.

mod tree;

pub use self::tree::AccessTree;

use std::fmt::{self, Debug};

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use crate::arith::{mod_inv, reduce_signed};
use crate::complex::Complex;
use crate::curve::{AffinePoint, EllipticCurve};
use crate::error::{Error, Result};
use crate::hash::{hash_to_point, HashFunction};
use crate::pairing::pairing;
use crate::random::{generate_group, random_in_range};
use crate::{ByteAccess, SecurityLevel};

/// The public key of a CP-ABE instantiation.
///
/// `h = β·g`, `f = β⁻¹·g`, and `egg_alpha = e(g, g)^α` for the master
/// key's `(α, β)`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub curve: EllipticCurve,
    pub g: AffinePoint,
    pub h: AffinePoint,
    pub f: AffinePoint,
    pub egg_alpha: Complex,
    /// The order of the pairing subgroup; a Solinas prime.
    pub q: BigUint,
    pub hash: HashFunction,
}

impl PublicKey {
    fn validate(&self) -> Result<()> {
        let consistent = !self.g.is_infinity()
            && !self.h.is_infinity()
            && !self.f.is_infinity()
            && self.g.is_on_curve(&self.curve)
            && self.h.is_on_curve(&self.curve)
            && self.f.is_on_curve(&self.curve)
            && !self.q.is_zero()
            && !self.egg_alpha.is_zero()
            && self.block_size() >= 1;
        if consistent {
            Ok(())
        } else {
            Err(Error::IllegalPublicParameters)
        }
    }

    /// The plaintext block width: the largest octet count whose values stay
    /// strictly below the field order.
    fn block_size(&self) -> usize {
        ((self.curve.p.bits() - 1) / 8) as usize
    }
}

impl ByteAccess for PublicKey {
    fn bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap()
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.fingerprint()).finish()
    }
}

/// The master key `(β, α·g)`, with a copy of the public key it belongs to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterKey {
    beta: BigUint,
    g_alpha: AffinePoint,
    public: PublicKey,
}

impl ByteAccess for MasterKey {
    fn bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap()
    }
}

impl Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MasterKey").field(&self.fingerprint()).finish()
    }
}

/// One attribute's slice of a secret key:
/// `d_j = r·g + r_j·H(attr)` and `d_j_prime = r_j·g`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AttributeKey {
    attribute: String,
    d_j: AffinePoint,
    d_j_prime: AffinePoint,
}

/// A secret key for a set of attributes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey {
    d: AffinePoint,
    components: Vec<AttributeKey>,
    public: PublicKey,
}

impl SecretKey {
    /// The attribute labels this key carries.
    pub fn attributes(&self) -> Vec<&str> {
        self.components
            .iter()
            .map(|c| c.attribute.as_str())
            .collect()
    }
}

impl ByteAccess for SecretKey {
    fn bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap()
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&self.fingerprint()).finish()
    }
}

/// The share points of one policy leaf: `C_y = q_x(0)·g` and
/// `C_y' = q_x(0)·H(attr)`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
struct LeafShare {
    c_y: AffinePoint,
    c_y_prime: AffinePoint,
}

/// A CP-ABE ciphertext.
///
/// The policy stays a pure tree; the leaf shares live in `shares`, indexed
/// by the policy's depth-first leaf order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherText {
    policy: AccessTree,
    shares: Vec<LeafShare>,
    c_tilde: Vec<Complex>,
    c: AffinePoint,
    message_len: usize,
}

impl CipherText {
    /// The policy this ciphertext is bound to.
    pub fn policy(&self) -> &AccessTree {
        &self.policy
    }

    fn validate(&self, pk: &PublicKey) -> Result<()> {
        let blocks = self.message_len.div_ceil(pk.block_size());
        let consistent = self.policy.validate().is_ok()
            && self.shares.len() == self.policy.leaf_count()
            && !self.c.is_infinity()
            && self.c.is_on_curve(&pk.curve)
            && self.message_len > 0
            && self.c_tilde.len() == blocks;
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
        f.debug_tuple("CipherText").field(&self.fingerprint()).finish()
    }
}

/// Establishes a CP-ABE public key and master key for the given security
/// level.
///
/// Parameters:
///
/// * `level` - The desired security level.
/// * `rng` - The randomness to use.
pub fn setup<R: Rng + CryptoRng>(
    level: SecurityLevel,
    rng: &mut R,
) -> Result<(PublicKey, MasterKey)> {
    let (curve, q, g) = generate_group(rng, level)?;

    // alpha and beta act on the order-q subgroup, so they live in Z_q
    let alpha = random_in_range(rng, &(&q - 1u32)) + 1u32;
    let beta = random_in_range(rng, &(&q - 1u32)) + 1u32;

    let h = g.mul(&beta, &curve)?;
    let f = g.mul(&mod_inv(&beta, &q)?, &curve)?;
    let g_alpha = g.mul(&alpha, &curve)?;
    let egg_alpha = pairing(&g, &g, &q, &curve)?.pow(&alpha, &curve.p);

    let public = PublicKey {
        curve,
        g,
        h,
        f,
        egg_alpha,
        q,
        hash: level.hash_function(),
    };
    let master = MasterKey {
        beta,
        g_alpha,
        public: public.clone(),
    };
    Ok((public, master))
}

/// Generates a secret key carrying the given attribute set.
///
/// Parameters:
///
/// * `master` - The master key.
/// * `attributes` - The attribute labels to bake into the key.
/// * `rng` - The randomness to use.
pub fn keygen<R: Rng + CryptoRng>(
    master: &MasterKey,
    attributes: &[&str],
    rng: &mut R,
) -> Result<SecretKey> {
    let pk = &master.public;
    pk.validate()?;

    let r = random_in_range(rng, &(&pk.q - 1u32)) + 1u32;
    let g_r = pk.g.mul(&r, &pk.curve)?;

    // D = β⁻¹ · (α·g + r·g)
    let beta_inv = mod_inv(&master.beta, &pk.q)?;
    let d = master.g_alpha.add(&g_r, &pk.curve)?.mul(&beta_inv, &pk.curve)?;

    let mut components = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        if attribute.is_empty() {
            return Err(Error::IdentityEmpty);
        }
        let r_j = random_in_range(rng, &(&pk.q - 1u32)) + 1u32;
        let hashed = hash_to_point(attribute.as_bytes(), &pk.curve, &pk.q, pk.hash)?;
        components.push(AttributeKey {
            attribute: (*attribute).to_owned(),
            d_j: g_r.add(&hashed.mul(&r_j, &pk.curve)?, &pk.curve)?,
            d_j_prime: pk.g.mul(&r_j, &pk.curve)?,
        });
    }

    Ok(SecretKey {
        d,
        components,
        public: pk.clone(),
    })
}

/// Encrypts a message under an access policy.
///
/// Parameters:
///
/// * `message` - The plaintext; must not be empty.
/// * `policy` - The access tree a key must satisfy to decrypt.
/// * `pk` - The public key.
/// * `rng` - The randomness to use.
pub fn encrypt<R: Rng + CryptoRng>(
    message: &[u8],
    policy: &AccessTree,
    pk: &PublicKey,
    rng: &mut R,
) -> Result<CipherText> {
    if message.is_empty() {
        return Err(Error::MessageEmpty);
    }
    policy.validate()?;
    pk.validate()?;

    let s = random_in_range(rng, &(&pk.q - 1u32)) + 1u32;

    let mut shares = Vec::with_capacity(policy.leaf_count());
    split_shares(policy, &s, pk, rng, &mut shares)?;

    let mask = pk.egg_alpha.pow(&s, &pk.curve.p);
    let c_tilde = message
        .chunks(pk.block_size())
        .map(|block| mask.scale(&BigUint::from_bytes_be(block), &pk.curve.p))
        .collect();

    Ok(CipherText {
        policy: policy.clone(),
        shares,
        c_tilde,
        c: pk.h.mul(&s, &pk.curve)?,
        message_len: message.len(),
    })
}

/// Decrypts a ciphertext with a secret key.
///
/// Fails with [`Error::IllegalPrivateKey`] when the key's attributes do not
/// satisfy the ciphertext's policy, and with [`Error::DecryptionFailed`]
/// when the recovered blocks are not well-formed plaintext integers.
pub fn decrypt(ciphertext: &CipherText, key: &SecretKey) -> Result<Vec<u8>> {
    let pk = &key.public;
    pk.validate()?;
    ciphertext.validate(pk)?;

    if !ciphertext.policy.satisfied_by(&key.attributes()) {
        return Err(Error::IllegalPrivateKey);
    }

    let p = &pk.curve.p;
    let mut cursor = 0;
    let blinded = decrypt_node(&ciphertext.policy, ciphertext, key, &mut cursor)?
        .ok_or(Error::IllegalPrivateKey)?;

    // A / e(C, D) strips e(g,g)^{αs} off every block mask
    let e_cd = pairing(&ciphertext.c, &key.d, &pk.q, &pk.curve)?;
    let unmask = blinded.mul(&e_cd.inverse(p).map_err(|_| Error::DecryptionFailed)?, p);

    let block_size = pk.block_size();
    let block_count = ciphertext.c_tilde.len();
    let mut message = Vec::with_capacity(ciphertext.message_len);
    for (index, block) in ciphertext.c_tilde.iter().enumerate() {
        let value = block.mul(&unmask, p);
        if !value.im.is_zero() {
            return Err(Error::DecryptionFailed);
        }
        let width = if index + 1 == block_count {
            ciphertext.message_len - block_size * (block_count - 1)
        } else {
            block_size
        };
        let bytes = value.re.to_bytes_be();
        if bytes.len() > width {
            return Err(Error::DecryptionFailed);
        }
        message.resize(message.len() + width - bytes.len(), 0);
        message.extend_from_slice(&bytes);
    }
    Ok(message)
}

/// Splits the encryption secret down the tree: every gate draws a random
/// polynomial of degree `threshold - 1` with `q_x(0)` equal to its incoming
/// share, child `i` (1-indexed) receives `q_x(i)`, and every leaf emits its
/// share points in depth-first order.
fn split_shares<R: Rng + CryptoRng>(
    node: &AccessTree,
    secret: &BigUint,
    pk: &PublicKey,
    rng: &mut R,
    out: &mut Vec<LeafShare>,
) -> Result<()> {
    match node {
        AccessTree::Leaf { attribute } => {
            let hashed = hash_to_point(attribute.as_bytes(), &pk.curve, &pk.q, pk.hash)?;
            out.push(LeafShare {
                c_y: pk.g.mul(secret, &pk.curve)?,
                c_y_prime: hashed.mul(secret, &pk.curve)?,
            });
        }
        AccessTree::Gate {
            threshold,
            children,
        } => {
            let mut coefficients = vec![secret.clone()];
            for _ in 1..*threshold {
                coefficients.push(random_in_range(rng, &pk.q));
            }
            for (i, child) in children.iter().enumerate() {
                let share = eval_poly(&coefficients, (i + 1) as u64, &pk.q);
                split_shares(child, &share, pk, rng, out)?;
            }
        }
    }
    Ok(())
}

/// Horner evaluation of the share polynomial modulo `q`.
fn eval_poly(coefficients: &[BigUint], x: u64, q: &BigUint) -> BigUint {
    let x = BigUint::from(x);
    let mut acc = BigUint::zero();
    for coefficient in coefficients.iter().rev() {
        acc = (acc * &x + coefficient) % q;
    }
    acc
}

/// Recovers `e(g,g)^{r·q_x(0)}` for a satisfied subtree, or `None` when the
/// subtree is not satisfied.
///
/// `cursor` walks the ciphertext's leaf shares in the same depth-first order
/// in which encryption emitted them, advancing over every leaf whether or
/// not it contributes.
fn decrypt_node(
    node: &AccessTree,
    ciphertext: &CipherText,
    key: &SecretKey,
    cursor: &mut usize,
) -> Result<Option<Complex>> {
    let pk = &key.public;
    let p = &pk.curve.p;
    match node {
        AccessTree::Leaf { attribute } => {
            let share = ciphertext
                .shares
                .get(*cursor)
                .ok_or(Error::IllegalCiphertext)?;
            *cursor += 1;
            let component = match key.components.iter().find(|c| &c.attribute == attribute) {
                None => return Ok(None),
                Some(component) => component,
            };
            // e(D_j, C_y) / e(D_j', C_y') = e(g,g)^{r·q_x(0)}
            let numerator = pairing(&component.d_j, &share.c_y, &pk.q, &pk.curve)?;
            let denominator = pairing(&component.d_j_prime, &share.c_y_prime, &pk.q, &pk.curve)?;
            let inverse = denominator
                .inverse(p)
                .map_err(|_| Error::PairingDegenerate)?;
            Ok(Some(numerator.mul(&inverse, p)))
        }
        AccessTree::Gate {
            threshold,
            children,
        } => {
            let mut recovered = Vec::new();
            for (i, child) in children.iter().enumerate() {
                if let Some(value) = decrypt_node(child, ciphertext, key, cursor)? {
                    recovered.push(((i + 1) as u64, value));
                }
            }
            if recovered.len() < *threshold {
                return Ok(None);
            }
            recovered.truncate(*threshold);

            let indices: Vec<u64> = recovered.iter().map(|(i, _)| *i).collect();
            let mut acc = Complex::one();
            for (i, value) in &recovered {
                let coefficient = lagrange_at_zero(*i, &indices, &pk.q)?;
                acc = acc.mul(&value.pow(&coefficient, p), p);
            }
            Ok(Some(acc))
        }
    }
}

/// The Lagrange coefficient `Δ_{i,S}(0) = ∏_{j∈S, j≠i} (-j) / (i - j)`,
/// computed modulo `q` with modular inverses.
fn lagrange_at_zero(i: u64, set: &[u64], q: &BigUint) -> Result<BigUint> {
    let mut numerator = BigInt::one();
    let mut denominator = BigInt::one();
    let i = i as i64;
    for &j in set {
        let j = j as i64;
        if j == i {
            continue;
        }
        numerator *= -j;
        denominator *= i - j;
    }
    let numerator = reduce_signed(&numerator, q);
    let denominator = reduce_signed(&denominator, q);
    Ok((numerator * mod_inv(&denominator, q)?) % q)
}
