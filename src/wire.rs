//! Explicit length-prefixed encodings of the IBE artifacts.
//!
//! Whole-struct serialization goes through `serde` (see [`ByteAccess`]);
//! this module additionally fixes a stable, self-describing wire format for
//! the artifacts that cross trust boundaries: big integers travel as
//! `(u32 length ‖ big-endian bytes)`, curve points as a one-byte infinity
//! tag followed by both coordinates, and the ciphertext's binary strings
//! with explicit lengths.
//!
//! [`ByteAccess`]: crate::ByteAccess

use num_bigint::BigUint;

use crate::curve::{AffinePoint, EllipticCurve};
use crate::error::{Error, Result};
use crate::hash::HashFunction;
use crate::ibe::{CipherText, PrivateKey, PublicParameters};

fn put_biguint(out: &mut Vec<u8>, value: &BigUint) {
    let bytes = value.to_bytes_be();
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(&bytes);
}

fn get_biguint(input: &mut &[u8]) -> Result<BigUint> {
    let bytes = get_bytes(input)?;
    Ok(BigUint::from_bytes_be(&bytes))
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn get_bytes(input: &mut &[u8]) -> Result<Vec<u8>> {
    if input.len() < 4 {
        return Err(Error::MalformedBytes);
    }
    let (prefix, rest) = input.split_at(4);
    let length = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    if rest.len() < length {
        return Err(Error::MalformedBytes);
    }
    let (bytes, rest) = rest.split_at(length);
    *input = rest;
    Ok(bytes.to_vec())
}

fn put_point(out: &mut Vec<u8>, point: &AffinePoint) {
    match point.xy() {
        None => out.push(1),
        Some((x, y)) => {
            out.push(0);
            put_biguint(out, x);
            put_biguint(out, y);
        }
    }
}

fn get_point(input: &mut &[u8]) -> Result<AffinePoint> {
    let (tag, rest) = input.split_first().ok_or(Error::MalformedBytes)?;
    *input = rest;
    match tag {
        1 => Ok(AffinePoint::Infinity),
        0 => {
            let x = get_biguint(input)?;
            let y = get_biguint(input)?;
            Ok(AffinePoint::new(x, y))
        }
        _ => Err(Error::MalformedBytes),
    }
}

fn put_hash(out: &mut Vec<u8>, hash: HashFunction) {
    out.push(match hash {
        HashFunction::Sha1 => 0,
        HashFunction::Sha224 => 1,
        HashFunction::Sha256 => 2,
        HashFunction::Sha384 => 3,
        HashFunction::Sha512 => 4,
    });
}

fn get_hash(input: &mut &[u8]) -> Result<HashFunction> {
    let (tag, rest) = input.split_first().ok_or(Error::MalformedBytes)?;
    *input = rest;
    match tag {
        0 => Ok(HashFunction::Sha1),
        1 => Ok(HashFunction::Sha224),
        2 => Ok(HashFunction::Sha256),
        3 => Ok(HashFunction::Sha384),
        4 => Ok(HashFunction::Sha512),
        _ => Err(Error::MalformedBytes),
    }
}

fn finish(input: &[u8]) -> Result<()> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(Error::MalformedBytes)
    }
}

impl PublicParameters {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_biguint(&mut out, &self.curve.a);
        put_biguint(&mut out, &self.curve.b);
        put_biguint(&mut out, &self.curve.p);
        put_biguint(&mut out, &self.q);
        put_point(&mut out, &self.point_p);
        put_point(&mut out, &self.point_p_public);
        put_hash(&mut out, self.hash);
        out
    }

    pub fn from_bytes(mut input: &[u8]) -> Result<Self> {
        let a = get_biguint(&mut input)?;
        let b = get_biguint(&mut input)?;
        let p = get_biguint(&mut input)?;
        let q = get_biguint(&mut input)?;
        let point_p = get_point(&mut input)?;
        let point_p_public = get_point(&mut input)?;
        let hash = get_hash(&mut input)?;
        finish(input)?;
        Ok(Self {
            curve: EllipticCurve::new(a, b, p),
            q,
            point_p,
            point_p_public,
            hash,
        })
    }
}

impl PrivateKey {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_point(&mut out, &self.0);
        out
    }

    pub fn from_bytes(mut input: &[u8]) -> Result<Self> {
        let point = get_point(&mut input)?;
        finish(input)?;
        Ok(Self(point))
    }
}

impl CipherText {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_point(&mut out, &self.u);
        put_bytes(&mut out, &self.v);
        put_bytes(&mut out, &self.w);
        out
    }

    pub fn from_bytes(mut input: &[u8]) -> Result<Self> {
        let u = get_point(&mut input)?;
        let v = get_bytes(&mut input)?;
        let w = get_bytes(&mut input)?;
        finish(input)?;
        Ok(Self { u, v, w })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ibe, ByteAccess, SecurityLevel};
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn sample() -> (PublicParameters, PrivateKey, CipherText) {
        let mut rng = ChaChaRng::from_seed([11; 32]);
        let (pp, master) = ibe::setup(SecurityLevel::Lowest, &mut rng).unwrap();
        let key = ibe::extract(b"alice", &pp, &master).unwrap();
        let ct = ibe::encrypt(b"wire format", b"alice", &pp, &mut rng).unwrap();
        (pp, key, ct)
    }

    #[test]
    fn roundtrips() {
        let (pp, key, ct) = sample();
        assert_eq!(PublicParameters::from_bytes(&pp.to_bytes()).unwrap(), pp);
        assert_eq!(PrivateKey::from_bytes(&key.to_bytes()).unwrap(), key);
        assert_eq!(CipherText::from_bytes(&ct.to_bytes()).unwrap(), ct);
    }

    #[test]
    fn decode_survives_decryption() {
        let (pp, key, ct) = sample();
        let pp = PublicParameters::from_bytes(&pp.to_bytes()).unwrap();
        let key = PrivateKey::from_bytes(&key.to_bytes()).unwrap();
        let ct = CipherText::from_bytes(&ct.to_bytes()).unwrap();
        assert_eq!(ibe::decrypt(&ct, &key, &pp).unwrap(), b"wire format");
    }

    #[test]
    fn truncated_input_is_rejected() {
        let (pp, _, ct) = sample();
        let bytes = pp.to_bytes();
        assert_eq!(
            PublicParameters::from_bytes(&bytes[..bytes.len() - 1]),
            Err(Error::MalformedBytes)
        );
        let bytes = ct.to_bytes();
        assert_eq!(
            CipherText::from_bytes(&bytes[..bytes.len() - 3]),
            Err(Error::MalformedBytes)
        );
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let (_, key, _) = sample();
        let mut bytes = key.to_bytes();
        bytes.push(0);
        assert_eq!(PrivateKey::from_bytes(&bytes), Err(Error::MalformedBytes));
    }

    #[test]
    fn infinity_tag_roundtrips() {
        let mut out = Vec::new();
        put_point(&mut out, &AffinePoint::Infinity);
        let mut input = out.as_slice();
        assert_eq!(get_point(&mut input).unwrap(), AffinePoint::Infinity);
        assert!(input.is_empty());
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let mut input = &[7u8][..];
        assert_eq!(get_point(&mut input), Err(Error::MalformedBytes));
        let mut input = &[9u8][..];
        assert_eq!(get_hash(&mut input), Err(Error::MalformedBytes));
    }

    #[test]
    fn byte_access_fingerprints_are_stable() {
        let (pp, key, _) = sample();
        assert_eq!(pp.fingerprint(), pp.fingerprint());
        assert_ne!(pp.bytes(), key.bytes());
    }
}
