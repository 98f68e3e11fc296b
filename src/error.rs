use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Solinas prime generation exceeded its attempt limit")]
    SolinasGenerationFailed,
    #[error("Curve point generation exceeded its attempt limit")]
    PointGenerationFailed,
    #[error("No prime was found within the attempt limit")]
    PrimalityTestFailed,
    #[error("The supplied public parameters are inconsistent")]
    IllegalPublicParameters,
    #[error("The supplied private key is invalid")]
    IllegalPrivateKey,
    #[error("The supplied ciphertext is malformed")]
    IllegalCiphertext,
    #[error("The message must not be empty")]
    MessageEmpty,
    #[error("The identity must not be empty")]
    IdentityEmpty,
    #[error("The access tree is malformed")]
    InvalidAccessTree,
    #[error("Decryption failed")]
    DecryptionFailed,
    #[error("The pairing degenerated")]
    PairingDegenerate,
    #[error("Hashing to a curve point exceeded its attempt limit")]
    HashToPointFailed,
    #[error("The element is not invertible")]
    InverseNonInvertible,
    #[error("The signature does not verify")]
    InvalidSignature,
    #[error("The supplied bytes could not be decoded")]
    MalformedBytes,
}

pub type Result<V, E = Error> = std::result::Result<V, E>;
