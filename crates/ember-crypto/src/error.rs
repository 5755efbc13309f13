use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("seal failed: {0}")]
    SealFailed(String),

    /// Covers both a wrong password and a tampered ciphertext; AES-GCM
    /// cannot distinguish the two, the caller maps this to its own taxonomy.
    #[error("open failed: authentication tag mismatch")]
    OpenFailed,

    #[error("key derivation failed: {0}")]
    KdfFailed(String),

    #[error("invalid sealed data: {0}")]
    InvalidSealedData(String),
}
