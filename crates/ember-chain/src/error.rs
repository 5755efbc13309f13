use thiserror::Error;

/// Ember chain operation errors.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("address recovery failed: {0}")]
    RecoveryFailed(String),

    /// Fatal: the locally produced signature does not recover to the sender.
    /// A transaction carrying this error must never reach the mempool.
    #[error("signature self-verification failed: {0}")]
    SelfVerificationFailed(String),
}
