use thiserror::Error;

use ember_chain::ChainError;
use ember_client::ClientError;
use ember_crypto::CryptoError;

/// Top-level wallet errors.
///
/// Each variant has a stable machine-readable [`kind`](WalletError::kind) in
/// addition to its Display message, so UI code can branch without string
/// matching. `WrongPassword` and `SessionExpired` are deliberately distinct:
/// the first means re-prompt, the second means full re-login.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("wrong password")]
    WrongPassword,

    #[error("wallet not found: {0}")]
    NotFound(String),

    #[error("session expired")]
    SessionExpired,

    #[error("sender {requested} does not match active wallet {active}")]
    SenderMismatch { requested: String, active: String },

    /// A signing pipeline is already in flight; concurrent requests are
    /// rejected rather than queued to avoid nonce confusion.
    #[error("a signing operation is already in progress")]
    Busy,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    /// Fatal, non-retryable: the local signature did not recover to the
    /// sender. The transaction never reached the network.
    #[error("signature self-verification failed: {0}")]
    SelfVerificationFailed(String),

    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("live update stream exhausted after {0} attempts")]
    StreamExhausted(u32),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::InvalidMnemonic(_) => "invalid_mnemonic",
            WalletError::WrongPassword => "wrong_password",
            WalletError::NotFound(_) => "not_found",
            WalletError::SessionExpired => "session_expired",
            WalletError::SenderMismatch { .. } => "sender_mismatch",
            WalletError::Busy => "busy",
            WalletError::Timeout => "timeout",
            WalletError::Network(_) => "network_error",
            WalletError::Canonicalization(_) => "canonicalization_error",
            WalletError::SelfVerificationFailed(_) => "signature_self_verification_failed",
            WalletError::SubmissionRejected(_) => "submission_rejected",
            WalletError::StreamExhausted(_) => "stream_exhausted",
            WalletError::Storage(_) => "storage_error",
            WalletError::Internal(_) => "internal_error",
        }
    }
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        match e {
            // AEAD tag mismatch is the positive signal for a bad password.
            CryptoError::OpenFailed => WalletError::WrongPassword,
            other => WalletError::Internal(other.to_string()),
        }
    }
}

impl From<ChainError> for WalletError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::Canonicalization(msg) => WalletError::Canonicalization(msg),
            ChainError::SelfVerificationFailed(msg) => {
                WalletError::SelfVerificationFailed(msg)
            }
            other => WalletError::Internal(other.to_string()),
        }
    }
}

impl From<ClientError> for WalletError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Timeout => WalletError::Timeout,
            ClientError::Network(msg) => WalletError::Network(msg),
            ClientError::SubmissionRejected(msg) => WalletError::SubmissionRejected(msg),
            ClientError::InvalidResponse(msg) => WalletError::Network(msg),
        }
    }
}
