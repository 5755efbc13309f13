use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::address::address_from_verifying_key;
use crate::error::ChainError;
use crate::stamp::compute_stamp;
use crate::types::{SignedTransaction, TransactionTemplate};

/// Base added to the recovery parity to form `v`.
///
/// This namespaces Ember signatures away from the common 27/28 convention;
/// the remote verifier subtracts the same constant. Fixed protocol constant,
/// unrelated to `chain_id`.
pub const SIGNATURE_V_BASE: u8 = 72;

/// A recoverable secp256k1 signature over a 32-byte stamp digest.
///
/// `r` and `s` are raw big-endian scalars; `v` is
/// [`SIGNATURE_V_BASE`] plus the recovery parity (0 or 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl RecoverableSignature {
    /// Recovers the parity bit by subtracting the protocol base.
    pub fn recovery_parity(&self) -> Result<u8, ChainError> {
        decode_parity(self.v)
    }
}

/// Maps a `v` byte back to a standard 0/1 recovery parity.
pub fn decode_parity(v: u8) -> Result<u8, ChainError> {
    let parity = v
        .checked_sub(SIGNATURE_V_BASE)
        .ok_or_else(|| ChainError::InvalidSignature(format!("v below base: {v}")))?;
    if parity > 1 {
        return Err(ChainError::InvalidSignature(format!(
            "v does not encode a parity bit: {v}"
        )));
    }
    Ok(parity)
}

/// Signs a 32-byte digest with a secp256k1 private key.
pub fn sign_digest(
    digest: &[u8; 32],
    private_key: &[u8; 32],
) -> Result<RecoverableSignature, ChainError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;
    key_bytes.zeroize();

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(digest.as_slice())
        .map_err(|e| ChainError::SigningFailed(e.to_string()))?;

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature.r().to_bytes());
    s.copy_from_slice(&signature.s().to_bytes());

    Ok(RecoverableSignature {
        r,
        s,
        v: SIGNATURE_V_BASE + recovery_id.is_y_odd() as u8,
    })
}

/// Computes the stamp of a template and signs it, producing a transaction
/// ready for self-verification and submission.
pub fn sign_template(
    template: &TransactionTemplate,
    private_key: &[u8; 32],
) -> Result<SignedTransaction, ChainError> {
    let stamp = compute_stamp(template)?;
    let sig = sign_digest(&stamp.digest, private_key)?;

    Ok(SignedTransaction {
        template: template.clone(),
        v_bytes: vec![sig.v],
        r_bytes: sig.r.to_vec(),
        s_bytes: sig.s.to_vec(),
    })
}

/// Recovers the signer address from a digest and an Ember-encoded signature.
pub fn recover_address(
    digest: &[u8; 32],
    r_bytes: &[u8],
    s_bytes: &[u8],
    v: u8,
) -> Result<String, ChainError> {
    if r_bytes.len() != 32 || s_bytes.len() != 32 {
        return Err(ChainError::InvalidSignature(format!(
            "r and s must be 32 bytes, got {} and {}",
            r_bytes.len(),
            s_bytes.len()
        )));
    }

    let parity = decode_parity(v)?;
    let recovery_id = RecoveryId::from_byte(parity)
        .ok_or_else(|| ChainError::InvalidSignature(format!("bad recovery id: {parity}")))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(r_bytes);
    sig_bytes[32..].copy_from_slice(s_bytes);
    let signature = Signature::from_slice(&sig_bytes)
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;

    let verifying_key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
        .map_err(|e| ChainError::RecoveryFailed(e.to_string()))?;

    Ok(address_from_verifying_key(&verifying_key))
}
