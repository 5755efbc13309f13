//! Mandatory pre-submission self-verification.
//!
//! A signing operation is not complete until this gate has recomputed the
//! stamp from the transaction's non-signature fields, recovered the signer
//! address, and matched it against `from`. Nothing may be handed to the
//! submission client before [`verify_signed`] returns `Ok`.

use crate::address::addresses_match;
use crate::error::ChainError;
use crate::signer::recover_address;
use crate::stamp::compute_stamp;
use crate::types::SignedTransaction;

/// Recomputes the stamp and checks that the signature recovers to the
/// transaction's `from` address (case-insensitively).
///
/// Failure is fatal and non-retryable: it means the local signing path and
/// the canonicalization disagree, and submitting would burn a nonce on a
/// transaction the chain will reject.
pub fn verify_signed(tx: &SignedTransaction) -> Result<(), ChainError> {
    let stamp = compute_stamp(&tx.template)?;

    let v = *tx
        .v_bytes
        .first()
        .ok_or_else(|| ChainError::InvalidSignature("empty v_bytes".into()))?;

    let recovered = recover_address(&stamp.digest, &tx.r_bytes, &tx.s_bytes, v)?;

    if !addresses_match(&recovered, &tx.template.from) {
        return Err(ChainError::SelfVerificationFailed(format!(
            "recovered {recovered}, expected {}",
            tx.template.from
        )));
    }
    Ok(())
}
