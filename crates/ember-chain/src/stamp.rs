//! Stamp canonicalization.
//!
//! The stamp is the byte-exact payload the remote verifier recomputes to
//! check a signature, so everything here must be deterministic: fixed key
//! order, lowercased addresses, compact JSON with no locale-dependent
//! formatting, and a domain-separation prefix embedding the exact byte length
//! of the canonical JSON.

use serde::Serialize;
use sha3::{Digest, Keccak256};

use crate::error::ChainError;
use crate::types::{TransactionTemplate, TransferKind};

/// Domain-separation prefix. The canonical JSON byte length is appended
/// before hashing, mirroring the server verifier.
pub const SIGNED_MESSAGE_PREFIX: &str = "\x19Ember Signed Message:\n";

/// A canonicalized template: the exact JSON string that was hashed and its
/// keccak-256 digest. Derived only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampPayload {
    pub json: String,
    pub digest: [u8; 32],
}

/// Stamp fields in their fixed canonical order. Serialization follows struct
/// declaration order, which is the whole point: reordering these fields
/// changes every digest.
#[derive(Serialize)]
struct StampFields<'a> {
    chain_id: u64,
    from: String,
    nonce_bytes: &'a [u8],
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_id_string: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_metadata_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_nonce_bytes: Option<&'a [u8]>,
    #[serde(rename = "type")]
    transfer_type: &'static str,
    value: u64,
}

/// Produces the canonical JSON string for a template.
///
/// Address-valued fields are lowercased; `data` is not part of the stamp.
pub fn canonical_json(template: &TransactionTemplate) -> Result<String, ChainError> {
    let (token_id, token_uri, token_nonce, transfer_type) = match &template.kind {
        TransferKind::Coin => (None, None, None, "coin"),
        TransferKind::Token {
            token_id_string,
            token_metadata_uri,
            token_nonce_bytes,
        } => (
            Some(token_id_string.as_str()),
            Some(token_metadata_uri.as_str()),
            Some(token_nonce_bytes.as_slice()),
            "token",
        ),
    };

    let fields = StampFields {
        chain_id: template.chain_id,
        from: template.from.to_lowercase(),
        nonce_bytes: &template.nonce_bytes,
        to: template.to.to_lowercase(),
        token_id_string: token_id,
        token_metadata_uri: token_uri,
        token_nonce_bytes: token_nonce,
        transfer_type,
        value: template.value,
    };

    serde_json::to_string(&fields).map_err(|e| ChainError::Canonicalization(e.to_string()))
}

/// Computes the stamp for a template: canonical JSON plus the keccak-256
/// digest of `prefix ‖ json`, where the prefix embeds the JSON byte length.
pub fn compute_stamp(template: &TransactionTemplate) -> Result<StampPayload, ChainError> {
    let json = canonical_json(template)?;

    let mut hasher = Keccak256::new();
    hasher.update(format!("{}{}", SIGNED_MESSAGE_PREFIX, json.len()).as_bytes());
    hasher.update(json.as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();

    Ok(StampPayload { json, digest })
}
