use k256::ecdsa::VerifyingKey;
use sha3::{Digest, Keccak256};

use crate::error::ChainError;

/// Derives a lowercase 0x-prefixed Ember address from a secp256k1 verifying
/// key.
///
/// The address is the last 20 bytes of the Keccak-256 hash of the 64-byte
/// uncompressed public key (0x04 prefix stripped). Ember addresses are
/// compared case-insensitively everywhere, so the canonical form is all
/// lowercase.
pub fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let uncompressed = key.to_encoded_point(false);
    let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Checks that an address has the expected shape: `0x` + 40 hex characters.
pub fn validate_address(address: &str) -> Result<(), ChainError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| ChainError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(ChainError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChainError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }
    Ok(())
}

/// Case-insensitive address equality.
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
