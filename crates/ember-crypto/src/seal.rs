use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::random::random_bytes_fixed;

/// AES-256-GCM nonce size in bytes.
const NONCE_SIZE: usize = 12;

/// Argon2id salt size in bytes.
const SALT_SIZE: usize = 16;

/// A password-sealed secret, safe to persist.
///
/// Layout of `ciphertext` is `[nonce (12 bytes) | ciphertext + tag]`; the
/// Argon2id salt is stored alongside. Opening with the wrong password fails
/// the GCM authentication tag, so failure is always detected positively and
/// garbage plaintext is never returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SealedKey {
    pub ciphertext: Vec<u8>,
    pub salt: Vec<u8>,
}

/// Derives a 32-byte AES key from `password` and `salt` using Argon2id
/// (64 MiB, 3 iterations, 4 lanes).
fn derive_key(password: &[u8], salt: &[u8; SALT_SIZE]) -> Result<[u8; 32], CryptoError> {
    let params = Params::new(65536, 3, 4, Some(32))
        .map_err(|e| CryptoError::KdfFailed(format!("invalid argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| CryptoError::KdfFailed(format!("argon2 hash failed: {e}")))?;
    Ok(output)
}

/// Seals `plaintext` under `password` with a fresh random salt and nonce.
pub fn seal(plaintext: &[u8], password: &[u8]) -> Result<SealedKey, CryptoError> {
    let salt = random_bytes_fixed::<SALT_SIZE>();
    let mut key = derive_key(password, &salt)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let nonce_bytes = random_bytes_fixed::<NONCE_SIZE>();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::SealFailed(e.to_string()))?;
    key.zeroize();

    let mut ciphertext = Vec::with_capacity(NONCE_SIZE + sealed.len());
    ciphertext.extend_from_slice(&nonce_bytes);
    ciphertext.extend_from_slice(&sealed);

    Ok(SealedKey {
        ciphertext,
        salt: salt.to_vec(),
    })
}

/// Opens a [`SealedKey`] with `password`.
///
/// The caller must zeroize the returned plaintext when done.
pub fn open(sealed: &SealedKey, password: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let salt: [u8; SALT_SIZE] = sealed
        .salt
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidSealedData("bad salt length".into()))?;

    if sealed.ciphertext.len() < NONCE_SIZE {
        return Err(CryptoError::InvalidSealedData(format!(
            "ciphertext too short: expected at least {} bytes, got {}",
            NONCE_SIZE,
            sealed.ciphertext.len()
        )));
    }

    let mut key = derive_key(password, &salt)?;
    let (nonce_bytes, body) = sealed.ciphertext.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), body)
        .map_err(|_| CryptoError::OpenFailed);
    key.zeroize();
    plaintext
}
