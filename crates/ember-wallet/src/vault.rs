use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use ember_chain::address::addresses_match;
use ember_crypto::seal::{open, seal, SealedKey};

use crate::error::WalletError;
use crate::keys;
use crate::store::KeyValueStore;

/// Storage key for the wallet list.
const WALLETS_KEY: &str = "ember.wallets";

/// One stored wallet. The private key exists here only as Argon2id+AES-GCM
/// ciphertext; records are appended on creation and touched on access, never
/// deleted automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub id: String,
    pub address: String,
    pub sealed_key: SealedKey,
    pub created_at: u64,
    pub last_accessed: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Encrypted-at-rest wallet storage over a [`KeyValueStore`].
pub struct KeyVault {
    store: Arc<dyn KeyValueStore>,
}

impl KeyVault {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns all stored wallet records.
    pub fn wallets(&self) -> Result<Vec<WalletRecord>, WalletError> {
        match self.store.get(WALLETS_KEY)? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| WalletError::Storage(format!("corrupt wallet list: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[WalletRecord]) -> Result<(), WalletError> {
        let json = serde_json::to_string(records)
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        self.store.set(WALLETS_KEY, &json)
    }

    /// Derives a keypair from `mnemonic`, seals the private key under
    /// `password`, and appends a new record.
    pub fn create_wallet(
        &self,
        mnemonic: &str,
        password: &str,
    ) -> Result<WalletRecord, WalletError> {
        let derived = keys::derive_key_from_mnemonic(mnemonic)?;
        let sealed_key = seal(derived.private_key.as_slice(), password.as_bytes())?;

        let now = unix_now();
        let record = WalletRecord {
            id: hex::encode(ember_crypto::random::random_bytes_fixed::<12>()),
            address: derived.address,
            sealed_key,
            created_at: now,
            last_accessed: now,
        };

        let mut records = self.wallets()?;
        records.push(record.clone());
        self.save(&records)?;
        Ok(record)
    }

    /// Unseals the private key for `wallet_id`.
    ///
    /// Fails `NotFound` for an unknown id and `WrongPassword` when the AEAD
    /// tag does not authenticate or the unsealed bytes do not reproduce the
    /// record's address — failure is always detected positively, garbage key
    /// bytes are never handed out.
    pub fn unlock_key(
        &self,
        wallet_id: &str,
        password: &str,
    ) -> Result<(WalletRecord, Zeroizing<[u8; 32]>), WalletError> {
        let mut records = self.wallets()?;
        let record = records
            .iter_mut()
            .find(|r| r.id == wallet_id)
            .ok_or_else(|| WalletError::NotFound(wallet_id.to_string()))?;

        let plaintext = Zeroizing::new(open(&record.sealed_key, password.as_bytes())?);
        let key_bytes: [u8; 32] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| WalletError::WrongPassword)?;
        let private_key = Zeroizing::new(key_bytes);

        if !addresses_match(&keys::address_for_private_key(&private_key)?, &record.address) {
            return Err(WalletError::WrongPassword);
        }

        record.last_accessed = unix_now();
        let record = record.clone();
        self.save(&records)?;
        Ok((record, private_key))
    }
}
