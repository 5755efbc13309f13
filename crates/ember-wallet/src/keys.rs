use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use k256::ecdsa::SigningKey;
use zeroize::{Zeroize, Zeroizing};

use ember_chain::address::address_from_verifying_key;

use crate::error::WalletError;

/// BIP-44 coin type registered for Ember.
pub const EMBER_COIN_TYPE: u32 = 7272;

/// The single account path the wallet uses: `m/44'/7272'/0'/0/0`.
fn derivation_path() -> String {
    format!("m/44'/{EMBER_COIN_TYPE}'/0'/0/0")
}

/// A derived signing key and its address. The key bytes are zeroized on
/// drop.
pub struct DerivedKey {
    pub private_key: Zeroizing<[u8; 32]>,
    pub address: String,
}

/// Derives the wallet keypair from a mnemonic phrase.
///
/// Checksum failure surfaces as `InvalidMnemonic`.
pub fn derive_key_from_mnemonic(phrase: &str) -> Result<DerivedKey, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    let mut seed = mnemonic.to_seed("");

    let path: DerivationPath = derivation_path()
        .parse()
        .map_err(|e: bip32::Error| WalletError::Internal(e.to_string()))?;
    let xprv = XPrv::derive_from_path(&seed, &path)
        .map_err(|e| WalletError::Internal(e.to_string()))?;
    seed.zeroize();

    let key_bytes: [u8; 32] = xprv.to_bytes().into();
    let private_key = Zeroizing::new(key_bytes);
    let signing_key = SigningKey::from_bytes((&*private_key).into())
        .map_err(|e| WalletError::Internal(e.to_string()))?;
    let address = address_from_verifying_key(signing_key.verifying_key());

    Ok(DerivedKey {
        private_key,
        address,
    })
}

/// Derives the address for a 32-byte private key, used to positively confirm
/// that unsealed key material matches a stored record.
pub fn address_for_private_key(private_key: &[u8; 32]) -> Result<String, WalletError> {
    let signing_key = SigningKey::from_bytes(private_key.into())
        .map_err(|_| WalletError::WrongPassword)?;
    Ok(address_from_verifying_key(signing_key.verifying_key()))
}
