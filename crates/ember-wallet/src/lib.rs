//! # ember-wallet
//!
//! Key custody and the transaction-signing/submission pipeline of the Ember
//! wallet. The [`service::WalletService`] facade is the only surface external
//! code calls: `create_wallet`, `unlock`, `lock`, `sign_and_submit`, and
//! `subscribe_to_updates`.
//!
//! Decrypted key material lives exclusively inside an unexpired
//! [`session::SessionManager`] session and is zeroized on expiry or lock.

pub mod error;
pub mod keys;
pub mod mnemonic;
pub mod service;
pub mod session;
pub mod store;
pub mod vault;

pub use error::WalletError;
pub use service::{TokenAsset, TransferRequest, WalletService};
pub use session::SessionConfig;
pub use store::{KeyValueStore, MemoryStore};
pub use vault::WalletRecord;
