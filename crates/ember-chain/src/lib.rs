//! Ember chain support: the pure, deterministic half of the signing path.
//!
//! This crate provides:
//! - Transaction template and signed-transaction types (coin and token kinds)
//! - Stamp canonicalization: fixed-key-order JSON + domain-separated keccak-256
//! - Recoverable secp256k1 signing with the Ember `v`-encoding
//! - Address derivation from secp256k1 public keys
//! - Mandatory pre-submission signature self-verification
//!
//! Nothing in here touches the network or holds long-lived key material.

pub mod address;
pub mod error;
pub mod signer;
pub mod stamp;
pub mod types;
pub mod verify;

pub use error::ChainError;
pub use types::{SignedTransaction, TransactionTemplate, TransferKind};
