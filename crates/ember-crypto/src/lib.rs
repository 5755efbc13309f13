//! # ember-crypto
//!
//! Password-based sealing of secret key material and secure random
//! generation for the Ember wallet.

pub mod error;
pub mod random;
pub mod seal;

pub use error::CryptoError;
pub use seal::{open, seal, SealedKey};
