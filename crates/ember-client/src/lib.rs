//! Async network surface of the Ember wallet.
//!
//! This crate provides:
//! - The prepare-endpoint client returning server-authoritative transaction
//!   templates
//! - Mempool submission with locally generated, ObjectId-style submission ids
//! - A reconnecting live-update stream delivering `data:`-prefixed payloads
//!
//! The HTTP seams are traits ([`api::ChainApi`], [`stream::EventTransport`])
//! so the signing pipeline and the stream state machine are testable without
//! sockets.

pub mod api;
pub mod config;
pub mod error;
pub mod oid;
pub mod stream;

pub use api::{ChainApi, HttpChainApi, MempoolSubmission, PrepareRequest, SubmissionReceipt};
pub use config::ClientConfig;
pub use error::ClientError;
pub use stream::{LiveUpdateStream, StreamState, StreamUpdate};
