use std::sync::Arc;

use tracing::{debug, info};

use ember_chain::address::addresses_match;
use ember_chain::signer::sign_template;
use ember_chain::verify::verify_signed;
use ember_client::api::{
    ChainApi, HttpChainApi, MempoolSubmission, PrepareAsset, PrepareRequest, SubmissionReceipt,
};
use ember_client::config::ClientConfig;
use ember_client::oid::submission_id;
use ember_client::stream::{EventTransport, HttpEventTransport, LiveUpdateStream, StreamUpdate};

use crate::error::WalletError;
use crate::session::{SessionConfig, SessionManager};
use crate::store::KeyValueStore;
use crate::vault::{KeyVault, WalletRecord};

/// Token-transfer fields of a [`TransferRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAsset {
    pub token_id_string: String,
    pub token_metadata_uri: String,
}

/// What the UI hands to [`WalletService::sign_and_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
    pub message: String,
    /// `None` for a native coin transfer.
    pub asset: Option<TokenAsset>,
}

/// The wallet's public surface. External code calls these operations and
/// renders whatever results or errors come back; everything else in the
/// workspace is an implementation detail behind this facade.
pub struct WalletService {
    vault: KeyVault,
    sessions: SessionManager,
    api: Arc<dyn ChainApi>,
    stream_transport: Arc<dyn EventTransport>,
    // Exclusive signing pipeline: try-locked, never queued.
    signing: tokio::sync::Mutex<()>,
}

impl WalletService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        api: Arc<dyn ChainApi>,
        stream_transport: Arc<dyn EventTransport>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            vault: KeyVault::new(store),
            sessions: SessionManager::new(session_config),
            api,
            stream_transport,
            signing: tokio::sync::Mutex::new(()),
        }
    }

    /// Convenience constructor wiring the reqwest-backed clients for a node
    /// base URL.
    pub fn over_http(
        store: Arc<dyn KeyValueStore>,
        client_config: ClientConfig,
        session_config: SessionConfig,
    ) -> Result<Self, WalletError> {
        let api = HttpChainApi::new(client_config.clone()).map_err(WalletError::from)?;
        let transport = HttpEventTransport::new(&client_config).map_err(WalletError::from)?;
        Ok(Self::new(
            store,
            Arc::new(api),
            Arc::new(transport),
            session_config,
        ))
    }

    /// Derives a keypair from `mnemonic`, seals it under `password`, and
    /// stores a new wallet record.
    pub fn create_wallet(
        &self,
        mnemonic: &str,
        password: &str,
    ) -> Result<WalletRecord, WalletError> {
        let record = self.vault.create_wallet(mnemonic, password)?;
        info!(wallet = %record.id, address = %record.address, "wallet created");
        Ok(record)
    }

    /// Lists stored wallet records.
    pub fn wallets(&self) -> Result<Vec<WalletRecord>, WalletError> {
        self.vault.wallets()
    }

    /// Unseals the wallet's key and starts a session, replacing any existing
    /// one. Returns the wallet address.
    pub fn unlock(&self, wallet_id: &str, password: &str) -> Result<String, WalletError> {
        let (record, private_key) = self.vault.unlock_key(wallet_id, password)?;
        self.sessions.start(record.address.clone(), private_key);
        info!(wallet = %record.id, "session started");
        Ok(record.address)
    }

    /// Purges the session and its key material unconditionally.
    pub fn lock(&self) {
        self.sessions.lock();
        info!("session locked");
    }

    /// The full transfer pipeline: template fetch, stamp, sign, mandatory
    /// self-verification, mempool submission.
    ///
    /// Strictly sequential; a second call while one is in flight fails
    /// `Busy`. Nothing is retried automatically — each attempt would mint a
    /// fresh submission id and the mempool is not known to deduplicate.
    pub async fn sign_and_submit(
        &self,
        request: &TransferRequest,
    ) -> Result<SubmissionReceipt, WalletError> {
        let _guard = self.signing.try_lock().map_err(|_| WalletError::Busy)?;

        self.sessions.touch()?;
        let active = self.sessions.active_wallet()?;
        if !addresses_match(&request.sender, &active.address) {
            return Err(WalletError::SenderMismatch {
                requested: request.sender.clone(),
                active: active.address,
            });
        }

        let prepare = PrepareRequest {
            sender_account_address: active.address.clone(),
            recipient_address: request.recipient.clone(),
            value: request.amount,
            data: request.message.clone(),
            asset: match &request.asset {
                None => PrepareAsset::Coin,
                Some(token) => PrepareAsset::Token {
                    token_id_string: token.token_id_string.clone(),
                    token_metadata_uri: token.token_metadata_uri.clone(),
                },
            },
        };
        let template = self.api.prepare(&prepare).await?;
        debug!(chain_id = template.chain_id, "template received");

        let signed = sign_template(&template, active.signing_key())?;
        // Gate: a signature that does not recover to the sender must never
        // reach the mempool.
        verify_signed(&signed)?;

        let submission = MempoolSubmission {
            id: submission_id(),
            tx: signed,
        };
        let receipt = self.api.submit(&submission).await?;
        info!(id = %receipt.transaction_id, "transaction submitted");
        Ok(receipt)
    }

    /// Opens the live-update stream for `address`. The handler receives each
    /// confirmed-transaction payload, or `StreamExhausted` once the bounded
    /// reconnect attempts run out. The returned handle owns the connection;
    /// dropping it or calling its `disconnect` tears the stream down.
    pub fn subscribe_to_updates<F>(&self, address: &str, handler: F) -> LiveUpdateStream
    where
        F: Fn(Result<String, WalletError>) + Send + Sync + 'static,
    {
        let mut stream = LiveUpdateStream::new(Arc::clone(&self.stream_transport));
        stream.connect(address, move |update| match update {
            StreamUpdate::Payload(payload) => handler(Ok(payload)),
            StreamUpdate::Exhausted { attempts } => {
                handler(Err(WalletError::StreamExhausted(attempts)))
            }
        });
        stream
    }
}
