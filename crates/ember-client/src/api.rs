use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ember_chain::types::{SignedTransaction, TransactionTemplate};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Request body for the prepare-transaction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrepareRequest {
    pub sender_account_address: String,
    pub recipient_address: String,
    pub value: u64,
    pub data: String,
    #[serde(flatten)]
    pub asset: PrepareAsset,
}

/// Asset selector for a prepare request; token fields exist only on the
/// `Token` variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PrepareAsset {
    Coin,
    Token {
        token_id_string: String,
        token_metadata_uri: String,
    },
}

/// One submission attempt: a locally generated id plus the signed
/// transaction, serialized flat for the mempool endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MempoolSubmission {
    pub id: String,
    #[serde(flatten)]
    pub tx: SignedTransaction,
}

/// Returned on HTTP 201 from the mempool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub transaction_id: String,
}

/// The two remote operations of the signing pipeline. A trait so the
/// pipeline is testable with a stub and so alternative transports can slot
/// in behind the wallet service.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Requests a server-authoritative transaction template. The client never
    /// derives nonce or chain id locally.
    async fn prepare(&self, request: &PrepareRequest)
        -> Result<TransactionTemplate, ClientError>;

    /// Posts one submission attempt to the mempool. Never retried
    /// automatically: a retry would mint a fresh id and the mempool is not
    /// known to deduplicate by signature.
    async fn submit(&self, submission: &MempoolSubmission)
        -> Result<SubmissionReceipt, ClientError>;
}

/// reqwest-backed [`ChainApi`].
pub struct HttpChainApi {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpChainApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ChainApi for HttpChainApi {
    async fn prepare(
        &self,
        request: &PrepareRequest,
    ) -> Result<TransactionTemplate, ClientError> {
        debug!(sender = %request.sender_account_address, "requesting transaction template");

        let response = self
            .http
            .post(&self.config.prepare_url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "prepare endpoint returned an error");
            return Err(ClientError::InvalidResponse(rejection_message(status, &body)));
        }

        response
            .json::<TransactionTemplate>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn submit(
        &self,
        submission: &MempoolSubmission,
    ) -> Result<SubmissionReceipt, ClientError> {
        debug!(id = %submission.id, "submitting to mempool");

        let response = self
            .http
            .post(&self.config.mempool_url)
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            let message = rejection_message(status, &body);
            warn!(%status, %message, "mempool rejected submission");
            return Err(ClientError::SubmissionRejected(message));
        }

        Ok(SubmissionReceipt {
            transaction_id: submission.id.clone(),
        })
    }
}

/// Error body shape shared by the remote endpoints.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extracts the server's `message` field from an error body, falling back to
/// the HTTP status text.
fn rejection_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => parsed.message,
        _ => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}
