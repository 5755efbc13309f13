use std::time::Duration;

/// Endpoints and timing knobs for the HTTP clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Prepare-transaction endpoint.
    pub prepare_url: String,
    /// Mempool-submission endpoint.
    pub mempool_url: String,
    /// Live-update streaming endpoint.
    pub stream_url: String,
    /// Per-request timeout for prepare and submit. Does not apply to the
    /// long-lived stream body.
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            prepare_url: format!("{base}/transactions/prepare"),
            mempool_url: format!("{base}/mempool"),
            stream_url: format!("{base}/updates"),
            request_timeout: Duration::from_secs(15),
        }
    }
}
