use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{BlockchainInfo, ListedTransaction, RpcRequest, RpcResponse};

const JSONRPC_VERSION: &str = "1.0";
const CLIENT_ID: &str = "anon-wallet-core";

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    url: String,
    username: Option<String>,
    password: Option<String>,
}

impl NodeClient {
    pub fn new(
        url: &str,
        username: Option<&str>,
        password: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.to_string(),
            username: username.map(ToString::to_string),
            password: password.map(ToString::to_string),
        })
    }

    /// Issues a single JSON-RPC call. A `result: null` on a successful
    /// response maps to `Ok(None)`; a populated `error` object maps to
    /// [`RpcError::Node`] even when the node reports it with a 5xx status.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, RpcError> {
        let payload = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: CLIENT_ID,
            method,
            params,
        };
        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let envelope: RpcResponse<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(error) => {
                if !status.is_success() {
                    return Err(RpcError::HttpStatus(status.as_u16()));
                }
                return Err(RpcError::Decode(error));
            }
        };
        if let Some(node_error) = envelope.error {
            return Err(RpcError::Node {
                code: node_error.code,
                message: node_error.message,
            });
        }

        Ok(envelope.result)
    }

    pub async fn get_blockchain_info(&self) -> Result<Option<BlockchainInfo>, RpcError> {
        self.call("getblockchaininfo", json!([])).await
    }

    pub async fn list_transactions(
        &self,
        count: usize,
        from: usize,
    ) -> Result<Vec<ListedTransaction>, RpcError> {
        let listed = self
            .call::<Vec<ListedTransaction>>("listtransactions", json!(["*", count, from]))
            .await?;
        Ok(listed.unwrap_or_default())
    }

    pub async fn list_transactions_with_retry(
        &self,
        count: usize,
        from: usize,
        max_retries: usize,
    ) -> Result<Vec<ListedTransaction>, RpcError> {
        let mut attempt = 0_usize;
        loop {
            match self.list_transactions(count, from).await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    let should_retry = matches!(err, RpcError::Request(_))
                        || matches!(err, RpcError::HttpStatus(code) if code >= 500);
                    if !should_retry || attempt >= max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    tokio::time::sleep(Duration::from_millis(40 * attempt as u64)).await;
                }
            }
        }
    }
}
