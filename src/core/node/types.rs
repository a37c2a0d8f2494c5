use serde::{Deserialize, Serialize};

use crate::core::transactions::TransactionKind;

/// Snapshot returned by the node's `getblockchaininfo` call. Field names
/// follow the node's all-lowercase JSON-RPC convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainInfo {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: Option<String>,
    pub difficulty: Option<f64>,
    #[serde(rename = "verificationprogress")]
    pub verification_progress: f64,
}

/// One row of the node's `listtransactions` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedTransaction {
    pub txid: String,
    pub category: TransactionKind,
    pub address: Option<String>,
    pub amount: f64,
    pub confirmations: i64,
    pub time: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'a str,
    pub id: &'a str,
    pub method: &'a str,
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}
