#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("node at {rpc_addr} running chain {chain_id} not caught up")]
    NotSynced { rpc_addr: String, chain_id: String },

    #[error("tx search failed for query `{query}`: {reason}")]
    Search { query: String, reason: String },

    #[error("failed to fetch block at height {height}: {reason}")]
    BlockFetch { height: i64, reason: String },

    #[error("failed to decode tx {hash}: {reason}")]
    Decode { hash: String, reason: String },

    #[error("not found: {reason}")]
    NotFound { reason: String },

    #[error("invalid arguments: {reason}")]
    InvalidArguments { reason: String },

    #[error("query cancelled: {reason}")]
    Cancelled { reason: String },

    #[error("node error: {reason}")]
    Node { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure reported by a [`crate::TxDecoder`]; the engine attaches the tx hash.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
