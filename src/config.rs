/// Must match the node's maximum `per_page` for `tx_search`; a shorter page means
/// the index has no more results.
pub const INDEX_PAGE_SIZE: usize = 30;

/// Page limit for paginated gRPC-style queries such as balances.
pub const DEFAULT_PAGE_LIMIT: u64 = 1000;

/// Upper bound for one denom-trace directory fetch.
pub const DENOM_TRACE_LIMIT: u64 = DEFAULT_PAGE_LIMIT;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    /// Leave ordering to the node (sent as an empty string).
    #[default]
    #[strum(serialize = "")]
    #[serde(rename = "")]
    Default,
    Asc,
    Desc,
}

/// Settings for one [`crate::ChainClient`] handle.
///
/// Loading from disk is left to the caller; this only describes the shape.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub chain_id: String,
    pub rpc_addr: String,
    pub index_page_size: usize,
    pub denom_trace_limit: u64,
    pub order_by: OrderBy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chain_id: String::new(),
            rpc_addr: String::new(),
            index_page_size: INDEX_PAGE_SIZE,
            denom_trace_limit: DENOM_TRACE_LIMIT,
            order_by: OrderBy::Default,
        }
    }
}
