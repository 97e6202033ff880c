use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A transaction as returned by the node's tx index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTransaction {
    /// Upper-case hex hash of the signed bytes.
    pub hash: String,
    /// Height of the block that included the transaction.
    pub height: i64,
    /// Signed transaction bytes, opaque until decoded.
    pub tx: Vec<u8>,
    /// Execution result code; `0` is success.
    pub code: u32,
    /// Execution log.
    pub log: String,
}

/// One page of a `tx_search` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchPage {
    /// Number of matching transactions across all pages, as reported by the node.
    pub total_count: u64,
    /// Transactions on this page, in index order.
    pub txs: Vec<RawTransaction>,
}

/// The block header fields the engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Block {
    pub height: i64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NodeStatus {
    pub latest_height: i64,
    pub catching_up: bool,
}

/// Offset/limit page request passed through to paginated gRPC-style endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
    pub count_total: bool,
}

impl PageRequest {
    pub fn with_limit(limit: u64) -> Self {
        Self {
            offset: 0,
            limit,
            count_total: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "amount")]
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

/// IBC transfer trace for a voucher denomination.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DenomTrace {
    /// Port/channel hops, e.g. `transfer/channel-0`. Empty for native denoms.
    pub path: String,
    pub base_denom: String,
}

impl DenomTrace {
    /// `path/base_denom`, or just `base_denom` for an empty path.
    pub fn full_denom_path(&self) -> String {
        if self.path.is_empty() {
            return self.base_denom.clone();
        }
        format!("{}/{}", self.path, self.base_denom)
    }

    /// The on-chain voucher denomination: `ibc/{SHA256(full path)}` in upper-case hex.
    /// Native denoms (empty path) are their own short form.
    pub fn ibc_denom(&self) -> String {
        if self.path.is_empty() {
            return self.base_denom.clone();
        }
        let hash = Sha256::digest(self.full_denom_path().as_bytes());
        format!("ibc/{}", hex::encode_upper(hash))
    }
}

/// Coin amounts travel as decimal strings; numbers are accepted on input.
mod amount {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(de::Error::custom),
            Repr::Number(n) => Ok(u128::from(n)),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn ibc_denom_hashes_full_path() {
        let trace = DenomTrace {
            path: "transfer/channel-0".to_string(),
            base_denom: "uatom".to_string(),
        };
        assert_eq!(trace.full_denom_path(), "transfer/channel-0/uatom");
        // Well-known voucher for ATOM over channel-0.
        assert_eq!(
            trace.ibc_denom(),
            "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"
        );
    }

    #[test]
    fn native_trace_is_its_own_denom() {
        let trace = DenomTrace {
            path: String::new(),
            base_denom: "uosmo".to_string(),
        };
        assert_eq!(trace.full_denom_path(), "uosmo");
        assert_eq!(trace.ibc_denom(), "uosmo");
    }

    #[test]
    fn coin_amount_accepts_string_and_number() {
        let from_str: Coin = serde_json::from_value(serde_json::json!({
            "denom": "uatom", "amount": "340282366920938463463374607431768211455"
        }))
        .unwrap();
        assert_eq!(from_str.amount, u128::MAX);

        let from_num: Coin =
            serde_json::from_value(serde_json::json!({ "denom": "uatom", "amount": 10 })).unwrap();
        assert_eq!(from_num, Coin::new("uatom", 10));

        assert_eq!(
            serde_json::to_value(&from_num).unwrap(),
            serde_json::json!({ "denom": "uatom", "amount": "10" })
        );
    }

    #[test]
    fn coin_amount_rejects_garbage() {
        let result: Result<Coin, _> =
            serde_json::from_value(serde_json::json!({ "denom": "uatom", "amount": "ten" }));
        assert!(result.is_err());
    }
}
