use chrono::SecondsFormat;
use serde::Serialize;

use crate::error::Error;
use crate::messages::DecodedTx;
use crate::node::TxDecoder;
use crate::query::block_time::BlockTimeCache;
use crate::types::{Block, RawTransaction};

/// A decoded transaction with its inclusion metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxResponse {
    pub height: i64,
    pub txhash: String,
    pub code: u32,
    pub raw_log: String,
    /// Serialised as an `{"@type": ...}` envelope.
    pub tx: DecodedTx,
    /// RFC3339 block time, second precision, `Z` suffix.
    pub timestamp: String,
}

/// One page of [`TxResponse`]s with the node's paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchTxsResult {
    pub total_count: u64,
    pub count: u64,
    pub page_number: u64,
    pub page_total: u64,
    pub limit: u64,
    pub txs: Vec<TxResponse>,
}

impl SearchTxsResult {
    pub fn new(total_count: u64, page: u64, limit: u64, txs: Vec<TxResponse>) -> Self {
        let page_total = if limit == 0 {
            0
        } else {
            total_count.div_ceil(limit)
        };
        Self {
            total_count,
            count: txs.len() as u64,
            page_number: page,
            page_total,
            limit,
            txs,
        }
    }
}

pub fn make_tx_result<D: TxDecoder + ?Sized>(
    decoder: &D,
    raw: &RawTransaction,
    block: &Block,
) -> Result<TxResponse, Error> {
    let tx = decoder.decode(&raw.tx).map_err(|e| Error::Decode {
        hash: raw.hash.clone(),
        reason: e.0,
    })?;

    Ok(TxResponse {
        height: raw.height,
        txhash: raw.hash.clone(),
        code: raw.code,
        raw_log: raw.log.clone(),
        tx,
        timestamp: block.time.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

/// Formats a batch in order. The first undecodable transaction fails the whole batch.
pub fn format_tx_results<D: TxDecoder + ?Sized>(
    decoder: &D,
    raws: &[RawTransaction],
    blocks: &BlockTimeCache,
) -> Result<Vec<TxResponse>, Error> {
    raws.iter()
        .map(|raw| {
            let block = blocks.get(&raw.height).ok_or_else(|| Error::BlockFetch {
                height: raw.height,
                reason: "block not resolved for tx".into(),
            })?;
            make_tx_result(decoder, raw, block)
        })
        .collect()
}
