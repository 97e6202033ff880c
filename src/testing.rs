//! In-memory node used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::Error;
use crate::node::{NodeClient, QueryContext};
use crate::types::{Block, Coin, DenomTrace, NodeStatus, PageRequest, RawTransaction, SearchPage};

#[derive(Default)]
pub(crate) struct MemoryNode {
    pub search: HashMap<(String, usize), Vec<RawTransaction>>,
    pub failing_queries: Vec<String>,
    pub failing_heights: Vec<i64>,
    pub txs_by_hash: HashMap<Vec<u8>, RawTransaction>,
    pub traces: Vec<DenomTrace>,
    pub balances: Vec<Coin>,
    pub catching_up: bool,
    pub search_calls: Mutex<Vec<(String, usize)>>,
    pub block_calls: Mutex<Vec<i64>>,
    pub trace_calls: Mutex<Vec<(PageRequest, i64)>>,
}

impl MemoryNode {
    pub fn with_page(mut self, query: &str, page: usize, txs: Vec<RawTransaction>) -> Self {
        self.search.insert((query.to_string(), page), txs);
        self
    }

    pub fn search_calls(&self) -> Vec<(String, usize)> {
        self.search_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn block_calls(&self) -> Vec<i64> {
        self.block_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn block_time(height: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_600_000_000 + height * 6, 0)
        .single()
        .unwrap_or_default()
}

pub(crate) fn raw_tx(hash: &str, height: i64, body: &serde_json::Value) -> RawTransaction {
    RawTransaction {
        hash: hash.to_string(),
        height,
        tx: serde_json::to_vec(body).unwrap_or_default(),
        code: 0,
        log: "[]".to_string(),
    }
}

impl NodeClient for MemoryNode {
    fn status(&self, ctx: &QueryContext) -> Result<NodeStatus, Error> {
        ctx.check()?;
        Ok(NodeStatus {
            latest_height: 1_000,
            catching_up: self.catching_up,
        })
    }

    fn block(&self, ctx: &QueryContext, height: i64) -> Result<Block, Error> {
        ctx.check()?;
        if let Ok(mut calls) = self.block_calls.lock() {
            calls.push(height);
        }
        if self.failing_heights.contains(&height) {
            return Err(Error::Node {
                reason: format!("height {height} pruned"),
            });
        }
        Ok(Block {
            height,
            time: block_time(height),
        })
    }

    fn tx(&self, ctx: &QueryContext, hash: &[u8], _prove: bool) -> Result<RawTransaction, Error> {
        ctx.check()?;
        self.txs_by_hash
            .get(hash)
            .cloned()
            .ok_or_else(|| Error::Node {
                reason: format!("tx ({}) not found", hex::encode_upper(hash)),
            })
    }

    fn tx_search(
        &self,
        ctx: &QueryContext,
        query: &str,
        _prove: bool,
        page: usize,
        _per_page: usize,
        _order_by: &str,
    ) -> Result<SearchPage, Error> {
        ctx.check()?;
        if let Ok(mut calls) = self.search_calls.lock() {
            calls.push((query.to_string(), page));
        }
        if self.failing_queries.iter().any(|q| q == query) {
            return Err(Error::Node {
                reason: "index unavailable".to_string(),
            });
        }
        let txs = self
            .search
            .get(&(query.to_string(), page))
            .cloned()
            .unwrap_or_default();
        let total_count = self
            .search
            .iter()
            .filter(|((q, _), _)| q == query)
            .map(|(_, txs)| txs.len() as u64)
            .sum();
        Ok(SearchPage { total_count, txs })
    }

    fn denom_traces(
        &self,
        ctx: &QueryContext,
        page: PageRequest,
        height: i64,
    ) -> Result<Vec<DenomTrace>, Error> {
        ctx.check()?;
        if let Ok(mut calls) = self.trace_calls.lock() {
            calls.push((page, height));
        }
        Ok(self.traces.clone())
    }

    fn all_balances(
        &self,
        ctx: &QueryContext,
        _address: &str,
        _page: PageRequest,
    ) -> Result<Vec<Coin>, Error> {
        ctx.check()?;
        Ok(self.balances.clone())
    }
}
