use std::collections::BTreeMap;

use crate::error::Error;
use crate::node::{NodeClient, QueryContext};
use crate::types::{Block, RawTransaction};

/// Blocks already fetched during one logical query, keyed by height.
pub type BlockTimeCache = BTreeMap<i64, Block>;

/// Fetches the block for every height in `txs` that `cache` does not hold yet,
/// in first-seen order. Each distinct height is fetched at most once.
pub fn resolve_blocks<N: NodeClient + ?Sized>(
    node: &N,
    ctx: &QueryContext,
    txs: &[RawTransaction],
    cache: &mut BlockTimeCache,
) -> Result<(), Error> {
    for tx in txs {
        if cache.contains_key(&tx.height) {
            continue;
        }
        ctx.check()?;
        let block = node.block(ctx, tx.height).map_err(|e| match e {
            Error::Cancelled { .. } => e,
            other => Error::BlockFetch {
                height: tx.height,
                reason: other.to_string(),
            },
        })?;
        tracing::debug!(height = tx.height, time = %block.time, "fetched block");
        cache.insert(tx.height, block);
    }
    Ok(())
}

/// Convenience wrapper building a fresh cache for a single batch.
pub fn blocks_for<N: NodeClient + ?Sized>(
    node: &N,
    ctx: &QueryContext,
    txs: &[RawTransaction],
) -> Result<BlockTimeCache, Error> {
    let mut cache = BlockTimeCache::new();
    resolve_blocks(node, ctx, txs, &mut cache)?;
    Ok(cache)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::testing::{MemoryNode, block_time, raw_tx};

    fn txs_at(heights: &[i64]) -> Vec<RawTransaction> {
        heights
            .iter()
            .enumerate()
            .map(|(i, h)| raw_tx(&format!("TX{i}"), *h, &serde_json::json!({})))
            .collect()
    }

    #[test]
    fn one_fetch_per_distinct_height() {
        let node = MemoryNode::default();
        let txs = txs_at(&[10, 12, 10, 11, 12, 10]);

        let cache = blocks_for(&node, &QueryContext::new(), &txs).unwrap();

        assert_eq!(node.block_calls(), vec![10, 12, 11]);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache[&12].time, block_time(12));
    }

    #[test]
    fn cache_carries_across_batches() {
        let node = MemoryNode::default();
        let ctx = QueryContext::new();
        let mut cache = BlockTimeCache::new();

        resolve_blocks(&node, &ctx, &txs_at(&[1, 2]), &mut cache).unwrap();
        resolve_blocks(&node, &ctx, &txs_at(&[2, 3, 1]), &mut cache).unwrap();

        assert_eq!(node.block_calls(), vec![1, 2, 3]);
    }

    #[test]
    fn fetch_failure_aborts() {
        let node = MemoryNode {
            failing_heights: vec![7],
            ..MemoryNode::default()
        };

        let result = blocks_for(&node, &QueryContext::new(), &txs_at(&[5, 7, 9]));

        assert!(matches!(result, Err(Error::BlockFetch { height: 7, .. })));
        assert_eq!(node.block_calls(), vec![5, 7]);
    }

    #[test]
    fn empty_batch_fetches_nothing() {
        let node = MemoryNode::default();
        let cache = blocks_for(&node, &QueryContext::new(), &[]).unwrap();
        assert!(cache.is_empty());
        assert!(node.block_calls().is_empty());
    }
}
