use std::collections::VecDeque;
use std::ops::Range;

use crate::error::Error;
use crate::node::{NodeClient, QueryContext, TxDecoder};
use crate::query::block_time::{BlockTimeCache, resolve_blocks};
use crate::query::extract::{RecordExtractor, extract_all, extract_first};
use crate::query::format::{TxResponse, format_tx_results};
use crate::query::planner::{PredicateGroup, plan};
use crate::query::search::search_union;

/// Lazy sequence of records replayed from the tx index.
///
/// Index pages are pulled only when the buffered records run out. The index
/// cursor is unrelated to any caller-visible page: one index page may yield
/// zero, one or many records. The stream ends after the first index page
/// (union of all predicate groups) that returns fewer than `page_size` raw
/// transactions. Any error, including cancellation, is yielded once and ends
/// the stream.
pub struct RecordStream<'a, N: ?Sized, D: ?Sized, E: RecordExtractor> {
    node: &'a N,
    decoder: &'a D,
    ctx: &'a QueryContext,
    extractor: E,
    groups: Vec<PredicateGroup>,
    page_size: usize,
    order_by: &'a str,
    cursor: usize,
    exhausted: bool,
    buffer: VecDeque<E::Record>,
    blocks: BlockTimeCache,
}

impl<'a, N, D, E> RecordStream<'a, N, D, E>
where
    N: NodeClient + ?Sized,
    D: TxDecoder + ?Sized,
    E: RecordExtractor,
{
    pub fn new(
        node: &'a N,
        decoder: &'a D,
        ctx: &'a QueryContext,
        extractor: E,
        page_size: usize,
        order_by: &'a str,
    ) -> Self {
        let groups = plan(&extractor.intent());
        Self {
            node,
            decoder,
            ctx,
            extractor,
            groups,
            page_size,
            order_by,
            cursor: 1,
            exhausted: false,
            buffer: VecDeque::new(),
            blocks: BlockTimeCache::new(),
        }
    }

    /// Starts from blocks already fetched by an earlier lookup of the same
    /// logical query.
    pub fn with_blocks(mut self, blocks: BlockTimeCache) -> Self {
        self.blocks = blocks;
        self
    }

    /// Hands back the block cache so a follow-up lookup can reuse it.
    pub fn into_blocks(self) -> BlockTimeCache {
        self.blocks
    }

    /// Queues a record ahead of anything the index yields.
    pub fn prepend(&mut self, record: E::Record) {
        self.buffer.push_front(record);
    }

    /// Next index page to pull, starting at 1.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// Rewinds to index page 1 and drops buffered records and cached blocks.
    pub fn restart(&mut self) {
        self.cursor = 1;
        self.exhausted = false;
        self.buffer.clear();
        self.blocks.clear();
    }

    /// Single-result mode: pages until one record matches, scanning each page
    /// only up to its first match. Buffered records are served first.
    pub fn first_match(&mut self) -> Result<Option<E::Record>, Error> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Ok(Some(record));
            }
            if self.exhausted {
                return Ok(None);
            }
            let txs = self.fetch_page().inspect_err(|_| self.exhausted = true)?;
            if let Some(record) = extract_first(&self.extractor, &txs) {
                return Ok(Some(record));
            }
        }
    }

    fn pull_page(&mut self) -> Result<(), Error> {
        let txs = self.fetch_page()?;
        let records = extract_all(&self.extractor, &txs);
        tracing::debug!(records = records.len(), "extracted records");
        self.buffer.extend(records);
        Ok(())
    }

    /// Fetches and decodes the index page under the cursor, then advances it.
    fn fetch_page(&mut self) -> Result<Vec<TxResponse>, Error> {
        self.ctx.check()?;

        let raws = search_union(
            self.node,
            self.ctx,
            &self.groups,
            self.cursor,
            self.page_size,
            self.order_by,
        )?;
        resolve_blocks(self.node, self.ctx, &raws, &mut self.blocks)?;
        let txs = format_tx_results(self.decoder, &raws, &self.blocks)?;

        tracing::debug!(index_page = self.cursor, txs = raws.len(), "replayed index page");

        if raws.len() < self.page_size {
            tracing::debug!(index_page = self.cursor, "tx index exhausted");
            self.exhausted = true;
        } else {
            self.cursor += 1;
        }
        Ok(txs)
    }
}

impl<N, D, E> Iterator for RecordStream<'_, N, D, E>
where
    N: NodeClient + ?Sized,
    D: TxDecoder + ?Sized,
    E: RecordExtractor,
{
    type Item = Result<E::Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.pull_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}

/// Window of a 1-indexed `page` of `limit` items over `len` items, or `None`
/// when the page starts past the end.
pub fn paginate(len: usize, page: usize, limit: usize) -> Option<Range<usize>> {
    if page == 0 || limit == 0 {
        return None;
    }
    let start = (page - 1).checked_mul(limit)?;
    if start >= len {
        return None;
    }
    let end = start.saturating_add(limit).min(len);
    Some(start..end)
}

pub(crate) fn validate_page(page: usize, limit: usize) -> Result<(), Error> {
    if page == 0 {
        return Err(Error::invalid("page must be greater than 0"));
    }
    if limit == 0 {
        return Err(Error::invalid("limit must be greater than 0"));
    }
    Ok(())
}

/// Pulls records until `page * limit` are held or the index runs dry, then
/// returns the requested window. Out-of-range pages come back empty, including
/// pages whose end does not fit in `usize`; those never touch the iterator.
pub fn collect_page<R, I>(records: I, page: usize, limit: usize) -> Result<Vec<R>, Error>
where
    I: Iterator<Item = Result<R, Error>>,
{
    validate_page(page, limit)?;
    let Some(wanted) = page.checked_mul(limit) else {
        return Ok(Vec::new());
    };
    let mut collected = records.take(wanted).collect::<Result<Vec<R>, Error>>()?;
    Ok(match paginate(collected.len(), page, limit) {
        Some(window) => collected.drain(window).collect(),
        None => Vec::new(),
    })
}
