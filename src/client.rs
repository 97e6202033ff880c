use crate::config::{ClientConfig, DEFAULT_PAGE_LIMIT, OrderBy};
use crate::error::Error;
use crate::messages::decoder::JsonTxDecoder;
use crate::node::{NodeClient, QueryContext, TxDecoder};
use crate::query::block_time::{BlockTimeCache, blocks_for};
use crate::query::denom::{fetch_denom_traces, resolve_denom_traces};
use crate::query::extract::{
    Deposit, DepositExtractor, InitialDepositExtractor, Proposer, ProposerExtractor,
    RecordExtractor, Vote, VoteExtractor,
};
use crate::query::format::{SearchTxsResult, TxResponse, format_tx_results, make_tx_result};
use crate::query::paginate::{RecordStream, collect_page, validate_page};
use crate::query::planner::{EventPredicate, PredicateGroup};
use crate::query::search::{render_query, search_page};
use crate::types::{Coin, PageRequest};

/// Handle to one chain: the node, the tx decoder and their settings.
///
/// Every query builds its own state and drops it on return, so a single handle
/// can serve concurrent callers.
pub struct ChainClient<N, D = JsonTxDecoder> {
    node: N,
    decoder: D,
    config: ClientConfig,
}

impl<N: NodeClient> ChainClient<N> {
    pub fn with_json_decoder(node: N, config: ClientConfig) -> Self {
        Self::new(node, JsonTxDecoder, config)
    }
}

impl<N: NodeClient, D: TxDecoder> ChainClient<N, D> {
    pub fn new(node: N, decoder: D, config: ClientConfig) -> Self {
        Self {
            node,
            decoder,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    /// Latest block height, refusing to answer while the node is still syncing.
    pub fn latest_height(&self, ctx: &QueryContext) -> Result<i64, Error> {
        let status = self.node.status(ctx)?;
        if status.catching_up {
            tracing::warn!(
                rpc_addr = %self.config.rpc_addr,
                chain_id = %self.config.chain_id,
                "node is catching up"
            );
            return Err(Error::NotSynced {
                rpc_addr: self.config.rpc_addr.clone(),
                chain_id: self.config.chain_id.clone(),
            });
        }
        Ok(status.latest_height)
    }

    /// Looks up one transaction by its hex hash.
    #[tracing::instrument(skip(self, ctx))]
    pub fn query_tx(&self, ctx: &QueryContext, hash_hex: &str) -> Result<TxResponse, Error> {
        let hash = hex::decode(hash_hex)
            .map_err(|e| Error::invalid(format!("tx hash {hash_hex:?} is not hex: {e}")))?;
        let raw = self.node.tx(ctx, &hash, true)?;
        let blocks = blocks_for(&self.node, ctx, std::slice::from_ref(&raw))?;
        let block = blocks.get(&raw.height).ok_or_else(|| Error::BlockFetch {
            height: raw.height,
            reason: "block not resolved for tx".into(),
        })?;
        make_tx_result(&self.decoder, &raw, block)
    }

    /// One page of transactions matching every event in `events`.
    #[tracing::instrument(skip(self, ctx, events), fields(events = events.len()))]
    pub fn txs_by_events(
        &self,
        ctx: &QueryContext,
        events: &[EventPredicate],
        page: usize,
        limit: usize,
        order_by: OrderBy,
    ) -> Result<SearchTxsResult, Error> {
        if events.is_empty() {
            return Err(Error::invalid("must declare at least one event to search"));
        }
        validate_page(page, limit)?;

        let query = render_query(&PredicateGroup(events.to_vec()));
        let result = search_page(&self.node, ctx, &query, page, limit, order_by.as_ref())?;
        let blocks = blocks_for(&self.node, ctx, &result.txs)?;
        let txs = format_tx_results(&self.decoder, &result.txs, &blocks)?;

        Ok(SearchTxsResult::new(
            result.total_count,
            page as u64,
            limit as u64,
            txs,
        ))
    }

    /// The account that submitted `proposal_id`.
    #[tracing::instrument(skip(self, ctx))]
    pub fn proposer(&self, ctx: &QueryContext, proposal_id: u64) -> Result<Proposer, Error> {
        let mut blocks = BlockTimeCache::new();
        self.find_first(ctx, ProposerExtractor { proposal_id }, &mut blocks, || {
            format!("failed to find the proposer for proposal {proposal_id}")
        })
    }

    /// The deposit submitted together with `proposal_id`.
    #[tracing::instrument(skip(self, ctx))]
    pub fn initial_deposit(&self, ctx: &QueryContext, proposal_id: u64) -> Result<Deposit, Error> {
        self.find_initial_deposit(ctx, proposal_id, &mut BlockTimeCache::new())
    }

    /// `voter`'s vote on `proposal_id`, plain or weighted.
    #[tracing::instrument(skip(self, ctx))]
    pub fn vote(&self, ctx: &QueryContext, proposal_id: u64, voter: &str) -> Result<Vote, Error> {
        let extractor = VoteExtractor {
            proposal_id,
            voter: Some(voter.to_string()),
        };
        self.find_first(ctx, extractor, &mut BlockTimeCache::new(), || {
            format!("address {voter:?} did not vote on proposal {proposal_id}")
        })
    }

    /// Page `page` (1-indexed) of `limit` votes on `proposal_id`.
    #[tracing::instrument(skip(self, ctx))]
    pub fn votes(
        &self,
        ctx: &QueryContext,
        proposal_id: u64,
        page: usize,
        limit: usize,
    ) -> Result<Vec<Vote>, Error> {
        validate_page(page, limit)?;
        let extractor = VoteExtractor {
            proposal_id,
            voter: None,
        };
        collect_page(self.stream(ctx, extractor), page, limit)
    }

    /// The first deposit `depositor` made on `proposal_id`: the initial deposit
    /// when they submitted it, otherwise their earliest `MsgDeposit`.
    #[tracing::instrument(skip(self, ctx))]
    pub fn deposit(
        &self,
        ctx: &QueryContext,
        proposal_id: u64,
        depositor: &str,
    ) -> Result<Deposit, Error> {
        let mut blocks = BlockTimeCache::new();
        if let Some(initial) = self.optional_initial_deposit(ctx, proposal_id, &mut blocks)?
            && initial.depositor == depositor
        {
            return Ok(initial);
        }

        let extractor = DepositExtractor {
            proposal_id,
            depositor: Some(depositor.to_string()),
        };
        self.find_first(ctx, extractor, &mut blocks, || {
            format!("address {depositor:?} did not deposit on proposal {proposal_id}")
        })
    }

    /// Page `page` (1-indexed) of `limit` deposits on `proposal_id`, the
    /// initial deposit first when it is non-zero.
    #[tracing::instrument(skip(self, ctx))]
    pub fn deposits(
        &self,
        ctx: &QueryContext,
        proposal_id: u64,
        page: usize,
        limit: usize,
    ) -> Result<Vec<Deposit>, Error> {
        validate_page(page, limit)?;
        let extractor = DepositExtractor {
            proposal_id,
            depositor: None,
        };
        let mut blocks = BlockTimeCache::new();
        let initial = self.optional_initial_deposit(ctx, proposal_id, &mut blocks)?;
        let mut stream = self.stream(ctx, extractor).with_blocks(blocks);
        if let Some(initial) = initial {
            stream.prepend(initial);
        }
        collect_page(stream, page, limit)
    }

    /// Balances of `address` with IBC voucher denoms expanded to their trace path.
    #[tracing::instrument(skip(self, ctx))]
    pub fn balance_with_denom_traces(
        &self,
        ctx: &QueryContext,
        address: &str,
    ) -> Result<Vec<Coin>, Error> {
        let coins = self
            .node
            .all_balances(ctx, address, PageRequest::with_limit(DEFAULT_PAGE_LIMIT))?;
        let height = self.latest_height(ctx)?;
        let traces = fetch_denom_traces(&self.node, ctx, height, self.config.denom_trace_limit)?;
        Ok(resolve_denom_traces(coins, &traces))
    }

    fn stream<'a, E: RecordExtractor>(
        &'a self,
        ctx: &'a QueryContext,
        extractor: E,
    ) -> RecordStream<'a, N, D, E> {
        RecordStream::new(
            &self.node,
            &self.decoder,
            ctx,
            extractor,
            self.config.index_page_size,
            self.config.order_by.as_ref(),
        )
    }

    /// First record of `extractor`, reading and extending `blocks` so later
    /// lookups of the same query skip heights already fetched.
    fn find_first<E: RecordExtractor>(
        &self,
        ctx: &QueryContext,
        extractor: E,
        blocks: &mut BlockTimeCache,
        not_found: impl FnOnce() -> String,
    ) -> Result<E::Record, Error> {
        let mut stream = self.stream(ctx, extractor).with_blocks(std::mem::take(blocks));
        let found = stream.first_match();
        *blocks = stream.into_blocks();
        found?.ok_or_else(|| Error::NotFound {
            reason: not_found(),
        })
    }

    fn find_initial_deposit(
        &self,
        ctx: &QueryContext,
        proposal_id: u64,
        blocks: &mut BlockTimeCache,
    ) -> Result<Deposit, Error> {
        self.find_first(ctx, InitialDepositExtractor { proposal_id }, blocks, || {
            format!("failed to find the initial deposit for proposal {proposal_id}")
        })
    }

    /// Initial deposit when the submission is indexed and non-zero.
    fn optional_initial_deposit(
        &self,
        ctx: &QueryContext,
        proposal_id: u64,
        blocks: &mut BlockTimeCache,
    ) -> Result<Option<Deposit>, Error> {
        match self.find_initial_deposit(ctx, proposal_id, blocks) {
            Ok(deposit) if !deposit.is_zero() => Ok(Some(deposit)),
            Ok(_) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
