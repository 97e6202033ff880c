#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod node;
pub mod query;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::ChainClient;
pub use config::{ClientConfig, DEFAULT_PAGE_LIMIT, DENOM_TRACE_LIMIT, INDEX_PAGE_SIZE, OrderBy};
pub use error::{DecodeError, Error};
pub use messages::decoder::JsonTxDecoder;
pub use messages::{DecodedTx, MsgKind, TxMsg, VoteOption, WeightedVoteOption};
pub use node::{NodeClient, QueryContext, TxDecoder};
pub use query::extract::{Deposit, Proposer, RecordExtractor, Vote};
pub use query::format::{SearchTxsResult, TxResponse};
pub use query::paginate::{RecordStream, collect_page, paginate};
pub use query::planner::{EventPredicate, Intent, PredicateGroup, parse_events, plan};
pub use types::{Block, Coin, DenomTrace, NodeStatus, PageRequest, RawTransaction, SearchPage};
