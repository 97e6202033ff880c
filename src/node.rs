use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{DecodeError, Error};
use crate::messages::DecodedTx;
use crate::types::{Block, Coin, DenomTrace, NodeStatus, PageRequest, RawTransaction, SearchPage};

/// Blocking RPC surface of a ledger node.
///
/// Implementations own their transport and must be shareable across threads.
/// Errors are returned as [`Error::Node`]; the engine re-wraps them where the
/// failing operation matters (search vs. block fetch).
pub trait NodeClient: Send + Sync {
    fn status(&self, ctx: &QueryContext) -> Result<NodeStatus, Error>;

    fn block(&self, ctx: &QueryContext, height: i64) -> Result<Block, Error>;

    fn tx(&self, ctx: &QueryContext, hash: &[u8], prove: bool) -> Result<RawTransaction, Error>;

    /// `query` is a conjunction of `{type}.{attr}='{value}'` clauses joined by `" AND "`.
    fn tx_search(
        &self,
        ctx: &QueryContext,
        query: &str,
        prove: bool,
        page: usize,
        per_page: usize,
        order_by: &str,
    ) -> Result<SearchPage, Error>;

    fn denom_traces(
        &self,
        ctx: &QueryContext,
        page: PageRequest,
        height: i64,
    ) -> Result<Vec<DenomTrace>, Error>;

    fn all_balances(
        &self,
        ctx: &QueryContext,
        address: &str,
        page: PageRequest,
    ) -> Result<Vec<Coin>, Error>;
}

/// Turns signed transaction bytes into typed messages.
pub trait TxDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedTx, DecodeError>;
}

/// Cancellation handle threaded through every node call of one logical query.
///
/// Clones share the same flag, so a caller can keep one clone and cancel the
/// query from another thread.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns [`Error::Cancelled`] once the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), Error> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(Error::Cancelled {
                reason: "cancelled by caller".into(),
            });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::Cancelled {
                reason: "deadline exceeded".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let ctx = QueryContext::new();
        let held = ctx.clone();
        assert!(ctx.check().is_ok());

        held.cancel();
        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.check(), Err(Error::Cancelled { .. })));
    }

    #[test]
    fn elapsed_deadline_cancels() {
        let ctx = QueryContext::with_timeout(Duration::ZERO);
        assert!(ctx.is_cancelled());
        assert!(matches!(
            ctx.check(),
            Err(Error::Cancelled { reason }) if reason == "deadline exceeded"
        ));
    }

    #[test]
    fn generous_deadline_does_not_cancel() {
        let ctx = QueryContext::with_timeout(Duration::from_secs(3600));
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_some());
    }

    #[test]
    fn unrepresentable_timeout_means_no_deadline() {
        let ctx = QueryContext::with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert!(ctx.check().is_ok());
    }
}
