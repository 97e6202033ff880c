use crate::error::Error;
use crate::node::{NodeClient, QueryContext};
use crate::query::planner::PredicateGroup;
use crate::types::{RawTransaction, SearchPage};

pub const QUERY_CONJUNCTION: &str = " AND ";

/// Renders a group as the index query string, e.g.
/// `message.action='vote' AND proposal_vote.proposal_id='1'`.
pub fn render_query(group: &PredicateGroup) -> String {
    group
        .predicates()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(QUERY_CONJUNCTION)
}

/// Runs one `tx_search`, mapping any node failure to [`Error::Search`].
pub fn search_page<N: NodeClient + ?Sized>(
    node: &N,
    ctx: &QueryContext,
    query: &str,
    page: usize,
    per_page: usize,
    order_by: &str,
) -> Result<SearchPage, Error> {
    if page == 0 {
        return Err(Error::invalid("page must be greater than 0"));
    }
    if per_page == 0 {
        return Err(Error::invalid("limit must be greater than 0"));
    }
    ctx.check()?;

    let result = node
        .tx_search(ctx, query, true, page, per_page, order_by)
        .map_err(|e| match e {
            Error::Cancelled { .. } => e,
            other => Error::Search {
                query: query.to_string(),
                reason: other.to_string(),
            },
        })?;
    tracing::debug!(
        query,
        page,
        per_page,
        returned = result.txs.len(),
        total = result.total_count,
        "tx search"
    );
    Ok(result)
}

/// Searches every group at the same index page and concatenates the results:
/// group order first, index order within a group. Transactions matched by more
/// than one group appear once per group. The first failing group aborts the union.
pub fn search_union<N: NodeClient + ?Sized>(
    node: &N,
    ctx: &QueryContext,
    groups: &[PredicateGroup],
    page: usize,
    per_page: usize,
    order_by: &str,
) -> Result<Vec<RawTransaction>, Error> {
    if groups.is_empty() || groups.iter().any(PredicateGroup::is_empty) {
        return Err(Error::invalid("must declare at least one event to search"));
    }

    let mut txs = Vec::new();
    for group in groups {
        let query = render_query(group);
        let result = search_page(node, ctx, &query, page, per_page, order_by)?;
        txs.extend(result.txs);
    }
    Ok(txs)
}
