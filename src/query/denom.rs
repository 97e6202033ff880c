use crate::error::Error;
use crate::node::{NodeClient, QueryContext};
use crate::types::{Coin, DenomTrace, PageRequest};

/// Fetches the trace directory as of `height`, capped at `limit` entries.
pub fn fetch_denom_traces<N: NodeClient + ?Sized>(
    node: &N,
    ctx: &QueryContext,
    height: i64,
    limit: u64,
) -> Result<Vec<DenomTrace>, Error> {
    let traces = node.denom_traces(ctx, PageRequest::with_limit(limit), height)?;
    tracing::debug!(height, traces = traces.len(), "fetched denom traces");
    Ok(traces)
}

/// Rewrites IBC voucher denoms to their full transfer path. Zero-amount coins
/// are dropped; coins with no matching trace pass through unchanged.
pub fn resolve_denom_traces(coins: Vec<Coin>, traces: &[DenomTrace]) -> Vec<Coin> {
    coins
        .into_iter()
        .filter(|coin| !coin.is_zero())
        .map(|coin| {
            match traces.iter().find(|trace| trace.ibc_denom() == coin.denom) {
                Some(trace) => Coin {
                    denom: trace.full_denom_path(),
                    amount: coin.amount,
                },
                None => coin,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom_trace() -> DenomTrace {
        DenomTrace {
            path: "transfer/channel-0".to_string(),
            base_denom: "uatom".to_string(),
        }
    }

    #[test]
    fn voucher_denom_becomes_full_path() {
        let trace = atom_trace();
        let coins = vec![Coin::new(trace.ibc_denom(), 10)];

        assert_eq!(
            resolve_denom_traces(coins, &[trace]),
            vec![Coin::new("transfer/channel-0/uatom", 10)]
        );
    }

    #[test]
    fn zero_amounts_dropped_even_when_traced() {
        let trace = atom_trace();
        let coins = vec![
            Coin::new(trace.ibc_denom(), 0),
            Coin::new("uosmo", 0),
            Coin::new("uosmo", 3),
        ];

        assert_eq!(
            resolve_denom_traces(coins, &[trace]),
            vec![Coin::new("uosmo", 3)]
        );
    }

    #[test]
    fn unmatched_coins_pass_through_in_order() {
        let coins = vec![
            Coin::new("ibc/FFFF", 1),
            Coin::new("uatom", 2),
        ];
        assert_eq!(resolve_denom_traces(coins.clone(), &[atom_trace()]), coins);
        assert_eq!(resolve_denom_traces(coins.clone(), &[]), coins);
    }
}
