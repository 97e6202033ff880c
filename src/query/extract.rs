use serde::Serialize;

use crate::messages::{TxMsg, WeightedVoteOption};
use crate::query::format::TxResponse;
use crate::query::planner::Intent;
use crate::types::Coin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vote {
    pub proposal_id: u64,
    pub voter: String,
    pub options: Vec<WeightedVoteOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deposit {
    pub proposal_id: u64,
    pub depositor: String,
    pub amount: Vec<Coin>,
}

impl Deposit {
    pub fn is_zero(&self) -> bool {
        self.amount.iter().all(Coin::is_zero)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposer {
    pub proposal_id: u64,
    pub proposer: String,
}

/// Turns the messages of one intent into domain records.
///
/// `extract` sees every message of every matched transaction and returns
/// `None` for anything that is not a record of this intent.
pub trait RecordExtractor: Sync {
    type Record;

    fn intent(&self) -> Intent;

    fn extract(&self, msg: &TxMsg) -> Option<Self::Record>;
}

/// Single-result mode: the first matching message, in transaction order.
pub fn extract_first<E: RecordExtractor + ?Sized>(
    extractor: &E,
    txs: &[TxResponse],
) -> Option<E::Record> {
    txs.iter()
        .flat_map(|tx| tx.tx.messages())
        .find_map(|msg| extractor.extract(msg))
}

/// Multi-result mode: every matching message across all transactions.
pub fn extract_all<E: RecordExtractor + ?Sized>(extractor: &E, txs: &[TxResponse]) -> Vec<E::Record> {
    txs.iter()
        .flat_map(|tx| tx.tx.messages())
        .filter_map(|msg| extractor.extract(msg))
        .collect()
}

/// Plain and weighted votes on one proposal, optionally from one voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteExtractor {
    pub proposal_id: u64,
    pub voter: Option<String>,
}

impl RecordExtractor for VoteExtractor {
    type Record = Vote;

    fn intent(&self) -> Intent {
        match &self.voter {
            Some(voter) => Intent::Vote {
                proposal_id: self.proposal_id,
                voter: voter.clone(),
            },
            None => Intent::Votes {
                proposal_id: self.proposal_id,
            },
        }
    }

    fn extract(&self, msg: &TxMsg) -> Option<Vote> {
        let (proposal_id, voter, options) = match msg {
            TxMsg::Vote(vote) => (
                vote.proposal_id,
                &vote.voter,
                vec![WeightedVoteOption::full(vote.option)],
            ),
            TxMsg::VoteWeighted(vote) => (vote.proposal_id, &vote.voter, vote.options.clone()),
            TxMsg::SubmitProposal(_) | TxMsg::Deposit(_) | TxMsg::Unrecognized { .. } => {
                return None;
            }
        };
        if proposal_id != self.proposal_id || !matches_filter(self.voter.as_deref(), voter) {
            return None;
        }
        Some(Vote {
            proposal_id,
            voter: voter.clone(),
            options,
        })
    }
}

/// `MsgDeposit`s on one proposal, optionally from one depositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositExtractor {
    pub proposal_id: u64,
    pub depositor: Option<String>,
}

impl RecordExtractor for DepositExtractor {
    type Record = Deposit;

    fn intent(&self) -> Intent {
        match &self.depositor {
            Some(depositor) => Intent::Deposit {
                proposal_id: self.proposal_id,
                depositor: depositor.clone(),
            },
            None => Intent::Deposits {
                proposal_id: self.proposal_id,
            },
        }
    }

    fn extract(&self, msg: &TxMsg) -> Option<Deposit> {
        let TxMsg::Deposit(deposit) = msg else {
            return None;
        };
        if deposit.proposal_id != self.proposal_id
            || !matches_filter(self.depositor.as_deref(), &deposit.depositor)
        {
            return None;
        }
        Some(Deposit {
            proposal_id: deposit.proposal_id,
            depositor: deposit.depositor.clone(),
            amount: deposit.amount.clone(),
        })
    }
}

/// The account that submitted a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposerExtractor {
    pub proposal_id: u64,
}

impl RecordExtractor for ProposerExtractor {
    type Record = Proposer;

    fn intent(&self) -> Intent {
        Intent::SubmitProposal {
            proposal_id: self.proposal_id,
        }
    }

    // MsgSubmitProposal carries no id; the index query already pinned it.
    fn extract(&self, msg: &TxMsg) -> Option<Proposer> {
        match msg {
            TxMsg::SubmitProposal(submit) => Some(Proposer {
                proposal_id: self.proposal_id,
                proposer: submit.proposer.clone(),
            }),
            _ => None,
        }
    }
}

/// The deposit attached to the submission itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialDepositExtractor {
    pub proposal_id: u64,
}

impl RecordExtractor for InitialDepositExtractor {
    type Record = Deposit;

    fn intent(&self) -> Intent {
        Intent::SubmitProposal {
            proposal_id: self.proposal_id,
        }
    }

    fn extract(&self, msg: &TxMsg) -> Option<Deposit> {
        match msg {
            TxMsg::SubmitProposal(submit) => Some(Deposit {
                proposal_id: self.proposal_id,
                depositor: submit.proposer.clone(),
                amount: submit.initial_deposit.clone(),
            }),
            _ => None,
        }
    }
}

fn matches_filter(filter: Option<&str>, address: &str) -> bool {
    filter.is_none_or(|wanted| wanted == address)
}
