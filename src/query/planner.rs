use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::messages::{
    ATTRIBUTE_KEY_ACTION, ATTRIBUTE_KEY_PROPOSAL_ID, ATTRIBUTE_KEY_SENDER,
    EVENT_TYPE_MESSAGE, EVENT_TYPE_PROPOSAL_DEPOSIT, EVENT_TYPE_PROPOSAL_VOTE,
    EVENT_TYPE_SUBMIT_PROPOSAL, MsgKind, TX_HEIGHT_KEY,
};

/// One `{type}.{attribute}='{value}'` clause of a tx-index query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPredicate {
    pub event_type: String,
    pub attribute: String,
    pub value: String,
}

impl EventPredicate {
    pub fn new(
        event_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn height(height: i64) -> Self {
        Self::new("tx", "height", height.to_string())
    }

    fn key(&self) -> String {
        format!("{}.{}", self.event_type, self.attribute)
    }
}

impl fmt::Display for EventPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key();
        if key == TX_HEIGHT_KEY {
            write!(f, "{key}={}", self.value)
        } else {
            write!(f, "{key}='{}'", self.value)
        }
    }
}

impl FromStr for EventPredicate {
    type Err = Error;

    /// Parses `type.attribute=value`, with or without single quotes around the value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.matches('=').count() != 1 {
            return Err(Error::invalid(format!(
                "event {s:?} should be of the form {{eventType}}.{{eventAttribute}}={{value}}"
            )));
        }
        let Some((key, value)) = s.split_once('=') else {
            return Err(Error::invalid(format!("event {s:?} has no value")));
        };
        let Some((event_type, attribute)) = key.trim().split_once('.') else {
            return Err(Error::invalid(format!(
                "event key {key:?} should be {{eventType}}.{{eventAttribute}}"
            )));
        };
        let value = value.trim();
        let value = value
            .strip_prefix('\'')
            .and_then(|v| v.strip_suffix('\''))
            .unwrap_or(value);
        if event_type.is_empty() || attribute.is_empty() || value.is_empty() {
            return Err(Error::invalid(format!("event {s:?} has an empty component")));
        }
        Ok(Self::new(event_type, attribute, value))
    }
}

/// Parses an `&`-separated event list such as `message.sender=cosmos1...&tx.height=5`.
pub fn parse_events(raw: &str) -> Result<Vec<EventPredicate>, Error> {
    let raw = raw.trim().trim_matches('\'');
    if raw.is_empty() {
        return Err(Error::invalid("must declare at least one event to search"));
    }
    raw.split('&').map(str::parse).collect()
}

/// Predicates ANDed together into one index query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateGroup(pub Vec<EventPredicate>);

impl PredicateGroup {
    pub fn predicates(&self) -> &[EventPredicate] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<EventPredicate>> for PredicateGroup {
    fn from(predicates: Vec<EventPredicate>) -> Self {
        Self(predicates)
    }
}

/// What the caller wants reconstructed from the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Votes { proposal_id: u64 },
    Vote { proposal_id: u64, voter: String },
    Deposits { proposal_id: u64 },
    Deposit { proposal_id: u64, depositor: String },
    /// The submission tx: source of both the proposer and the initial deposit.
    SubmitProposal { proposal_id: u64 },
}

/// Builds one predicate group per historical encoding of the intent's messages,
/// legacy action names before protobuf type URLs.
pub fn plan(intent: &Intent) -> Vec<PredicateGroup> {
    match intent {
        Intent::Votes { proposal_id } => vote_groups(*proposal_id, None),
        Intent::Vote { proposal_id, voter } => vote_groups(*proposal_id, Some(voter.as_str())),
        Intent::Deposits { proposal_id } => {
            groups_for(MsgKind::Deposit, EVENT_TYPE_PROPOSAL_DEPOSIT, *proposal_id, None)
        }
        Intent::Deposit {
            proposal_id,
            depositor,
        } => groups_for(
            MsgKind::Deposit,
            EVENT_TYPE_PROPOSAL_DEPOSIT,
            *proposal_id,
            Some(depositor.as_str()),
        ),
        Intent::SubmitProposal { proposal_id } => groups_for(
            MsgKind::SubmitProposal,
            EVENT_TYPE_SUBMIT_PROPOSAL,
            *proposal_id,
            None,
        ),
    }
}

fn vote_groups(proposal_id: u64, voter: Option<&str>) -> Vec<PredicateGroup> {
    let mut groups = groups_for(MsgKind::Vote, EVENT_TYPE_PROPOSAL_VOTE, proposal_id, voter);
    groups.extend(groups_for(
        MsgKind::VoteWeighted,
        EVENT_TYPE_PROPOSAL_VOTE,
        proposal_id,
        voter,
    ));
    groups
}

fn groups_for(
    kind: MsgKind,
    proposal_event: &str,
    proposal_id: u64,
    sender: Option<&str>,
) -> Vec<PredicateGroup> {
    [kind.legacy_action(), kind.type_url()]
        .into_iter()
        .map(|action| {
            let mut predicates = vec![
                EventPredicate::new(EVENT_TYPE_MESSAGE, ATTRIBUTE_KEY_ACTION, action),
                EventPredicate::new(
                    proposal_event,
                    ATTRIBUTE_KEY_PROPOSAL_ID,
                    proposal_id.to_string(),
                ),
            ];
            if let Some(sender) = sender {
                predicates.push(EventPredicate::new(
                    EVENT_TYPE_MESSAGE,
                    ATTRIBUTE_KEY_SENDER,
                    sender,
                ));
            }
            PredicateGroup(predicates)
        })
        .collect()
}
