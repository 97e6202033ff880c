pub mod decoder;

use serde::{Deserialize, Serialize};

use crate::types::Coin;

pub const EVENT_TYPE_MESSAGE: &str = "message";
pub const ATTRIBUTE_KEY_ACTION: &str = "action";
pub const ATTRIBUTE_KEY_SENDER: &str = "sender";

pub const EVENT_TYPE_SUBMIT_PROPOSAL: &str = "submit_proposal";
pub const EVENT_TYPE_PROPOSAL_VOTE: &str = "proposal_vote";
pub const EVENT_TYPE_PROPOSAL_DEPOSIT: &str = "proposal_deposit";
pub const ATTRIBUTE_KEY_PROPOSAL_ID: &str = "proposal_id";

pub const TX_HEIGHT_KEY: &str = "tx.height";

pub const MSG_SUBMIT_PROPOSAL_TYPE_URL: &str = "/cosmos.gov.v1beta1.MsgSubmitProposal";
pub const MSG_VOTE_TYPE_URL: &str = "/cosmos.gov.v1beta1.MsgVote";
pub const MSG_VOTE_WEIGHTED_TYPE_URL: &str = "/cosmos.gov.v1beta1.MsgVoteWeighted";
pub const MSG_DEPOSIT_TYPE_URL: &str = "/cosmos.gov.v1beta1.MsgDeposit";

pub const TX_TYPE_URL: &str = "/cosmos.tx.v1beta1.Tx";
pub const LEGACY_STD_TX_NAME: &str = "cosmos-sdk/StdTx";

/// 18 fractional digits, matching the ledger's fixed-point decimal.
pub const DEC_PRECISION: usize = 18;

/// Governance messages the engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MsgKind {
    SubmitProposal,
    Vote,
    VoteWeighted,
    Deposit,
}

impl MsgKind {
    pub fn from_type_url(type_url: &str) -> Option<Self> {
        match type_url {
            MSG_SUBMIT_PROPOSAL_TYPE_URL => Some(Self::SubmitProposal),
            MSG_VOTE_TYPE_URL => Some(Self::Vote),
            MSG_VOTE_WEIGHTED_TYPE_URL => Some(Self::VoteWeighted),
            MSG_DEPOSIT_TYPE_URL => Some(Self::Deposit),
            _ => None,
        }
    }

    pub fn from_amino_name(name: &str) -> Option<Self> {
        match name {
            "cosmos-sdk/MsgSubmitProposal" => Some(Self::SubmitProposal),
            "cosmos-sdk/MsgVote" => Some(Self::Vote),
            "cosmos-sdk/MsgVoteWeighted" => Some(Self::VoteWeighted),
            "cosmos-sdk/MsgDeposit" => Some(Self::Deposit),
            _ => None,
        }
    }

    pub fn type_url(self) -> &'static str {
        match self {
            Self::SubmitProposal => MSG_SUBMIT_PROPOSAL_TYPE_URL,
            Self::Vote => MSG_VOTE_TYPE_URL,
            Self::VoteWeighted => MSG_VOTE_WEIGHTED_TYPE_URL,
            Self::Deposit => MSG_DEPOSIT_TYPE_URL,
        }
    }

    /// `message.action` value emitted by pre-protobuf (legacy amino) handlers.
    pub fn legacy_action(self) -> &'static str {
        match self {
            Self::SubmitProposal => "submit_proposal",
            Self::Vote => "vote",
            Self::VoteWeighted => "weighted_vote",
            Self::Deposit => "deposit",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum VoteOption {
    #[strum(to_string = "VOTE_OPTION_UNSPECIFIED", serialize = "unspecified")]
    Unspecified,
    #[strum(to_string = "VOTE_OPTION_YES", serialize = "yes")]
    Yes,
    #[strum(to_string = "VOTE_OPTION_ABSTAIN", serialize = "abstain")]
    Abstain,
    #[strum(to_string = "VOTE_OPTION_NO", serialize = "no")]
    No,
    #[strum(to_string = "VOTE_OPTION_NO_WITH_VETO", serialize = "no_with_veto")]
    NoWithVeto,
}

impl VoteOption {
    /// Numeric enum value used by legacy amino JSON.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Yes),
            2 => Some(Self::Abstain),
            3 => Some(Self::No),
            4 => Some(Self::NoWithVeto),
            _ => None,
        }
    }
}

impl Serialize for VoteOption {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

impl<'de> Deserialize<'de> for VoteOption {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Code(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Name(name) => name
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("unknown vote option: {name}"))),
            Repr::Code(code) => Self::from_code(code)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown vote option: {code}"))),
        }
    }
}

/// A vote option with its share of the voter's power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWeightedVoteOption")]
pub struct WeightedVoteOption {
    pub option: VoteOption,
    /// Normalised decimal, always with [`DEC_PRECISION`] fractional digits.
    pub weight: String,
}

impl WeightedVoteOption {
    pub fn new(option: VoteOption, weight: &str) -> Result<Self, String> {
        Ok(Self {
            option,
            weight: normalize_weight(weight)?,
        })
    }

    /// The option a plain (non-split) vote carries.
    pub fn full(option: VoteOption) -> Self {
        Self {
            option,
            weight: format!("1.{}", "0".repeat(DEC_PRECISION)),
        }
    }
}

#[derive(Deserialize)]
struct RawWeightedVoteOption {
    option: VoteOption,
    weight: String,
}

impl TryFrom<RawWeightedVoteOption> for WeightedVoteOption {
    type Error = String;

    fn try_from(raw: RawWeightedVoteOption) -> Result<Self, Self::Error> {
        Self::new(raw.option, &raw.weight)
    }
}

/// Rewrites a non-negative decimal string into fixed 18-digit form, so `"1"`,
/// `"1.0"` and `"1.000000000000000000"` compare equal.
pub fn normalize_weight(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(format!("invalid decimal weight: {raw:?}"));
    }
    if frac_part.len() > DEC_PRECISION {
        return Err(format!(
            "weight {raw:?} exceeds {DEC_PRECISION} decimal places"
        ));
    }

    let int_part = int_part.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    Ok(format!("{int_part}.{frac_part:0<DEC_PRECISION$}"))
}

/// Proposal ids are `uint64` and travel as strings in protobuf JSON.
pub(crate) mod proposal_id {
    use serde::{Deserialize, Deserializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(de::Error::custom),
            Repr::Number(n) => Ok(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MsgVote {
    #[serde(with = "proposal_id")]
    pub proposal_id: u64,
    pub voter: String,
    pub option: VoteOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MsgVoteWeighted {
    #[serde(with = "proposal_id")]
    pub proposal_id: u64,
    pub voter: String,
    pub options: Vec<WeightedVoteOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MsgDeposit {
    #[serde(with = "proposal_id")]
    pub proposal_id: u64,
    pub depositor: String,
    #[serde(default)]
    pub amount: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MsgSubmitProposal {
    /// Proposal content; not interpreted.
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub initial_deposit: Vec<Coin>,
    pub proposer: String,
}

/// One message of a decoded transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TxMsg {
    SubmitProposal(MsgSubmitProposal),
    Vote(MsgVote),
    VoteWeighted(MsgVoteWeighted),
    Deposit(MsgDeposit),
    /// Any message outside the governance set, kept by its type URL or amino name.
    Unrecognized { type_url: String },
}

/// `google.protobuf.Any`-style JSON envelope: `{"@type": ..., ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnyTx {
    #[serde(rename = "@type")]
    pub type_url: String,
    #[serde(flatten)]
    pub value: serde_json::Map<String, serde_json::Value>,
}

/// A transaction after decoding: its messages in order plus the body it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "AnyTx")]
pub struct DecodedTx {
    type_url: String,
    body: serde_json::Map<String, serde_json::Value>,
    messages: Vec<TxMsg>,
}

impl DecodedTx {
    pub fn new(
        type_url: impl Into<String>,
        body: serde_json::Map<String, serde_json::Value>,
        messages: Vec<TxMsg>,
    ) -> Self {
        Self {
            type_url: type_url.into(),
            body,
            messages,
        }
    }

    pub fn messages(&self) -> &[TxMsg] {
        &self.messages
    }

    pub fn as_any(&self) -> AnyTx {
        AnyTx {
            type_url: self.type_url.clone(),
            value: self.body.clone(),
        }
    }
}

impl From<DecodedTx> for AnyTx {
    fn from(tx: DecodedTx) -> Self {
        AnyTx {
            type_url: tx.type_url,
            value: tx.body,
        }
    }
}
