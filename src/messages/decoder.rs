use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::messages::{DecodedTx, LEGACY_STD_TX_NAME, MsgKind, TX_TYPE_URL, TxMsg};
use crate::node::TxDecoder;

/// Decodes JSON-encoded transactions.
///
/// Two shapes are understood:
/// - protobuf JSON: `{"body": {"messages": [{"@type": "/cosmos.gov.v1beta1.MsgVote", ...}]}, ...}`
/// - legacy amino JSON: `{"type": "cosmos-sdk/StdTx", "value": {"msg": [{"type": "cosmos-sdk/MsgVote", "value": {...}}]}}`,
///   with or without the outer `type`/`value` wrapper.
///
/// Messages outside the governance set decode to [`TxMsg::Unrecognized`]; a
/// known message with malformed fields fails the whole transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTxDecoder;

impl TxDecoder for JsonTxDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedTx, DecodeError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| DecodeError::new(format!("tx is not valid JSON: {e}")))?;
        let Value::Object(mut root) = value else {
            return Err(DecodeError::new("tx is not a JSON object"));
        };

        if let Some(messages) = root
            .get("body")
            .and_then(|b| b.get("messages"))
            .and_then(Value::as_array)
        {
            let messages = decode_messages(messages)?;
            return Ok(DecodedTx::new(TX_TYPE_URL, root, messages));
        }

        if root.get("type").and_then(Value::as_str) == Some(LEGACY_STD_TX_NAME) {
            root = match root.remove("value") {
                Some(Value::Object(inner)) => inner,
                _ => return Err(DecodeError::new("legacy tx has no value object")),
            };
        }
        if let Some(messages) = root.get("msg").and_then(Value::as_array) {
            let messages = decode_messages(messages)?;
            return Ok(DecodedTx::new(LEGACY_STD_TX_NAME, root, messages));
        }

        Err(DecodeError::new("unsupported tx encoding: no message list"))
    }
}

fn decode_messages(raw: &[Value]) -> Result<Vec<TxMsg>, DecodeError> {
    raw.iter()
        .enumerate()
        .map(|(index, msg)| {
            decode_message(msg).map_err(|e| DecodeError::new(format!("message {index}: {}", e.0)))
        })
        .collect()
}

fn decode_message(msg: &Value) -> Result<TxMsg, DecodeError> {
    // protobuf JSON: fields sit next to "@type"
    if let Some(type_url) = msg.get("@type").and_then(Value::as_str) {
        return match MsgKind::from_type_url(type_url) {
            Some(kind) => typed_message(kind, msg),
            None => Ok(TxMsg::Unrecognized {
                type_url: type_url.to_string(),
            }),
        };
    }

    // amino JSON: {"type": name, "value": {...}}
    if let Some(name) = msg.get("type").and_then(Value::as_str) {
        let value = msg.get("value").unwrap_or(&Value::Null);
        return match MsgKind::from_amino_name(name) {
            Some(kind) => typed_message(kind, value),
            None => Ok(TxMsg::Unrecognized {
                type_url: name.to_string(),
            }),
        };
    }

    Err(DecodeError::new("message carries neither @type nor type"))
}

fn typed_message(kind: MsgKind, fields: &Value) -> Result<TxMsg, DecodeError> {
    match kind {
        MsgKind::SubmitProposal => parse_fields(kind, fields).map(TxMsg::SubmitProposal),
        MsgKind::Vote => parse_fields(kind, fields).map(TxMsg::Vote),
        MsgKind::VoteWeighted => parse_fields(kind, fields).map(TxMsg::VoteWeighted),
        MsgKind::Deposit => parse_fields(kind, fields).map(TxMsg::Deposit),
    }
}

fn parse_fields<T: DeserializeOwned>(kind: MsgKind, fields: &Value) -> Result<T, DecodeError> {
    let mut fields: Map<String, Value> = match fields {
        Value::Object(map) => map.clone(),
        _ => return Err(DecodeError::new(format!("{kind:?} fields are not an object"))),
    };
    fields.remove("@type");
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| DecodeError::new(format!("failed to parse {}: {e}", kind.type_url())))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::messages::{VoteOption, WeightedVoteOption};
    use crate::types::Coin;

    fn decode(value: &Value) -> Result<DecodedTx, DecodeError> {
        JsonTxDecoder.decode(&serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn decodes_protobuf_json_messages_in_order() {
        let tx = decode(&serde_json::json!({
            "body": {
                "messages": [
                    {
                        "@type": "/cosmos.gov.v1beta1.MsgVote",
                        "proposal_id": "42",
                        "voter": "cosmos1voter",
                        "option": "VOTE_OPTION_YES"
                    },
                    {
                        "@type": "/cosmos.bank.v1beta1.MsgSend",
                        "from_address": "a", "to_address": "b", "amount": []
                    },
                    {
                        "@type": "/cosmos.gov.v1beta1.MsgDeposit",
                        "proposal_id": "42",
                        "depositor": "cosmos1dep",
                        "amount": [{ "denom": "uatom", "amount": "500" }]
                    }
                ],
                "memo": ""
            },
            "auth_info": {},
            "signatures": []
        }))
        .unwrap();

        assert_eq!(tx.as_any().type_url, TX_TYPE_URL);
        let msgs = tx.messages();
        assert_eq!(msgs.len(), 3);
        let TxMsg::Vote(vote) = &msgs[0] else {
            unreachable!("expected vote, got {:?}", msgs[0]);
        };
        assert_eq!(vote.proposal_id, 42);
        assert_eq!(vote.option, VoteOption::Yes);
        assert_eq!(
            msgs[1],
            TxMsg::Unrecognized {
                type_url: "/cosmos.bank.v1beta1.MsgSend".to_string()
            }
        );
        let TxMsg::Deposit(deposit) = &msgs[2] else {
            unreachable!("expected deposit, got {:?}", msgs[2]);
        };
        assert_eq!(deposit.amount, vec![Coin::new("uatom", 500)]);
    }

    #[test]
    fn decodes_legacy_amino_std_tx() {
        let tx = decode(&serde_json::json!({
            "type": "cosmos-sdk/StdTx",
            "value": {
                "msg": [{
                    "type": "cosmos-sdk/MsgVoteWeighted",
                    "value": {
                        "proposal_id": 7,
                        "voter": "cosmos1voter",
                        "options": [
                            { "option": 1, "weight": "0.7" },
                            { "option": 3, "weight": "0.3" }
                        ]
                    }
                }],
                "memo": "split"
            }
        }))
        .unwrap();

        assert_eq!(tx.as_any().type_url, LEGACY_STD_TX_NAME);
        assert_eq!(tx.as_any().value["memo"], "split");
        let TxMsg::VoteWeighted(weighted) = &tx.messages()[0] else {
            unreachable!("expected weighted vote");
        };
        assert_eq!(
            weighted.options,
            vec![
                WeightedVoteOption::new(VoteOption::Yes, "0.7").unwrap(),
                WeightedVoteOption::new(VoteOption::No, "0.3").unwrap(),
            ]
        );
    }

    #[test]
    fn decodes_bare_legacy_msg_list() {
        let tx = decode(&serde_json::json!({
            "msg": [{
                "type": "cosmos-sdk/MsgSubmitProposal",
                "value": {
                    "content": { "type": "cosmos-sdk/TextProposal", "value": { "title": "t" } },
                    "initial_deposit": [{ "denom": "uatom", "amount": "10" }],
                    "proposer": "cosmos1prop"
                }
            }]
        }))
        .unwrap();
        let TxMsg::SubmitProposal(submit) = &tx.messages()[0] else {
            unreachable!("expected submit proposal");
        };
        assert_eq!(submit.proposer, "cosmos1prop");
        assert_eq!(submit.initial_deposit, vec![Coin::new("uatom", 10)]);
    }

    #[test]
    fn malformed_known_message_fails_the_tx() {
        let result = decode(&serde_json::json!({
            "body": { "messages": [{
                "@type": "/cosmos.gov.v1beta1.MsgVote",
                "proposal_id": "not-a-number",
                "voter": "v",
                "option": "VOTE_OPTION_YES"
            }]}
        }));
        let err = result.unwrap_err();
        assert!(err.0.starts_with("message 0:"), "{}", err.0);
    }

    #[test]
    fn rejects_non_json_and_unknown_shapes() {
        assert!(JsonTxDecoder.decode(b"\x0a\x02\x08\x01").is_err());
        assert!(decode(&serde_json::json!([1, 2, 3])).is_err());
        assert!(decode(&serde_json::json!({ "body": { "memo": "" } })).is_err());
        assert!(decode(&serde_json::json!({ "msg": [{ "value": {} }] })).is_err());
    }
}
