//! Transaction shapes as returned by an LCD `GetTx` endpoint.
//!
//! Only the fields the decoder touches are typed; everything else is kept
//! in `extra` maps so the output mirrors the input structure.

use crate::decode::ContractResponse;
use crate::decrypt::FailureKind;
use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// Attribute carrying the message index an event belongs to.
pub const MSG_INDEX_KEY: &str = "msg_index";

pub const MSG_INSTANTIATE_CONTRACT: &str = "/secret.compute.v1beta1.MsgInstantiateContract";
pub const MSG_EXECUTE_CONTRACT: &str = "/secret.compute.v1beta1.MsgExecuteContract";
pub const MSG_MIGRATE_CONTRACT: &str = "/secret.compute.v1beta1.MsgMigrateContract";

/// The transaction response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxResponse {
    #[serde(default)]
    pub txhash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    /// Aggregate response container, hex or base64.
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<TxLog>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub tx: Tx,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl TxResponse {
    /// Parse transaction JSON, unwrapping a `{ "tx_response": ... }` wrapper.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: JsonValue =
            serde_json::from_str(text).map_err(|e| Error::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: JsonValue) -> Result<Self> {
        if let Some(inner) = value.get_mut("tx_response") {
            value = inner.take();
        }
        if !value.is_object() {
            return Err(Error::InvalidJson("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| Error::InvalidJson(e.to_string()))
    }

    pub fn messages(&self) -> &[Message] {
        &self.tx.body.messages
    }
}

/// Signed transaction body wrapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tx {
    #[serde(default)]
    pub body: TxBody,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxBody {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// One message: a type URL plus type-specific fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "@type", default)]
    pub type_url: String,
    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
}

impl Message {
    pub fn new(type_url: &str, fields: Map<String, JsonValue>) -> Self {
        Message {
            type_url: type_url.to_string(),
            fields,
        }
    }

    /// Name of the field holding this message's encrypted input, if any.
    pub fn confidential_field(&self) -> Option<&'static str> {
        confidential_field(&self.type_url)
    }

    /// Still-encoded input blob, if the message has one and it is a string.
    pub fn encrypted_input(&self) -> Option<&str> {
        self.fields.get(self.confidential_field()?)?.as_str()
    }

    /// The contract call payload (decrypted JSON or the original string).
    pub fn payload(&self) -> Option<&JsonValue> {
        self.fields.get(self.confidential_field()?)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// Native coins attached to the call.
    pub fn funds(&self) -> Vec<Coin> {
        ["sent_funds", "init_funds", "funds"]
            .iter()
            .find_map(|name| self.fields.get(*name))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

/// Type URL → confidential input field.
pub fn confidential_field(type_url: &str) -> Option<&'static str> {
    match type_url {
        MSG_INSTANTIATE_CONTRACT => Some("init_msg"),
        MSG_EXECUTE_CONTRACT | MSG_MIGRATE_CONTRACT => Some("msg"),
        _ => None,
    }
}

/// A native coin amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// Legacy per-message log entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxLog {
    #[serde(default)]
    pub msg_index: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// A flat event-log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    /// Message index from the `msg_index` attribute.
    ///
    /// Non-canonical values (leading zeros, signs, whitespace) are ignored.
    pub fn msg_index(&self) -> Option<usize> {
        self.attributes
            .iter()
            .find(|a| a.key == MSG_INDEX_KEY)
            .and_then(|a| parse_msg_index(&a.value))
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub index: bool,
}

impl EventAttribute {
    pub fn new(key: &str, value: &str) -> Self {
        EventAttribute {
            key: key.to_string(),
            value: value.to_string(),
            index: false,
        }
    }
}

/// Parse a stringified message index, accepting canonical decimal only.
pub fn parse_msg_index(s: &str) -> Option<usize> {
    let index: usize = s.parse().ok()?;
    (index.to_string() == s).then_some(index)
}

/// Per-message decryption status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageStatus {
    pub index: usize,
    pub type_url: String,
    /// Whether the message type carries an encrypted input at all.
    pub confidential: bool,
    /// Whether the input was opened.
    pub decrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One per-message response slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MsgResponse {
    pub index: usize,
    pub type_url: String,
    /// New contract address for instantiate responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Decrypted payload when `decrypted`, otherwise the slot as received.
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
    pub decrypted: bool,
    /// Decrypted payload parsed as JSON, when it is JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonValue>,
}

impl MsgResponse {
    pub(crate) fn opaque(index: usize, type_url: String, data: Vec<u8>) -> Self {
        MsgResponse {
            index,
            type_url,
            address: None,
            data,
            decrypted: false,
            json: None,
        }
    }

    pub(crate) fn with_address(mut self, response: &ContractResponse) -> Self {
        if let ContractResponse::Instantiate { address, .. } = response {
            self.address = Some(address.clone());
        }
        self
    }
}

fn serialize_base64<T, S>(bytes: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
}

/// A transaction with every openable field replaced in place.
#[derive(Debug, Clone, Serialize)]
pub struct DecryptedTransaction {
    /// The transaction skeleton; inputs, event attributes and raw log are
    /// rewritten in place where decryption succeeded.
    pub tx: TxResponse,
    pub messages: Vec<MessageStatus>,
    pub responses: Vec<MsgResponse>,
    /// True when at least one message input was opened.
    pub decrypted: bool,
}

impl DecryptedTransaction {
    /// Flattened event list.
    pub fn events(&self) -> &[Event] {
        &self.tx.events
    }

    pub fn raw_log(&self) -> &str {
        &self.tx.raw_log
    }

    /// True when at least one confidential message exists but none could be
    /// opened because no capability was supplied.
    pub fn needs_capability(&self) -> bool {
        !self.decrypted
            && self
                .messages
                .iter()
                .any(|m| m.failure == Some(FailureKind::CapabilityUnavailable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_msg_index_canonical_only() {
        assert_eq!(parse_msg_index("0"), Some(0));
        assert_eq!(parse_msg_index("12"), Some(12));
        assert_eq!(parse_msg_index("01"), None);
        assert_eq!(parse_msg_index("+1"), None);
        assert_eq!(parse_msg_index(" 1"), None);
        assert_eq!(parse_msg_index("-1"), None);
        assert_eq!(parse_msg_index("99999999999999999999999"), None);
    }

    #[test]
    fn test_confidential_field_map() {
        assert_eq!(confidential_field(MSG_INSTANTIATE_CONTRACT), Some("init_msg"));
        assert_eq!(confidential_field(MSG_EXECUTE_CONTRACT), Some("msg"));
        assert_eq!(confidential_field(MSG_MIGRATE_CONTRACT), Some("msg"));
        assert_eq!(confidential_field("/cosmos.bank.v1beta1.MsgSend"), None);
    }

    #[test]
    fn test_from_json_unwraps_tx_response() {
        let text = r#"{"tx_response": {"txhash": "AB", "code": 0, "tx": {"body": {"messages": [
            {"@type": "/cosmos.bank.v1beta1.MsgSend", "from_address": "a"}
        ]}}}}"#;
        let tx = TxResponse::from_json(text).unwrap();
        assert_eq!(tx.txhash, "AB");
        assert_eq!(tx.messages().len(), 1);
        assert_eq!(tx.messages()[0].str_field("from_address"), Some("a"));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let text = r#"{"txhash": "AB", "height": "42", "gas_used": "100", "tx": {"@type": "/cosmos.tx.v1beta1.Tx", "body": {"messages": [], "memo": "hi"}}}"#;
        let tx = TxResponse::from_json(text).unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["height"], "42");
        assert_eq!(json["tx"]["@type"], "/cosmos.tx.v1beta1.Tx");
        assert_eq!(json["tx"]["body"]["memo"], "hi");
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(matches!(
            TxResponse::from_json("[1, 2]"),
            Err(Error::InvalidJson(_))
        ));
        assert!(matches!(
            TxResponse::from_json("not json"),
            Err(Error::InvalidJson(_))
        ));
    }

    #[test]
    fn test_event_msg_index() {
        let event = Event {
            kind: "wasm".to_string(),
            attributes: vec![
                EventAttribute::new("contract_address", "secret1x"),
                EventAttribute::new(MSG_INDEX_KEY, "1"),
            ],
        };
        assert_eq!(event.msg_index(), Some(1));
        assert_eq!(event.attribute("contract_address"), Some("secret1x"));
    }

    #[test]
    fn test_message_funds() {
        let fields = serde_json::json!({
            "sender": "secret1s",
            "sent_funds": [{"denom": "uscrt", "amount": "10"}]
        });
        let msg = Message::new(MSG_EXECUTE_CONTRACT, fields.as_object().unwrap().clone());
        assert_eq!(
            msg.funds(),
            vec![Coin {
                denom: "uscrt".to_string(),
                amount: "10".to_string()
            }]
        );
    }
}
