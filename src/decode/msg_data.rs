//! Aggregate response container (`TxMsgData`) codec.
//!
//! The transaction `data` field holds a protobuf `TxMsgData`:
//!
//! - field 2: `repeated Any msg_responses` (`type_url = 1`, `value = 2`)
//! - field 1: `repeated MsgData data` (legacy; `msg_type = 1`, `data = 2`)
//!
//! Each slot's value is a type-specific contract response whose `data`
//! field is ciphertext (no envelope).

use base64::{Engine as _, engine::general_purpose::STANDARD};
use prost::Message;
use thiserror::Error;

/// Container-level parse failures. These indicate a wire format mismatch,
/// not a missing key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("response data is neither hex nor base64")]
    InvalidEncoding,

    #[error("protobuf decode error: {0}")]
    Malformed(String),
}

impl From<prost::DecodeError> for ContainerError {
    fn from(e: prost::DecodeError) -> Self {
        ContainerError::Malformed(e.to_string())
    }
}

#[derive(Clone, PartialEq, Message)]
struct TxMsgData {
    #[prost(message, repeated, tag = "1")]
    data: Vec<MsgData>,
    #[prost(message, repeated, tag = "2")]
    msg_responses: Vec<Any>,
}

#[derive(Clone, PartialEq, Message)]
struct Any {
    #[prost(string, tag = "1")]
    type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    value: Vec<u8>,
}

/// Legacy per-message slot, keyed by the request type.
#[derive(Clone, PartialEq, Message)]
struct MsgData {
    #[prost(string, tag = "1")]
    msg_type: String,
    #[prost(bytes = "vec", tag = "2")]
    data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct MsgInstantiateContractResponse {
    #[prost(string, tag = "1")]
    address: String,
    #[prost(bytes = "vec", tag = "2")]
    data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct MsgExecuteContractResponse {
    #[prost(bytes = "vec", tag = "1")]
    data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct MsgMigrateContractResponse {
    #[prost(bytes = "vec", tag = "1")]
    data: Vec<u8>,
}

impl TxMsgData {
    fn into_slots(self) -> Vec<RawResponse> {
        if self.msg_responses.is_empty() {
            self.data
                .into_iter()
                .map(|slot| RawResponse {
                    type_url: slot.msg_type,
                    value: slot.data,
                })
                .collect()
        } else {
            self.msg_responses
                .into_iter()
                .map(|any| RawResponse {
                    type_url: any.type_url,
                    value: any.value,
                })
                .collect()
        }
    }
}

/// One per-message slot of the aggregate container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Response type URL (or request type for legacy `MsgData`).
    pub type_url: String,
    /// Encoded response message.
    pub value: Vec<u8>,
}

/// Contract response envelopes, by message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractResponse {
    /// Instantiate carries the new contract address plus encrypted data.
    Instantiate { address: String, data: Vec<u8> },
    /// Execute carries encrypted data only.
    Execute { data: Vec<u8> },
    /// Migrate carries encrypted data only.
    Migrate { data: Vec<u8> },
}

impl ContractResponse {
    /// The encrypted inner blob.
    pub fn data(&self) -> &[u8] {
        match self {
            ContractResponse::Instantiate { data, .. }
            | ContractResponse::Execute { data }
            | ContractResponse::Migrate { data } => data,
        }
    }
}

/// Decode the aggregate response string into per-message slots.
///
/// Hex is tried first (the LCD form), then base64. The two alphabets
/// overlap, so a hex reading that does not parse falls through to base64.
/// An empty string is an empty container.
pub fn decode_container(encoded: &str) -> Result<Vec<RawResponse>, ContainerError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    let hex_error = match hex::decode(encoded) {
        Ok(bytes) => match TxMsgData::decode(bytes.as_slice()) {
            Ok(container) => return Ok(container.into_slots()),
            Err(e) => Some(ContainerError::from(e)),
        },
        Err(_) => None,
    };

    let Ok(bytes) = STANDARD.decode(encoded) else {
        return Err(hex_error.unwrap_or(ContainerError::InvalidEncoding));
    };

    TxMsgData::decode(bytes.as_slice())
        .map(TxMsgData::into_slots)
        .map_err(|e| hex_error.unwrap_or_else(|| e.into()))
}

/// Decode a slot into its contract response, if it is a contract message.
pub fn decode_contract_response(
    raw: &RawResponse,
) -> Result<Option<ContractResponse>, ContainerError> {
    let kind = raw
        .type_url
        .strip_suffix("Response")
        .unwrap_or(&raw.type_url);
    let value = raw.value.as_slice();

    let response = if kind.ends_with("MsgInstantiateContract") {
        let MsgInstantiateContractResponse { address, data } =
            MsgInstantiateContractResponse::decode(value)?;
        ContractResponse::Instantiate { address, data }
    } else if kind.ends_with("MsgExecuteContract") {
        ContractResponse::Execute {
            data: MsgExecuteContractResponse::decode(value)?.data,
        }
    } else if kind.ends_with("MsgMigrateContract") {
        ContractResponse::Migrate {
            data: MsgMigrateContractResponse::decode(value)?.data,
        }
    } else {
        return Ok(None);
    };

    Ok(Some(response))
}

/// Encode slots as a `TxMsgData` (field 2 form).
pub fn encode_container(responses: &[RawResponse]) -> Vec<u8> {
    TxMsgData {
        data: Vec::new(),
        msg_responses: responses
            .iter()
            .map(|response| Any {
                type_url: response.type_url.clone(),
                value: response.value.clone(),
            })
            .collect(),
    }
    .encode_to_vec()
}

/// Encode a contract response message.
pub fn encode_contract_response(response: &ContractResponse) -> Vec<u8> {
    match response {
        ContractResponse::Instantiate { address, data } => MsgInstantiateContractResponse {
            address: address.clone(),
            data: data.clone(),
        }
        .encode_to_vec(),
        ContractResponse::Execute { data } => MsgExecuteContractResponse { data: data.clone() }
            .encode_to_vec(),
        ContractResponse::Migrate { data } => MsgMigrateContractResponse { data: data.clone() }
            .encode_to_vec(),
    }
}
