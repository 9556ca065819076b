//! Wire codecs: encrypted envelopes and the aggregate response container.

mod envelope;
mod msg_data;

pub use envelope::{
    ENVELOPE_PREFIX_SIZE, EncryptedEnvelope, EnvelopeError, NONCE_SIZE, Nonce, RESERVED_SIZE,
    decode_envelope,
};
pub use msg_data::{
    ContainerError, ContractResponse, RawResponse, decode_container, decode_contract_response,
    encode_container, encode_contract_response,
};
