//! Transaction model and the whole-transaction decoder.

mod decoder;
mod error_log;
mod types;

pub use decoder::{
    CODE_HASH_PREFIX_LEN, CONFIDENTIAL_EVENT_TYPE, decrypt_transaction, parse_input_plaintext,
};
pub use error_log::{EncryptedError, decrypt_error_log, find_encrypted_error};
pub use types::{
    Coin, DecryptedTransaction, Event, EventAttribute, MSG_EXECUTE_CONTRACT,
    MSG_INSTANTIATE_CONTRACT, MSG_INDEX_KEY, MSG_MIGRATE_CONTRACT, Message, MessageStatus,
    MsgResponse, Tx, TxBody, TxLog, TxResponse, confidential_field, parse_msg_index,
};
