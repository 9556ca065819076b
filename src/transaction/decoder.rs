//! Whole-transaction decryption.
//!
//! Runs in strict phases so the nonce table is complete before it is read:
//!
//! 1. open every confidential message input (concurrently), recording nonces
//! 2. decrypt `wasm` event attributes tagged with an opened message index
//! 3. decrypt response slots of opened messages
//! 4. splice a decrypted contract error into the raw log of a failed tx
//!
//! No phase can abort the decode; each field degrades to "as received".

use crate::decode::{RawResponse, decode_container, decode_contract_response};
use crate::decrypt::{DecryptionCapability, DecryptionEngine, InputOutcome, NonceTable};
use crate::transaction::error_log::decrypt_error_log;
use crate::transaction::types::{
    DecryptedTransaction, Event, EventAttribute, MSG_INDEX_KEY, MessageStatus, MsgResponse,
    TxResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use futures::future::join_all;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, warn};

/// Hex characters of the contract code hash prepended to every plaintext input.
///
/// Fixed by the chain; if it ever changes, input parsing silently breaks.
pub const CODE_HASH_PREFIX_LEN: usize = 64;

/// The one event type whose attributes are encrypted.
pub const CONFIDENTIAL_EVENT_TYPE: &str = "wasm";

/// Attributes of confidential events that are always plaintext.
const PLAINTEXT_ATTRIBUTE_KEYS: [&str; 2] = [MSG_INDEX_KEY, "contract_address"];

/// Decrypt everything in `tx` that the capability can open.
///
/// Passing `None` for the capability yields an undecrypted view whose
/// messages report [`crate::decrypt::FailureKind::CapabilityUnavailable`].
pub async fn decrypt_transaction(
    mut tx: TxResponse,
    capability: Option<&dyn DecryptionCapability>,
) -> DecryptedTransaction {
    let engine = DecryptionEngine::new(capability);

    flatten_legacy_logs(&mut tx);

    let (nonces, messages) = open_message_inputs(&engine, &mut tx).await;

    decrypt_events(&engine, &nonces, &mut tx.events).await;

    let responses = decrypt_responses(&engine, &nonces, &tx.data).await;

    if tx.code != 0 && !tx.raw_log.is_empty() {
        if let Some(log) = decrypt_error_log(&engine, &nonces, &tx.raw_log).await {
            tx.raw_log = log;
        }
    }

    let decrypted = messages.iter().any(|m| m.decrypted);
    info!(
        txhash = %tx.txhash,
        messages = messages.len(),
        opened = nonces.len(),
        "transaction decode finished"
    );

    DecryptedTransaction {
        tx,
        messages,
        responses,
        decrypted,
    }
}

/// Phase one. Replaces opened inputs in place and returns the nonce table.
async fn open_message_inputs(
    engine: &DecryptionEngine<'_>,
    tx: &mut TxResponse,
) -> (NonceTable, Vec<MessageStatus>) {
    let inputs: Vec<(usize, String)> = tx
        .tx
        .body
        .messages
        .iter()
        .enumerate()
        .filter_map(|(index, msg)| Some((index, msg.encrypted_input()?.to_string())))
        .collect();
    let borrowed: Vec<(usize, &str)> = inputs.iter().map(|(i, s)| (*i, s.as_str())).collect();

    let (nonces, outcomes) = engine.open_inputs(&borrowed).await;

    let mut statuses: Vec<MessageStatus> = tx
        .tx
        .body
        .messages
        .iter()
        .enumerate()
        .map(|(index, msg)| MessageStatus {
            index,
            type_url: msg.type_url.clone(),
            confidential: msg.confidential_field().is_some(),
            decrypted: false,
            failure: None,
            reason: None,
        })
        .collect();

    for InputOutcome { index, result } in outcomes {
        let status = &mut statuses[index];
        match result {
            Ok(plaintext) => {
                let msg = &mut tx.tx.body.messages[index];
                if let Some(field) = msg.confidential_field() {
                    msg.fields
                        .insert(field.to_string(), parse_input_plaintext(&plaintext));
                }
                status.decrypted = true;
            }
            Err(e) => {
                status.failure = Some(e.kind());
                status.reason = Some(e.to_string());
            }
        }
    }

    (nonces, statuses)
}

/// Strip the code-hash prefix and parse the remaining JSON. Non-JSON
/// remainders are kept as a string.
pub fn parse_input_plaintext(plaintext: &[u8]) -> JsonValue {
    let text = String::from_utf8_lossy(plaintext);
    let body = text.get(CODE_HASH_PREFIX_LEN..).unwrap_or(&text);
    serde_json::from_str(body).unwrap_or_else(|_| JsonValue::String(body.to_string()))
}

/// Legacy responses group events under `logs[]`; flatten them into the
/// event list with an explicit `msg_index` attribute.
fn flatten_legacy_logs(tx: &mut TxResponse) {
    if !tx.events.is_empty() || tx.logs.is_empty() {
        return;
    }

    for log in &tx.logs {
        for event in &log.events {
            let mut event = event.clone();
            if event.msg_index().is_none() {
                event.attributes.push(EventAttribute::new(
                    MSG_INDEX_KEY,
                    &log.msg_index.to_string(),
                ));
            }
            tx.events.push(event);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AttributePart {
    Key,
    Value,
}

struct AttributeJob {
    event: usize,
    attribute: usize,
    part: AttributePart,
    msg_index: usize,
    ciphertext: Vec<u8>,
}

/// Phase two. Best-effort, per attribute, per part.
async fn decrypt_events(engine: &DecryptionEngine<'_>, nonces: &NonceTable, events: &mut [Event]) {
    let mut jobs = Vec::new();

    for (event_idx, event) in events.iter().enumerate() {
        if event.kind != CONFIDENTIAL_EVENT_TYPE {
            continue;
        }
        let Some(msg_index) = event.msg_index() else {
            debug!(event = event_idx, "confidential event without a usable msg_index");
            continue;
        };
        if !nonces.contains(msg_index) {
            continue;
        }

        for (attr_idx, attr) in event.attributes.iter().enumerate() {
            if PLAINTEXT_ATTRIBUTE_KEYS.contains(&attr.key.as_str()) {
                continue;
            }
            for (part, text) in [
                (AttributePart::Key, &attr.key),
                (AttributePart::Value, &attr.value),
            ] {
                if let Ok(ciphertext) = STANDARD.decode(text) {
                    jobs.push(AttributeJob {
                        event: event_idx,
                        attribute: attr_idx,
                        part,
                        msg_index,
                        ciphertext,
                    });
                }
            }
        }
    }

    let attempts = jobs.into_iter().map(|job| async move {
        let result = engine
            .open_with_nonce(nonces, job.msg_index, &job.ciphertext)
            .await;
        (job, result)
    });

    for (job, result) in join_all(attempts).await {
        let plaintext = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(msg_index = job.msg_index, error = %e, "event attribute left encrypted");
                continue;
            }
        };
        let Ok(text) = String::from_utf8(plaintext) else {
            continue;
        };

        let attr = &mut events[job.event].attributes[job.attribute];
        match job.part {
            AttributePart::Key => attr.key = text.trim().to_string(),
            AttributePart::Value => attr.value = text.trim().to_string(),
        }
    }
}

/// Phase three. Container failure is a wire-format defect and is logged as
/// such; slot failures leave the slot opaque.
async fn decrypt_responses(
    engine: &DecryptionEngine<'_>,
    nonces: &NonceTable,
    data: &str,
) -> Vec<MsgResponse> {
    let slots = match decode_container(data) {
        Ok(slots) => slots,
        Err(e) => {
            error!(error = %e, "response data container failed to parse");
            return Vec::new();
        }
    };

    let attempts = slots
        .into_iter()
        .enumerate()
        .map(|(index, raw)| decrypt_response_slot(engine, nonces, index, raw));

    join_all(attempts).await
}

async fn decrypt_response_slot(
    engine: &DecryptionEngine<'_>,
    nonces: &NonceTable,
    index: usize,
    raw: RawResponse,
) -> MsgResponse {
    if !nonces.contains(index) {
        return MsgResponse::opaque(index, raw.type_url, raw.value);
    }

    let parsed = decode_contract_response(&raw);
    let slot = MsgResponse::opaque(index, raw.type_url, raw.value);
    let response = match parsed {
        Ok(Some(response)) => response,
        Ok(None) => return slot,
        Err(e) => {
            warn!(msg_index = index, error = %e, "response slot failed to parse");
            return slot;
        }
    };

    let slot = slot.with_address(&response);
    if response.data().is_empty() {
        return slot;
    }

    match engine.open_with_nonce(nonces, index, response.data()).await {
        Ok(plaintext) => {
            let inner = decode_base64_payload(plaintext);
            let json = serde_json::from_slice(&inner).ok();
            MsgResponse {
                data: inner,
                decrypted: true,
                json,
                ..slot
            }
        }
        Err(e) => {
            debug!(msg_index = index, error = %e, "response data left encrypted");
            slot
        }
    }
}

/// Decrypted response data is base64 text of the inner payload.
fn decode_base64_payload(plaintext: Vec<u8>) -> Vec<u8> {
    std::str::from_utf8(&plaintext)
        .ok()
        .and_then(|text| STANDARD.decode(text.trim()).ok())
        .unwrap_or(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainConfig;
    use crate::decode::{
        ContractResponse, Nonce, RawResponse, encode_container, encode_contract_response,
    };
    use crate::decrypt::{DecryptError, FailureKind, TxEncryptionKey};
    use crate::transaction::types::{MSG_EXECUTE_CONTRACT, MSG_INSTANTIATE_CONTRACT, Message};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CODE_HASH: &str = "af74387e276be8874f07bec3a87023ee49b0e7ebe08178c49d0a49c3c98ed60e";

    fn key(seed: u8) -> TxEncryptionKey {
        TxEncryptionKey::from_seed([seed; 32], &ChainConfig::default())
    }

    /// Encrypt a contract call the way a wallet does.
    fn encrypted_input(key: &TxEncryptionKey, msg: &JsonValue) -> (String, Nonce) {
        let plaintext = format!("{}{}", CODE_HASH, msg);
        let envelope = key.encrypt(plaintext.as_bytes()).unwrap();
        (envelope.to_base64(), envelope.nonce)
    }

    fn execute(input: &str) -> Message {
        let fields = json!({
            "sender": "secret1sender",
            "contract": "secret1token",
            "msg": input,
            "sent_funds": []
        });
        Message::new(MSG_EXECUTE_CONTRACT, fields.as_object().unwrap().clone())
    }

    fn seal_b64(key: &TxEncryptionKey, text: &str, nonce: &Nonce) -> String {
        STANDARD.encode(key.seal(text.as_bytes(), nonce).unwrap())
    }

    fn wasm_event(key: &TxEncryptionKey, nonce: &Nonce, msg_index: &str) -> Event {
        Event {
            kind: CONFIDENTIAL_EVENT_TYPE.to_string(),
            attributes: vec![
                EventAttribute::new("contract_address", "secret1token"),
                EventAttribute::new(
                    &seal_b64(key, "action", nonce),
                    &seal_b64(key, "transfer", nonce),
                ),
                EventAttribute::new(MSG_INDEX_KEY, msg_index),
            ],
        }
    }

    /// Wraps a capability and counts calls.
    struct Counting<'a> {
        inner: &'a TxEncryptionKey,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DecryptionCapability for Counting<'_> {
        async fn decrypt(&self, ciphertext: &[u8], nonce: &Nonce) -> Result<Vec<u8>, DecryptError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.decrypt(ciphertext, nonce).await
        }
    }

    #[test]
    fn test_parse_input_plaintext_strips_code_hash() {
        let plaintext = format!("{}{}", CODE_HASH, r#"{"transfer":{"amount":"1"}}"#);
        assert_eq!(
            parse_input_plaintext(plaintext.as_bytes()),
            json!({"transfer": {"amount": "1"}})
        );
    }

    #[test]
    fn test_parse_input_plaintext_non_json() {
        let plaintext = format!("{}not json", CODE_HASH);
        assert_eq!(
            parse_input_plaintext(plaintext.as_bytes()),
            JsonValue::String("not json".to_string())
        );
    }

    #[test]
    fn test_decrypts_message_input_in_place() {
        let key = key(1);
        let call = json!({"transfer": {"recipient": "secret1r", "amount": "100"}});
        let (input, _) = encrypted_input(&key, &call);

        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(execute(&input));

        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert!(out.decrypted);
        assert!(out.messages[0].decrypted);
        assert_eq!(out.tx.messages()[0].fields["msg"], call);
    }

    #[test]
    fn test_two_message_scenario() {
        let mine = key(1);
        let theirs = key(2);
        let (input0, nonce0) = encrypted_input(&mine, &json!({"transfer": {}}));
        let (input1, nonce1) = encrypted_input(&theirs, &json!({"transfer": {}}));

        let mut tx = TxResponse::default();
        tx.tx.body.messages = vec![execute(&input0), execute(&input1)];
        tx.events = vec![
            wasm_event(&mine, &nonce0, "0"),
            wasm_event(&theirs, &nonce1, "1"),
        ];
        let untouched = tx.events[1].clone();

        let out = block_on(decrypt_transaction(tx, Some(&mine)));

        assert!(out.decrypted);
        assert!(out.messages[0].decrypted);
        assert!(!out.messages[1].decrypted);
        assert_eq!(out.messages[1].failure, Some(FailureKind::Rejected));
        assert_eq!(out.tx.messages()[1].fields["msg"], JsonValue::String(input1));

        assert_eq!(out.events()[0].attribute("action"), Some("transfer"));
        assert_eq!(out.events()[0].attribute("contract_address"), Some("secret1token"));
        assert_eq!(out.events()[1], untouched);
    }

    #[test]
    fn test_no_confidential_messages() {
        let fields = json!({"from_address": "a", "to_address": "b", "amount": []});
        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(Message::new(
            "/cosmos.bank.v1beta1.MsgSend",
            fields.as_object().unwrap().clone(),
        ));
        let before = serde_json::to_value(&tx).unwrap();

        let key = key(1);
        let out = block_on(decrypt_transaction(tx, Some(&key)));

        assert!(!out.decrypted);
        assert!(!out.messages[0].confidential);
        assert_eq!(out.messages[0].failure, None);
        assert_eq!(serde_json::to_value(&out.tx).unwrap(), before);
    }

    #[test]
    fn test_without_capability() {
        let (input, _) = encrypted_input(&key(1), &json!({"transfer": {}}));
        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(execute(&input));

        let out = block_on(decrypt_transaction(tx, None));
        assert!(!out.decrypted);
        assert!(out.needs_capability());
        assert_eq!(
            out.messages[0].failure,
            Some(FailureKind::CapabilityUnavailable)
        );
    }

    #[test]
    fn test_plaintext_input_is_left_alone() {
        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(execute("eyJ4IjoxfQ=="));

        let key = key(1);
        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert!(!out.decrypted);
        assert_eq!(
            out.messages[0].failure,
            Some(FailureKind::MalformedEnvelope)
        );
        assert_eq!(out.tx.messages()[0].fields["msg"], "eyJ4IjoxfQ==");
    }

    #[test]
    fn test_leading_zero_msg_index_is_ignored() {
        let key = key(1);
        let (input, nonce) = encrypted_input(&key, &json!({"transfer": {}}));
        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(execute(&input));
        tx.events = vec![wasm_event(&key, &nonce, "00")];
        let original = tx.events[0].clone();

        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert_eq!(out.events()[0], original);
    }

    #[test]
    fn test_non_wasm_events_untouched() {
        let key = key(1);
        let (input, nonce) = encrypted_input(&key, &json!({"transfer": {}}));
        let mut event = wasm_event(&key, &nonce, "0");
        event.kind = "message".to_string();

        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(execute(&input));
        tx.events = vec![event.clone()];

        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert_eq!(out.events()[0], event);
    }

    #[test]
    fn test_legacy_logs_are_flattened() {
        let key = key(1);
        let (input, nonce) = encrypted_input(&key, &json!({"transfer": {}}));
        let mut event = wasm_event(&key, &nonce, "0");
        event.attributes.retain(|a| a.key != MSG_INDEX_KEY);

        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(execute(&input));
        tx.logs = vec![crate::transaction::types::TxLog {
            msg_index: 0,
            log: String::new(),
            events: vec![event],
        }];

        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert_eq!(out.events().len(), 1);
        assert_eq!(out.events()[0].msg_index(), Some(0));
        assert_eq!(out.events()[0].attribute("action"), Some("transfer"));
    }

    #[test]
    fn test_responses_decrypted_per_slot() {
        let mine = key(1);
        let theirs = key(2);
        let (input0, nonce0) = encrypted_input(&mine, &json!({"transfer": {}}));
        let (input1, nonce1) = encrypted_input(&theirs, &json!({"transfer": {}}));

        let inner0 = STANDARD.encode(br#"{"transfer":{"status":"success"}}"#);
        let inner1 = STANDARD.encode(b"hidden");
        let slots = vec![
            RawResponse {
                type_url: format!("{}Response", MSG_EXECUTE_CONTRACT),
                value: encode_contract_response(&ContractResponse::Execute {
                    data: mine.seal(inner0.as_bytes(), &nonce0).unwrap(),
                }),
            },
            RawResponse {
                type_url: format!("{}Response", MSG_EXECUTE_CONTRACT),
                value: encode_contract_response(&ContractResponse::Execute {
                    data: theirs.seal(inner1.as_bytes(), &nonce1).unwrap(),
                }),
            },
        ];
        let opaque_slot = slots[1].value.clone();

        let mut tx = TxResponse::default();
        tx.tx.body.messages = vec![execute(&input0), execute(&input1)];
        tx.data = hex::encode_upper(encode_container(&slots));

        let out = block_on(decrypt_transaction(tx, Some(&mine)));
        assert_eq!(out.responses.len(), 2);
        assert!(out.responses[0].decrypted);
        assert_eq!(
            out.responses[0].json,
            Some(json!({"transfer": {"status": "success"}}))
        );
        assert!(!out.responses[1].decrypted);
        assert_eq!(out.responses[1].data, opaque_slot);
    }

    #[test]
    fn test_instantiate_response_keeps_address() {
        let key = key(1);
        let (input, nonce) = encrypted_input(&key, &json!({"name": "token"}));
        let fields = json!({"sender": "secret1s", "code_id": "1", "label": "t", "init_msg": input});

        let inner = STANDARD.encode(b"{}");
        let slots = vec![RawResponse {
            type_url: format!("{}Response", MSG_INSTANTIATE_CONTRACT),
            value: encode_contract_response(&ContractResponse::Instantiate {
                address: "secret1new".to_string(),
                data: key.seal(inner.as_bytes(), &nonce).unwrap(),
            }),
        }];

        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(Message::new(
            MSG_INSTANTIATE_CONTRACT,
            fields.as_object().unwrap().clone(),
        ));
        tx.data = STANDARD.encode(encode_container(&slots));

        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert_eq!(out.tx.messages()[0].fields["init_msg"], json!({"name": "token"}));
        assert_eq!(out.responses[0].address.as_deref(), Some("secret1new"));
        assert!(out.responses[0].decrypted);
        assert_eq!(out.responses[0].data, b"{}");
    }

    #[test]
    fn test_bad_container_yields_no_responses() {
        let mut tx = TxResponse::default();
        tx.data = "12ff".to_string();

        let key = key(1);
        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert!(out.responses.is_empty());
    }

    #[test]
    fn test_error_log_is_spliced() {
        let key = key(1);
        let (input, nonce) = encrypted_input(&key, &json!({"transfer": {}}));
        let fragment = seal_b64(&key, r#"{"generic_err":{"msg":"insufficient funds"}}"#, &nonce);

        let mut tx = TxResponse::default();
        tx.code = 3;
        tx.raw_log = format!(
            "failed to execute message; message index: 0: encrypted: {}: execute contract failed",
            fragment
        );
        tx.tx.body.messages.push(execute(&input));

        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert_eq!(
            out.raw_log(),
            r#"failed to execute message; message index: 0: {"generic_err":{"msg":"insufficient funds"}}: execute contract failed"#
        );
    }

    #[test]
    fn test_error_log_without_nonce_is_kept() {
        let key = key(1);
        let fragment = seal_b64(&key, "oops", &Nonce::new([1; 32]));
        let raw_log = format!(
            "message index: 0: encrypted: {}: execute contract failed",
            fragment
        );

        let mut tx = TxResponse::default();
        tx.code = 3;
        tx.raw_log = raw_log.clone();

        let out = block_on(decrypt_transaction(tx, Some(&key)));
        assert_eq!(out.raw_log(), raw_log);
    }

    #[test]
    fn test_each_field_attempted_once() {
        let key = key(1);
        let (input, nonce) = encrypted_input(&key, &json!({"transfer": {}}));
        let counting = Counting {
            inner: &key,
            calls: AtomicUsize::new(0),
        };

        let mut tx = TxResponse::default();
        tx.tx.body.messages.push(execute(&input));
        tx.events = vec![wasm_event(&key, &nonce, "0")];

        block_on(decrypt_transaction(tx, Some(&counting)));
        // one input + one attribute key + one attribute value
        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
    }
}
