//! Message classification.
//!
//! Turns a (possibly still encrypted) contract payload into a titled,
//! ordered list of labelled values plus the coin amounts it moves. Pure:
//! the only lookup is the caller-supplied contract label table.

mod shapes;
mod value;

pub use shapes::{ContractCall, recognize};
pub use value::{TRUNCATE_AT, generic_fields, render_binary, render_text, render_value};

use crate::transaction::{
    Coin, DecryptedTransaction, MSG_EXECUTE_CONTRACT, MSG_INSTANTIATE_CONTRACT,
    MSG_MIGRATE_CONTRACT, Message,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Known contract address → human label.
pub type ContractLabels = HashMap<String, String>;

/// A coin amount extracted for aggregate display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinAmount {
    pub amount: String,
    /// Native denom, or the token contract address for SNIP-20 amounts.
    pub denom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl fmt::Display for CoinAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.label.as_deref().unwrap_or(&self.denom))
    }
}

/// One displayable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Renderable {
    Text(String),
    Address {
        address: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Amount(CoinAmount),
    Coins(Vec<CoinAmount>),
    /// Structured JSON, shown pretty-printed.
    Json(JsonValue),
    /// Long text; `full` is kept for expansion.
    Truncated { preview: String, full: String },
    /// Payload that could not be decrypted.
    Encrypted,
    List(Vec<Renderable>),
}

impl fmt::Display for Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderable::Text(s) => write!(f, "{}", s),
            Renderable::Address {
                address,
                label: Some(label),
            } => write!(f, "{} ({})", label, address),
            Renderable::Address { address, .. } => write!(f, "{}", address),
            Renderable::Amount(coin) => write!(f, "{}", coin),
            Renderable::Coins(coins) => {
                let parts: Vec<String> = coins.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            Renderable::Json(value) => {
                let text = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                write!(f, "{}", text)
            }
            Renderable::Truncated { preview, .. } => write!(f, "{}…", preview),
            Renderable::Encrypted => write!(f, "Encrypted"),
            Renderable::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedMessage {
    pub title: String,
    /// Matched shape title, `None` when the generic renderer was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<&'static str>,
    /// Display order is significant.
    pub fields: Vec<(String, Renderable)>,
    pub amounts: Vec<CoinAmount>,
}

impl ParsedMessage {
    pub fn is_generic(&self) -> bool {
        self.shape.is_none()
    }

    /// First field with the given label.
    pub fn field(&self, label: &str) -> Option<&Renderable> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| value)
    }
}

/// What the classifier knows about the message besides its payload.
#[derive(Debug, Clone)]
pub struct MessageContext<'a> {
    pub type_url: &'a str,
    pub sender: Option<&'a str>,
    pub contract: Option<&'a str>,
    pub funds: Vec<Coin>,
    pub labels: &'a ContractLabels,
    /// Whether the confidential input was opened.
    pub decrypted: bool,
}

impl<'a> MessageContext<'a> {
    pub fn from_message(msg: &'a Message, labels: &'a ContractLabels) -> Self {
        MessageContext {
            type_url: &msg.type_url,
            sender: msg.str_field("sender"),
            contract: msg.str_field("contract"),
            funds: msg.funds(),
            labels,
            decrypted: false,
        }
    }

    fn address(&self, address: &str) -> Renderable {
        Renderable::Address {
            address: address.to_string(),
            label: self.labels.get(address).cloned(),
        }
    }

    /// A token amount of the called contract.
    fn token_amount(&self, amount: &str) -> CoinAmount {
        let denom = self.contract.unwrap_or_default().to_string();
        CoinAmount {
            amount: amount.to_string(),
            label: self.labels.get(&denom).cloned(),
            denom,
        }
    }

    fn native_funds(&self) -> Vec<CoinAmount> {
        self.funds
            .iter()
            .map(|coin| CoinAmount {
                amount: coin.amount.clone(),
                denom: coin.denom.clone(),
                label: None,
            })
            .collect()
    }
}

/// Accumulates fields in display order.
struct Builder<'c> {
    ctx: &'c MessageContext<'c>,
    fields: Vec<(String, Renderable)>,
    amounts: Vec<CoinAmount>,
}

impl<'c> Builder<'c> {
    fn new(ctx: &'c MessageContext<'c>) -> Self {
        Builder {
            ctx,
            fields: Vec::new(),
            amounts: Vec::new(),
        }
    }

    fn push(&mut self, label: &str, value: Renderable) {
        self.fields.push((label.to_string(), value));
    }

    fn text(&mut self, label: &str, value: &str) {
        self.push(label, Renderable::Text(value.to_string()));
    }

    fn optional(&mut self, label: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.text(label, value);
        }
    }

    fn address(&mut self, label: &str, address: &str) {
        let value = self.ctx.address(address);
        self.push(label, value);
    }

    fn amount(&mut self, label: &str, amount: &str) {
        let coin = self.ctx.token_amount(amount);
        self.amounts.push(coin.clone());
        self.push(label, Renderable::Amount(coin));
    }

    fn binary(&mut self, label: &str, encoded: Option<&str>) {
        if let Some(encoded) = encoded {
            self.push(label, render_binary(encoded));
        }
    }

    fn finish(mut self, title: &str, shape: Option<&'static str>) -> ParsedMessage {
        if let Some(contract) = self.ctx.contract {
            self.address("Contract", contract);
        }
        let funds = self.ctx.native_funds();
        if !funds.is_empty() {
            self.push("Sent Funds", Renderable::Coins(funds.clone()));
            self.amounts.extend(funds);
        }
        ParsedMessage {
            title: title.to_string(),
            shape,
            fields: self.fields,
            amounts: self.amounts,
        }
    }
}

/// Classify one payload.
pub fn classify(payload: &JsonValue, ctx: &MessageContext<'_>) -> ParsedMessage {
    let mut builder = Builder::new(ctx);

    // Undecrypted inputs are still the original base64 string.
    if let JsonValue::String(text) = payload {
        let rendered = if ctx.decrypted {
            render_text(text)
        } else {
            Renderable::Encrypted
        };
        builder.push("Message", rendered);
        return builder.finish(fallback_title(ctx.type_url), None);
    }

    match ctx.type_url {
        MSG_INSTANTIATE_CONTRACT | MSG_MIGRATE_CONTRACT => {
            for (label, value) in generic_fields(payload) {
                builder.push(&label, value);
            }
            builder.finish(fallback_title(ctx.type_url), None)
        }
        _ => match recognize(payload) {
            Some(call) => {
                let title = call.title();
                render_call(&mut builder, call);
                builder.finish(title, Some(title))
            }
            None => {
                for (label, value) in generic_fields(payload) {
                    builder.push(&label, value);
                }
                builder.finish(fallback_title(ctx.type_url), None)
            }
        },
    }
}

/// Classify every message of a decoded transaction, in order.
///
/// Messages without a confidential input are listed by their plaintext
/// fields.
pub fn classify_transaction(
    tx: &DecryptedTransaction,
    labels: &ContractLabels,
) -> Vec<ParsedMessage> {
    tx.tx
        .messages()
        .iter()
        .enumerate()
        .map(|(index, msg)| {
            let mut ctx = MessageContext::from_message(msg, labels);
            ctx.decrypted = tx.messages.get(index).is_some_and(|s| s.decrypted);
            match msg.payload() {
                Some(payload) => classify(payload, &ctx),
                None => plaintext_message(msg, &ctx),
            }
        })
        .collect()
}

fn plaintext_message(msg: &Message, ctx: &MessageContext<'_>) -> ParsedMessage {
    let mut builder = Builder::new(ctx);
    for (key, value) in &msg.fields {
        builder.push(key, render_value(value));
    }
    ParsedMessage {
        title: short_type_name(&msg.type_url).to_string(),
        shape: None,
        fields: builder.fields,
        amounts: Vec::new(),
    }
}

fn fallback_title(type_url: &str) -> &'static str {
    match type_url {
        MSG_INSTANTIATE_CONTRACT => "Instantiate Contract",
        MSG_MIGRATE_CONTRACT => "Migrate Contract",
        MSG_EXECUTE_CONTRACT => "Execute Contract",
        _ => "Contract Call",
    }
}

fn short_type_name(type_url: &str) -> &str {
    type_url.rsplit('.').next().unwrap_or(type_url)
}

fn render_call(b: &mut Builder<'_>, call: ContractCall) {
    match call {
        ContractCall::Transfer(c) => {
            b.address("Recipient", &c.recipient);
            b.amount("Amount", &c.amount);
            b.optional("Memo", c.memo.as_deref());
            if let Some(decoys) = c.decoys.filter(|d| !d.is_empty()) {
                let list = decoys.iter().map(|d| b.ctx.address(d)).collect();
                b.push("Decoys", Renderable::List(list));
            }
        }
        ContractCall::Send(c) => {
            b.address("Recipient", &c.recipient);
            b.amount("Amount", &c.amount);
            b.optional("Memo", c.memo.as_deref());
            b.binary("Callback", c.msg.as_deref());
            b.optional("Recipient Code Hash", c.recipient_code_hash.as_deref());
        }
        ContractCall::BatchTransfer(c) => {
            for action in c.actions {
                b.address("Recipient", &action.recipient);
                b.amount("Amount", &action.amount);
                b.optional("Memo", action.memo.as_deref());
            }
        }
        ContractCall::TransferFrom(c) => {
            b.address("Owner", &c.owner);
            b.address("Recipient", &c.recipient);
            b.amount("Amount", &c.amount);
            b.optional("Memo", c.memo.as_deref());
        }
        ContractCall::SendFrom(c) => {
            b.address("Owner", &c.owner);
            b.address("Recipient", &c.recipient);
            b.amount("Amount", &c.amount);
            b.optional("Memo", c.memo.as_deref());
            b.binary("Callback", c.msg.as_deref());
            b.optional("Recipient Code Hash", c.recipient_code_hash.as_deref());
        }
        ContractCall::IncreaseAllowance(c) | ContractCall::DecreaseAllowance(c) => {
            b.address("Spender", &c.spender);
            b.amount("Amount", &c.amount);
            if let Some(expiration) = c.expiration {
                b.text("Expiration", &expiration.to_string());
            }
        }
        ContractCall::Burn(c) => {
            b.amount("Amount", &c.amount);
            b.optional("Memo", c.memo.as_deref());
        }
        ContractCall::Mint(c) => {
            b.address("Recipient", &c.recipient);
            b.amount("Amount", &c.amount);
            b.optional("Memo", c.memo.as_deref());
        }
        ContractCall::Deposit(_) => {}
        ContractCall::Redeem(c) => {
            b.amount("Amount", &c.amount);
            b.optional("Denom", c.denom.as_deref());
        }
        ContractCall::SetViewingKey(c) => b.text("Viewing Key", &c.key),
        ContractCall::CreateViewingKey(c) => b.push("Entropy", render_text(&c.entropy)),
        ContractCall::RevokePermit(c) => b.text("Permit", &c.permit_name),
        ContractCall::TransferNft(c) => {
            b.address("Recipient", &c.recipient);
            b.text("Token ID", &c.token_id);
            b.optional("Memo", c.memo.as_deref());
        }
        ContractCall::SendNft(c) => {
            b.address("Recipient Contract", &c.contract);
            b.text("Token ID", &c.token_id);
            b.optional("Memo", c.memo.as_deref());
            b.binary("Callback", c.msg.as_deref());
        }
        ContractCall::BatchTransferNft(c) => {
            for transfer in c.transfers {
                b.address("Recipient", &transfer.recipient);
                b.text("Token IDs", &transfer.token_ids.join(", "));
                b.optional("Memo", transfer.memo.as_deref());
            }
        }
        ContractCall::MintNft(c) => {
            b.optional("Token ID", c.token_id.as_deref());
            if let Some(owner) = c.owner {
                b.address("Owner", &owner);
            }
            if let Some(metadata) = c.public_metadata {
                b.push("Public Metadata", Renderable::Json(metadata));
            }
            if c.private_metadata.is_some() {
                b.text("Private Metadata", "(present)");
            }
            b.optional("Memo", c.memo.as_deref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainConfig;
    use crate::decrypt::TxEncryptionKey;
    use crate::transaction::{DecryptedTransaction, MessageStatus, TxResponse, decrypt_transaction};
    use futures::executor::block_on;
    use serde_json::json;

    fn execute_ctx<'a>(labels: &'a ContractLabels) -> MessageContext<'a> {
        MessageContext {
            type_url: MSG_EXECUTE_CONTRACT,
            sender: Some("secret1sender"),
            contract: Some("secret1token"),
            funds: Vec::new(),
            labels,
            decrypted: true,
        }
    }

    #[test]
    fn test_transfer_is_recognized() {
        let labels = ContractLabels::new();
        let parsed = classify(
            &json!({"transfer": {"recipient": "addr1", "amount": "100"}}),
            &execute_ctx(&labels),
        );

        assert_eq!(parsed.title, "Transfer");
        assert!(!parsed.is_generic());
        assert_eq!(
            parsed.field("Recipient"),
            Some(&Renderable::Address {
                address: "addr1".to_string(),
                label: None
            })
        );
        assert_eq!(parsed.fields[0].0, "Recipient");
        assert_eq!(
            parsed.amounts,
            vec![CoinAmount {
                amount: "100".to_string(),
                denom: "secret1token".to_string(),
                label: None
            }]
        );
    }

    #[test]
    fn test_unknown_shape_falls_back_to_generic() {
        let labels = ContractLabels::new();
        let parsed = classify(&json!({"frobnicate": {"x": 1}}), &execute_ctx(&labels));

        assert!(parsed.is_generic());
        assert_eq!(parsed.title, "Execute Contract");
        assert_eq!(parsed.field("frobnicate"), Some(&Renderable::Json(json!({"x": 1}))));
    }

    #[test]
    fn test_labels_are_applied() {
        let mut labels = ContractLabels::new();
        labels.insert("secret1token".to_string(), "sSCRT".to_string());
        labels.insert("addr1".to_string(), "Alice".to_string());

        let parsed = classify(
            &json!({"transfer": {"recipient": "addr1", "amount": "5"}}),
            &execute_ctx(&labels),
        );
        assert_eq!(parsed.field("Recipient").unwrap().to_string(), "Alice (addr1)");
        assert_eq!(parsed.amounts[0].to_string(), "5 sSCRT");
        assert_eq!(
            parsed.field("Contract").unwrap().to_string(),
            "sSCRT (secret1token)"
        );
    }

    #[test]
    fn test_sent_funds_appended() {
        let labels = ContractLabels::new();
        let mut ctx = execute_ctx(&labels);
        ctx.funds = vec![Coin {
            denom: "uscrt".to_string(),
            amount: "1000000".to_string(),
        }];

        let parsed = classify(&json!({"deposit": {}}), &ctx);
        assert_eq!(parsed.title, "Deposit");
        assert_eq!(parsed.amounts.len(), 1);
        assert_eq!(parsed.amounts[0].denom, "uscrt");
        assert!(parsed.field("Sent Funds").is_some());
    }

    #[test]
    fn test_encrypted_payload() {
        let labels = ContractLabels::new();
        let mut ctx = execute_ctx(&labels);
        ctx.decrypted = false;

        let parsed = classify(&json!("Q2lwaGVydGV4dA=="), &ctx);
        assert_eq!(parsed.field("Message"), Some(&Renderable::Encrypted));
        assert!(parsed.is_generic());
    }

    #[test]
    fn test_decrypted_text_payload_is_generic() {
        let labels = ContractLabels::new();
        let parsed = classify(&json!("hello world"), &execute_ctx(&labels));
        assert_eq!(
            parsed.field("Message"),
            Some(&Renderable::Text("hello world".to_string()))
        );
        assert_eq!(parsed.title, "Execute Contract");
    }

    #[test]
    fn test_decrypted_non_json_input_is_not_encrypted() {
        let key = TxEncryptionKey::from_seed([3; 32], &ChainConfig::default());
        let plaintext = format!("{}hello world", "a".repeat(64));
        let envelope = key.encrypt(plaintext.as_bytes()).unwrap();
        let fields = json!({
            "sender": "secret1sender",
            "contract": "secret1token",
            "msg": envelope.to_base64()
        });
        let mut tx = TxResponse::default();
        tx.tx.body.messages = vec![Message::new(
            MSG_EXECUTE_CONTRACT,
            fields.as_object().unwrap().clone(),
        )];

        let decrypted = block_on(decrypt_transaction(tx, Some(&key)));
        assert!(decrypted.messages[0].decrypted);

        let parsed = classify_transaction(&decrypted, &ContractLabels::new());
        assert_eq!(
            parsed[0].field("Message"),
            Some(&Renderable::Text("hello world".to_string()))
        );
    }

    #[test]
    fn test_unopened_input_stays_encrypted() {
        let fields = json!({"sender": "s", "contract": "c", "msg": "Q2lwaGVydGV4dA=="});
        let mut tx = TxResponse::default();
        tx.tx.body.messages = vec![Message::new(
            MSG_EXECUTE_CONTRACT,
            fields.as_object().unwrap().clone(),
        )];

        let decrypted = block_on(decrypt_transaction(tx, None));
        let parsed = classify_transaction(&decrypted, &ContractLabels::new());
        assert_eq!(parsed[0].field("Message"), Some(&Renderable::Encrypted));
    }

    #[test]
    fn test_instantiate_title() {
        let labels = ContractLabels::new();
        let ctx = MessageContext {
            type_url: MSG_INSTANTIATE_CONTRACT,
            sender: Some("secret1sender"),
            contract: None,
            funds: Vec::new(),
            labels: &labels,
            decrypted: true,
        };
        let parsed = classify(&json!({"name": "Token", "symbol": "TKN"}), &ctx);
        assert_eq!(parsed.title, "Instantiate Contract");
        assert_eq!(parsed.field("symbol"), Some(&Renderable::Text("TKN".to_string())));
    }

    #[test]
    fn test_send_callback_is_decoded() {
        let labels = ContractLabels::new();
        let parsed = classify(
            &json!({"send": {"recipient": "secret1pool", "amount": "9", "msg": "eyJzd2FwIjp7fX0="}}),
            &execute_ctx(&labels),
        );
        assert_eq!(parsed.title, "Send");
        assert_eq!(parsed.field("Callback"), Some(&Renderable::Json(json!({"swap": {}}))));
    }

    #[test]
    fn test_batch_transfer_collects_all_amounts() {
        let labels = ContractLabels::new();
        let parsed = classify(
            &json!({"batch_transfer": {"actions": [
                {"recipient": "a", "amount": "1"},
                {"recipient": "b", "amount": "2"}
            ]}}),
            &execute_ctx(&labels),
        );
        assert_eq!(parsed.amounts.len(), 2);
        let recipients = parsed.fields.iter().filter(|(l, _)| l == "Recipient").count();
        assert_eq!(recipients, 2);
    }

    #[test]
    fn test_classify_transaction_covers_every_message() {
        let exec = json!({"sender": "s", "contract": "secret1token", "msg": {"burn": {"amount": "3"}}});
        let bank = json!({"from_address": "a", "to_address": "b"});
        let mut tx = TxResponse::default();
        tx.tx.body.messages = vec![
            Message::new(MSG_EXECUTE_CONTRACT, exec.as_object().unwrap().clone()),
            Message::new("/cosmos.bank.v1beta1.MsgSend", bank.as_object().unwrap().clone()),
        ];
        let decrypted = DecryptedTransaction {
            tx,
            messages: Vec::<MessageStatus>::new(),
            responses: Vec::new(),
            decrypted: true,
        };

        let parsed = classify_transaction(&decrypted, &ContractLabels::new());
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].title, "Burn");
        assert_eq!(parsed[1].title, "MsgSend");
        assert_eq!(parsed[1].field("to_address"), Some(&Renderable::Text("b".to_string())));
    }
}
