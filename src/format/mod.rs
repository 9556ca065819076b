//! Output formatting module.

mod json;
mod pretty;

use crate::classify::ParsedMessage;
use crate::cli::Args;
use crate::error::{Error, Result};
use crate::query::QueryResult;
use crate::transaction::DecryptedTransaction;
use serde::Serialize;
use serde_json::Value as JsonValue;

pub use json::format_json;
pub use pretty::{format_envelope_pretty, format_query_pretty, format_transaction_pretty};

/// Everything shown for one transaction: the decrypted transaction plus
/// the classification of each message. This is also what queries select from.
#[derive(Debug, Serialize)]
pub struct TransactionView<'a> {
    #[serde(flatten)]
    pub transaction: &'a DecryptedTransaction,
    pub classified: &'a [ParsedMessage],
}

impl<'a> TransactionView<'a> {
    pub fn new(transaction: &'a DecryptedTransaction, classified: &'a [ParsedMessage]) -> Self {
        TransactionView {
            transaction,
            classified,
        }
    }

    pub fn to_json(&self) -> Result<JsonValue> {
        serde_json::to_value(self).map_err(|e| Error::FormatError(e.to_string()))
    }
}

/// What the `envelope` subcommand reports about one blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeReport {
    pub nonce: String,
    pub sender_public_key: String,
    pub ciphertext_len: usize,
    pub decrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plaintext: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Format a full transaction according to the output flags.
pub fn format_transaction(view: &TransactionView<'_>, args: &Args) -> Result<String> {
    if args.json {
        format_json(view)
    } else {
        Ok(format_transaction_pretty(view))
    }
}

/// Format a query result according to the output flags.
pub fn format_query(result: &QueryResult, args: &Args) -> Result<String> {
    if args.json {
        format_json(result)
    } else {
        format_query_pretty(result)
    }
}

/// Format an envelope report according to the output flags.
pub fn format_envelope(report: &EnvelopeReport, args: &Args) -> Result<String> {
    if args.json {
        format_json(report)
    } else {
        Ok(format_envelope_pretty(report))
    }
}
