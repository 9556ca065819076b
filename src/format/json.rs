//! JSON output formatting.

use crate::error::{Error, Result};
use serde::Serialize;

/// Format any output value as pretty JSON.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::FormatError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ContractLabels, classify_transaction};
    use crate::format::TransactionView;
    use crate::query::{QueryResult, QueryValue};
    use crate::transaction::{DecryptedTransaction, TxResponse};

    #[test]
    fn test_format_single_value() {
        let result = QueryResult::Single(QueryValue::String("test".to_string()));
        let output = format_json(&result).unwrap();
        assert_eq!(output.trim(), "\"test\"");
    }

    #[test]
    fn test_format_multiple() {
        let result = QueryResult::Multiple(vec![
            QueryValue::String("a".to_string()),
            QueryValue::String("b".to_string()),
        ]);
        let output = format_json(&result).unwrap();
        assert!(output.contains("\"a\""));
        assert!(output.contains("\"b\""));
    }

    #[test]
    fn test_transaction_view_is_flat() {
        let tx = TxResponse::from_json(r#"{"txhash": "AB", "height": "7"}"#).unwrap();
        let decrypted = DecryptedTransaction {
            tx,
            messages: Vec::new(),
            responses: Vec::new(),
            decrypted: false,
        };
        let classified = classify_transaction(&decrypted, &ContractLabels::new());
        let view = TransactionView::new(&decrypted, &classified);

        let json: serde_json::Value = serde_json::from_str(&format_json(&view).unwrap()).unwrap();
        assert_eq!(json["decrypted"], false);
        assert_eq!(json["tx"]["txhash"], "AB");
        assert_eq!(json["tx"]["height"], "7");
        assert!(json["classified"].as_array().unwrap().is_empty());
    }
}
