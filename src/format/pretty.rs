//! Pretty terminal output with colors and tables.

use crate::classify::{ParsedMessage, Renderable};
use crate::error::{Error, Result};
use crate::format::{EnvelopeReport, TransactionView};
use crate::query::{QueryResult, QueryValue};
use crate::transaction::{Event, MessageStatus, MsgResponse};
use colored::Colorize;
use comfy_table::{Cell, ContentArrangement, Table, presets};

const LABEL_WIDTH: usize = 14;

/// Format a decoded transaction for the terminal.
pub fn format_transaction_pretty(view: &TransactionView<'_>) -> String {
    let tx = view.transaction;
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Transaction".bold().cyan()));
    output.push_str(&format!(
        "  {} {}\n",
        "Hash:".dimmed(),
        or_unknown(&tx.tx.txhash).yellow()
    ));
    let code = if tx.tx.code == 0 {
        "0 (success)".green()
    } else {
        format!("{} (failed)", tx.tx.code).red()
    };
    output.push_str(&format!("  {} {}\n", "Code:".dimmed(), code));
    output.push_str(&format!(
        "  {} {}\n\n",
        "Decrypted:".dimmed(),
        if tx.decrypted {
            "yes".green()
        } else {
            "no".red()
        }
    ));

    if !view.classified.is_empty() {
        output.push_str(&format!(
            "{} ({})\n",
            "Messages".bold().cyan(),
            view.classified.len()
        ));
        for (idx, parsed) in view.classified.iter().enumerate() {
            output.push_str(&format_message(idx, parsed, tx.messages.get(idx)));
        }
        output.push('\n');
    }

    let amounts: Vec<String> = view
        .classified
        .iter()
        .flat_map(|p| p.amounts.iter())
        .map(|coin| format!("{} {}", group_digits(&coin.amount), coin_name(coin)))
        .collect();
    if !amounts.is_empty() {
        output.push_str(&format!("{}\n", "Amounts".bold().cyan()));
        for amount in amounts {
            output.push_str(&format!("  {}\n", amount));
        }
        output.push('\n');
    }

    if !tx.events().is_empty() {
        output.push_str(&format!(
            "{} ({})\n",
            "Events".bold().cyan(),
            tx.events().len()
        ));
        output.push_str(&format_events_table(tx.events()));
        output.push_str("\n\n");
    }

    if !tx.responses.is_empty() {
        output.push_str(&format!(
            "{} ({})\n",
            "Responses".bold().cyan(),
            tx.responses.len()
        ));
        for response in &tx.responses {
            output.push_str(&format_response(response));
        }
        output.push('\n');
    }

    if tx.tx.code != 0 && !tx.raw_log().is_empty() {
        output.push_str(&format!("{}\n", "Log".bold().cyan()));
        output.push_str(&format!("  {}\n\n", tx.raw_log().red()));
    }

    if tx.needs_capability() {
        output.push_str(&format!(
            "{} pass --key-file to decrypt contract messages\n",
            "hint:".yellow()
        ));
    }

    output
}

fn format_message(idx: usize, parsed: &ParsedMessage, status: Option<&MessageStatus>) -> String {
    let mut output = format!(
        "  [{}] {}{}\n",
        idx.to_string().dimmed(),
        parsed.title.bold(),
        status.map(format_status).unwrap_or_default()
    );

    for (label, value) in &parsed.fields {
        let text = format_renderable(value);
        let mut lines = text.lines();
        let first = lines.next().unwrap_or_default();
        output.push_str(&format!(
            "      {} {}\n",
            format!("{:<width$}", label, width = LABEL_WIDTH).dimmed(),
            first
        ));
        for line in lines {
            output.push_str(&format!("      {:<width$} {}\n", "", line, width = LABEL_WIDTH));
        }
    }

    output
}

fn format_status(status: &MessageStatus) -> String {
    if !status.confidential {
        return String::new();
    }
    if status.decrypted {
        format!("  {}", "decrypted".green())
    } else {
        let why = status
            .failure
            .map(|f| format!(" ({})", f))
            .unwrap_or_default();
        format!("  {}", format!("encrypted{}", why).red())
    }
}

fn format_renderable(value: &Renderable) -> String {
    match value {
        Renderable::Address {
            address,
            label: Some(label),
        } => format!("{} {}", label.bold(), format!("({})", address).dimmed()),
        Renderable::Address { address, .. } => address.yellow().to_string(),
        Renderable::Amount(coin) => format!("{} {}", group_digits(&coin.amount), coin_name(coin)),
        Renderable::Encrypted => "Encrypted".red().to_string(),
        Renderable::Truncated { preview, .. } => format!("{}{}", preview, "…".dimmed()),
        Renderable::List(items) => items
            .iter()
            .map(format_renderable)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn coin_name(coin: &crate::classify::CoinAmount) -> String {
    match &coin.label {
        Some(label) => label.clone(),
        None => truncate_middle(&coin.denom, 24),
    }
}

/// Format events as a table, one row per attribute.
fn format_events_table(events: &[Event]) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(comfy_table::Color::DarkGrey),
        Cell::new("Type").fg(comfy_table::Color::DarkGrey),
        Cell::new("Key").fg(comfy_table::Color::DarkGrey),
        Cell::new("Value").fg(comfy_table::Color::DarkGrey),
    ]);

    for (idx, event) in events.iter().enumerate() {
        if event.attributes.is_empty() {
            table.add_row(vec![Cell::new(idx), Cell::new(&event.kind)]);
            continue;
        }
        for attr in &event.attributes {
            table.add_row(vec![
                Cell::new(idx),
                Cell::new(&event.kind),
                Cell::new(truncate_middle(&attr.key, 32)),
                Cell::new(truncate_middle(&attr.value, 48)),
            ]);
        }
    }

    table.to_string()
}

fn format_response(response: &MsgResponse) -> String {
    let type_name = response
        .type_url
        .rsplit('.')
        .next()
        .unwrap_or(&response.type_url);
    let mut output = format!("  [{}] {}", response.index.to_string().dimmed(), type_name);

    if let Some(address) = &response.address {
        output.push_str(&format!(" {}", address.yellow()));
    }

    if !response.decrypted {
        output.push_str(&format!(" {}\n", "encrypted".red()));
        return output;
    }
    output.push_str(&format!(" {}\n", "decrypted".green()));

    let body = match &response.json {
        Some(json) => serde_json::to_string_pretty(json).unwrap_or_default(),
        None => String::from_utf8_lossy(&response.data).into_owned(),
    };
    for line in body.lines() {
        output.push_str(&format!("      {}\n", line));
    }
    output
}

/// Format the `envelope` subcommand report.
pub fn format_envelope_pretty(report: &EnvelopeReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Envelope".bold().cyan()));
    output.push_str(&format!("  {} {}\n", "Nonce:".dimmed(), report.nonce.yellow()));
    output.push_str(&format!(
        "  {} {}\n",
        "Sender key:".dimmed(),
        report.sender_public_key
    ));
    output.push_str(&format!(
        "  {} {} bytes\n",
        "Ciphertext:".dimmed(),
        report.ciphertext_len
    ));

    match (&report.plaintext, &report.failure) {
        (Some(plaintext), _) => {
            output.push_str(&format!("\n{}\n", "Plaintext".bold().cyan()));
            let text = serde_json::to_string_pretty(plaintext).unwrap_or_default();
            for line in text.lines() {
                output.push_str(&format!("  {}\n", line));
            }
        }
        (None, Some(failure)) => {
            output.push_str(&format!("  {} {}\n", "Decrypted:".dimmed(), failure.red()));
        }
        (None, None) => {}
    }

    output
}

/// Format a query result for the terminal.
pub fn format_query_pretty(result: &QueryResult) -> Result<String> {
    match result {
        QueryResult::Single(value) => format_single_value(value),
        QueryResult::Multiple(values) => format_multiple_values(values),
    }
}

fn format_single_value(value: &QueryValue) -> Result<String> {
    match value {
        QueryValue::Null => Ok("null".dimmed().to_string()),
        QueryValue::Bool(b) => Ok(if *b {
            "true".green().to_string()
        } else {
            "false".red().to_string()
        }),
        QueryValue::Number(n) => Ok(n.to_string()),
        QueryValue::String(s) => Ok(s.clone()),
        QueryValue::Array(arr) => {
            let items: Result<Vec<String>> = arr.iter().map(format_single_value).collect();
            Ok(format!("[{}]", items?.join(", ")))
        }
        QueryValue::Object(_) => {
            serde_json::to_string_pretty(value).map_err(|e| Error::FormatError(e.to_string()))
        }
    }
}

/// Format multiple query values (from wildcard).
fn format_multiple_values(values: &[QueryValue]) -> Result<String> {
    let formatted: Result<Vec<String>> = values
        .iter()
        .enumerate()
        .map(|(idx, v)| {
            let formatted = format_single_value(v)?;
            Ok(format!("[{}] {}", idx.to_string().dimmed(), formatted))
        })
        .collect();

    Ok(formatted?.join("\n"))
}

fn or_unknown(s: &str) -> &str {
    if s.is_empty() { "unknown" } else { s }
}

/// Insert thousand separators into an integer amount string.
fn group_digits(amount: &str) -> String {
    if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
        return amount.to_string();
    }
    let mut result = String::new();
    for (i, c) in amount.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Shorten long text around the middle, on char boundaries.
fn truncate_middle(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        return s.to_string();
    }
    let half = (max_len - 3) / 2;
    let head: String = s.chars().take(half).collect();
    let tail: String = s.chars().skip(count - half).collect();
    format!("{}...{}", head, tail)
}
