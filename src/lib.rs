//! scrtx - confidential transaction decoder.
//!
//! Reconstructs the plaintext view of a transaction whose contract inputs,
//! event attributes, responses and error log are encrypted per message,
//! then classifies every decrypted contract call.
//!
//! # Features
//!
//! - Read `tx_response` JSON from a file, inline argument, or stdin
//! - Decrypt with a wallet transaction encryption seed (X25519 + HKDF + AES-SIV)
//!   or any other [`decrypt::DecryptionCapability`]
//! - Per-message nonces: attributes and responses only open for messages
//!   whose input opened
//! - Classify known token and NFT calls, fall back to a generic field dump
//! - Query fields with dot notation and `*` wildcards
//! - Pretty terminal output or JSON
//! - Check mode with exit codes

pub mod classify;
pub mod cli;
pub mod config;
pub mod decode;
pub mod decrypt;
pub mod error;
pub mod format;
pub mod input;
pub mod query;
pub mod transaction;

pub use cli::{Args, Command};
pub use error::{Error, Result};

use classify::{ContractLabels, classify_transaction};
use decode::EncryptedEnvelope;
use decrypt::{DecryptionCapability, DecryptionEngine, TxEncryptionKey};
use format::{EnvelopeReport, TransactionView, format_envelope, format_query, format_transaction};
use futures::executor::block_on;
use input::read_input;
use query::execute_query;
use tracing::debug;
use transaction::{TxResponse, decrypt_transaction, parse_input_plaintext};

/// Run scrtx with the given arguments.
pub fn run(args: &Args) -> Result<()> {
    let key = load_key(args)?;

    // Single envelope inspection skips the transaction pipeline
    if let Some(Command::Envelope { blob }) = &args.command {
        let report = inspect_envelope(blob, key.as_ref())?;
        println!("{}", format_envelope(&report, args)?);
        return Ok(());
    }

    // Resolve query and input from positional arguments
    let (query_opt, input_spec) = args.resolve();

    // Read and parse the transaction JSON
    let text = read_input(&input_spec)?;
    let tx = TxResponse::from_json(&text)?;

    // Decrypt whatever the key can open
    let capability = key.as_ref().map(|k| k as &dyn DecryptionCapability);
    let decrypted = block_on(decrypt_transaction(tx, capability));

    // Check mode: succeed only if something was decrypted
    if args.check {
        return if decrypted.decrypted {
            Ok(())
        } else {
            Err(Error::NotDecrypted)
        };
    }

    // Classify with optional contract labels
    let labels = match &args.labels {
        Some(path) => config::load_labels(path)?,
        None => ContractLabels::new(),
    };
    let classified = classify_transaction(&decrypted, &labels);
    let view = TransactionView::new(&decrypted, &classified);

    // Format and print output
    let output = match query_opt {
        Some(query) => format_query(&execute_query(&view.to_json()?, query)?, args)?,
        None => format_transaction(&view, args)?,
    };
    println!("{}", output);

    Ok(())
}

/// Build the encryption key from `--key-file` and the chain flags.
pub fn load_key(args: &Args) -> Result<Option<TxEncryptionKey>> {
    let Some(path) = &args.key_file else {
        return Ok(None);
    };
    let seed = config::load_seed(path)?;
    let chain = args.chain_config()?;
    let key = TxEncryptionKey::from_seed(seed, &chain);
    debug!(public_key = %hex::encode(key.public_key()), "loaded transaction encryption key");
    Ok(Some(key))
}

/// Describe one envelope and open it when a key is available.
pub fn inspect_envelope(blob: &str, key: Option<&TxEncryptionKey>) -> Result<EnvelopeReport> {
    let envelope =
        EncryptedEnvelope::from_base64(blob).map_err(|e| Error::DecodeFailed(e.to_string()))?;

    let engine = DecryptionEngine::new(key.map(|k| k as &dyn DecryptionCapability));
    let (plaintext, failure) = match block_on(engine.open_envelope(blob)) {
        Ok(opened) => (Some(parse_input_plaintext(&opened.plaintext)), None),
        Err(e) => (None, Some(e.to_string())),
    };

    Ok(EnvelopeReport {
        nonce: envelope.nonce.to_string(),
        sender_public_key: hex::encode(envelope.sender_public_key),
        ciphertext_len: envelope.ciphertext.len(),
        decrypted: plaintext.is_some(),
        plaintext,
        failure,
    })
}
