//! CLI argument parsing for scrtx.

use crate::config::{ChainConfig, DEFAULT_HKDF_SALT, MAINNET_CONSENSUS_IO_PUBKEY};
use crate::error::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Confidential transaction decoder for Secret-style chains.
///
/// Decrypts the contract inputs, event attributes, responses and error log
/// of a transaction with your wallet's transaction encryption seed, then
/// classifies every contract call.
#[derive(Parser, Debug)]
#[command(
    name = "scrtx",
    version,
    about = "Decrypt and classify confidential contract transactions",
    after_help = r#"EXAMPLES:
    scrtx tx.json --key-file seed.hex          Decrypt and show a transaction
    curl -s $LCD/cosmos/tx/v1beta1/txs/$HASH | scrtx --key-file seed.hex
    scrtx msgs.0.msg tx.json --key-file seed.hex
                                               Query the decrypted first input
    scrtx events.*.type tx.json                Wildcard (all event types)
    scrtx tx.json --json                       JSON output
    scrtx tx.json --key-file seed.hex --check  Exit 0 only if something decrypted
    scrtx envelope CiBh...                     Inspect one encrypted blob

QUERY SHORTCUTS:
    hash       → tx.txhash
    code       → tx.code
    log        → tx.raw_log
    msgs       → tx.tx.body.messages
    events     → tx.events
    status     → messages
    parsed     → classified"#
)]
pub struct Args {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Query path or input (file path / inline JSON).
    /// If one argument: treated as input unless it looks like a query.
    /// If two arguments: first is query, second is input.
    #[arg(value_name = "QUERY_OR_INPUT")]
    pub first: Option<String>,

    /// Input file or inline JSON when a query is provided.
    #[arg(value_name = "INPUT")]
    pub second: Option<String>,

    /// File holding the 32-byte transaction encryption seed, hex.
    #[arg(long, short = 'k', env = "SCRTX_KEY_FILE", global = true)]
    pub key_file: Option<PathBuf>,

    /// Chain consensus IO public key, base64 (defaults to mainnet).
    #[arg(long, env = "SCRTX_CONSENSUS_IO_PUBKEY", global = true)]
    pub consensus_io_pubkey: Option<String>,

    /// HKDF salt of the chain's transaction encryption, hex.
    #[arg(long, env = "SCRTX_HKDF_SALT", global = true)]
    pub hkdf_salt: Option<String>,

    /// JSON object mapping contract addresses to display labels.
    #[arg(long, short = 'l', env = "SCRTX_LABELS")]
    pub labels: Option<PathBuf>,

    /// Output as JSON.
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Validate only (exit 0 if at least one message input decrypted).
    #[arg(long, short = 'c')]
    pub check: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace). Logs go to stderr.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect a single encrypted envelope.
    ///
    /// Shows the nonce, the sender public key and the ciphertext size, and
    /// decrypts the payload when a key file is given.
    #[command(name = "envelope")]
    Envelope {
        /// The base64 envelope (a contract input as found in a transaction).
        blob: String,
    },
}

/// Specifies where the transaction JSON comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Read from stdin.
    Stdin,
    /// Read from a file path.
    File(PathBuf),
    /// JSON given directly on the command line.
    Inline(String),
}

impl Args {
    /// Resolve the query and input from positional arguments.
    ///
    /// Returns (optional query path, input source).
    pub fn resolve(&self) -> (Option<&str>, InputSpec) {
        match (&self.first, &self.second) {
            (None, None) => (None, InputSpec::Stdin),

            (Some(first), None) => {
                if Self::looks_like_query(first) {
                    (Some(first.as_str()), InputSpec::Stdin)
                } else {
                    (None, InputSpec::detect(first))
                }
            }

            (Some(query), Some(input)) => (Some(query.as_str()), InputSpec::detect(input)),

            // clap fills positionals in order
            (None, Some(input)) => (None, InputSpec::detect(input)),
        }
    }

    /// Chain parameters from the flags, falling back to mainnet values.
    pub fn chain_config(&self) -> Result<ChainConfig> {
        if self.consensus_io_pubkey.is_none() && self.hkdf_salt.is_none() {
            return Ok(ChainConfig::default());
        }
        ChainConfig::parse(
            self.consensus_io_pubkey
                .as_deref()
                .unwrap_or(MAINNET_CONSENSUS_IO_PUBKEY),
            self.hkdf_salt.as_deref().unwrap_or(DEFAULT_HKDF_SALT),
        )
    }

    /// Heuristic to determine if a string looks like a query path.
    fn looks_like_query(s: &str) -> bool {
        let shortcuts = [
            "hash", "code", "log", "msgs", "events", "status", "parsed", "tx", "messages",
            "responses", "classified", "decrypted",
        ];
        if shortcuts.contains(&s) {
            return true;
        }

        if s.trim_start().starts_with('{') || s.ends_with(".json") || s.contains('/') {
            return false;
        }

        s.contains('.') || s.contains('*')
    }
}

impl InputSpec {
    /// Detect input type from a string argument.
    pub fn detect(s: &str) -> Self {
        if s.trim_start().starts_with('{') {
            return InputSpec::Inline(s.to_string());
        }
        InputSpec::File(PathBuf::from(s))
    }
}
