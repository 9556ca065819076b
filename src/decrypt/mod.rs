//! Decryption engine: the injected capability, nonce bookkeeping and orchestration.

mod capability;
mod engine;
mod nonce;
mod secret;

pub use capability::{DecryptError, DecryptionCapability, FailureKind};
pub use engine::{DecryptionEngine, InputOutcome, OpenedInput};
pub use nonce::NonceTable;
pub use secret::TxEncryptionKey;
