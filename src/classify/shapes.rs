//! Known contract-call shapes.
//!
//! Each variant is one externally tagged JSON object (`{"transfer": {...}}`).
//! A payload matches a variant when it has exactly that single top-level key
//! and the inner object carries the variant's required fields. Required key
//! sets differ between variants, so at most one can match.

use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A recognized contract call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractCall {
    Transfer(TransferCall),
    Send(SendCall),
    BatchTransfer(BatchTransferCall),
    TransferFrom(TransferFromCall),
    SendFrom(SendFromCall),
    IncreaseAllowance(AllowanceCall),
    DecreaseAllowance(AllowanceCall),
    Burn(BurnCall),
    Mint(MintCall),
    Deposit(DepositCall),
    Redeem(RedeemCall),
    SetViewingKey(SetViewingKeyCall),
    CreateViewingKey(CreateViewingKeyCall),
    RevokePermit(RevokePermitCall),
    TransferNft(TransferNftCall),
    SendNft(SendNftCall),
    BatchTransferNft(BatchTransferNftCall),
    MintNft(MintNftCall),
}

impl ContractCall {
    /// Display title.
    pub fn title(&self) -> &'static str {
        match self {
            ContractCall::Transfer(_) => "Transfer",
            ContractCall::Send(_) => "Send",
            ContractCall::BatchTransfer(_) => "Batch Transfer",
            ContractCall::TransferFrom(_) => "Transfer From",
            ContractCall::SendFrom(_) => "Send From",
            ContractCall::IncreaseAllowance(_) => "Increase Allowance",
            ContractCall::DecreaseAllowance(_) => "Decrease Allowance",
            ContractCall::Burn(_) => "Burn",
            ContractCall::Mint(_) => "Mint",
            ContractCall::Deposit(_) => "Deposit",
            ContractCall::Redeem(_) => "Redeem",
            ContractCall::SetViewingKey(_) => "Set Viewing Key",
            ContractCall::CreateViewingKey(_) => "Create Viewing Key",
            ContractCall::RevokePermit(_) => "Revoke Permit",
            ContractCall::TransferNft(_) => "Transfer NFT",
            ContractCall::SendNft(_) => "Send NFT",
            ContractCall::BatchTransferNft(_) => "Batch Transfer NFT",
            ContractCall::MintNft(_) => "Mint NFT",
        }
    }
}

/// Match a payload against the known shapes.
pub fn recognize(payload: &JsonValue) -> Option<ContractCall> {
    ContractCall::deserialize(payload).ok()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferCall {
    pub recipient: String,
    pub amount: String,
    pub memo: Option<String>,
    pub decoys: Option<Vec<String>>,
    pub entropy: Option<String>,
    pub padding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendCall {
    pub recipient: String,
    pub amount: String,
    pub recipient_code_hash: Option<String>,
    /// Base64 callback message for the recipient contract.
    pub msg: Option<String>,
    pub memo: Option<String>,
    pub padding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchTransferCall {
    pub actions: Vec<TransferAction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferAction {
    pub recipient: String,
    pub amount: String,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferFromCall {
    pub owner: String,
    pub recipient: String,
    pub amount: String,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendFromCall {
    pub owner: String,
    pub recipient: String,
    pub amount: String,
    pub recipient_code_hash: Option<String>,
    pub msg: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AllowanceCall {
    pub spender: String,
    pub amount: String,
    /// Unix seconds.
    pub expiration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BurnCall {
    pub amount: String,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MintCall {
    pub recipient: String,
    pub amount: String,
    pub memo: Option<String>,
}

/// `{"deposit": {}}`; the deposited coins travel as sent funds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepositCall {
    pub padding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedeemCall {
    pub amount: String,
    pub denom: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SetViewingKeyCall {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateViewingKeyCall {
    pub entropy: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RevokePermitCall {
    pub permit_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferNftCall {
    pub recipient: String,
    pub token_id: String,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendNftCall {
    pub contract: String,
    pub token_id: String,
    pub msg: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchTransferNftCall {
    pub transfers: Vec<NftTransfer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NftTransfer {
    pub recipient: String,
    pub token_ids: Vec<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MintNftCall {
    pub token_id: Option<String>,
    pub owner: Option<String>,
    pub public_metadata: Option<JsonValue>,
    pub private_metadata: Option<JsonValue>,
    pub memo: Option<String>,
}
