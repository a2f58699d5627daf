mod ibc_client;
mod staking;
mod tokenfactory;

pub use ibc_client::{CreateClientMsg, SubmitMisbehaviourMsg, UpdateClientMsg, UpgradeClientMsg};
pub use staking::{BeginRedelegateMsg, CreateValidatorMsg, DelegateMsg, EditValidatorMsg, UndelegateMsg};
pub use tokenfactory::{BurnMsg, ChangeAdminMsg, CreateDenomMsg, MintMsg, SetDenomMetadataMsg};

use std::sync::Arc;

use crate::chain::any::pack_any;
use crate::chain::error::{ClientError, Result};
use crate::codec::{Codec, Message};

/// Denomination plus integer amount; Cosmos carries the amount as a decimal string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn to_message(&self) -> Message {
        Message::new()
            .with("denom", self.denom.as_str())
            .with("amount", self.amount.to_string())
    }

    /// Reject empty denoms and zero amounts
    pub(crate) fn validate(&self, field: &str) -> Result<()> {
        require(&format!("{}.denom", field), &self.denom)?;
        if self.amount == 0 {
            return Err(ClientError::invalid(field, "amount must be positive"));
        }
        Ok(())
    }
}

/// Helper trait for building transaction messages
pub trait MessageBuilder {
    /// Schema of the Msg this builder produces
    fn codec(&self) -> Arc<Codec>;

    /// Sparse message in snake_case field names; missing fields take defaults
    fn to_partial(&self) -> Message;

    fn type_url(&self) -> String {
        self.codec().type_url()
    }

    /// Complete the partial message and pack it into a `google.protobuf.Any`
    fn to_any(&self) -> Result<Message> {
        let codec = self.codec();
        let complete = codec.from_partial(&self.to_partial())?;
        Ok(pack_any(&codec, &complete)?)
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Addresses must at least carry a bech32 separator
pub(crate) fn require_address(field: &str, value: &str) -> Result<()> {
    require(field, value)?;
    match value.rfind('1') {
        Some(pos) if pos > 0 && pos + 1 < value.len() => Ok(()),
        _ => Err(ClientError::invalid(field, format!("{:?} is not a bech32 address", value))),
    }
}

/// `Any` fields passed by the caller must name their type
pub(crate) fn require_any(field: &str, any: &Message) -> Result<()> {
    match any.get_str("type_url") {
        Some(url) if url.starts_with('/') && url.len() > 1 => Ok(()),
        _ => Err(ClientError::invalid(field, "Any requires a type_url like /pkg.Type")),
    }
}
